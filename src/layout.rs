//! Geometry of the TLC59711 serial frame.
//!
//! Every chip in a cascade consumes a 28 byte region of the frame:
//!
//! ```text
//!  byte  0   1   2   3   4   5   6   7  ...  26  27
//!       [    header     ][ slot 0][ slot 1] ... [slot 11]
//! ```
//!
//! The header is one big-endian 32-bit word:
//!
//! ```text
//!  bit  31..26     25     24     23     22     21    20..14  13..7  6..0
//!      WRITE_CMD OUTTMG EXTGCK TMGRST DSPRPT BLANK    BCB     BCG    BCR
//! ```
//!
//! Slots are big-endian 16-bit PWM values. Regions of cascaded chips are
//! concatenated in the order they are shifted out.

/// Size of one chip's region of the frame in bytes.
pub const CHIP_FRAME_BYTES: usize = 28;
/// Size of the configuration header at the start of each chip region.
pub const HEADER_BYTES: usize = 4;
/// RGB LEDs driven by one chip.
pub const LEDS_PER_CHIP: usize = 4;
/// Color channels per LED.
pub const COLORS_PER_PIXEL: usize = 3;
/// PWM channels per chip.
pub const CHANNELS_PER_CHIP: usize = LEDS_PER_CHIP * COLORS_PER_PIXEL;
/// Size of one channel slot in bytes.
pub const SLOT_BYTES: usize = 2;
/// The write command the chip expects in the top six header bits.
pub const WRITE_COMMAND: u32 = 0b10_0101;

const BC_PART_OFFSET: u32 = 0;
const BC_BITS: u32 = 3 * 7;
const FC_PART_OFFSET: u32 = BC_PART_OFFSET + BC_BITS;
const FC_BITS: u32 = 5;
const WC_PART_OFFSET: u32 = FC_PART_OFFSET + FC_BITS;
const WC_BITS: u32 = 6;

/// Total number of header bits.
pub const HEADER_BITS: u32 = WC_BITS + FC_BITS + BC_BITS;

const _: () = assert!(HEADER_BITS as usize == HEADER_BYTES * 8);
const _: () = assert!(HEADER_BYTES + CHANNELS_PER_CHIP * SLOT_BYTES == CHIP_FRAME_BYTES);

/// Position of a sub-field inside the header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaderField {
    /// Bit offset of the field's least significant bit, 0 = LSB of the word
    pub bit_offset: u32,
    /// Width in bits
    pub width: u32,
}

impl HeaderField {
    const fn new(part_offset: u32, offset: u32, width: u32) -> Self {
        Self {
            bit_offset: part_offset + offset,
            width,
        }
    }
}

/// Red global brightness.
pub const BCR: HeaderField = HeaderField::new(BC_PART_OFFSET, 0, 7);
/// Green global brightness.
pub const BCG: HeaderField = HeaderField::new(BC_PART_OFFSET, 7, 7);
/// Blue global brightness.
pub const BCB: HeaderField = HeaderField::new(BC_PART_OFFSET, 14, 7);

/// Blank all outputs.
pub const BLANK: HeaderField = HeaderField::new(FC_PART_OFFSET, 0, 1);
/// Auto display repeat.
pub const DSPRPT: HeaderField = HeaderField::new(FC_PART_OFFSET, 1, 1);
/// Display timing reset.
pub const TMGRST: HeaderField = HeaderField::new(FC_PART_OFFSET, 2, 1);
/// Use SCKI as the grayscale clock instead of the internal oscillator.
pub const EXTGCK: HeaderField = HeaderField::new(FC_PART_OFFSET, 3, 1);
/// Latch on the rising (set) or falling (clear) edge of the grayscale clock.
pub const OUTTMG: HeaderField = HeaderField::new(FC_PART_OFFSET, 4, 1);

/// Write command.
pub const WRITE_CMD: HeaderField = HeaderField::new(WC_PART_OFFSET, 0, WC_BITS);

/// Computes the number of chips needed for a number of RGB pixels.
///
/// # Arguments
///
/// * `pixel_count` - Number of RGB LEDs in the cascade
///
/// # Returns
///
/// Number of chips, `pixel_count / 4` (integer division)
#[must_use]
pub const fn compute_chip_count(pixel_count: usize) -> usize {
    pixel_count / LEDS_PER_CHIP
}

/// Computes the number of PWM channels for a number of RGB pixels.
#[must_use]
pub const fn compute_channel_count(pixel_count: usize) -> usize {
    pixel_count * COLORS_PER_PIXEL
}

/// Computes the frame length in bytes for a number of RGB pixels.
#[must_use]
pub const fn compute_frame_len(pixel_count: usize) -> usize {
    compute_chip_count(pixel_count) * CHIP_FRAME_BYTES
}

/// Maps a logical channel index to the channel slot it is stored in.
///
/// The outputs are wired in the opposite order to how they are shifted out,
/// so logical channel 0 lives in the last slot of the last chip.
///
/// `channel_index` must be below `channel_count`.
#[inline]
#[must_use]
pub const fn reverse_channel_index(channel_count: usize, channel_index: usize) -> usize {
    channel_count - 1 - channel_index
}

/// Derived sizes for a cascade of chips.
///
/// This is pure arithmetic and does no validation; a pixel count that is not
/// a multiple of four drops the trailing pixels from the chip count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    pixel_count: usize,
}

impl FrameLayout {
    /// Create the layout for `pixel_count` RGB pixels.
    #[must_use]
    pub const fn new(pixel_count: usize) -> Self {
        Self { pixel_count }
    }

    /// Number of RGB pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Number of chips in the cascade.
    #[must_use]
    pub const fn chip_count(&self) -> usize {
        compute_chip_count(self.pixel_count)
    }

    /// Number of PWM channels.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        compute_channel_count(self.pixel_count)
    }

    /// Frame length in bytes.
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        compute_frame_len(self.pixel_count)
    }

    /// Byte offset of a chip's header.
    #[must_use]
    pub const fn header_offset(chip_index: usize) -> usize {
        chip_index * CHIP_FRAME_BYTES
    }

    /// Byte offset of a channel slot, counted in slot (not logical) order.
    ///
    /// `chip = slot_index / 12`, `slot = slot_index % 12`, and the offset is
    /// `chip * 28 + 4 + slot * 2`.
    #[must_use]
    pub const fn channel_offset(slot_index: usize) -> usize {
        let chip = slot_index / CHANNELS_PER_CHIP;
        let slot = slot_index % CHANNELS_PER_CHIP;
        Self::header_offset(chip) + HEADER_BYTES + slot * SLOT_BYTES
    }
}
