//! The frame buffer shifted out to a cascade of TLC59711 chips.
//!
//! A [`Frame`] owns the raw bytes for every chip in the cascade, header
//! included, exactly as they go out on the wire. Header sub-fields are
//! written with the masked read-modify-write in [`crate::field`], channel
//! slots are written as plain big-endian 16-bit values.
//!
//! # DMA
//! The frame implements `ReadBuffer` (from `embedded-dma`, or from `esp-hal`
//! with the `esp-dma` feature) so it can be handed to a DMA-capable SPI
//! peripheral instead of going through [`crate::Tlc59711::show`]. The backing
//! storage is allocated once and never resized, so the pointer it hands out
//! stays valid for the lifetime of the frame.

use alloc::vec;
use alloc::vec::Vec;

use bitfield::bitfield;
#[cfg(not(feature = "esp-dma"))]
use embedded_dma::ReadBuffer;
#[cfg(feature = "esp-dma")]
use esp_hal::dma::ReadBuffer;

use crate::field::set_field;
use crate::layout::{
    FrameLayout, HeaderField, BCB, BCG, BCR, BLANK, DSPRPT, EXTGCK, HEADER_BYTES, OUTTMG,
    SLOT_BYTES, TMGRST, WRITE_CMD, WRITE_COMMAND,
};

/// Largest global brightness value a chip accepts.
pub const BRIGHTNESS_MAX: u8 = 0x7f;

/// Global brightness control for the red, green and blue outputs.
///
/// Each value is 7 bits wide (0-127) and scales the constant current of
/// every output of that color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness {
    /// Red outputs (BCR)
    pub red: u8,
    /// Green outputs (BCG)
    pub green: u8,
    /// Blue outputs (BCB)
    pub blue: u8,
}

impl Brightness {
    /// Full brightness on all colors, the power-on default.
    pub const MAX: Self = Self {
        red: BRIGHTNESS_MAX,
        green: BRIGHTNESS_MAX,
        blue: BRIGHTNESS_MAX,
    };

    /// Create a brightness triple. Values are masked to 7 bits.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red & BRIGHTNESS_MAX,
            green: green & BRIGHTNESS_MAX,
            blue: blue & BRIGHTNESS_MAX,
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

/// The five function control flags of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionControl {
    /// OUTTMG: outputs change on the rising edge of the grayscale clock
    pub output_timing: bool,
    /// EXTGCK: use the serial clock as grayscale clock
    pub external_clock: bool,
    /// TMGRST: reset the grayscale counter when data is latched
    pub timing_reset: bool,
    /// DSPRPT: repeat the PWM cycle automatically
    pub display_repeat: bool,
    /// BLANK: force all outputs off
    pub blank: bool,
}

impl Default for FunctionControl {
    fn default() -> Self {
        Self {
            output_timing: true,
            external_clock: false,
            timing_reset: true,
            display_repeat: true,
            blank: false,
        }
    }
}

bitfield! {
    /// Decoded view of one chip's 32-bit header word.
    ///
    /// The bit layout is as follows:
    /// - Bits 31-26: Write command
    /// - Bit 25: OUTTMG
    /// - Bit 24: EXTGCK
    /// - Bit 23: TMGRST
    /// - Bit 22: DSPRPT
    /// - Bit 21: BLANK
    /// - Bits 20-14: Blue brightness
    /// - Bits 13-7: Green brightness
    /// - Bits 6-0: Red brightness
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ChipHeader(u32);
    impl Debug;
    pub u8, write_command, set_write_command: 31, 26;
    pub outtmg, set_outtmg: 25;
    pub extgck, set_extgck: 24;
    pub tmgrst, set_tmgrst: 23;
    pub dsprpt, set_dsprpt: 22;
    pub blank, set_blank: 21;
    pub u8, bcb, set_bcb: 20, 14;
    pub u8, bcg, set_bcg: 13, 7;
    pub u8, bcr, set_bcr: 6, 0;
}

impl ChipHeader {
    /// Wrap a raw header word.
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        Self(word)
    }

    /// Decode the header stored big-endian in `bytes`.
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; HEADER_BYTES]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// The raw header word.
    #[must_use]
    pub const fn word(&self) -> u32 {
        self.0
    }

    /// The brightness triple stored in this header.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        Brightness::new(self.bcr(), self.bcg(), self.bcb())
    }

    /// The function control flags stored in this header.
    #[must_use]
    pub fn function_control(&self) -> FunctionControl {
        FunctionControl {
            output_timing: self.outtmg(),
            external_clock: self.extgck(),
            timing_reset: self.tmgrst(),
            display_repeat: self.dsprpt(),
            blank: self.blank(),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChipHeader {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ChipHeader({=u32:#010x})", self.0);
    }
}

/// Raw frame for a cascade of chips.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Allocate an all-zero frame for `layout`.
    ///
    /// The headers are not initialized; [`crate::Tlc59711::new`] does that.
    #[must_use]
    pub fn new(layout: &FrameLayout) -> Self {
        Self {
            bytes: vec![0u8; layout.frame_len()],
        }
    }

    /// The bytes exactly as they are sent to the chips.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` for a frame without any chip.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of chips this frame covers.
    #[must_use]
    pub fn chip_count(&self) -> usize {
        self.bytes.len() / crate::layout::CHIP_FRAME_BYTES
    }

    /// Decode the header of `chip_index`, or `None` past the last chip.
    #[must_use]
    pub fn header(&self, chip_index: usize) -> Option<ChipHeader> {
        if chip_index >= self.chip_count() {
            return None;
        }
        let start = FrameLayout::header_offset(chip_index);
        let bytes = self.bytes.get(start..start + HEADER_BYTES)?;
        let mut word = [0u8; HEADER_BYTES];
        word.copy_from_slice(bytes);
        Some(ChipHeader::from_be_bytes(word))
    }

    /// Read the 16-bit value stored at a slot byte offset.
    ///
    /// # Panics
    ///
    /// Panics if the slot is outside the frame.
    #[must_use]
    pub fn read_slot(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    pub(crate) fn write_slot(&mut self, offset: usize, value: u16) {
        self.bytes[offset..offset + SLOT_BYTES].copy_from_slice(&value.to_be_bytes());
    }

    fn set_header_field(&mut self, chip_index: usize, field: HeaderField, value: u32) {
        set_field(
            &mut self.bytes,
            FrameLayout::header_offset(chip_index),
            field.bit_offset,
            field.width,
            value,
        );
    }

    pub(crate) fn write_command(&mut self, chip_index: usize) {
        self.set_header_field(chip_index, WRITE_CMD, WRITE_COMMAND);
    }

    pub(crate) fn write_brightness(&mut self, chip_index: usize, brightness: Brightness) {
        self.set_header_field(chip_index, BCR, u32::from(brightness.red));
        self.set_header_field(chip_index, BCG, u32::from(brightness.green));
        self.set_header_field(chip_index, BCB, u32::from(brightness.blue));
    }

    pub(crate) fn write_function_control(&mut self, chip_index: usize, flags: FunctionControl) {
        self.set_header_field(chip_index, OUTTMG, u32::from(flags.output_timing));
        self.set_header_field(chip_index, EXTGCK, u32::from(flags.external_clock));
        self.set_header_field(chip_index, TMGRST, u32::from(flags.timing_reset));
        self.set_header_field(chip_index, DSPRPT, u32::from(flags.display_repeat));
        self.set_header_field(chip_index, BLANK, u32::from(flags.blank));
    }
}

unsafe impl ReadBuffer for Frame {
    #[cfg(not(feature = "esp-dma"))]
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        (self.bytes.as_ptr(), self.bytes.len())
    }
}

impl core::fmt::Debug for Frame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.bytes.len())
            .field("chip_count", &self.chip_count())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Frame size: {} chip_count: {}",
            self.bytes.len(),
            self.chip_count()
        );
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;

    use super::*;
    use crate::layout::CHIP_FRAME_BYTES;

    fn formatted_frame(pixel_count: usize) -> Frame {
        let layout = FrameLayout::new(pixel_count);
        let mut frame = Frame::new(&layout);
        for chip in 0..layout.chip_count() {
            frame.write_brightness(chip, Brightness::default());
            frame.write_function_control(chip, FunctionControl::default());
            frame.write_command(chip);
        }
        frame
    }

    #[test]
    fn test_brightness_masks_to_seven_bits() {
        let brightness = Brightness::new(0xff, 0x80, 100);
        assert_eq!(brightness.red, 0x7f);
        assert_eq!(brightness.green, 0);
        assert_eq!(brightness.blue, 100);
        assert_eq!(Brightness::default(), Brightness::new(127, 127, 127));
    }

    #[test]
    fn test_function_control_default() {
        let flags = FunctionControl::default();
        assert_eq!(flags.output_timing, true);
        assert_eq!(flags.external_clock, false);
        assert_eq!(flags.timing_reset, true);
        assert_eq!(flags.display_repeat, true);
        assert_eq!(flags.blank, false);
    }

    #[test]
    fn test_chip_header_accessors() {
        let header = ChipHeader::from_word(0x96df_ffff);
        assert_eq!(header.write_command(), 0b10_0101);
        assert_eq!(header.outtmg(), true);
        assert_eq!(header.extgck(), false);
        assert_eq!(header.tmgrst(), true);
        assert_eq!(header.dsprpt(), true);
        assert_eq!(header.blank(), false);
        assert_eq!(header.bcr(), 127);
        assert_eq!(header.bcg(), 127);
        assert_eq!(header.bcb(), 127);
        assert_eq!(header.brightness(), Brightness::MAX);
        assert_eq!(header.function_control(), FunctionControl::default());
    }

    #[test]
    fn test_chip_header_setters() {
        let mut header = ChipHeader::from_word(0);
        header.set_bcr(10);
        header.set_bcg(20);
        header.set_bcb(30);
        assert_eq!(header.word(), 10 | (20 << 7) | (30 << 14));

        header.set_blank(true);
        assert_eq!(header.word() & (1 << 21), 1 << 21);
        assert_eq!(header.bcb(), 30);
    }

    #[test]
    fn test_new_frame_is_zeroed() {
        let frame = Frame::new(&FrameLayout::new(8));
        assert_eq!(frame.len(), 2 * CHIP_FRAME_BYTES);
        assert_eq!(frame.chip_count(), 2);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_default_header_bytes() {
        let frame = formatted_frame(8);
        for chip in 0..2 {
            let start = chip * CHIP_FRAME_BYTES;
            assert_eq!(
                &frame.as_bytes()[start..start + HEADER_BYTES],
                &[0x96, 0xdf, 0xff, 0xff]
            );
            assert_eq!(frame.header(chip).map(|h| h.word()), Some(0x96df_ffff));
        }
        assert_eq!(frame.header(2), None);
    }

    #[test]
    fn test_header_past_the_end_is_none() {
        let frame = formatted_frame(8);
        assert_eq!(frame.header(3), None);
        assert_eq!(frame.header(usize::MAX / 20), None);
        assert_eq!(frame.header(usize::MAX), None);
    }

    #[test]
    fn test_write_brightness_leaves_other_fields() {
        let mut frame = formatted_frame(4);
        frame.write_brightness(0, Brightness::new(10, 20, 30));

        let header = frame.header(0).unwrap();
        assert_eq!(header.brightness(), Brightness::new(10, 20, 30));
        assert_eq!(header.function_control(), FunctionControl::default());
        assert_eq!(header.write_command(), 0b10_0101);
    }

    #[test]
    fn test_write_function_control_leaves_other_fields() {
        let mut frame = formatted_frame(4);
        let flags = FunctionControl {
            output_timing: false,
            external_clock: true,
            timing_reset: false,
            display_repeat: false,
            blank: true,
        };
        frame.write_function_control(0, flags);

        let header = frame.header(0).unwrap();
        assert_eq!(header.function_control(), flags);
        assert_eq!(header.brightness(), Brightness::MAX);
        assert_eq!(header.write_command(), 0b10_0101);
        // EXTGCK | BLANK
        assert_eq!(header.word(), 0x9520_0000 | 0x1f_ffff);
    }

    #[test]
    fn test_slot_is_big_endian() {
        let mut frame = formatted_frame(4);
        frame.write_slot(4, 0x1234);
        assert_eq!(frame.as_bytes()[4], 0x12);
        assert_eq!(frame.as_bytes()[5], 0x34);
        assert_eq!(frame.read_slot(4), 0x1234);
        // header untouched
        assert_eq!(frame.header(0).unwrap().word(), 0x96df_ffff);
    }

    #[test]
    fn test_read_buffer() {
        let frame = formatted_frame(4);
        let (ptr, len) = unsafe { frame.read_buffer() };
        assert_eq!(ptr, frame.as_bytes().as_ptr());
        assert_eq!(len, 28);
    }

    #[test]
    fn test_frame_debug() {
        let frame = formatted_frame(16);
        let debug = format!("{:?}", frame);
        assert_eq!(debug, "Frame { size: 112, chip_count: 4 }");
    }
}
