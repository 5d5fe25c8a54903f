//! Masked read-modify-write of bit fields inside big-endian 32-bit words.
//!
//! The TLC59711 header is a single 32-bit word sent MSB first. Every header
//! sub-field (write command, function control flags and the three brightness
//! values) is updated through [`set_field`], which reads the word at a byte
//! offset, replaces only the bits of one field and writes the word back.
//!
//! Values wider than the field are silently truncated to the field width.
//! Channel PWM values are plain 16-bit stores and never go through here.

/// Returns a mask with the low `width` bits set.
///
/// Widths above 32 are clamped to 32.
#[inline]
#[must_use]
pub const fn field_mask(width: u32) -> u32 {
    let width = if width > u32::BITS { u32::BITS } else { width };
    match u32::MAX.checked_shr(u32::BITS - width) {
        Some(mask) => mask,
        None => 0,
    }
}

#[inline]
fn read_word(buffer: &[u8], byte_offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buffer[byte_offset..byte_offset + 4]);
    u32::from_be_bytes(word)
}

#[inline]
fn write_word(buffer: &mut [u8], byte_offset: usize, word: u32) {
    buffer[byte_offset..byte_offset + 4].copy_from_slice(&word.to_be_bytes());
}

/// Set a `field_width` bit wide field at `bit_offset` in the big-endian word
/// starting at `byte_offset`.
///
/// Bits outside the field are preserved. `field_value` is masked to
/// `field_width` bits before it is shifted into place; any excess bits are
/// dropped without an error.
///
/// # Arguments
///
/// * `buffer` - Byte buffer holding the word
/// * `byte_offset` - Offset of the first (most significant) byte of the word
/// * `bit_offset` - Position of the field's least significant bit, 0 = LSB of the word
/// * `field_width` - Width of the field in bits
/// * `field_value` - New value of the field
///
/// # Panics
///
/// Panics if `byte_offset + 4` is past the end of `buffer`.
///
/// # Example
/// ```rust
/// use tlc59711::field::{get_field, set_field};
///
/// let mut buffer = [0u8; 4];
/// set_field(&mut buffer, 0, 26, 6, 0b10_0101);
/// assert_eq!(buffer, [0x94, 0x00, 0x00, 0x00]);
/// assert_eq!(get_field(&buffer, 0, 26, 6), 0b10_0101);
/// ```
pub fn set_field(
    buffer: &mut [u8],
    byte_offset: usize,
    bit_offset: u32,
    field_width: u32,
    field_value: u32,
) {
    let mask = field_mask(field_width);
    let value = (field_value & mask).checked_shl(bit_offset).unwrap_or(0);
    let clear = mask.checked_shl(bit_offset).unwrap_or(0);

    let mut word = read_word(buffer, byte_offset);
    word &= !clear;
    word |= value;
    write_word(buffer, byte_offset, word);
}

/// Read the `field_width` bit wide field at `bit_offset` of the big-endian
/// word starting at `byte_offset`.
///
/// # Panics
///
/// Panics if `byte_offset + 4` is past the end of `buffer`.
#[must_use]
pub fn get_field(buffer: &[u8], byte_offset: usize, bit_offset: u32, field_width: u32) -> u32 {
    read_word(buffer, byte_offset)
        .checked_shr(bit_offset)
        .unwrap_or(0)
        & field_mask(field_width)
}
