//! Colors for the NeoPixels on the slider's I2C bridge.
//!
//! The bridge takes one to four bytes per pixel in a device specific order.
//! Callers hand in either a packed `0xWWRRGGBB` integer or separate
//! components; [`PixelColor::encode`] resolves both into the byte layout of a
//! [`PixelOrder`].

use embedded_graphics::pixelcolor::RgbColor;

use crate::Color;

/// Byte slot of each component for one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelOrder {
    red: usize,
    green: usize,
    blue: usize,
    white: Option<usize>,
}

impl PixelOrder {
    /// Red, green, blue
    pub const RGB: Self = Self::new(0, 1, 2, None);
    /// Green, red, blue
    pub const GRB: Self = Self::new(1, 0, 2, None);
    /// Red, green, blue, white
    pub const RGBW: Self = Self::new(0, 1, 2, Some(3));
    /// Green, red, blue, white
    pub const GRBW: Self = Self::new(1, 0, 2, Some(3));

    const fn new(red: usize, green: usize, blue: usize, white: Option<usize>) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Bytes per pixel, 3 or 4.
    #[must_use]
    pub const fn bytes_per_pixel(&self) -> usize {
        if self.white.is_some() {
            4
        } else {
            3
        }
    }
}

/// A pixel color as accepted at the bridge boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelColor {
    /// `0xRRGGBB` or `0xWWRRGGBB`
    Packed(u32),
    /// Separate red, green and blue components
    Rgb(Color),
    /// Separate components plus a white channel
    Rgbw(Color, u8),
}

impl From<u32> for PixelColor {
    fn from(value: u32) -> Self {
        Self::Packed(value)
    }
}

impl From<Color> for PixelColor {
    fn from(color: Color) -> Self {
        Self::Rgb(color)
    }
}

impl PixelColor {
    /// The `(red, green, blue, white)` components.
    #[must_use]
    pub fn components(&self) -> (u8, u8, u8, u8) {
        match *self {
            Self::Packed(value) => {
                let [w, r, g, b] = value.to_be_bytes();
                (r, g, b, w)
            }
            Self::Rgb(color) => (color.r(), color.g(), color.b(), 0),
            Self::Rgbw(color, w) => (color.r(), color.g(), color.b(), w),
        }
    }

    /// Lay the color out for `order`.
    ///
    /// Returns the bytes and how many of them are used. A three byte order
    /// drops the white component. A four byte order moves a gray color with
    /// no white component onto the white LED.
    #[must_use]
    pub fn encode(&self, order: PixelOrder) -> ([u8; 4], usize) {
        let (mut r, mut g, mut b, mut w) = self.components();
        let mut bytes = [0u8; 4];

        if let Some(white) = order.white {
            if r == g && g == b && w == 0 {
                w = r;
                r = 0;
                g = 0;
                b = 0;
            }
            bytes[white] = w;
        }
        bytes[order.red] = r;
        bytes[order.green] = g;
        bytes[order.blue] = b;

        (bytes, order.bytes_per_pixel())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PixelColor {
    fn format(&self, f: defmt::Formatter) {
        let (r, g, b, w) = self.components();
        defmt::write!(f, "PixelColor({}, {}, {}, {})", r, g, b, w);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_packed_components() {
        assert_eq!(PixelColor::Packed(0x00ff_8000).components(), (0xff, 0x80, 0, 0));
        assert_eq!(PixelColor::Packed(0x1122_3344).components(), (0x22, 0x33, 0x44, 0x11));
        assert_eq!(PixelColor::from(0x0000_00b9).components(), (0, 0, 0xb9, 0));
    }

    #[test]
    fn test_component_forms_match_packed() {
        let packed = PixelColor::Packed(0x0000_00b9);
        let rgb = PixelColor::from(Color::new(0, 0, 185));
        assert_eq!(packed.components(), rgb.components());
        assert_eq!(packed.encode(PixelOrder::GRB), rgb.encode(PixelOrder::GRB));

        let rgbw = PixelColor::Rgbw(Color::new(1, 2, 3), 4);
        assert_eq!(rgbw.components(), PixelColor::Packed(0x0401_0203).components());
    }

    #[test]
    fn test_encode_grb() {
        let (bytes, len) = PixelColor::Rgb(Color::new(0x10, 0x20, 0x30)).encode(PixelOrder::GRB);
        assert_eq!(len, 3);
        assert_eq!(&bytes[..len], &[0x20, 0x10, 0x30]);
    }

    #[test]
    fn test_encode_rgb_drops_white() {
        let (bytes, len) = PixelColor::Packed(0xff10_2030).encode(PixelOrder::RGB);
        assert_eq!(len, 3);
        assert_eq!(bytes, [0x10, 0x20, 0x30, 0]);
    }

    #[test]
    fn test_encode_gray_moves_to_white() {
        let (bytes, len) = PixelColor::Rgb(Color::WHITE).encode(PixelOrder::GRBW);
        assert_eq!(len, 4);
        assert_eq!(bytes, [0, 0, 0, 0xff]);

        // an explicit white component keeps the colors
        let (bytes, _) = PixelColor::Rgbw(Color::new(9, 9, 9), 1).encode(PixelOrder::RGBW);
        assert_eq!(bytes, [9, 9, 9, 1]);

        // three byte orders never do
        let (bytes, _) = PixelColor::Rgb(Color::WHITE).encode(PixelOrder::GRB);
        assert_eq!(bytes, [0xff, 0xff, 0xff, 0]);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelOrder::RGB.bytes_per_pixel(), 3);
        assert_eq!(PixelOrder::GRB.bytes_per_pixel(), 3);
        assert_eq!(PixelOrder::RGBW.bytes_per_pixel(), 4);
        assert_eq!(PixelOrder::GRBW.bytes_per_pixel(), 4);
    }
}
