//! Frame-buffered driver for TLC59711/TLC5971 LED PWM controllers.
//!
//! ## How the TLC59711 works
//!
//! The TLC59711 is a 12-channel, 16-bit PWM, constant-current LED driver with
//! a two-wire serial interface. It is usually wired to four RGB LEDs.
//!
//! ### Signal names
//! - **SCKI / SDTI** – Serial clock and data in; data is shifted in on the rising clock edge
//! - **SCKO / SDTO** – Buffered clock and data out, wired to the next chip of a cascade
//! - **OUTR0..3 / OUTG0..3 / OUTB0..3** – The twelve constant-current outputs
//!
//! ### Writing the chip
//! 1. The controller shifts in a 224 bit (28 byte) packet per chip: a 32 bit
//!    header followed by twelve 16 bit PWM values.
//! 2. In a cascade the packet for the chip furthest from the controller is
//!    sent first; every chip passes older data on through SDTO.
//! 3. When the clock stops for long enough the chips latch what they
//!    received, all at once.
//!
//! There is no chip select and no read-back: the controller always sends the
//! complete frame for every chip in one go.
//!
//! ### The header
//! - **Write command** (6 bits) – Fixed `0b100101`; the chip ignores packets without it
//! - **Function control** (5 bits) – OUTTMG, EXTGCK, TMGRST, DSPRPT and BLANK
//! - **Global brightness** (3 × 7 bits) – BCB, BCG and BCR scale the output current per color
//!
//! See [`layout`] for the exact bit positions.
//!
//! ## Crate layout
//!
//! - [`Tlc59711`] – The driver: owns the frame and the bus
//! - [`frame`] – The raw frame, the decoded [`ChipHeader`] and DMA access
//! - [`field`] – Masked read-modify-write of header bit fields
//! - [`layout`] – Frame geometry and the logical-to-slot channel mapping
//! - [`control`] – Slider and pushbutton control loop built on the driver
//! - [`patterns`] – Wiring test patterns
//! - [`pixel`] – Colors for the NeoPixels on the slider
//!
//! ## Example
//! ```rust
//! # use core::convert::Infallible;
//! # use embedded_hal::spi::{ErrorType, SpiBus};
//! # struct Bus;
//! # impl ErrorType for Bus { type Error = Infallible; }
//! # impl SpiBus<u8> for Bus {
//! #     fn read(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn write(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer(&mut self, _: &mut [u8], _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Infallible> { Ok(()) }
//! # }
//! # let spi = Bus;
//! use tlc59711::{BusConfig, FunctionControl, Tlc59711};
//!
//! // two chips, eight RGB LEDs
//! let mut leds = Tlc59711::new(spi, 8, BusConfig::default()).unwrap();
//!
//! // dim the red outputs, this writes the frame right away
//! leds.set_brightness(64, 127, 127).unwrap();
//!
//! leds.set_all(25.0).unwrap();
//! leds.set_channel(3, 100.0).unwrap();
//! leds.set_function_control(FunctionControl {
//!     display_repeat: true,
//!     ..FunctionControl::default()
//! });
//! leds.show().unwrap();
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `esp-dma` Feature
//! Switches the `ReadBuffer` implementation of [`Frame`] from `embedded-dma`
//! to `esp-hal::dma`. Enable it when handing the frame to an `esp-hal` SPI
//! DMA transfer. The `esp32`, `esp32s3` and `esp32c6` features select the
//! chip and imply `esp-dma`.
//!
//! ```toml
//! [dependencies]
//! tlc59711 = { version = "0.1.0", features = ["esp32s3"] }
//! ```
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and traces frame writes
//! and control loop updates with `defmt`. No functional changes.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

use embedded_graphics::pixelcolor::Rgb888;

pub mod control;
mod error;
pub mod field;
pub mod frame;
pub mod layout;
pub mod patterns;
pub mod pixel;
mod tlc59711;

#[cfg(test)]
mod mock;

pub use error::{Error, ErrorKind};
pub use frame::{Brightness, ChipHeader, Frame, FunctionControl};
pub use layout::{compute_channel_count, compute_chip_count, compute_frame_len};
pub use tlc59711::{
    percent_to_pwm, pwm_to_percent, BusConfig, Tlc59711, MAX_BUS_FREQUENCY_HZ, PWM_PER_PERCENT,
};

/// Color type used for pixel colors
pub type Color = Rgb888;
