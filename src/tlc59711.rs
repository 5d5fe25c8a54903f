//! Driver for a cascade of TLC59711/TLC5971 chips.
//!
//! The driver keeps the complete frame for every chip in memory. Setting a
//! channel, the brightness or the function control flags only edits that
//! frame; nothing reaches the chips until [`Tlc59711::show`] writes the whole
//! frame to the bus in one transfer. The one exception is
//! [`Tlc59711::set_brightness`], which writes the frame right away.
//!
//! # Channel order
//! The outputs are wired in the reverse of the order they are shifted out.
//! Logical channel `i` is stored in slot `channel_count - 1 - i` (see
//! [`crate::layout::reverse_channel_index`]), so channel 0 is the last
//! output of the last chip in the cascade.
//!
//! # Bus
//! The chip only has a clock and a data input. Any
//! [`embedded_hal::spi::SpiBus`] works; configure it as described by
//! [`BusConfig`] before handing it to the driver.

use alloc::vec::Vec;

use embedded_hal::spi::{Mode, Phase, Polarity, SpiBus, MODE_0};

use crate::frame::{Brightness, ChipHeader, Frame, FunctionControl};
use crate::layout::{reverse_channel_index, FrameLayout, LEDS_PER_CHIP};
use crate::Error;

/// PWM counts per percent: 100 % is `65535`.
pub const PWM_PER_PERCENT: f64 = 655.35;

/// Fastest serial clock the chip accepts.
pub const MAX_BUS_FREQUENCY_HZ: u32 = 20_000_000;

/// Serial bus settings the chip needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Serial clock frequency in Hz
    pub frequency_hz: u32,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1_000_000,
            mode: MODE_0,
        }
    }
}

impl BusConfig {
    /// Check the settings against what the chip supports.
    ///
    /// The chip shifts data in on the rising edge of the clock, which rules
    /// out modes 1 and 2.
    ///
    /// # Errors
    ///
    /// [`Error::BusFrequency`] for a zero or too fast clock,
    /// [`Error::BusMode`] for a mode sampling on the falling edge.
    pub fn validate<E>(&self) -> Result<(), Error<E>> {
        if self.frequency_hz == 0 || self.frequency_hz > MAX_BUS_FREQUENCY_HZ {
            return Err(Error::BusFrequency(self.frequency_hz));
        }
        let rising_edge = matches!(
            (self.mode.polarity, self.mode.phase),
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition)
                | (Polarity::IdleHigh, Phase::CaptureOnSecondTransition)
        );
        if !rising_edge {
            return Err(Error::BusMode);
        }
        Ok(())
    }
}

/// Convert a percentage to a PWM value, `round(percent * 655.35)`.
///
/// Returns `None` when the result is outside `0..=65535` or `percent` is NaN.
#[must_use]
pub fn percent_to_pwm(percent: f32) -> Option<u16> {
    let scaled = f64::from(percent) * PWM_PER_PERCENT;
    // round half up; comparisons are false for NaN
    if scaled >= -0.5 && scaled < f64::from(u16::MAX) + 0.5 {
        Some((scaled + 0.5) as u16)
    } else {
        None
    }
}

/// Convert a PWM value back to a whole percentage, `round(value / 655.35)`.
#[must_use]
pub fn pwm_to_percent(value: u16) -> u8 {
    (f64::from(value) / PWM_PER_PERCENT + 0.5) as u8
}

/// A cascade of TLC59711 chips on one serial bus.
///
/// # Example
/// ```rust
/// # use core::convert::Infallible;
/// # use embedded_hal::spi::{ErrorType, SpiBus};
/// # struct Bus;
/// # impl ErrorType for Bus { type Error = Infallible; }
/// # impl SpiBus<u8> for Bus {
/// #     fn read(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
/// #     fn write(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
/// #     fn transfer(&mut self, _: &mut [u8], _: &[u8]) -> Result<(), Infallible> { Ok(()) }
/// #     fn transfer_in_place(&mut self, _: &mut [u8]) -> Result<(), Infallible> { Ok(()) }
/// #     fn flush(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
/// use tlc59711::{BusConfig, Tlc59711};
///
/// let mut leds = Tlc59711::new(Bus, 4, BusConfig::default()).unwrap();
/// leds.set_channel(0, 50.0).unwrap();
/// leds.set_channel(1, 100.0).unwrap();
/// leds.show().unwrap();
/// assert_eq!(leds.get_channel(0).unwrap(), 50);
/// let _bus = leds.release();
/// ```
pub struct Tlc59711<SPI> {
    spi: SPI,
    layout: FrameLayout,
    frame: Frame,
    channel_offsets: Vec<usize>,
    brightness: Brightness,
    function_control: FunctionControl,
}

impl<SPI> Tlc59711<SPI>
where
    SPI: SpiBus<u8>,
{
    /// Create a driver for `pixel_count` RGB pixels (four per chip).
    ///
    /// Every chip header is initialized with the write command, the default
    /// [`FunctionControl`] flags and full [`Brightness`]. All channels start
    /// at 0. Nothing is written to the bus.
    ///
    /// # Errors
    ///
    /// [`Error::PixelCount`] unless `pixel_count` is a positive multiple of
    /// four, or the error from [`BusConfig::validate`].
    pub fn new(
        spi: SPI,
        pixel_count: usize,
        config: BusConfig,
    ) -> Result<Self, Error<SPI::Error>> {
        config.validate()?;
        if pixel_count == 0 || pixel_count % LEDS_PER_CHIP != 0 {
            return Err(Error::PixelCount(pixel_count));
        }

        let layout = FrameLayout::new(pixel_count);
        let channel_offsets = (0..layout.channel_count())
            .map(FrameLayout::channel_offset)
            .collect();

        let mut driver = Self {
            spi,
            layout,
            frame: Frame::new(&layout),
            channel_offsets,
            brightness: Brightness::default(),
            function_control: FunctionControl::default(),
        };
        for chip in 0..layout.chip_count() {
            driver.frame.write_brightness(chip, driver.brightness);
            driver.frame.write_function_control(chip, driver.function_control);
            driver.frame.write_command(chip);
        }
        Ok(driver)
    }

    /// Number of RGB pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.layout.pixel_count()
    }

    /// Number of chips in the cascade.
    #[must_use]
    pub fn chip_count(&self) -> usize {
        self.layout.chip_count()
    }

    /// Number of PWM channels, three per pixel.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    /// The frame as it will be written by the next [`Self::show`].
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Decoded header of `chip_index`, or `None` past the last chip.
    #[must_use]
    pub fn header(&self, chip_index: usize) -> Option<ChipHeader> {
        self.frame.header(chip_index)
    }

    /// The global brightness shared by all chips.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// The function control flags shared by all chips.
    #[must_use]
    pub fn function_control(&self) -> FunctionControl {
        self.function_control
    }

    fn slot_offset(&self, channel_index: usize) -> Result<usize, Error<SPI::Error>> {
        let channel_count = self.channel_count();
        if channel_index >= channel_count {
            return Err(Error::ChannelIndex {
                index: channel_index,
                channel_count,
            });
        }
        Ok(self.channel_offsets[reverse_channel_index(channel_count, channel_index)])
    }

    /// Set one channel to `percent` (0-100) of full scale.
    ///
    /// The value is `round(percent * 655.35)`. Only the frame is updated.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelIndex`] for an index past the last channel and
    /// [`Error::PwmValue`] when the value is outside `0..=65535`. The frame
    /// is left unchanged on error.
    pub fn set_channel(
        &mut self,
        channel_index: usize,
        percent: f32,
    ) -> Result<(), Error<SPI::Error>> {
        let offset = self.slot_offset(channel_index)?;
        let value = percent_to_pwm(percent).ok_or(Error::PwmValue(percent))?;
        self.frame.write_slot(offset, value);
        Ok(())
    }

    /// Read back one channel as a whole percentage.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelIndex`] for an index past the last channel.
    pub fn get_channel(&self, channel_index: usize) -> Result<u8, Error<SPI::Error>> {
        let offset = self.slot_offset(channel_index)?;
        Ok(pwm_to_percent(self.frame.read_slot(offset)))
    }

    /// Set every channel to `percent`.
    ///
    /// # Errors
    ///
    /// [`Error::PwmValue`] when `percent` is out of range; no channel is
    /// changed in that case.
    pub fn set_all(&mut self, percent: f32) -> Result<(), Error<SPI::Error>> {
        let value = percent_to_pwm(percent).ok_or(Error::PwmValue(percent))?;
        for &offset in &self.channel_offsets {
            self.frame.write_slot(offset, value);
        }
        Ok(())
    }

    /// Turn every channel off. Only the frame is updated.
    pub fn set_all_off(&mut self) {
        for &offset in &self.channel_offsets {
            self.frame.write_slot(offset, 0);
        }
    }

    /// Set the global brightness of every chip and write the frame.
    ///
    /// Values are masked to 7 bits. Unlike the other setters this transmits
    /// immediately.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] if the bus write fails; the new brightness is
    /// kept in the frame either way.
    pub fn set_brightness(
        &mut self,
        red: u8,
        green: u8,
        blue: u8,
    ) -> Result<(), Error<SPI::Error>> {
        self.brightness = Brightness::new(red, green, blue);
        for chip in 0..self.chip_count() {
            self.frame.write_brightness(chip, self.brightness);
        }
        self.show()
    }

    /// Set the function control flags of every chip.
    ///
    /// Only the frame is updated, call [`Self::show`] to apply them.
    pub fn set_function_control(&mut self, flags: FunctionControl) {
        self.function_control = flags;
        for chip in 0..self.chip_count() {
            self.frame.write_function_control(chip, flags);
        }
    }

    /// Write the whole frame to the bus as one transfer.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] with the bus error. Nothing is retried.
    pub fn show(&mut self) -> Result<(), Error<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("tlc59711: writing {} byte frame", self.frame.len());

        self.spi
            .write(self.frame.as_bytes())
            .map_err(Error::Transport)?;
        self.spi.flush().map_err(Error::Transport)
    }

    /// Give the bus back. The driver is gone afterwards.
    pub fn release(self) -> SPI {
        self.spi
    }

    #[cfg(test)]
    pub(crate) fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }
}

impl<SPI> core::fmt::Debug for Tlc59711<SPI> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tlc59711")
            .field("pixel_count", &self.layout.pixel_count())
            .field("chip_count", &self.layout.chip_count())
            .field("brightness", &self.brightness)
            .field("function_control", &self.function_control)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<SPI> defmt::Format for Tlc59711<SPI> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Tlc59711 pixel_count: {} chip_count: {} brightness: {}",
            self.layout.pixel_count(),
            self.layout.chip_count(),
            self.brightness
        );
    }
}
