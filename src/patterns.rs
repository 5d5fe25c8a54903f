//! Bring-up patterns for checking the wiring of a new cascade.
//!
//! [`chase`] lights one channel at a time so each output can be matched to
//! its LED; [`flash`] blinks everything together.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiBus;

use crate::{percent_to_pwm, Error, Tlc59711};

/// Light each channel on its own, in logical order, for `step_ms` each.
///
/// The last channel is left on.
///
/// # Errors
///
/// [`Error::PwmValue`] for a bad `percent`, with the frame left as it was,
/// or [`Error::Transport`] from the bus.
pub fn chase<SPI, D>(
    leds: &mut Tlc59711<SPI>,
    percent: f32,
    delay: &mut D,
    step_ms: u32,
) -> Result<(), Error<SPI::Error>>
where
    SPI: SpiBus<u8>,
    D: DelayNs,
{
    percent_to_pwm(percent).ok_or(Error::PwmValue(percent))?;
    for channel in 0..leds.channel_count() {
        leds.set_all_off();
        leds.set_channel(channel, percent)?;
        leds.show()?;
        delay.delay_ms(step_ms);
    }
    Ok(())
}

/// Switch all channels on and off `times` times, `period_ms` per half cycle.
///
/// # Errors
///
/// [`Error::PwmValue`] for a bad `percent` or [`Error::Transport`] from the
/// bus.
pub fn flash<SPI, D>(
    leds: &mut Tlc59711<SPI>,
    percent: f32,
    delay: &mut D,
    period_ms: u32,
    times: usize,
) -> Result<(), Error<SPI::Error>>
where
    SPI: SpiBus<u8>,
    D: DelayNs,
{
    for _ in 0..times {
        leds.set_all(percent)?;
        leds.show()?;
        delay.delay_ms(period_ms);

        leds.set_all_off();
        leds.show()?;
        delay.delay_ms(period_ms);
    }
    Ok(())
}
