//! Slider and pushbutton control of the LEDs.
//!
//! A slider sets the brightness and a pushbutton toggles the LEDs on and
//! off. The loop polls both, works out the wanted state and only touches the
//! driver when that state changed since the last update, which keeps bus
//! traffic down to what is needed.
//!
//! The decision logic is the pure function [`step`]: it takes the previous
//! [`ControlState`] and one [`Input`] sample and returns the next state plus
//! what to do. [`Controller`] wires it to the collaborators and the driver.
//!
//! # Press counting
//! Every acknowledged button event advances a counter modulo four. With
//! [`ToggleEdge::Rise`] the LEDs are on for counts 1 and 2 and off for 0 and
//! 3. With [`ToggleEdge::Fall`] they turn on at 2 and off at 0, and keep
//! their state on the other counts.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiBus;

use crate::frame::Brightness;
use crate::{Error, Tlc59711};

/// Largest value a slider reports.
pub const SLIDER_MAX: u16 = 1023;

/// Channels the application lights, in logical channel order.
pub const LIT_CHANNELS: [usize; 9] = [0, 1, 2, 3, 4, 6, 7, 9, 10];

/// A potentiometer slider with its own indicator pixels.
pub trait Slider {
    /// Current position, `0..=1023`.
    fn position(&mut self) -> u16;

    /// Update the slider's own pixels from its position.
    fn refresh_pixels(&mut self) {}
}

/// A pushbutton with an event latch and a built-in LED.
pub trait Pushbutton {
    /// `true` when a press was latched since the last [`Self::clear_event`].
    fn available(&mut self) -> bool;

    /// Acknowledge the latched press.
    fn clear_event(&mut self);

    /// Set the button LED brightness.
    fn set_led(&mut self, brightness: u8);
}

/// Which press turns the LEDs on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToggleEdge {
    /// On after the first press, off after the third
    #[default]
    Rise,
    /// On after the second press, off after the fourth
    Fall,
}

/// Convert a slider position to a whole percentage.
///
/// Positions past [`SLIDER_MAX`] count as full scale.
#[must_use]
pub fn slider_percent(position: u16) -> u8 {
    let position = u32::from(position.min(SLIDER_MAX));
    (position * 100 / u32::from(SLIDER_MAX)) as u8
}

/// One sample of the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Input {
    /// Slider position, `0..=1023`
    pub position: u16,
    /// A button press was latched
    pub pressed: bool,
}

/// State carried from one loop iteration to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    /// Button presses modulo four
    pub press_count: u8,
    /// Whether the LEDs should be lit
    pub lit: bool,
    /// `lit` as of the last applied update
    pub prev_lit: bool,
    /// Brightness of the last applied update, `None` before the first one
    pub prev_percent: Option<u8>,
}

/// What to write to the LED channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedUpdate {
    /// Brightness in percent
    pub percent: u8,
    /// Lit at `percent`, or off
    pub lit: bool,
}

/// Outcome of one [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    /// Level for the button LED: the slider percentage while lit, otherwise
    /// the standby level
    pub button_led: u8,
    /// Channel update to apply, if anything changed
    pub update: Option<LedUpdate>,
}

fn toggle(edge: ToggleEdge, press_count: u8, lit: bool) -> bool {
    match edge {
        ToggleEdge::Rise => matches!(press_count, 1 | 2),
        ToggleEdge::Fall => match press_count {
            2 => true,
            0 => false,
            _ => lit,
        },
    }
}

/// Advance the loop by one input sample.
///
/// An update is emitted when the lit state changed, or when lit and the
/// slider percentage differs from the last update. The returned state
/// already records that update as applied.
#[must_use]
pub fn step(
    state: ControlState,
    input: Input,
    edge: ToggleEdge,
    standby_led: u8,
) -> (ControlState, Step) {
    let percent = slider_percent(input.position);
    let press_count = if input.pressed {
        (state.press_count + 1) % 4
    } else {
        state.press_count
    };
    let lit = toggle(edge, press_count, state.lit);

    let changed = lit != state.prev_lit || (lit && Some(percent) != state.prev_percent);
    let update = changed.then_some(LedUpdate { percent, lit });

    let next = ControlState {
        press_count,
        lit,
        prev_lit: if changed { lit } else { state.prev_lit },
        prev_percent: if changed { Some(percent) } else { state.prev_percent },
    };
    let outcome = Step {
        button_led: if lit { percent } else { standby_led },
        update,
    };
    (next, outcome)
}

/// Write an update to the lit channels and show it.
///
/// # Errors
///
/// Range errors for channels the driver does not have, or
/// [`Error::Transport`] from [`Tlc59711::show`].
pub fn apply<SPI>(
    leds: &mut Tlc59711<SPI>,
    channels: &[usize],
    update: LedUpdate,
) -> Result<(), Error<SPI::Error>>
where
    SPI: SpiBus<u8>,
{
    let percent = if update.lit {
        f32::from(update.percent)
    } else {
        0.0
    };
    for &channel in channels {
        leds.set_channel(channel, percent)?;
    }
    leds.show()
}

/// Settings of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    /// Which press toggles the LEDs
    pub edge: ToggleEdge,
    /// Global brightness applied by [`Controller::start`]
    pub brightness: Brightness,
    /// Button LED level while the LEDs are off
    pub standby_led: u8,
    /// Pause between polls in [`Controller::run`]
    pub poll_interval_ms: u32,
    /// Channels switched by the button
    pub channels: &'static [usize],
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            edge: ToggleEdge::Rise,
            brightness: Brightness::new(100, 100, 127),
            standby_led: 0,
            poll_interval_ms: 10,
            channels: &LIT_CHANNELS,
        }
    }
}

/// The polling loop: driver, slider and button.
pub struct Controller<SPI, S, B> {
    leds: Tlc59711<SPI>,
    slider: S,
    button: B,
    config: ControlConfig,
    state: ControlState,
    button_led: Option<u8>,
}

impl<SPI, S, B> Controller<SPI, S, B>
where
    SPI: SpiBus<u8>,
    S: Slider,
    B: Pushbutton,
{
    /// Take ownership of the driver and the collaborators.
    pub fn new(leds: Tlc59711<SPI>, slider: S, button: B, config: ControlConfig) -> Self {
        Self {
            leds,
            slider,
            button,
            config,
            state: ControlState::default(),
            button_led: None,
        }
    }

    /// The loop state after the last poll.
    #[must_use]
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// The driver.
    #[must_use]
    pub fn leds(&self) -> &Tlc59711<SPI> {
        &self.leds
    }

    /// Apply the configured brightness and switch the lit channels off.
    ///
    /// # Errors
    ///
    /// Errors from the driver; the loop should not be started then.
    pub fn start(&mut self) -> Result<(), Error<SPI::Error>> {
        let Brightness { red, green, blue } = self.config.brightness;
        self.leds.set_brightness(red, green, blue)?;
        self.button.clear_event();
        self.set_button_led(self.config.standby_led);
        apply(
            &mut self.leds,
            self.config.channels,
            LedUpdate {
                percent: 0,
                lit: false,
            },
        )?;
        self.state = ControlState {
            prev_percent: Some(0),
            ..ControlState::default()
        };
        Ok(())
    }

    fn set_button_led(&mut self, level: u8) {
        if self.button_led != Some(level) {
            self.button.set_led(level);
            self.button_led = Some(level);
        }
    }

    fn sample(&mut self) -> Input {
        self.slider.refresh_pixels();
        let position = self.slider.position();
        let pressed = self.button.available();
        if pressed {
            self.button.clear_event();
        }
        Input { position, pressed }
    }

    /// Run one iteration of the loop.
    ///
    /// Returns the update that was written, if any. When writing fails the
    /// press count is kept but the update is not recorded, so the next poll
    /// tries again.
    ///
    /// # Errors
    ///
    /// Errors from the driver.
    pub fn poll(&mut self) -> Result<Option<LedUpdate>, Error<SPI::Error>> {
        let input = self.sample();
        let (next, outcome) = step(self.state, input, self.config.edge, self.config.standby_led);
        self.set_button_led(outcome.button_led);

        let Some(update) = outcome.update else {
            self.state = next;
            return Ok(None);
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("control: {}", update);

        match apply(&mut self.leds, self.config.channels, update) {
            Ok(()) => {
                self.state = next;
                Ok(Some(update))
            }
            Err(err) => {
                self.state = ControlState {
                    prev_lit: self.state.prev_lit,
                    prev_percent: self.state.prev_percent,
                    ..next
                };
                Err(err)
            }
        }
    }

    /// Poll until `keep_running` returns `false`, pausing between polls.
    ///
    /// Bus faults are logged and the loop carries on; the LEDs may show
    /// stale data until the next successful write.
    pub fn run<D, F>(&mut self, delay: &mut D, mut keep_running: F)
    where
        D: DelayNs,
        F: FnMut() -> bool,
    {
        while keep_running() {
            if let Err(_err) = self.poll() {
                #[cfg(feature = "defmt")]
                defmt::warn!("control: update failed: {}", _err.kind());
            }
            delay.delay_ms(self.config.poll_interval_ms);
        }
    }

    /// Switch every channel off, show it and hand everything back.
    ///
    /// The bus, slider and button are returned even when the final write
    /// fails; the second element is the result of that write.
    pub fn shutdown(mut self) -> ((SPI, S, B), Result<(), Error<SPI::Error>>) {
        self.leds.set_all_off();
        let result = self.leds.show();
        #[cfg(feature = "defmt")]
        if let Err(err) = &result {
            defmt::warn!("control: shutdown write failed: {}", err.kind());
        }
        ((self.leds.release(), self.slider, self.button), result)
    }
}
