use thiserror::Error;

/// Errors reported by the driver. `E` is the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The pixel count is zero or not a multiple of four.
    #[error("pixel count {0} is not a positive multiple of 4")]
    PixelCount(usize),
    /// The bus clock frequency is outside what the chip supports.
    #[error("bus frequency {0} Hz is not supported")]
    BusFrequency(u32),
    /// The bus clock mode does not sample data on the rising edge.
    #[error("bus mode does not sample on the rising clock edge")]
    BusMode,
    /// The channel index is past the last channel.
    #[error("channel index {index} out of range (0..{channel_count})")]
    ChannelIndex {
        /// Requested channel
        index: usize,
        /// Number of channels of the driver
        channel_count: usize,
    },
    /// The percentage does not convert to a 16-bit PWM value.
    #[error("{0}% does not convert to a PWM value in 0..=65535")]
    PwmValue(f32),
    /// Writing the frame to the bus failed.
    #[error("bus write failed")]
    Transport(E),
}

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Invalid construction parameters, fatal.
    Configuration,
    /// A rejected call; nothing was modified.
    Range,
    /// The bus reported a fault; the device may show stale data.
    Transport,
}

impl<E> Error<E> {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PixelCount(_) | Self::BusFrequency(_) | Self::BusMode => ErrorKind::Configuration,
            Self::ChannelIndex { .. } | Self::PwmValue(_) => ErrorKind::Range,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    type TestError = Error<()>;

    #[test]
    fn test_error_kind() {
        assert_eq!(TestError::PixelCount(3).kind(), ErrorKind::Configuration);
        assert_eq!(TestError::BusFrequency(0).kind(), ErrorKind::Configuration);
        assert_eq!(TestError::BusMode.kind(), ErrorKind::Configuration);
        assert_eq!(
            TestError::ChannelIndex {
                index: 12,
                channel_count: 12
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(TestError::PwmValue(101.0).kind(), ErrorKind::Range);
        assert_eq!(TestError::Transport(()).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TestError::PixelCount(6).to_string(),
            "pixel count 6 is not a positive multiple of 4"
        );
        assert_eq!(
            TestError::ChannelIndex {
                index: 12,
                channel_count: 12
            }
            .to_string(),
            "channel index 12 out of range (0..12)"
        );
        assert_eq!(TestError::Transport(()).to_string(), "bus write failed");
    }
}
