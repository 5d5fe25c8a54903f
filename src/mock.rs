//! Bus and delay doubles shared by the unit tests.

extern crate std;

use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorKind, ErrorType, SpiBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

impl embedded_hal::spi::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Records every write; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingSpi {
    pub writes: Vec<Vec<u8>>,
    pub flushes: usize,
    pub fail_writes: bool,
}

impl RecordingSpi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn last_write(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }
}

impl ErrorType for RecordingSpi {
    type Error = BusFault;
}

impl SpiBus<u8> for RecordingSpi {
    fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(BusFault)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(BusFault);
        }
        self.writes.push(words.to_vec());
        Ok(())
    }

    fn transfer(&mut self, _read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(BusFault)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Adds up the requested delays instead of sleeping.
#[derive(Debug, Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
