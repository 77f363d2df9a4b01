//! Adapters from `embedded-hal` 1.0 traits to this crate's hardware traits.
//!
//! Any HAL that implements `embedded-hal` (esp-idf-hal, rp2040-hal,
//! stm32 HALs, ...) can drive the action pin and input line through these
//! wrappers.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, StatefulOutputPin};

use crate::traits::{ActionPin, Delay, InputLine, Level};

/// Action pin over an `embedded-hal` stateful output.
///
/// `get_level` reads the output latch via `is_set_high`.
#[derive(Debug)]
pub struct HalOutput<P>(pub P);

impl<P: StatefulOutputPin> ActionPin for HalOutput<P> {
    type Error = P::Error;

    fn set_level(&mut self, level: Level) -> Result<(), P::Error> {
        match level {
            Level::High => self.0.set_high(),
            Level::Low => self.0.set_low(),
        }
    }

    fn get_level(&mut self) -> Result<Level, P::Error> {
        self.0.is_set_high().map(Level::from_high)
    }
}

/// Input line over an `embedded-hal` input pin.
#[derive(Debug)]
pub struct HalInput<P>(pub P);

impl<P: InputPin> InputLine for HalInput<P> {
    type Error = P::Error;

    fn read(&mut self) -> Result<Level, P::Error> {
        self.0.is_high().map(Level::from_high)
    }
}

/// Blocking delay over an `embedded-hal` delay provider.
#[derive(Clone, Debug)]
pub struct HalDelay<D>(pub D);

impl<D: DelayNs> Delay for HalDelay<D> {
    fn delay_ms(&mut self, ms: u32) {
        DelayNs::delay_ms(&mut self.0, ms);
    }
}
