//! Error types.
//!
//! The core has no fatal paths: unrecognized bytes, timeouts and
//! disconnects are ordinary outcomes, not errors. What remains is bad
//! configuration (rejected before anything starts) and hardware failures
//! reported by the pin or input drivers.

use thiserror::Error;

/// Which protocol byte role a value was assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteRole {
    /// Switch-off byte.
    Off,
    /// Switch-on byte.
    On,
    /// State query byte.
    Query,
}

impl core::fmt::Display for ByteRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ByteRole::Off => "off",
            ByteRole::On => "on",
            ByteRole::Query => "query",
        })
    }
}

/// Rejected configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two protocol roles share the same byte value.
    #[error("protocol byte {byte:#04x} is used for both {first} and {second}")]
    DuplicateProtocolByte {
        /// The shared value.
        byte: u8,
        /// First role using it.
        first: ByteRole,
        /// Second role using it.
        second: ByteRole,
    },

    /// Button confirmation needs at least two samples, or no press is
    /// ever confirmed.
    #[error("debounce sample count must be at least 2, got {0}")]
    TooFewSamples(u32),

    /// A zero idle timeout would close every client immediately.
    #[error("client timeout must be greater than zero")]
    ZeroTimeout,

    /// A zero-length pulse is not observable.
    #[error("pulse duration must be greater than zero")]
    ZeroPulse,

    /// Action pin and input pin are the same GPIO.
    #[error("GPIO{0} is configured as both action pin and input pin")]
    PinConflict(u8),

    /// Config file could not be parsed.
    #[cfg(feature = "desktop")]
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Hardware failure while servicing a request or polling the input.
///
/// `PE` is the action pin's error type, `IE` the input line's.
#[derive(Debug, Error)]
pub enum ServiceError<PE, IE>
where
    PE: core::fmt::Debug,
    IE: core::fmt::Debug,
{
    /// The action pin driver failed.
    #[error("action pin error: {0:?}")]
    Pin(PE),

    /// The input line driver failed.
    #[error("input line error: {0:?}")]
    Input(IE),
}
