//! # tcp-action
//!
//! A network-controlled GPIO actuator: one output pin, driven by a one-byte
//! TCP protocol and optionally by a physical button or switch.
//!
//! ## Features
//!
//! - **Five pin modes**: on/off, inverted on/off, toggle, pulse-low, pulse-high
//! - **One-byte protocol**: set, toggle or pulse with a single byte; query state in on/off modes
//! - **Physical input**: latching switch or debounced push button mirrored to the same action
//! - **Idle timeout**: one client at a time, dropped after a configurable idle period
//! - **Two schedulers**: a blocking main loop, or callbacks driven by a network stack or tokio
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and network abstractions
//! - `mode` - Mode, action requests and output state
//! - `action` - Action state machine that owns the pin
//! - `codec` - Byte decoder and state encoder
//! - `debounce` - Switch and button input handling
//! - `session` - Client idle timeout
//! - `services` - Server loops tying everything together
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use tcp_action::{ActionController, Decoded, Mode, OutputState, ProtocolCodec};
//! use tcp_action::config::ActionConfig;
//! use tcp_action::hal::{MockDelay, MockPin};
//! use tcp_action::traits::Level;
//!
//! let config = ActionConfig::default().with_mode(Mode::OnOffInverted);
//! let pin = MockPin::new(Level::Low);
//! let mut action = ActionController::new(pin.clone(), MockDelay::new(), &config).unwrap();
//! let codec = ProtocolCodec::new(config.mode, config.bytes);
//!
//! // 0x01 switches on; inverted mode drives the pin low
//! if let Decoded::Action(request) = codec.decode(0x01) {
//!     action.apply(request).unwrap();
//! }
//! assert_eq!(action.state(), OutputState::On);
//! assert_eq!(pin.level(), Level::Low);
//!
//! // 0x03 asks for the state
//! assert_eq!(codec.decode(0x03), Decoded::Query);
//! assert_eq!(codec.encode_state(action.state()), Some(0x01));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Action state machine that owns the pin.
pub mod action;
/// One-byte protocol decoding and state encoding.
pub mod codec;
/// Boot-time configuration for desktop and ESP32.
pub mod config;
/// Physical input debouncing.
pub mod debounce;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Pin modes and the values that flow through the core.
pub mod mode;
/// Server realizations.
pub mod services;
/// Client idle timeout.
pub mod session;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Crate version, printed in boot banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for convenience
pub use action::ActionController;
pub use codec::{Decoded, ProtocolBytes, ProtocolCodec};
pub use config::{ActionConfig, Config, DeviceConfig, InputConfig, ServerConfig, WifiConfig};
pub use debounce::{Debouncer, InputPolicy};
pub use error::{ConfigError, ServiceError};
pub use mode::{ActionRequest, Mode, OutputState};
pub use services::{ActionService, BlockingServer, SessionDriver};
pub use session::{Session, SessionEnd, SessionState};
pub use traits::{
    // Hardware
    ActionPin,
    Clock,
    // Network
    Connection,
    Delay,
    InputLine,
    Level,
    Listener,
    ReadOutcome,
};

#[cfg(feature = "tokio-server")]
pub use services::AsyncServer;
