//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development (requires `std`)
//! - `host`: `std` clock and delay (requires `std`)
//! - `embedded`: `embedded-hal` 1.0 adapters (requires `embedded` feature)
//! - `esp32`: ESP32 clock and Wi-Fi bring-up (requires `esp32` feature)

#[cfg(feature = "std")]
pub mod mock;

#[cfg(feature = "std")]
pub mod host;

#[cfg(feature = "embedded")]
pub mod embedded;

#[cfg(feature = "esp32")]
pub mod esp32;

#[cfg(feature = "std")]
pub use host::*;
#[cfg(feature = "std")]
pub use mock::*;

#[cfg(feature = "embedded")]
pub use embedded::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
