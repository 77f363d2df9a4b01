//! ESP32 hardware abstraction layer for the TCP action server.
//!
//! GPIO goes through the `embedded-hal` adapters in [`crate::hal::embedded`]
//! on top of esp-idf-hal's `PinDriver`; sockets use `std::net`, which
//! ESP-IDF provides. What remains here is the clock, pin construction from
//! configured GPIO numbers, and Wi-Fi bring-up.
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for the default GPIO assignments.

mod clock;

pub use clock::Esp32Clock;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, Input, InputOutput, PinDriver, Pull};
use esp_idf_hal::sys::EspError;

use crate::hal::embedded::{HalDelay, HalInput, HalOutput};

/// Action pin driver: input-output so the level can be read back.
pub type Esp32ActionPin = HalOutput<PinDriver<'static, AnyIOPin, InputOutput>>;

/// Physical input driver with the internal pull-up enabled.
pub type Esp32InputLine = HalInput<PinDriver<'static, AnyIOPin, Input>>;

/// Blocking delay yielding to the FreeRTOS scheduler.
pub type Esp32Delay = HalDelay<FreeRtos>;

/// Default GPIO assignments.
///
/// Only defaults: the firmware takes the actual numbers from
/// [`Config`](crate::Config).
pub mod pins {
    /// Action pin (relay, opto-coupler or transistor gate)
    pub const ACTION: u8 = 5;

    /// Physical button or switch, active low
    pub const INPUT: u8 = 4;

    /// On-board status LED (blinks while Wi-Fi connects)
    pub const STATUS_LED: u8 = 8;
}

/// Claim a GPIO by number.
///
/// # Safety
///
/// The caller must not claim the same GPIO twice, and must not claim a GPIO
/// that is also handed out through `Peripherals`.
unsafe fn claim(gpio: u8) -> AnyIOPin {
    AnyIOPin::new(i32::from(gpio))
}

/// Take the action pin configured at `gpio`.
///
/// # Safety
///
/// See [`claim`]: every GPIO may only be taken once.
pub unsafe fn action_pin(gpio: u8) -> Result<Esp32ActionPin, EspError> {
    let driver = PinDriver::input_output(claim(gpio))?;
    Ok(HalOutput(driver))
}

/// Take the physical input line configured at `gpio`.
///
/// # Safety
///
/// See [`claim`]: every GPIO may only be taken once.
pub unsafe fn input_line(gpio: u8) -> Result<Esp32InputLine, EspError> {
    let mut driver = PinDriver::input(claim(gpio))?;
    driver.set_pull(Pull::Up)?;
    Ok(HalInput(driver))
}

/// Take the status LED at `gpio`.
///
/// # Safety
///
/// See [`claim`]: every GPIO may only be taken once.
pub unsafe fn status_led(gpio: u8) -> Result<Esp32ActionPin, EspError> {
    action_pin(gpio)
}

/// Blocking delay for pulses and debouncing.
pub fn delay() -> Esp32Delay {
    HalDelay(FreeRtos)
}
