//! ESP32 TCP action server firmware.
//!
//! This is the main entry point for the physical hardware. It:
//! - Drives the action pin to its boot level
//! - Starts Wi-Fi, polling the physical input and blinking the status LED
//!   until the station is up
//! - Serves the one-byte protocol on the configured port with the blocking
//!   server loop, reconnecting Wi-Fi between sessions if the link drops
//!
//! # Build-time Configuration
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `ACTION_MODE` | `on_off`, `on_off_inverted`, `toggle`, `pulse_low`, `pulse_high` | `on_off` |
//! | `BOOT_ON` | `1`/`true`/`on`: boot on (on/off modes) or high (toggle); `0`/`false`/`off`: boot off | off |
//! | `INPUT_POLICY` | `none`, `switch`, `button` | `none` |
//! | `WIFI_SSID` / `WIFI_PASSWORD` | Station credentials | required |
//! | `STATIC_IP` / `GATEWAY` / `SUBNET` | Fixed address instead of DHCP | DHCP |
//!
//! # Build
//!
//! ```bash
//! ACTION_MODE=pulse_low INPUT_POLICY=button WIFI_SSID=... WIFI_PASSWORD=... \
//!     cargo build --release --bin esp32_main --features wifi
//! ```

use anyhow::{anyhow, bail, Context};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::warn;
use tcp_action::config::{parse_flag, StaticIpConfig};
use tcp_action::hal::esp32::{self, pins, Esp32Clock, Esp32Wifi};
use tcp_action::services::StdListener;
use tcp_action::traits::{ActionPin, Level};
use tcp_action::{
    ActionConfig, ActionService, BlockingServer, Config, InputConfig, InputPolicy, Mode,
    WifiConfig, VERSION,
};

/// Status LED blink period while Wi-Fi connects
const BLINK_MS: u32 = 250;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  TCP Action Server {}", VERSION);
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = build_config()?;
    config.validate()?;
    println!(
        "[OK] Mode {} on GPIO{}, input {}",
        config.action.mode.as_str(),
        config.action.pin,
        config.input.policy.as_str()
    );

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Action pin and physical input
    // =========================================================================
    // SAFETY: validate() guarantees the action and input GPIOs differ, and
    // neither is taken out of `peripherals.pins`.
    let pin = unsafe { esp32::action_pin(config.action.pin)? };
    let input = match config.input.policy {
        InputPolicy::None => None,
        _ => Some(unsafe { esp32::input_line(config.input.pin)? }),
    };
    let mut service = ActionService::new(pin, input, esp32::delay(), &config)
        .map_err(|e| anyhow!("action init failed: {}", e))?;
    println!("[OK] Action pin at boot state {:?}", service.state());

    // =========================================================================
    // WiFi (keeps serving the physical input while connecting)
    // =========================================================================
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = Esp32Wifi::begin(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;

    // SAFETY: the status LED GPIO is not used by anything else
    let mut led = unsafe { esp32::status_led(pins::STATUS_LED)? };
    let mut lit = Level::High;
    while !wifi.is_up() {
        if let Err(e) = service.poll_input() {
            warn!("physical input: {}", e);
        }
        if let Err(e) = led.set_level(lit) {
            warn!("status LED: {:?}", e);
        }
        lit = !lit;
        FreeRtos::delay_ms(BLINK_MS);
    }
    // LED is active low
    led.set_level(Level::High)
        .map_err(|e| anyhow!("status LED: {:?}", e))?;
    drop(led);

    match wifi.ip_addr() {
        Some(ip) => println!("[OK] WiFi connected: {}:{}", ip, config.server.port),
        None => println!("[OK] WiFi connected"),
    }

    // =========================================================================
    // TCP server
    // =========================================================================
    let listener = StdListener::bind(("0.0.0.0", config.server.port))
        .context("failed to bind TCP listener")?;
    println!("[OK] Started TCP server");
    println!();

    let mut server = BlockingServer::new(
        listener,
        Esp32Clock::new(),
        esp32::delay(),
        service,
        &config.server,
    );
    server.run_with(|| wifi.maintain())
}

/// Assemble the configuration from build-time environment variables.
fn build_config() -> anyhow::Result<Config> {
    let mode = match option_env!("ACTION_MODE") {
        Some(text) => {
            Mode::from_text(text).ok_or_else(|| anyhow!("unknown ACTION_MODE {:?}", text))?
        }
        None => Mode::OnOff,
    };
    let boot_on = match option_env!("BOOT_ON") {
        Some(text) => {
            parse_flag(text).ok_or_else(|| anyhow!("BOOT_ON must be on or off, got {:?}", text))?
        }
        None => false,
    };
    let policy = match option_env!("INPUT_POLICY") {
        Some(text) => {
            InputPolicy::from_text(text).ok_or_else(|| anyhow!("unknown INPUT_POLICY {:?}", text))?
        }
        None => InputPolicy::None,
    };

    let mut wifi = WifiConfig::default()
        .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
        .with_password(option_env!("WIFI_PASSWORD").unwrap_or(""));
    if !wifi.is_configured() {
        bail!("WIFI_SSID was not set at build time");
    }
    if let (Some(ip), Some(gateway), Some(subnet)) = (
        option_env!("STATIC_IP"),
        option_env!("GATEWAY"),
        option_env!("SUBNET"),
    ) {
        wifi = wifi.with_static_ip(StaticIpConfig::new(ip, gateway, subnet));
    }

    Ok(Config::default()
        .with_wifi(wifi)
        .with_action(
            ActionConfig::default()
                .with_mode(mode)
                .with_pin(pins::ACTION)
                .with_boot_on(boot_on),
        )
        .with_input(
            InputConfig::default()
                .with_policy(policy)
                .with_pin(pins::INPUT),
        ))
}
