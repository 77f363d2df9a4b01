//! Boot-time configuration for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use tcp_action::config::{ActionConfig, Config, InputConfig, ServerConfig};
//! use tcp_action::{InputPolicy, Mode};
//!
//! // Use defaults
//! let config = Config::default();
//! assert!(config.validate().is_ok());
//!
//! // Or customize
//! let config = Config::default()
//!     .with_action(ActionConfig::default().with_mode(Mode::PulseLow).with_pin(5))
//!     .with_input(InputConfig::default().with_policy(InputPolicy::Button).with_pin(4))
//!     .with_server(ServerConfig::default().with_port(9000));
//! assert!(config.validate().is_ok());
//! ```

use heapless::String as HString;

use crate::codec::ProtocolBytes;
use crate::debounce::InputPolicy;
use crate::error::{ByteRole, ConfigError};
use crate::mode::Mode;

/// Maximum length for short config strings (SSID, password, names)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for dotted-quad address strings
pub const MAX_ADDR_STRING: usize = 16;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for address strings
pub type AddrString = HString<MAX_ADDR_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Copy as much of `s` as fits into a heapless string, on a UTF-8 boundary.
fn bounded<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let take = s.len().min(N);
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    bounded(s)
}

/// Create an AddrString from a &str, truncating if too long
pub fn addr_string(s: &str) -> AddrString {
    bounded(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// TCP server configuration
    pub server: ServerConfig,
    /// Action pin configuration
    pub action: ActionConfig,
    /// Physical input configuration
    pub input: InputConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set server configuration
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Set action configuration
    pub fn with_action(mut self, action: ActionConfig) -> Self {
        self.action = action;
        self
    }

    /// Set physical input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Check the whole configuration before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.action.validate()?;
        self.input.validate()?;
        if self.input.policy != InputPolicy::None && self.input.pin == self.action.pin {
            return Err(ConfigError::PinConflict(self.action.pin));
        }
        Ok(())
    }

    /// Parse and validate a JSON config file.
    ///
    /// Missing sections and fields fall back to their defaults.
    #[cfg(feature = "desktop")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// TCP server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Idle time after which a client is disconnected, in milliseconds
    pub client_timeout_ms: u32,
    /// Main loop poll interval in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            client_timeout_ms: 30_000,
            poll_interval_ms: 10,
        }
    }
}

impl ServerConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client idle timeout
    pub fn with_client_timeout_ms(mut self, ms: u32) -> Self {
        self.client_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

// ============================================================================
// Action Config
// ============================================================================

/// Action pin configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActionConfig {
    /// Behavior of the pin
    pub mode: Mode,
    /// GPIO number of the action pin
    pub pin: u8,
    /// Boot state: On for on/off modes, high for toggle mode
    pub boot_on: bool,
    /// Pulse hold time in milliseconds (pulse modes)
    pub pulse_ms: u32,
    /// Protocol byte values
    pub bytes: ProtocolBytes,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::OnOff,
            pin: 5,
            boot_on: false,
            pulse_ms: 250,
            bytes: ProtocolBytes::default(),
        }
    }
}

impl ActionConfig {
    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the action pin
    pub fn with_pin(mut self, pin: u8) -> Self {
        self.pin = pin;
        self
    }

    /// Set the boot state
    pub fn with_boot_on(mut self, on: bool) -> Self {
        self.boot_on = on;
        self
    }

    /// Set the pulse duration
    pub fn with_pulse_ms(mut self, ms: u32) -> Self {
        self.pulse_ms = ms;
        self
    }

    /// Set the protocol bytes
    pub fn with_bytes(mut self, bytes: ProtocolBytes) -> Self {
        self.bytes = bytes;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode.is_pulse() && self.pulse_ms == 0 {
            return Err(ConfigError::ZeroPulse);
        }
        if self.mode.is_on_off() {
            let roles = [
                (ByteRole::Off, self.bytes.off),
                (ByteRole::On, self.bytes.on),
                (ByteRole::Query, self.bytes.query),
            ];
            for (i, &(first, a)) in roles.iter().enumerate() {
                if let Some(&(second, _)) = roles[i + 1..].iter().find(|(_, b)| *b == a) {
                    return Err(ConfigError::DuplicateProtocolByte {
                        byte: a,
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Physical input configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputConfig {
    /// How the line is interpreted
    pub policy: InputPolicy,
    /// GPIO number of the input line
    pub pin: u8,
    /// Button debounce window in milliseconds
    pub debounce_ms: u32,
    /// Number of confirmation samples after the debounce window
    pub samples: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            policy: InputPolicy::None,
            pin: 4,
            debounce_ms: 20,
            samples: 10,
        }
    }
}

impl InputConfig {
    /// Set the input policy
    pub fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the input pin
    pub fn with_pin(mut self, pin: u8) -> Self {
        self.pin = pin;
        self
    }

    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the confirmation sample count
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // A press is confirmed when fewer than samples / 2 disagree
        if self.policy == InputPolicy::Button && self.samples < 2 {
            return Err(ConfigError::TooFewSamples(self.samples));
        }
        Ok(())
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// Fixed IPv4 settings used instead of DHCP
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticIpConfig {
    /// Device address, dotted quad
    pub ip: AddrString,
    /// Gateway address, dotted quad
    pub gateway: AddrString,
    /// Subnet mask, dotted quad
    pub subnet: AddrString,
}

impl StaticIpConfig {
    /// Create a static IP configuration.
    pub fn new(ip: &str, gateway: &str, subnet: &str) -> Self {
        Self {
            ip: addr_string(ip),
            gateway: addr_string(gateway),
            subnet: addr_string(subnet),
        }
    }

    /// Prefix length of the subnet mask, if it parses as a contiguous mask.
    ///
    /// ```
    /// use tcp_action::config::StaticIpConfig;
    ///
    /// let cfg = StaticIpConfig::new("192.168.1.10", "192.168.1.1", "255.255.255.0");
    /// assert_eq!(cfg.prefix_len(), Some(24));
    /// ```
    pub fn prefix_len(&self) -> Option<u8> {
        let mask = u32::from_be_bytes(parse_ipv4(self.subnet.as_str())?);
        let len = mask.leading_ones();
        // Reject masks with holes such as 255.0.255.0
        if mask.checked_shl(len).unwrap_or(0) != 0 {
            return None;
        }
        Some(len as u8)
    }
}

/// Parse a dotted-quad IPv4 address without `std::net`.
pub fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = s.trim().split('.');
    for octet in octets.iter_mut() {
        *octet = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Parse a yes/no setting such as a build-time flag.
///
/// Accepts `1`/`true`/`on`/`yes` and `0`/`false`/`off`/`no`, ignoring case
/// and surrounding whitespace.
///
/// ```rust
/// use tcp_action::config::parse_flag;
///
/// assert_eq!(parse_flag("ON"), Some(true));
/// assert_eq!(parse_flag("0"), Some(false));
/// assert_eq!(parse_flag("maybe"), None);
/// ```
pub fn parse_flag(s: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["1", "true", "on", "yes"];
    const FALSE: [&str; 4] = ["0", "false", "off", "no"];

    let s = s.trim();
    if TRUE.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| s.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Fixed address; `None` uses DHCP
    pub static_ip: Option<StaticIpConfig>,
    /// Connection timeout in milliseconds (0 = keep trying)
    pub connect_timeout_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            static_ip: None,
            connect_timeout_ms: 0,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Use a fixed address instead of DHCP
    pub fn with_static_ip(mut self, static_ip: StaticIpConfig) -> Self {
        self.static_ip = Some(static_ip);
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout_ms(mut self, ms: u32) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("tcp-action"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.client_timeout_ms, 30_000);
        assert_eq!(config.action.mode, Mode::OnOff);
        assert_eq!(config.action.pulse_ms, 250);
        assert_eq!(config.input.policy, InputPolicy::None);
        assert_eq!(config.input.debounce_ms, 20);
        assert_eq!(config.input.samples, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_server(ServerConfig::default().with_port(9000).with_client_timeout_ms(5_000))
            .with_action(
                ActionConfig::default()
                    .with_mode(Mode::Toggle)
                    .with_pin(12)
                    .with_boot_on(true),
            )
            .with_device(DeviceConfig::default().with_name("garage door"));

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.client_timeout_ms, 5_000);
        assert_eq!(config.action.mode, Mode::Toggle);
        assert_eq!(config.action.pin, 12);
        assert!(config.action.boot_on);
        assert_eq!(config.device.name.as_str(), "garage door");
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn duplicate_on_off_bytes_rejected() {
        let bytes = ProtocolBytes {
            query: 0x01,
            ..ProtocolBytes::default()
        };
        let config = Config::default().with_action(ActionConfig::default().with_bytes(bytes));

        match config.validate() {
            Err(ConfigError::DuplicateProtocolByte {
                byte,
                first,
                second,
            }) => {
                assert_eq!(byte, 0x01);
                assert_eq!(first, ByteRole::On);
                assert_eq!(second, ByteRole::Query);
            }
            other => panic!("expected duplicate byte error, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_bytes_irrelevant_outside_on_off() {
        let bytes = ProtocolBytes {
            off: 0x01,
            on: 0x01,
            query: 0x01,
            ..ProtocolBytes::default()
        };
        let config = Config::default().with_action(
            ActionConfig::default()
                .with_mode(Mode::Toggle)
                .with_bytes(bytes),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config =
            Config::default().with_server(ServerConfig::default().with_client_timeout_ms(0));
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn zero_pulse_rejected_only_in_pulse_modes() {
        let pulse = Config::default().with_action(
            ActionConfig::default()
                .with_mode(Mode::PulseHigh)
                .with_pulse_ms(0),
        );
        assert!(matches!(pulse.validate(), Err(ConfigError::ZeroPulse)));

        let on_off = Config::default().with_action(ActionConfig::default().with_pulse_ms(0));
        assert!(on_off.validate().is_ok());
    }

    #[test]
    fn too_few_samples_rejected_for_button() {
        for samples in [0, 1] {
            let config = Config::default().with_input(
                InputConfig::default()
                    .with_policy(InputPolicy::Button)
                    .with_samples(samples),
            );
            assert!(
                matches!(config.validate(), Err(ConfigError::TooFewSamples(n)) if n == samples),
                "{} samples",
                samples
            );
        }

        let two = Config::default().with_input(
            InputConfig::default()
                .with_policy(InputPolicy::Button)
                .with_samples(2),
        );
        assert!(two.validate().is_ok());

        // Only the button policy samples repeatedly
        let switch = Config::default().with_input(
            InputConfig::default()
                .with_policy(InputPolicy::Switch)
                .with_samples(1),
        );
        assert!(switch.validate().is_ok());
    }

    #[test]
    fn pin_conflict_rejected_when_input_active() {
        let action = ActionConfig::default().with_pin(4);
        let input = InputConfig::default()
            .with_pin(4)
            .with_policy(InputPolicy::Switch);
        let config = Config::default().with_action(action.clone()).with_input(input);
        assert!(matches!(config.validate(), Err(ConfigError::PinConflict(4))));

        let unused = InputConfig::default().with_pin(4);
        let config = Config::default().with_action(action).with_input(unused);
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // WifiConfig Tests
    // =========================================================================

    #[test]
    fn wifi_config_default() {
        let wifi = WifiConfig::default();
        assert!(wifi.ssid.is_empty());
        assert!(wifi.password.is_empty());
        assert!(wifi.static_ip.is_none());
        assert!(!wifi.is_configured());
    }

    #[test]
    fn wifi_config_builder() {
        let wifi = WifiConfig::default()
            .with_ssid("TestNetwork")
            .with_password("secret123")
            .with_connect_timeout_ms(15_000)
            .with_static_ip(StaticIpConfig::new(
                "192.168.1.10",
                "192.168.1.1",
                "255.255.255.0",
            ));

        assert_eq!(wifi.ssid.as_str(), "TestNetwork");
        assert_eq!(wifi.password.as_str(), "secret123");
        assert_eq!(wifi.connect_timeout_ms, 15_000);
        assert!(wifi.is_configured());
        assert_eq!(wifi.static_ip.unwrap().ip.as_str(), "192.168.1.10");
    }

    #[test]
    fn subnet_prefix_len() {
        let prefix = |mask: &str| StaticIpConfig::new("10.0.0.2", "10.0.0.1", mask).prefix_len();
        assert_eq!(prefix("255.255.255.0"), Some(24));
        assert_eq!(prefix("255.255.0.0"), Some(16));
        assert_eq!(prefix("255.255.255.255"), Some(32));
        assert_eq!(prefix("0.0.0.0"), Some(0));
        assert_eq!(prefix("255.0.255.0"), None);
        assert_eq!(prefix("255.255.255"), None);
        assert_eq!(prefix("not a mask"), None);
    }

    #[test]
    fn parse_ipv4_rejects_garbage() {
        assert_eq!(parse_ipv4("192.168.1.10"), Some([192, 168, 1, 10]));
        assert_eq!(parse_ipv4("192.168.1.10.5"), None);
        assert_eq!(parse_ipv4("192.168.1.256"), None);
        assert_eq!(parse_ipv4(""), None);
    }

    #[test]
    fn flag_zero_means_off() {
        for on in ["1", "true", "On", "YES", " on "] {
            assert_eq!(parse_flag(on), Some(true), "{:?}", on);
        }
        for off in ["0", "false", "OFF", "no"] {
            assert_eq!(parse_flag(off), Some(false), "{:?}", off);
        }
        for junk in ["", "2", "enabled", "o"] {
            assert_eq!(parse_flag(junk), None, "{:?}", junk);
        }
    }

    // =========================================================================
    // String Helper Tests
    // =========================================================================

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // 4-byte characters: 17 of them do not fit in 64 bytes
        let input = "\u{1F6A8}".repeat(17);
        let s = short_string(&input);
        assert_eq!(s.len(), 64);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());

        let s = addr_string("\u{1F6A8}\u{1F6A8}\u{1F6A8}\u{1F6A8}\u{1F6A8}");
        assert_eq!(s.len(), 16);
    }
}
