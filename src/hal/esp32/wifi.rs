//! Wi-Fi station bring-up for ESP32.
//!
//! Unlike a blocking connect, [`Esp32Wifi::begin`] only starts the
//! association and returns. The firmware keeps servicing the physical input
//! and blinking the status LED while it polls [`Esp32Wifi::is_up`].
//! Once serving, [`Esp32Wifi::maintain`] re-issues the connect if the
//! station drops.
//!
//! # Example
//!
//! ```ignore
//! use tcp_action::hal::esp32::Esp32Wifi;
//! use tcp_action::config::{StaticIpConfig, WifiConfig};
//!
//! let config = WifiConfig::default()
//!     .with_ssid("MyNetwork")
//!     .with_password("secret123")
//!     .with_static_ip(StaticIpConfig::new("192.168.1.10", "192.168.1.1", "255.255.255.0"));
//!
//! let wifi = Esp32Wifi::begin(modem, sysloop, nvs, &config)?;
//! while !wifi.is_up() {
//!     // poll the button, blink the LED...
//! }
//! println!("IP: {:?}", wifi.ip_addr());
//!
//! server.run_with(|| wifi.maintain());
//! ```

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::ipv4;
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi, WifiDriver};
use log::{info, warn};

use crate::config::{parse_ipv4, StaticIpConfig, WifiConfig};

/// Wi-Fi station connection for ESP32.
///
/// Owns the driver for the lifetime of the firmware.
pub struct Esp32Wifi<'a> {
    wifi: EspWifi<'a>,
    /// Last reconnect attempt; `None` while the link is up
    retried_at: Option<Instant>,
}

/// Minimum time between reconnect attempts.
const RECONNECT_INTERVAL: Duration = Duration::from_secs(10);

impl<'a> Esp32Wifi<'a> {
    /// Configure station mode and start connecting.
    ///
    /// Returns as soon as the association has been started. With a static
    /// address DHCP is disabled on the station interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be initialized, or if the
    /// static address settings do not parse.
    pub fn begin(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let driver = WifiDriver::new(modem, sysloop, nvs)?;

        let mut wifi = match &config.static_ip {
            Some(static_ip) => {
                let sta = EspNetif::new_with_conf(&static_netif(static_ip)?)?;
                let ap = EspNetif::new(NetifStack::Ap)?;
                info!(
                    "static IP {} gw {} mask {}",
                    static_ip.ip, static_ip.gateway, static_ip.subnet
                );
                EspWifi::wrap_all(driver, sta, ap)?
            }
            None => EspWifi::wrap(driver)?,
        };

        let mut ssid: heapless::String<32> = heapless::String::new();
        ssid.push_str(config.ssid.as_str())
            .map_err(|_| anyhow!("SSID longer than 32 bytes"))?;

        let mut password: heapless::String<64> = heapless::String::new();
        password
            .push_str(config.password.as_str())
            .map_err(|_| anyhow!("password longer than 64 bytes"))?;

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;

        wifi.start()?;
        info!("connecting to '{}'...", config.ssid);
        wifi.connect()?;

        Ok(Self {
            wifi,
            retried_at: None,
        })
    }

    /// Reconnect if the station has dropped.
    ///
    /// Cheap to call on every idle iteration of the server loop: while the
    /// link is down, `connect()` is re-issued at most once per
    /// [`RECONNECT_INTERVAL`].
    pub fn maintain(&mut self) {
        if self.wifi.is_connected().unwrap_or(false) {
            if self.retried_at.take().is_some() {
                info!("WiFi reconnected");
            }
            return;
        }

        let now = Instant::now();
        match self.retried_at {
            Some(at) if now.duration_since(at) < RECONNECT_INTERVAL => return,
            Some(_) => {}
            None => warn!("WiFi connection lost"),
        }
        self.retried_at = Some(now);

        info!("reconnecting...");
        if let Err(e) = self.wifi.connect() {
            warn!("reconnect failed: {}", e);
        }
    }

    /// Whether the station is associated and has an address.
    pub fn is_up(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    /// Get the current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }
}

fn static_netif(cfg: &StaticIpConfig) -> anyhow::Result<NetifConfiguration> {
    let ip = parse_ipv4(&cfg.ip).context("invalid static IP")?;
    let gateway = parse_ipv4(&cfg.gateway).context("invalid gateway")?;
    let prefix = cfg.prefix_len().context("invalid subnet mask")?;

    Ok(NetifConfiguration {
        ip_configuration: Some(ipv4::Configuration::Client(
            ipv4::ClientConfiguration::Fixed(ipv4::ClientSettings {
                ip: Ipv4Addr::from(ip),
                subnet: ipv4::Subnet {
                    gateway: Ipv4Addr::from(gateway),
                    mask: ipv4::Mask(prefix),
                },
                dns: None,
                secondary_dns: None,
            }),
        )),
        ..NetifConfiguration::wifi_default_client()
    })
}
