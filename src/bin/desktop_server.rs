//! Desktop simulator for the TCP action server.
//!
//! Runs the full protocol on a real TCP port against mock GPIO, so clients
//! and the protocol can be exercised without hardware. Every pin change is
//! logged at debug level (`-v`).
//!
//! # Usage
//!
//! Blocking loop (what the firmware runs):
//! ```sh
//! cargo run --bin desktop_server --features desktop -- -v
//! ```
//!
//! Event-driven loop on tokio, with a config file:
//! ```sh
//! cargo run --bin desktop_server --features desktop -- --event-loop --config action.json
//! ```
//!
//! A config file may set any subset of fields:
//! ```json
//! { "action": { "mode": "pulse_low", "pulse_ms": 500 }, "server": { "port": 9000 } }
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::info;
use tcp_action::hal::{MockInput, MockPin, StdClock, StdDelay};
use tcp_action::services::StdListener;
use tcp_action::traits::Level;
use tcp_action::{ActionService, AsyncServer, BlockingServer, Config, Mode, VERSION};

/// TCP action server with simulated GPIO
#[derive(Parser, Debug)]
#[command(name = "desktop_server", version, long_about = None)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the pin mode (on_off, on_off_inverted, toggle, pulse_low, pulse_high)
    #[arg(short, long)]
    mode: Option<String>,

    /// Override the TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Use the event-driven server instead of the blocking loop
    #[arg(long, default_value_t = false)]
    event_loop: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    println!("=================================");
    println!("  TCP Action Desktop Server {}", VERSION);
    println!("=================================");
    println!();

    let config = load_config(&args)?;
    info!(
        "mode {} (boot_on={}), input {}, timeout {} ms",
        config.action.mode.as_str(),
        config.action.boot_on,
        config.input.policy.as_str(),
        config.server.client_timeout_ms
    );

    // Simulated hardware: the input line idles high and never changes.
    // Pin changes are logged by the controller, so no write history is kept.
    let service = ActionService::new(
        MockPin::new(Level::Low).with_history_limit(0),
        MockInput::new(Level::High),
        StdDelay,
        &config,
    )
    .map_err(|e| anyhow!("action init failed: {}", e))?;

    println!("Listening on 0.0.0.0:{}", config.server.port);
    println!("Press Ctrl+C to stop.");
    println!();

    if args.event_loop {
        run_event_loop(service, &config)
    } else {
        let listener = StdListener::bind(("0.0.0.0", config.server.port))
            .context("failed to bind TCP listener")?;
        let mut server =
            BlockingServer::new(listener, StdClock::new(), StdDelay, service, &config.server);
        server.run()
    }
}

fn run_event_loop(
    service: ActionService<MockPin, MockInput, StdDelay>,
    config: &Config,
) -> anyhow::Result<()> {
    // Pulses block the handler; a single thread keeps that serialization
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
            .await
            .context("failed to bind TCP listener")?;
        let service = AsyncServer::new(service, StdClock::new(), &config.server)
            .run(listener, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
        info!("final state: {:?}", service.state());
        Ok(())
    })
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_json_str(&json)?
        }
        None => Config::default(),
    };

    if let Some(text) = &args.mode {
        config.action.mode =
            Mode::from_text(text).ok_or_else(|| anyhow!("unknown mode {:?}", text))?;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}
