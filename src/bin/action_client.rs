//! Command-line test client for the TCP action server.
//!
//! # Usage
//!
//! ```sh
//! action_client --ip 192.168.1.10 --port 8080 --on
//! action_client --ip 192.168.1.10 --port 8080 --get
//! action_client --ip 192.168.1.10 --port 8080 --interval 2.5
//! ```
//!
//! `--interval` keeps one connection open and alternates off/on forever,
//! which also exercises the server's idle timeout when the interval is
//! longer than the timeout.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use tcp_action::ProtocolBytes;

/// Send one-byte commands to a TCP action server
#[derive(Parser, Debug)]
#[command(name = "action_client", version, long_about = None)]
#[command(group(
    ArgGroup::new("command")
        .required(true)
        .args(["on", "off", "get", "toggle", "pulse", "interval"]),
))]
struct Args {
    /// Server address
    #[arg(long)]
    ip: String,

    /// Server port
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Switch on (on/off modes)
    #[arg(long)]
    on: bool,

    /// Switch off (on/off modes)
    #[arg(long)]
    off: bool,

    /// Query the state and print the reply (on/off modes)
    #[arg(long)]
    get: bool,

    /// Flip the pin (toggle mode)
    #[arg(long)]
    toggle: bool,

    /// Fire one pulse (pulse modes)
    #[arg(long)]
    pulse: bool,

    /// Alternate off/on every INTERVAL seconds on one connection
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    interval: Option<Duration>,

    /// Seconds to wait for a query reply
    #[arg(long, value_name = "SECONDS", default_value = "2", value_parser = parse_seconds)]
    reply_timeout: Duration,
}

/// Parse a positive, finite number of seconds.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{:?} is not a number of seconds", s))?;
    if !(secs > 0.0) {
        return Err(format!("{} must be greater than zero", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{}: {}", s, e))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let bytes = ProtocolBytes::default();

    let mut stream = TcpStream::connect((args.ip.as_str(), args.port))
        .with_context(|| format!("failed to connect to {}:{}", args.ip, args.port))?;
    stream.set_nodelay(true)?;
    println!("Connected to {}:{}", args.ip, args.port);

    if let Some(pause) = args.interval {
        loop {
            send(&mut stream, bytes.off)?;
            thread::sleep(pause);
            send(&mut stream, bytes.on)?;
            thread::sleep(pause);
        }
    }

    let byte = if args.on {
        bytes.on
    } else if args.off {
        bytes.off
    } else if args.get {
        bytes.query
    } else if args.toggle {
        bytes.toggle
    } else {
        bytes.pulse
    };
    send(&mut stream, byte)?;

    if args.get {
        stream.set_read_timeout(Some(args.reply_timeout))?;
        let mut reply = [0u8; 1];
        match stream.read(&mut reply) {
            Ok(1) => println!("Received: {:#04x}", reply[0]),
            Ok(_) => bail!("server closed the connection without replying"),
            Err(e) => return Err(e).context("no reply"),
        }
    }

    // Give the server time to read before the connection closes
    thread::sleep(Duration::from_millis(100));
    Ok(())
}

fn send(stream: &mut TcpStream, byte: u8) -> anyhow::Result<()> {
    stream.write_all(&[byte]).context("send failed")?;
    println!("Sent: {:#04x}", byte);
    Ok(())
}
