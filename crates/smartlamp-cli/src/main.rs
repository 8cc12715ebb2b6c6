//! `smartlamp` command line tool.
//!
//! Reads and writes lamp attributes over a serial port, raw USB bulk
//! endpoints or a simulated device:
//!
//! ```text
//! smartlamp --simulate get ldr
//! smartlamp --port /dev/ttyUSB0 set led 80
//! smartlamp --usb --retries 5 --timeout-ms 500 show --json
//! ```
//!
//! Logging goes to stderr. `RUST_LOG` sets the filter (default `warn`);
//! `-v` forces `debug`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use smartlamp_core::TransactionConfig;
use smartlamp_hardware::mock::SimulatedLamp;
use smartlamp_hardware::{AttributeTable, SmartLamp, Transport};
use smartlamp_protocol::Attribute;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// SmartLamp host tool
#[derive(Parser, Debug)]
#[command(name = "smartlamp", version, long_about = None)]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,

    /// JSON file with transaction settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Retry budget per transaction
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Per-attempt read timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

/// Which link to talk over. At most one may be given.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
struct LinkArgs {
    /// Serial port path (e.g. /dev/ttyUSB0)
    #[arg(long, value_name = "PATH")]
    port: Option<String>,

    /// Use raw USB bulk transfers
    #[arg(long, default_value_t = false)]
    usb: bool,

    /// Talk to a simulated lamp
    #[arg(long, default_value_t = false)]
    simulate: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Action {
    /// Read one attribute (led, ldr, temp, hum)
    Get { attribute: Attribute },

    /// Write one attribute
    Set {
        attribute: Attribute,
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },

    /// Print every attribute
    Show {
        /// Print a JSON object instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    run(cli, &mut stdout.lock())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = build_config(&cli)?;
    let transport = open_transport(&cli.link)?;
    info!(transport = transport.name(), "Connected");

    let lamp = SmartLamp::new(transport, config).context("failed to open lamp session")?;

    match cli.action {
        Action::Get { attribute } => {
            let value = lamp
                .get(attribute)
                .with_context(|| format!("failed to read {attribute}"))?;
            writeln!(out, "{value}")?;
        }
        Action::Set { attribute, value } => {
            let status = lamp
                .set(attribute, value)
                .with_context(|| format!("failed to set {attribute}"))?;
            if status < 0 {
                bail!("lamp refused {attribute} = {value} (status {status})");
            }
            writeln!(out, "{status}")?;
        }
        Action::Show { json: true } => write_json(&lamp, out)?,
        Action::Show { json: false } => {
            let table = AttributeTable::new(Arc::new(lamp));
            for (attr, text) in table.show_all() {
                write!(out, "{attr}: {text}")?;
            }
        }
    }

    Ok(())
}

/// Print every attribute as one JSON object; failed reads show as `-1`.
fn write_json<T: Transport>(lamp: &SmartLamp<T>, out: &mut impl Write) -> Result<()> {
    let object: serde_json::Map<String, serde_json::Value> = Attribute::ALL
        .into_iter()
        .map(|attr| {
            let value = lamp.get(attr).unwrap_or_else(|e| e.to_sentinel());
            (attr.name().to_string(), value.into())
        })
        .collect();

    writeln!(out, "{}", serde_json::to_string_pretty(&object)?)?;
    Ok(())
}

fn build_config(cli: &Cli) -> Result<TransactionConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TransactionConfig::default(),
    };

    if let Some(retries) = cli.retries {
        config = config.with_retry_budget(retries);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_read_timeout(Duration::from_millis(ms));
    }

    config.validate()?;
    debug!(?config, "Transaction settings");
    Ok(config)
}

fn load_config(path: &Path) -> Result<TransactionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn open_transport(link: &LinkArgs) -> Result<Box<dyn Transport>> {
    if link.simulate {
        return Ok(Box::new(SimulatedLamp::new()));
    }
    if link.usb {
        return open_usb();
    }
    match &link.port {
        Some(path) => open_serial(path),
        None => open_discovered(),
    }
}

#[cfg(feature = "usb")]
fn open_usb() -> Result<Box<dyn Transport>> {
    let transport = smartlamp_hardware::UsbBulkTransport::open()?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "usb"))]
fn open_usb() -> Result<Box<dyn Transport>> {
    bail!("built without USB support (enable the `usb` feature)")
}

#[cfg(feature = "serial")]
fn open_serial(path: &str) -> Result<Box<dyn Transport>> {
    let transport = smartlamp_hardware::SerialTransport::open(path)?;
    Ok(Box::new(transport))
}

#[cfg(not(feature = "serial"))]
fn open_serial(path: &str) -> Result<Box<dyn Transport>> {
    bail!("cannot open {path}: built without serial support (enable the `serial` feature)")
}

#[cfg(feature = "serial")]
fn open_discovered() -> Result<Box<dyn Transport>> {
    let ports = smartlamp_hardware::SerialTransport::discover()?;
    match ports.first() {
        Some(path) => open_serial(path),
        None => bail!("no lamp found; pass --port, --usb or --simulate"),
    }
}

#[cfg(not(feature = "serial"))]
fn open_discovered() -> Result<Box<dyn Transport>> {
    bail!("no link selected; pass --port, --usb or --simulate")
}
