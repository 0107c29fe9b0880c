//! Command-line interface definitions and argument parsing
//!
//! This module handles the CLI surface: argument definitions, selector
//! assembly from flags, and validity-window parsing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use spacelock::{CharacteristicId, DeviceSelector, Error, Result, ServiceId};

/// Command-line interface definition for spacelock
#[derive(Parser)]
#[command(name = "spacelock")]
#[command(about = "Sign and deliver access tokens to a spacelock over BLE")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub verbose: bool,
}

/// Available commands for the spacelock CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a lock secret key file
    Keygen {
        /// Where to write the hex-encoded key
        #[arg(long, default_value = "spacelock.key")]
        out: PathBuf,
    },

    /// Sign an access token for a user and validity window
    Sign {
        /// Key file produced by keygen
        #[arg(long, default_value = "spacelock.key")]
        key: PathBuf,

        /// User the token is issued to
        #[arg(long)]
        user: String,

        /// Window start, RFC 3339 (defaults to now)
        #[arg(long)]
        from: Option<String>,

        /// Window end, RFC 3339 (conflicts with --hours)
        #[arg(long, conflicts_with = "hours")]
        until: Option<String>,

        /// Window length in hours from the start
        #[arg(long, default_value = "24")]
        hours: u64,
    },

    /// Decode a base64 token and print its fields
    Decode {
        /// The armored token
        token: String,

        /// Verify the MAC against this key file
        #[arg(long)]
        key: Option<PathBuf>,
    },

    /// Deliver a token to the lock over BLE (requires the `bluetooth` feature)
    Send {
        /// The armored token text to deliver
        token: String,

        /// Match peripherals by advertised name prefix
        #[arg(long, conflicts_with_all = ["accept_all", "selector"])]
        device_name: Option<String>,

        /// Accept the first peripheral seen
        #[arg(long, conflicts_with = "selector")]
        accept_all: bool,

        /// Full selector as legacy request-options JSON
        #[arg(long)]
        selector: Option<String>,

        /// GATT service to target
        #[arg(long, default_value = "12345678-1234-5678-1234-56789abcdef0")]
        service: ServiceId,

        /// Characteristic to write
        #[arg(long, default_value = "12345678-1234-5678-1234-56789abcdef5")]
        characteristic: CharacteristicId,

        /// Decode the token and write the binary record instead of its text
        #[arg(long)]
        binary: bool,

        /// Optional TOML config with scan/operation timeouts
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Build the device selector from the `send` flags. Precedence: explicit
/// JSON, then name prefix, then accept-all (the `--accept-all` flag and the
/// no-flag default coincide, matching the original caller).
pub fn resolve_selector(
    selector_json: Option<&str>,
    device_name: Option<&str>,
) -> Result<DeviceSelector> {
    if let Some(json) = selector_json {
        let selector: DeviceSelector =
            serde_json::from_str(json).map_err(|e| Error::Selector(e.to_string()))?;
        return Ok(selector);
    }
    if let Some(prefix) = device_name {
        return Ok(DeviceSelector::by_name_prefix(prefix));
    }
    Ok(DeviceSelector::AcceptAll)
}

/// Parse an RFC 3339 datetime into Unix seconds
pub fn parse_timestamp(input: &str) -> Result<u64> {
    let parsed = DateTime::parse_from_rfc3339(input)
        .map_err(|e| Error::InvalidInput(format!("invalid datetime '{}': {}", input, e)))?;
    let seconds = parsed.timestamp();
    if seconds < 0 {
        return Err(Error::InvalidInput(format!(
            "datetime '{}' is before the Unix epoch",
            input
        )));
    }
    Ok(seconds as u64)
}

/// Resolve the validity window from the sign flags
pub fn resolve_window(
    from: Option<&str>,
    until: Option<&str>,
    hours: u64,
) -> Result<(u64, u64)> {
    let valid_from = match from {
        Some(text) => parse_timestamp(text)?,
        None => Utc::now().timestamp() as u64,
    };
    let valid_until = match until {
        Some(text) => parse_timestamp(text)?,
        None => valid_from + hours * 3600,
    };
    Ok((valid_from, valid_until))
}

/// Format Unix seconds for display
pub fn format_timestamp(unix_time: u64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_time as i64, 0) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("[{}]", unix_time),
    }
}
