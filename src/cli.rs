use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::capabilities::Tab;
use crate::config::{ClientConfig, ConfigSource};
use crate::decode::ParamValue;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "snapclient-config")]
#[command(version)]
#[command(about = "Read and write settings on an ESP32 Snapcast client over HTTP")]
pub struct Args {
    /// Device origin, e.g. http://192.168.1.50 or http://esp32-snapclient
    #[arg(long, global = true)]
    pub device: Option<String>,

    /// Full UI page URL; its origin is the device and its ?backend= is honoured
    #[arg(long, global = true)]
    pub page_url: Option<String>,

    /// Send GET/POST requests to this origin instead of the device
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// TOML config file (device, page_url, backend, timeouts)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// TCP connect timeout in seconds
    #[arg(long, global = true)]
    pub connect_timeout: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Log every request (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Read one or more parameters (fetched concurrently)
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Write a parameter
    Set { key: String, value: String },
    /// Clear a parameter back to its default
    Delete { key: String },
    /// Show the settings snapshot for a UI tab
    Capabilities {
        #[arg(long, value_enum, default_value = "general")]
        tab: Tab,
    },
    /// Reboot the device
    Restart,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Args {
    /// The command-line settings layer.
    pub fn source(&self) -> ConfigSource {
        ConfigSource {
            device: self.device.clone(),
            page_url: self.page_url.clone(),
            backend: self.backend.clone(),
            connect_timeout_secs: self.connect_timeout,
            request_timeout_secs: self.timeout,
        }
    }

    /// Flags over `--config` file over defaults.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => ConfigSource::load(path)?,
            None => ConfigSource::default(),
        };
        self.source().merge(file).into_client_config()
    }
}

/// `key = value` line for `get`.
pub fn format_param(key: &str, value: Option<&ParamValue>) -> String {
    match value {
        Some(ParamValue::Text(s)) if s.is_empty() => format!("{key} = \"\""),
        Some(v) => format!("{key} = {v}"),
        None => format!("{key} = <unavailable>"),
    }
}
