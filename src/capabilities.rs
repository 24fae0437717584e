//! `/capabilities?tab=...` response types.
//!
//! Mirrors what the firmware renders with cJSON. Every field is optional on
//! the wire (the device omits unset settings), so everything defaults.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which settings page to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    General,
    Dsp,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::General => "general",
            Tab::Dsp => "dsp",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `tab=general`. `server_host`/`server_port` are absent when unset
/// (the device then finds the server via mDNS). The port is whatever integer
/// was stored; the device does not range-check it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdns_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<i64>,
    pub dsp_available: bool,
}

/// One tunable of a DSP flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspParameter {
    /// Parameter key for `/get` and `/post` (`fc_1`, `gain_1`, ...).
    pub key: String,
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub current: f64,
}

/// A DSP processing flow and its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspFlow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enum_value: i64,
    pub parameters: Vec<DspParameter>,
}

/// `tab=dsp`. Builds without the DSP processor answer only
/// `{"dsp_enabled": false}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsp_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_flow: Option<i64>,
    pub flows: Vec<DspFlow>,
}

impl DspSettings {
    pub fn is_enabled(&self) -> bool {
        self.dsp_enabled.unwrap_or(true)
    }

    /// The flow whose `enum_value` matches `active_flow`.
    pub fn active(&self) -> Option<&DspFlow> {
        let active = self.active_flow?;
        self.flows.iter().find(|f| f.enum_value == active)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Capabilities {
    General(GeneralSettings),
    Dsp(DspSettings),
}

impl Capabilities {
    /// Decode a body for `tab`.
    pub fn from_json(tab: Tab, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match tab {
            Tab::General => Capabilities::General(serde_json::from_slice(body)?),
            Tab::Dsp => Capabilities::Dsp(serde_json::from_slice(body)?),
        })
    }
}
