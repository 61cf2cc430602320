//! Named snapshot formats, for configuration files and command lines.

use crate::json::JsonTranscoder;
use crate::key_value::KeyValueTranscoder;
use crate::transcoder::Transcoder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The formats this crate can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Kv,
    Json,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Kv, Format::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Kv => "kv",
            Format::Json => "json",
        }
    }

    /// A transcoder for this format. `pretty` only affects JSON.
    pub fn transcoder(self, pretty: bool) -> Box<dyn Transcoder> {
        match self {
            Format::Kv => Box::new(KeyValueTranscoder::new()),
            Format::Json => Box::new(JsonTranscoder::new().with_pretty(pretty)),
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "kv" | "txt" | "properties" => Some(Format::Kv),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kv" | "key-value" => Ok(Format::Kv),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown snapshot format '{}' (expected kv or json)", other)),
        }
    }
}
