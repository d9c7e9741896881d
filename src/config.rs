use crate::wave::{ExtensionMode, MagicPolicy, ParseOptions};
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

/// Top level configuration for the CLI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Parser settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// "reject" or "warn"
    pub magic_policy: MagicPolicy,
    /// "tagged" or "format_size"
    pub extension_mode: ExtensionMode,
    /// Cross-check byte_rate and block_align against the other fields
    pub check_consistency: bool,
    /// Refuse payloads larger than this many MiB
    pub max_payload_mb: Option<u64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            magic_policy: MagicPolicy::Reject,
            extension_mode: ExtensionMode::TaggedChunk,
            check_consistency: false,
            max_payload_mb: None,
        }
    }
}

impl ParserConfig {
    /// Converts the settings into options for a [`crate::wave::WaveParser`]
    pub fn to_options(&self) -> ParseOptions {
        ParseOptions {
            magic: self.magic_policy,
            extension: self.extension_mode,
            check_consistency: self.check_consistency,
            max_payload_len: self.max_payload_mb.map(|mb| mb.saturating_mul(1024 * 1024)),
        }
    }
}

/// Load configuration from config.toml
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from(CONFIG_FILE)
}

/// Load configuration from `path`, falling back to defaults if the file doesn't exist
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    match File::open(path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            Ok(toml::from_str(&contents)?)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}
