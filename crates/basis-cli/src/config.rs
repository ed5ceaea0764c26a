// crates/basis-cli/src/config.rs
//
// CLI configuration. Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use basis_exchange::GenesisConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Snapshot file holding the exchange state between invocations.
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Parameters used by `basis init`.
    #[serde(default)]
    pub genesis: GenesisConfig,
}

fn default_state_path() -> String {
    "~/.basis/state.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
            log_level: default_log_level(),
            genesis: GenesisConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: CliConfig = toml::from_str(&contents)?;
        config.genesis.validate()?;
        Ok(config)
    }

    pub fn state_file(&self) -> PathBuf {
        expand_tilde(&self.state_path)
    }
}

/// Replace a leading `~/` with the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
