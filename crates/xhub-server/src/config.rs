//! Server configuration read from the environment.
//!
//! Values are read once at startup. `main` loads a `.env` file first, so
//! every variable below can also be set there.
//!
//! | Variable             | Default                 |
//! |----------------------|-------------------------|
//! | `XHUB_DB_PATH`       | `xhub.db`               |
//! | `XHUB_ADDR`          | `0.0.0.0:8081`          |
//! | `XHUB_BASE_URL`      | `http://localhost:8081` |
//! | `XHUB_ATOMIC_WRITES` | `false`                 |
//! | `XHUB_IN_MEMORY`     | `false`                 |

use xhub_storage::WriteMode;

pub const DEFAULT_DB_PATH: &str = "xhub.db";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}

/// Everything `main` needs to open the store and bind the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub addr: String,
    pub base_url: String,
    pub write_mode: WriteMode,
    /// Use a process-local in-memory store instead of SQLite.
    pub in_memory: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            addr: DEFAULT_ADDR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            write_mode: WriteMode::BestEffort,
            in_memory: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();
        let atomic = flag(&lookup, "XHUB_ATOMIC_WRITES")?;
        Ok(ServerConfig {
            db_path: lookup("XHUB_DB_PATH").unwrap_or(defaults.db_path),
            addr: lookup("XHUB_ADDR").unwrap_or(defaults.addr),
            base_url: lookup("XHUB_BASE_URL").unwrap_or(defaults.base_url),
            write_mode: if atomic {
                WriteMode::Atomic
            } else {
                WriteMode::BestEffort
            },
            in_memory: flag(&lookup, "XHUB_IN_MEMORY")?,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(ConfigError::InvalidFlag { var, value }),
    }
}
