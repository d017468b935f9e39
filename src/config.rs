//! Runtime configuration read from the environment.
//!
//! | Variable          | Meaning                                         | Default |
//! |-------------------|-------------------------------------------------|---------|
//! | `WAGE_REGIME_DIR` | directory of regime JSON files overriding years | unset   |
//! | `WAGE_LOG`        | `tracing` filter directive                      | `info`  |
//! | `WAGE_LOG_JSON`   | `1`/`true` to emit JSON log lines               | off     |

use crate::error::EngineError;
use crate::regime::{load_regimes_from_dir, RegimeTable};
use std::path::PathBuf;
use tracing::info;

pub const REGIME_DIR_VAR: &str = "WAGE_REGIME_DIR";
pub const LOG_VAR: &str = "WAGE_LOG";
pub const LOG_JSON_VAR: &str = "WAGE_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub regime_dir: Option<PathBuf>,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regime_dir: None,
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            regime_dir: non_empty(REGIME_DIR_VAR).map(PathBuf::from),
            log_filter: non_empty(LOG_VAR).unwrap_or(defaults.log_filter),
            log_json: non_empty(LOG_JSON_VAR)
                .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// Built-in regimes, overridden by any regimes found in `regime_dir`.
    pub fn load_regimes(&self) -> Result<RegimeTable, EngineError> {
        let mut table = RegimeTable::builtin();
        if let Some(dir) = &self.regime_dir {
            for regime in load_regimes_from_dir(dir)? {
                table.insert(regime);
            }
        }
        info!(years = ?table.years(), "tax regimes ready");
        Ok(table)
    }
}
