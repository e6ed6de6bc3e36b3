use std::{env, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::allocation::DEFAULT_CAP;

pub const DEFAULT_INDEX_KEY: &str = "AccountKeys";

pub const CAP_VAR: &str = "LEDGER_CAP";
pub const INDEX_KEY_VAR: &str = "LEDGER_INDEX_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LEDGER_CAP is not a decimal: `{value}`")]
    InvalidCap {
        value: String,
        source: rust_decimal::Error,
    },
    #[error("LEDGER_CAP must be positive, got {cap}")]
    NonPositiveCap { cap: Decimal },
    #[error("LEDGER_INDEX_KEY must not be empty")]
    EmptyIndexKey,
}

/// Process-wide ledger settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub cap: Decimal,
    /// Store key of the account index record.
    pub index_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            index_key: DEFAULT_INDEX_KEY.to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, unset ones keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(CAP_VAR) {
            let cap = Decimal::from_str(value.trim())
                .map_err(|source| ConfigError::InvalidCap { value, source })?;
            if cap <= Decimal::ZERO {
                return Err(ConfigError::NonPositiveCap { cap });
            }
            config.cap = cap;
        }
        if let Some(index_key) = lookup(INDEX_KEY_VAR) {
            if index_key.is_empty() {
                return Err(ConfigError::EmptyIndexKey);
            }
            config.index_key = index_key;
        }
        Ok(config)
    }
}
