//! Interpreter configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the fallback function for unresolved calls
pub const DEFAULT_FUNCTION_MISSING: &str = "function-missing";

/// Configuration for one interpreter
///
/// Transaction amounts are signed and added to the balance, so debits are
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log every reduction step at debug level
    pub debug: bool,
    /// Starting balance (default: unlimited)
    pub balance: Option<f64>,
    /// Wall-clock budget in milliseconds (default: unlimited)
    pub timeout_ms: Option<u64>,
    /// Seed for the per-run random stream (default: random)
    pub seed: Option<u64>,
    /// Amount added to the balance per quote
    pub quote_transaction: f64,
    /// Amount added to the balance per invocation
    pub invoke_transaction: f64,
    /// Amount added to the balance per sequenced element
    pub sequence_transaction: f64,
    /// Stop with a warning when a pass makes no progress
    pub irreducible_list_check: bool,
    /// Check argument counts against declared signatures
    pub runtime_type_check: bool,
    /// Warn about unresolvable names before running
    pub preflight_type_check: bool,
    /// Allow functions flagged impure
    pub allow_impure_functions: bool,
    /// Warn when an impure function runs
    pub warn_on_impure_functions: bool,
    /// Function used when a call resolves to nothing
    pub function_missing_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            balance: None,
            timeout_ms: None,
            seed: None,
            quote_transaction: -1.0,
            invoke_transaction: -1.0,
            sequence_transaction: -1.0,
            irreducible_list_check: true,
            runtime_type_check: true,
            preflight_type_check: true,
            allow_impure_functions: true,
            warn_on_impure_functions: true,
            function_missing_name: DEFAULT_FUNCTION_MISSING.to_string(),
        }
    }
}

impl Config {
    /// Parses a JSON configuration; missing fields keep their defaults
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the meter cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.balance.map_or(false, f64::is_nan) {
            return Err(Error::Config("balance must be a number".to_string()));
        }
        let prices = [
            self.quote_transaction,
            self.invoke_transaction,
            self.sequence_transaction,
        ];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(Error::Config("transaction amounts must be finite".to_string()));
        }
        Ok(())
    }

    /// Sets the starting balance
    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Sets the wall-clock budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Wall-clock budget as a duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
