//! Engine configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Voucher and statement numbering configuration.
    #[serde(default)]
    pub numbering: NumberingConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

/// Numbering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// Zero-padded width of voucher sequence numbers.
    #[serde(default = "default_voucher_seq_width")]
    pub voucher_seq_width: usize,
    /// Zero-padded width of statement sequence numbers.
    #[serde(default = "default_statement_seq_width")]
    pub statement_seq_width: usize,
}

fn default_voucher_seq_width() -> usize {
    5
}

fn default_statement_seq_width() -> usize {
    4
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            voucher_seq_width: default_voucher_seq_width(),
            statement_seq_width: default_statement_seq_width(),
        }
    }
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Residual balance at or below which a billing counts as fully paid.
    #[serde(default = "default_settlement_tolerance")]
    pub settlement_tolerance: Decimal,
}

fn default_settlement_tolerance() -> Decimal {
    // 0.01 currency units
    Decimal::new(1, 2)
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            settlement_tolerance: default_settlement_tolerance(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CARTAGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
