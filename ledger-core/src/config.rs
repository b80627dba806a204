//! Configuration for the credit ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// HTTP listen address
    pub http_listen_addr: String,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Credit issuance configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Revenue split policy
    #[serde(default)]
    pub revenue: RevenueConfig,

    /// Command actor configuration
    #[serde(default)]
    pub actor: ActorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "credit-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            http_listen_addr: "0.0.0.0:8080".to_string(),
            log: LogConfig::default(),
            verification: VerificationConfig::default(),
            revenue: RevenueConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Credit issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Credits minted per verified hectare
    pub credits_per_hectare: Decimal,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            credits_per_hectare: Decimal::from(20),
        }
    }
}

/// Revenue split policy (fractions of each sale's total value)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueConfig {
    /// Community share
    pub community: Decimal,

    /// NGO operations share
    pub operations: Decimal,

    /// Verification costs share
    pub verification: Decimal,

    /// Platform fee share
    pub platform: Decimal,

    /// Decimal places of the currency's minor unit
    pub minor_unit_scale: u32,
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            community: Decimal::new(60, 2),    // 0.60
            operations: Decimal::new(25, 2),   // 0.25
            verification: Decimal::new(10, 2), // 0.10
            platform: Decimal::new(5, 2),      // 0.05
            minor_unit_scale: 2,               // cents
        }
    }
}

impl RevenueConfig {
    /// Check that fractions are non-negative and sum to exactly one
    pub fn validate(&self) -> crate::Result<()> {
        let fractions = [self.community, self.operations, self.verification, self.platform];

        if fractions.iter().any(|f| f.is_sign_negative()) {
            return Err(crate::Error::Config(
                "Revenue fractions must be non-negative".to_string(),
            ));
        }

        let sum: Decimal = fractions.iter().sum();
        if sum != Decimal::ONE {
            return Err(crate::Error::Config(format!(
                "Revenue fractions must sum to 1, got {}",
                sum
            )));
        }

        if self.minor_unit_scale > 8 {
            return Err(crate::Error::Config(format!(
                "Minor unit scale {} is out of range",
                self.minor_unit_scale
            )));
        }

        Ok(())
    }
}

/// Command actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Bounded mailbox capacity
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(addr) = std::env::var("CREDIT_LEDGER_HTTP_ADDR") {
            config.http_listen_addr = addr;
        }

        if let Ok(filter) = std::env::var("CREDIT_LEDGER_LOG_FILTER") {
            config.log.filter = filter;
        }

        if let Ok(json) = std::env::var("CREDIT_LEDGER_LOG_JSON") {
            config.log.json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        if let Ok(rate) = std::env::var("CREDIT_LEDGER_CREDITS_PER_HECTARE") {
            config.verification.credits_per_hectare = Decimal::from_str(&rate).map_err(|e| {
                crate::Error::Config(format!("Invalid CREDIT_LEDGER_CREDITS_PER_HECTARE: {}", e))
            })?;
        }

        if let Ok(capacity) = std::env::var("CREDIT_LEDGER_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid CREDIT_LEDGER_MAILBOX_CAPACITY: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> crate::Result<()> {
        if self.verification.credits_per_hectare <= Decimal::ZERO {
            return Err(crate::Error::Config(
                "credits_per_hectare must be positive".to_string(),
            ));
        }

        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }

        self.revenue.validate()
    }
}
