//! Revenue split
//!
//! Splits the value of a sale across the community, operations,
//! verification and platform buckets. The three non-community buckets are
//! rounded down to the currency's minor unit and the community bucket takes
//! whatever remains, so the buckets always sum exactly to the sale value.

use crate::{Error, Result};
use ledger_core::{config::RevenueConfig, RevenueAllocation};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed-percentage revenue allocator
#[derive(Debug, Clone)]
pub struct RevenueAllocator {
    operations: Decimal,
    verification: Decimal,
    platform: Decimal,
    scale: u32,
}

impl RevenueAllocator {
    /// Build from a revenue split policy
    pub fn from_config(config: &RevenueConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::InvalidPolicy(e.to_string()))?;

        Ok(Self {
            operations: config.operations,
            verification: config.verification,
            platform: config.platform,
            scale: config.minor_unit_scale,
        })
    }

    /// Split `total_value` into bucket amounts
    pub fn allocate(&self, total_value: Decimal) -> Result<RevenueAllocation> {
        if total_value < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "sale value must not be negative, got {}",
                total_value
            )));
        }
        if total_value.is_zero() {
            return Ok(RevenueAllocation::default());
        }

        let operations = self.share(total_value, self.operations)?;
        let verification = self.share(total_value, self.verification)?;
        let platform = self.share(total_value, self.platform)?;
        let community = total_value - operations - verification - platform;

        Ok(RevenueAllocation {
            community,
            operations,
            verification,
            platform,
        })
    }

    fn share(&self, total_value: Decimal, fraction: Decimal) -> Result<Decimal> {
        total_value
            .checked_mul(fraction)
            .map(|amount| amount.round_dp_with_strategy(self.scale, RoundingStrategy::ToZero))
            .ok_or_else(|| Error::InvalidAmount(format!("sale value {} is out of range", total_value)))
    }
}

impl Default for RevenueAllocator {
    fn default() -> Self {
        let config = RevenueConfig::default();
        Self {
            operations: config.operations,
            verification: config.verification,
            platform: config.platform,
            scale: config.minor_unit_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_split() {
        let allocation = RevenueAllocator::default().allocate(dec!(10000)).unwrap();

        assert_eq!(allocation.community, dec!(6000));
        assert_eq!(allocation.operations, dec!(2500));
        assert_eq!(allocation.verification, dec!(1000));
        assert_eq!(allocation.platform, dec!(500));
        assert_eq!(allocation.total(), dec!(10000));
    }

    #[test]
    fn test_remainder_goes_to_community() {
        let allocation = RevenueAllocator::default().allocate(dec!(0.07)).unwrap();

        // 0.0175 → 0.01, 0.007 → 0.00, 0.0035 → 0.00
        assert_eq!(allocation.operations, dec!(0.01));
        assert_eq!(allocation.verification, dec!(0.00));
        assert_eq!(allocation.platform, dec!(0.00));
        assert_eq!(allocation.community, dec!(0.06));
        assert_eq!(allocation.total(), dec!(0.07));
    }

    #[test]
    fn test_zero_and_negative() {
        let allocator = RevenueAllocator::default();
        assert_eq!(
            allocator.allocate(Decimal::ZERO).unwrap(),
            RevenueAllocation::default()
        );
        assert!(matches!(
            allocator.allocate(dec!(-1)).unwrap_err(),
            Error::InvalidAmount(_)
        ));
    }

    #[test]
    fn test_custom_policy() {
        let config = RevenueConfig {
            community: dec!(0.50),
            operations: dec!(0.30),
            verification: dec!(0.15),
            platform: dec!(0.05),
            minor_unit_scale: 0,
        };
        let allocator = RevenueAllocator::from_config(&config).unwrap();
        let allocation = allocator.allocate(dec!(99)).unwrap();

        assert_eq!(allocation.operations, dec!(29));
        assert_eq!(allocation.verification, dec!(14));
        assert_eq!(allocation.platform, dec!(4));
        assert_eq!(allocation.community, dec!(52));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let config = RevenueConfig {
            community: dec!(0.70),
            ..RevenueConfig::default()
        };
        assert!(matches!(
            RevenueAllocator::from_config(&config).unwrap_err(),
            Error::InvalidPolicy(_)
        ));
    }
}
