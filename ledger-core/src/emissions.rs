//! Corporate emissions profiles
//!
//! A corporate organization reports its annual emissions (tCO₂e) broken down
//! by category, together with a percentage reduction target. Retired credits
//! are counted against the reported total, one credit per tonne.

use crate::{types::OrganizationId, Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Emissions of one category (e.g. transportation, energy)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionCategory {
    /// Category label
    pub category: String,
    /// tCO₂e
    pub emissions: Decimal,
}

/// Emissions figures submitted by an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsReport {
    /// Year the figures cover
    pub reporting_year: i32,
    /// Per-category emissions
    pub categories: Vec<EmissionCategory>,
    /// Planned reduction, in percent of the total
    pub reduction_target: Decimal,
}

/// Validated emissions profile held by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsProfile {
    /// Reporting organization
    pub organization_id: OrganizationId,
    /// Year the figures cover
    pub reporting_year: i32,
    /// Per-category emissions, in reported order
    pub categories: Vec<EmissionCategory>,
    /// Sum over categories
    pub total_emissions: Decimal,
    /// Planned reduction, in percent of the total
    pub reduction_target: Decimal,
    /// Last time the profile was reported
    pub updated_at: DateTime<Utc>,
}

impl EmissionsProfile {
    /// Validate a report and total its categories
    pub fn from_report(
        organization_id: OrganizationId,
        report: EmissionsReport,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if report.categories.is_empty() {
            return Err(Error::Validation(
                "emissions report has no categories".to_string(),
            ));
        }
        if report.reduction_target < Decimal::ZERO || report.reduction_target > Decimal::ONE_HUNDRED
        {
            return Err(Error::InvalidAmount(format!(
                "reduction target must be between 0 and 100 percent, got {}",
                report.reduction_target
            )));
        }

        let mut seen = HashSet::new();
        let mut total = Decimal::ZERO;
        for entry in &report.categories {
            let label = entry.category.trim();
            if label.is_empty() {
                return Err(Error::Validation("emission category is empty".to_string()));
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(Error::Validation(format!(
                    "emission category {} reported twice",
                    label
                )));
            }
            if entry.emissions < Decimal::ZERO {
                return Err(Error::InvalidAmount(format!(
                    "emissions of {} must not be negative, got {}",
                    label, entry.emissions
                )));
            }
            total = total.checked_add(entry.emissions).ok_or_else(|| {
                Error::InvalidAmount("total emissions are out of range".to_string())
            })?;
        }

        if total.is_zero() {
            return Err(Error::InvalidAmount(
                "total emissions must be positive".to_string(),
            ));
        }

        Ok(Self {
            organization_id,
            reporting_year: report.reporting_year,
            categories: report.categories,
            total_emissions: total,
            reduction_target: report.reduction_target,
            updated_at: now,
        })
    }

    /// Emissions left once the reduction target is met
    pub fn target_emissions(&self) -> Decimal {
        let remaining_share = (Decimal::ONE_HUNDRED - self.reduction_target) / Decimal::ONE_HUNDRED;
        self.total_emissions * remaining_share
    }
}
