//! Dashboard reports
//!
//! Read-only aggregates for the NGO and corporate dashboards. Each report is
//! computed under a single read lock, so it reflects one committed state.

use crate::Result;
use chrono::{DateTime, Utc};
use ledger_core::{
    LedgerState, LedgerStore, OrganizationId, ProjectId, ProjectStatus, RevenueLedger,
    VerificationPolicy,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// NGO dashboard headline figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgoSummary {
    /// NGO
    pub organization_id: OrganizationId,
    /// Projects uploaded
    pub total_projects: usize,
    /// Credits issued across verified projects
    pub verified_credits: u64,
    /// Projects awaiting verification
    pub pending_projects: usize,
    /// Credits expected from pending projects at the current rate
    pub pending_credits: u64,
    /// Gross sale proceeds
    pub total_revenue: Decimal,
    /// Community bucket total
    pub community_revenue: Decimal,
    /// Communities served across all projects
    pub communities_served: u64,
    /// Hectares accepted by verification
    pub hectares_restored: Decimal,
    /// Credits still available for sale
    pub credits_available: u64,
}

/// Corporate credit holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPortfolio {
    /// Organization
    pub organization_id: OrganizationId,
    /// Credits that can be sold or retired
    pub available: u64,
    /// Credits retired
    pub retired: u64,
    /// available + retired
    pub owned: u64,
    /// Credits bought on the marketplace
    pub credits_purchased: u64,
    /// Total paid for purchased credits
    pub total_spent: Decimal,
    /// Price used for valuation
    pub unit_price: Decimal,
    /// Available credits valued at `unit_price`
    pub market_value: Decimal,
}

/// One buyer of a seller's credits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSummary {
    /// Buyer
    pub organization_id: OrganizationId,
    /// Credits bought from the seller
    pub credits_purchased: u64,
    /// Total paid to the seller
    pub total_investment: Decimal,
    /// Number of purchases
    pub purchases: u64,
    /// First purchase
    pub partner_since: DateTime<Utc>,
}

/// Per-project sales figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRevenue {
    /// Project
    pub project_id: ProjectId,
    /// Project name
    pub name: String,
    /// Credits sold
    pub credits_sold: u64,
    /// Gross proceeds
    pub revenue: Decimal,
}

/// Seller revenue breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueOverview {
    /// Bucket totals
    pub ledger: RevenueLedger,
    /// Projects with at least one sale, highest revenue first
    pub projects: Vec<ProjectRevenue>,
}

/// Share of one emission category in the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Category label
    pub category: String,
    /// tCO₂e
    pub emissions: Decimal,
    /// Percent of total emissions
    pub percentage: Decimal,
}

/// Retired credits measured against reported emissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetReport {
    /// Organization
    pub organization_id: OrganizationId,
    /// Year the emissions cover
    pub reporting_year: i32,
    /// Reported tCO₂e
    pub total_emissions: Decimal,
    /// Planned reduction in percent
    pub reduction_target: Decimal,
    /// Emissions once the target is met
    pub target_emissions: Decimal,
    /// Per-category breakdown, largest first
    pub categories: Vec<CategoryShare>,
    /// Credits retired (one tonne each)
    pub credits_retired: u64,
    /// Credits held but not yet retired
    pub credits_available: u64,
    /// Retired credits as a percent of total emissions
    pub coverage_percent: Decimal,
    /// Emissions not yet offset (never negative)
    pub remaining_emissions: Decimal,
}

/// Report builder over a store
#[derive(Debug, Clone)]
pub struct Reports {
    store: Arc<LedgerStore>,
    policy: VerificationPolicy,
}

impl Reports {
    /// Create report builder
    pub fn new(store: Arc<LedgerStore>, policy: VerificationPolicy) -> Self {
        Self { store, policy }
    }

    /// NGO dashboard summary
    pub fn ngo_summary(&self, organization: &OrganizationId) -> NgoSummary {
        self.store.read(|state| {
            let projects = state.projects_owned_by(organization);
            let revenue = state.revenue(organization);

            let mut summary = NgoSummary {
                organization_id: organization.clone(),
                total_projects: projects.len(),
                verified_credits: 0,
                pending_projects: 0,
                pending_credits: 0,
                total_revenue: revenue.gross,
                community_revenue: revenue.totals.community,
                communities_served: 0,
                hectares_restored: Decimal::ZERO,
                credits_available: state.balance(organization).available,
            };

            for project in &projects {
                summary.communities_served = summary
                    .communities_served
                    .saturating_add(u64::from(project.communities));
                match project.status {
                    ProjectStatus::Verified => {
                        summary.verified_credits =
                            summary.verified_credits.saturating_add(project.issued_credits);
                        summary.hectares_restored = summary
                            .hectares_restored
                            .saturating_add(project.verified_hectares.unwrap_or(project.hectares));
                    }
                    ProjectStatus::PendingVerification => {
                        summary.pending_projects += 1;
                        // Estimates beyond u64 pin at the maximum
                        let estimate = self
                            .policy
                            .credits_for(project.hectares)
                            .unwrap_or(u64::MAX);
                        summary.pending_credits = summary.pending_credits.saturating_add(estimate);
                    }
                    ProjectStatus::Draft | ProjectStatus::Rejected => {}
                }
            }

            tracing::debug!(%organization, projects = summary.total_projects, "Built NGO summary");
            summary
        })
    }

    /// Holdings of an organization valued at `unit_price`
    pub fn credit_portfolio(
        &self,
        organization: &OrganizationId,
        unit_price: Decimal,
    ) -> Result<CreditPortfolio> {
        if unit_price < Decimal::ZERO {
            return Err(ledger_core::Error::InvalidAmount(format!(
                "unit price must not be negative, got {}",
                unit_price
            ))
            .into());
        }

        let portfolio = self.store.read(|state| -> ledger_core::Result<CreditPortfolio> {
            let balance = state.balance(organization);
            let (credits_purchased, total_spent) = state
                .transactions_for(organization)
                .filter(|tx| &tx.buyer_id == organization)
                .try_fold((0u64, Decimal::ZERO), |(credits, spent), tx| {
                    Some((
                        credits.checked_add(tx.credit_amount)?,
                        spent.checked_add(tx.total_value())?,
                    ))
                })
                .ok_or_else(|| {
                    ledger_core::Error::InvalidAmount(format!(
                        "purchase totals of {} are out of range",
                        organization
                    ))
                })?;

            let market_value = Decimal::from(balance.available)
                .checked_mul(unit_price)
                .ok_or_else(|| {
                    ledger_core::Error::InvalidAmount(format!(
                        "market value at {} per credit is out of range",
                        unit_price
                    ))
                })?;

            Ok(CreditPortfolio {
                organization_id: organization.clone(),
                available: balance.available,
                retired: balance.retired,
                owned: balance.owned(),
                credits_purchased,
                total_spent,
                unit_price,
                market_value,
            })
        })?;
        Ok(portfolio)
    }

    /// Retired credits against the organization's reported emissions
    pub fn offset_report(&self, organization: &OrganizationId) -> Result<OffsetReport> {
        let report = self.store.read(|state| -> ledger_core::Result<OffsetReport> {
            let profile = state.emissions(organization).ok_or_else(|| {
                ledger_core::Error::NotFound(format!("emissions profile of {}", organization))
            })?;
            let balance = state.balance(organization);
            let total = profile.total_emissions;
            let retired = Decimal::from(balance.retired);

            let mut categories: Vec<CategoryShare> = profile
                .categories
                .iter()
                .map(|entry| CategoryShare {
                    category: entry.category.clone(),
                    emissions: entry.emissions,
                    percentage: percent_of(entry.emissions, total),
                })
                .collect();
            categories.sort_by(|a, b| b.emissions.cmp(&a.emissions));

            Ok(OffsetReport {
                organization_id: organization.clone(),
                reporting_year: profile.reporting_year,
                total_emissions: total,
                reduction_target: profile.reduction_target,
                target_emissions: profile.target_emissions(),
                categories,
                credits_retired: balance.retired,
                credits_available: balance.available,
                coverage_percent: percent_of(retired, total),
                remaining_emissions: total - retired.min(total),
            })
        })?;

        tracing::debug!(%organization, coverage = %report.coverage_percent, "Built offset report");
        Ok(report)
    }

    /// Buyers of a seller's credits, largest investment first
    pub fn corporate_partners(&self, seller: &OrganizationId) -> Vec<PartnerSummary> {
        self.store.read(|state| partners_of(state, seller))
    }

    /// Revenue totals of a seller
    pub fn revenue_overview(&self, seller: &OrganizationId) -> RevenueOverview {
        self.store.read(|state| {
            let mut projects: Vec<ProjectRevenue> = state
                .projects_owned_by(seller)
                .into_iter()
                .filter(|p| p.credits_sold > 0)
                .map(|p| ProjectRevenue {
                    project_id: p.id,
                    name: p.name,
                    credits_sold: p.credits_sold,
                    revenue: p.revenue,
                })
                .collect();
            projects.sort_by(|a, b| b.revenue.cmp(&a.revenue));

            RevenueOverview {
                ledger: state.revenue(seller),
                projects,
            }
        })
    }
}

/// `part / whole` in percent at two decimal places, saturating at `Decimal::MAX`
fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::MAX)
}

fn partners_of(state: &LedgerState, seller: &OrganizationId) -> Vec<PartnerSummary> {
    let mut partners: HashMap<&OrganizationId, PartnerSummary> = HashMap::new();

    for tx in state.transactions().iter().filter(|tx| &tx.seller_id == seller) {
        let entry = partners.entry(&tx.buyer_id).or_insert_with(|| PartnerSummary {
            organization_id: tx.buyer_id.clone(),
            credits_purchased: 0,
            total_investment: Decimal::ZERO,
            purchases: 0,
            partner_since: tx.timestamp,
        });
        entry.credits_purchased = entry.credits_purchased.saturating_add(tx.credit_amount);
        entry.total_investment = entry.total_investment.saturating_add(tx.total_value());
        entry.purchases = entry.purchases.saturating_add(1);
        entry.partner_since = entry.partner_since.min(tx.timestamp);
    }

    let mut partners: Vec<PartnerSummary> = partners.into_values().collect();
    partners.sort_by(|a, b| {
        b.total_investment
            .cmp(&a.total_investment)
            .then_with(|| a.organization_id.cmp(&b.organization_id))
    });
    partners
}
