//! Credit service facade
//!
//! Wires the ledger store, verifier, marketplace and reports together from
//! one [`Config`] and exposes every operation the API serves. Failed calls
//! are counted by error kind before being returned.

use crate::{Error, Result};
use ledger_core::{
    Config, CreditBalance, EmissionsProfile, EmissionsReport, LedgerStore, Metrics, NewProject,
    OrganizationId, Project, ProjectId, Transaction, VerificationPolicy, Verifier,
};
use marketplace::{
    CreditPortfolio, Marketplace, NgoSummary, OffsetReport, PartnerSummary, Reports,
    RevenueAllocator, RevenueOverview,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Credit purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Corporate buyer
    pub buyer_id: OrganizationId,
    /// Selling NGO
    pub seller_id: OrganizationId,
    /// Project the credits come from
    pub project_id: ProjectId,
    /// Credits to buy
    pub credit_amount: u64,
    /// Price per credit
    pub unit_price: Decimal,
}

/// All credit operations over one ledger
#[derive(Debug)]
pub struct CreditService {
    store: Arc<LedgerStore>,
    verifier: Verifier,
    marketplace: Marketplace,
    reports: Reports,
}

impl CreditService {
    /// Build the service graph from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let metrics = Metrics::new()
            .map_err(|e| ledger_core::Error::Metrics(format!("Failed to register metrics: {}", e)))?;
        let store = Arc::new(LedgerStore::new().with_metrics(metrics));
        let policy = VerificationPolicy::from_config(&config.verification)?;
        let allocator = RevenueAllocator::from_config(&config.revenue)?;

        Ok(Self::new(store, policy, allocator))
    }

    /// Build the service graph over an existing store
    pub fn new(
        store: Arc<LedgerStore>,
        policy: VerificationPolicy,
        allocator: RevenueAllocator,
    ) -> Self {
        Self {
            verifier: Verifier::new(store.clone(), policy),
            marketplace: Marketplace::new(store.clone(), allocator),
            reports: Reports::new(store.clone(), policy),
            store,
        }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    /// Upload a project in `Draft`
    pub fn register_project(&self, data: NewProject) -> Result<Project> {
        self.observe(self.verifier.register_project(data).map_err(Error::from))
    }

    /// Send a project for verification
    pub fn submit_project(&self, id: ProjectId) -> Result<Project> {
        self.observe(self.verifier.submit(id).map_err(Error::from))
    }

    /// Approve a project and issue its credits
    pub fn approve_project(&self, id: ProjectId, verified_hectares: Decimal) -> Result<Project> {
        self.observe(self.verifier.approve(id, verified_hectares).map_err(Error::from))
    }

    /// Reject a project
    pub fn reject_project(&self, id: ProjectId, reason: String) -> Result<Project> {
        self.observe(self.verifier.reject(id, reason).map_err(Error::from))
    }

    /// Project by ID
    pub fn get_project(&self, id: ProjectId) -> Result<Project> {
        self.store.project(id).map_err(Error::from)
    }

    /// Projects owned by an organization
    pub fn list_projects(&self, owner: &OrganizationId) -> Vec<Project> {
        self.store.projects_owned_by(owner)
    }

    /// Credit balance (zero for unknown organizations)
    pub fn get_balance(&self, organization: &OrganizationId) -> CreditBalance {
        self.store.get_balance(organization)
    }

    /// Purchases where the organization was buyer or seller, oldest first
    pub fn get_transaction_history(&self, organization: &OrganizationId) -> Vec<Transaction> {
        self.store.transactions_for(organization)
    }

    /// Buy credits from an NGO
    pub fn purchase_credits(&self, request: PurchaseRequest) -> Result<Transaction> {
        self.observe(
            self.marketplace
                .purchase(
                    &request.buyer_id,
                    &request.seller_id,
                    request.project_id,
                    request.credit_amount,
                    request.unit_price,
                )
                .map_err(Error::from),
        )
    }

    /// Retire available credits
    pub fn retire_credits(&self, organization: &OrganizationId, amount: u64) -> Result<CreditBalance> {
        self.observe(self.store.retire(organization, amount).map_err(Error::from))
    }

    /// Replace an organization's emissions profile
    pub fn record_emissions(
        &self,
        organization: &OrganizationId,
        report: EmissionsReport,
    ) -> Result<EmissionsProfile> {
        self.observe(
            self.store
                .record_emissions(organization, report)
                .map_err(Error::from),
        )
    }

    /// Emissions profile of an organization
    pub fn get_emissions(&self, organization: &OrganizationId) -> Result<EmissionsProfile> {
        self.store.emissions(organization).map_err(Error::from)
    }

    /// Retired credits against reported emissions
    pub fn offset_report(&self, organization: &OrganizationId) -> Result<OffsetReport> {
        self.reports.offset_report(organization).map_err(Error::from)
    }

    /// NGO dashboard summary
    pub fn ngo_summary(&self, organization: &OrganizationId) -> NgoSummary {
        self.reports.ngo_summary(organization)
    }

    /// Holdings valued at `unit_price`, or at the last price the organization paid
    pub fn credit_portfolio(
        &self,
        organization: &OrganizationId,
        unit_price: Option<Decimal>,
    ) -> Result<CreditPortfolio> {
        let unit_price = match unit_price {
            Some(price) => price,
            None => self.last_purchase_price(organization),
        };
        self.observe(
            self.reports
                .credit_portfolio(organization, unit_price)
                .map_err(Error::from),
        )
    }

    /// Buyers of a seller's credits
    pub fn corporate_partners(&self, seller: &OrganizationId) -> Vec<PartnerSummary> {
        self.reports.corporate_partners(seller)
    }

    /// Seller revenue breakdown
    pub fn revenue_overview(&self, seller: &OrganizationId) -> RevenueOverview {
        self.reports.revenue_overview(seller)
    }

    /// Prometheus text exposition
    pub fn export_metrics(&self) -> Result<String> {
        match self.store.metrics() {
            Some(metrics) => Ok(metrics.export()?),
            None => Ok(String::new()),
        }
    }

    fn last_purchase_price(&self, organization: &OrganizationId) -> Decimal {
        self.store.read(|state| {
            state
                .transactions_for(organization)
                .filter(|tx| &tx.buyer_id == organization)
                .last()
                .map(|tx| tx.unit_price)
                .unwrap_or(Decimal::ZERO)
        })
    }

    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let (Err(err), Some(metrics)) = (&result, self.store.metrics()) {
            metrics.record_rejection(err.kind());
        }
        result
    }
}
