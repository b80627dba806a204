//! In-memory ledger store
//!
//! Holds projects, credit balances, the transaction log, per-seller revenue
//! and the credit movement audit log behind a single `RwLock`.
//!
//! # Write path
//!
//! Every mutation runs through [`LedgerStore::transaction`]:
//!
//! ```text
//! write lock ──► LedgerTxn (reads committed state, stages changes)
//!                    │
//!          closure returns Ok?
//!            │ yes             │ no
//!            ▼                 ▼
//!      apply staged       drop staged
//!      changes            changes
//! ```
//!
//! Checks and debits happen inside one critical section, so two purchases
//! against the same seller can never both pass against a stale balance.
//! Readers take the read lock and only ever see committed state.

use crate::{
    emissions::{EmissionsProfile, EmissionsReport},
    metrics::Metrics,
    types::{
        CreditBalance, CreditEvent, CreditMovement, OrganizationId, Project, ProjectId,
        RevenueAllocation, RevenueLedger, Transaction, TransactionId,
    },
    Error, Result,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Committed ledger state
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    projects: HashMap<ProjectId, Project>,
    balances: HashMap<OrganizationId, CreditBalance>,
    transactions: Vec<Transaction>,
    transaction_index: HashMap<TransactionId, usize>,
    revenue: HashMap<OrganizationId, RevenueLedger>,
    emissions: HashMap<OrganizationId, EmissionsProfile>,
    events: Vec<CreditEvent>,
    total_minted: u64,
}

impl LedgerState {
    /// Balance of an organization (zero record if unknown)
    pub fn balance(&self, organization: &OrganizationId) -> CreditBalance {
        self.balances
            .get(organization)
            .cloned()
            .unwrap_or_else(|| CreditBalance::empty(organization.clone()))
    }

    /// All balances
    pub fn balances(&self) -> impl Iterator<Item = &CreditBalance> {
        self.balances.values()
    }

    /// Project by ID
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(&id)
    }

    /// All projects
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Projects owned by an organization, oldest first
    pub fn projects_owned_by(&self, owner: &OrganizationId) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| &p.owner == owner)
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.created_at, p.id));
        projects
    }

    /// Full transaction log in commit order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transaction by ID
    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transaction_index
            .get(&id)
            .map(|&position| &self.transactions[position])
    }

    /// Transactions where the organization is buyer or seller
    pub fn transactions_for<'a>(
        &'a self,
        organization: &'a OrganizationId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |tx| tx.involves(organization))
    }

    /// Revenue ledger of a seller (empty if unknown)
    pub fn revenue(&self, organization: &OrganizationId) -> RevenueLedger {
        self.revenue
            .get(organization)
            .cloned()
            .unwrap_or_else(|| RevenueLedger::empty(organization.clone()))
    }

    /// Emissions profile of an organization, if one was reported
    pub fn emissions(&self, organization: &OrganizationId) -> Option<&EmissionsProfile> {
        self.emissions.get(organization)
    }

    /// Credit movement audit log
    pub fn events(&self) -> &[CreditEvent] {
        &self.events
    }

    /// Sum of every mint ever applied
    pub fn total_minted(&self) -> u64 {
        self.total_minted
    }

    /// Check credit conservation
    ///
    /// Purchases only move credits between organizations, so the sum of
    /// `available + retired` over all organizations must equal everything
    /// ever minted, and no organization may own more than it received.
    pub fn check_conservation(&self) -> Result<()> {
        let mut owned: u128 = 0;

        for balance in self.balances.values() {
            if balance.owned() > balance.received {
                return Err(Error::InvariantViolation(format!(
                    "{} owns {} credits but only received {}",
                    balance.organization_id,
                    balance.owned(),
                    balance.received
                )));
            }
            owned += u128::from(balance.available) + u128::from(balance.retired);
        }

        if owned != u128::from(self.total_minted) {
            return Err(Error::InvariantViolation(format!(
                "Credits owned {} != credits minted {}",
                owned, self.total_minted
            )));
        }

        if let Some(project) = self.projects.values().find(|p| !p.is_consistent()) {
            return Err(Error::InvariantViolation(format!(
                "Project {} has {} issued credits in status {}",
                project.id, project.issued_credits, project.status
            )));
        }

        Ok(())
    }

    fn apply(&mut self, changes: StagedChanges) {
        let now = Utc::now();

        self.balances.extend(changes.balances);
        self.projects.extend(changes.projects);
        self.revenue.extend(changes.revenue);
        self.emissions.extend(changes.emissions);
        self.total_minted += changes.minted;

        for tx in changes.transactions {
            self.transaction_index.insert(tx.id, self.transactions.len());
            self.transactions.push(tx);
        }

        for movement in changes.movements {
            let sequence = self.events.len() as u64;
            self.events.push(CreditEvent {
                sequence,
                timestamp: now,
                movement,
            });
        }
    }
}

/// Changes staged by a write transaction
#[derive(Debug, Default)]
struct StagedChanges {
    balances: HashMap<OrganizationId, CreditBalance>,
    projects: HashMap<ProjectId, Project>,
    revenue: HashMap<OrganizationId, RevenueLedger>,
    emissions: HashMap<OrganizationId, EmissionsProfile>,
    transactions: Vec<Transaction>,
    movements: Vec<CreditMovement>,
    minted: u64,
}

/// Write transaction over the ledger
///
/// Reads see committed state overlaid with this transaction's own staged
/// writes. Each operation validates before staging anything, and nothing
/// reaches the store unless the enclosing closure returns `Ok`.
#[derive(Debug)]
pub struct LedgerTxn<'a> {
    base: &'a LedgerState,
    staged: StagedChanges,
}

impl<'a> LedgerTxn<'a> {
    fn new(base: &'a LedgerState) -> Self {
        Self {
            base,
            staged: StagedChanges::default(),
        }
    }

    /// Current balance of an organization
    pub fn balance(&self, organization: &OrganizationId) -> CreditBalance {
        self.staged
            .balances
            .get(organization)
            .cloned()
            .unwrap_or_else(|| self.base.balance(organization))
    }

    /// Issue new credits into an organization's available balance
    pub fn mint(
        &mut self,
        organization: &OrganizationId,
        amount: u64,
        project: Option<ProjectId>,
    ) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "Mint amount must be positive".to_string(),
            ));
        }

        let mut balance = self.balance(organization);
        balance.available = checked_add(balance.available, amount, "available")?;
        balance.received = checked_add(balance.received, amount, "received")?;
        let staged_minted = checked_add(self.staged.minted, amount, "minted")?;
        checked_add(self.base.total_minted, staged_minted, "minted")?;

        self.staged.minted = staged_minted;
        self.staged.balances.insert(organization.clone(), balance);
        self.staged.movements.push(CreditMovement::Minted {
            organization: organization.clone(),
            project,
            amount,
        });
        Ok(())
    }

    /// Move available credits from one organization to another
    pub fn transfer_available(
        &mut self,
        from: &OrganizationId,
        to: &OrganizationId,
        amount: u64,
        reference: Option<TransactionId>,
    ) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "Transfer amount must be positive".to_string(),
            ));
        }
        if from == to {
            return Err(Error::InvalidAmount(format!(
                "Cannot transfer credits from {} to itself",
                from
            )));
        }

        let mut source = self.balance(from);
        if source.available < amount {
            return Err(Error::InsufficientBalance {
                organization: from.clone(),
                available: source.available,
                requested: amount,
            });
        }

        let mut target = self.balance(to);
        target.available = checked_add(target.available, amount, "available")?;
        target.received = checked_add(target.received, amount, "received")?;
        source.available -= amount;

        self.staged.balances.insert(from.clone(), source);
        self.staged.balances.insert(to.clone(), target);
        self.staged.movements.push(CreditMovement::Transferred {
            from: from.clone(),
            to: to.clone(),
            amount,
            transaction: reference,
        });
        Ok(())
    }

    /// Move credits from available to retired
    pub fn retire(&mut self, organization: &OrganizationId, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "Retirement amount must be positive".to_string(),
            ));
        }

        let mut balance = self.balance(organization);
        if balance.available < amount {
            return Err(Error::InsufficientBalance {
                organization: organization.clone(),
                available: balance.available,
                requested: amount,
            });
        }

        balance.available -= amount;
        balance.retired += amount;

        self.staged.balances.insert(organization.clone(), balance);
        self.staged.movements.push(CreditMovement::Retired {
            organization: organization.clone(),
            amount,
        });
        Ok(())
    }

    /// Append a transaction to the log
    pub fn record_transaction(&mut self, tx: Transaction) -> Result<()> {
        let duplicate = self.base.transaction_index.contains_key(&tx.id)
            || self.staged.transactions.iter().any(|t| t.id == tx.id);
        if duplicate {
            return Err(Error::DuplicateId(format!("transaction {}", tx.id)));
        }

        self.staged.transactions.push(tx);
        Ok(())
    }

    /// Project by ID (staged version if modified in this transaction)
    pub fn project(&self, id: ProjectId) -> Result<Project> {
        self.staged
            .projects
            .get(&id)
            .or_else(|| self.base.project(id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }

    /// Insert a project that does not exist yet
    pub fn insert_project(&mut self, project: Project) -> Result<()> {
        if self.base.projects.contains_key(&project.id)
            || self.staged.projects.contains_key(&project.id)
        {
            return Err(Error::DuplicateId(format!("project {}", project.id)));
        }

        self.staged.projects.insert(project.id, project);
        Ok(())
    }

    /// Replace an existing project
    pub fn update_project(&mut self, project: Project) -> Result<()> {
        // Existence check
        self.project(project.id)?;
        self.staged.projects.insert(project.id, project);
        Ok(())
    }

    /// Revenue ledger of a seller
    pub fn revenue(&self, seller: &OrganizationId) -> RevenueLedger {
        self.staged
            .revenue
            .get(seller)
            .cloned()
            .unwrap_or_else(|| self.base.revenue(seller))
    }

    /// Add a sale's allocation to a seller's revenue ledger
    pub fn credit_revenue(
        &mut self,
        seller: &OrganizationId,
        allocation: &RevenueAllocation,
    ) -> Result<()> {
        let mut ledger = self.revenue(seller);
        ledger.record(allocation)?;
        self.staged.revenue.insert(seller.clone(), ledger);
        Ok(())
    }

    /// Replace an organization's emissions profile
    pub fn put_emissions(&mut self, profile: EmissionsProfile) {
        self.staged
            .emissions
            .insert(profile.organization_id.clone(), profile);
    }
}

fn checked_add(current: u64, amount: u64, field: &str) -> Result<u64> {
    current.checked_add(amount).ok_or_else(|| {
        Error::InvariantViolation(format!("{} credits overflow ({} + {})", field, current, amount))
    })
}

/// Shared ledger store
///
/// Passed to services as `Arc<LedgerStore>`; there is no global instance.
pub struct LedgerStore {
    state: RwLock<LedgerState>,
    metrics: Option<Metrics>,
}

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Metrics collector, if attached
    pub fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Run a write transaction
    ///
    /// The closure's staged changes are applied atomically if it returns
    /// `Ok`, and discarded otherwise.
    pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut LedgerTxn<'_>) -> std::result::Result<T, E>,
    {
        let mut state = self.state.write();

        let (output, changes) = {
            let mut txn = LedgerTxn::new(&state);
            let output = f(&mut txn)?;
            (output, txn.staged)
        };

        if let Some(metrics) = &self.metrics {
            for movement in &changes.movements {
                match movement {
                    CreditMovement::Minted { amount, .. } => metrics.credits_minted.inc_by(*amount),
                    CreditMovement::Transferred { amount, .. } => {
                        metrics.credits_transferred.inc_by(*amount)
                    }
                    CreditMovement::Retired { amount, .. } => metrics.credits_retired.inc_by(*amount),
                }
            }
        }

        state.apply(changes);
        Ok(output)
    }

    /// Run a read-only closure against committed state
    pub fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> T {
        f(&self.state.read())
    }

    /// Clone of the committed state
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    /// Issue new credits to an organization
    pub fn mint(&self, organization: &OrganizationId, amount: u64) -> Result<CreditBalance> {
        let balance = self.transaction(|txn| {
            txn.mint(organization, amount, None)?;
            Ok::<_, Error>(txn.balance(organization))
        })?;
        tracing::info!(%organization, amount, "Minted credits");
        Ok(balance)
    }

    /// Move available credits between organizations
    pub fn transfer_available(
        &self,
        from: &OrganizationId,
        to: &OrganizationId,
        amount: u64,
    ) -> Result<()> {
        self.transaction(|txn| txn.transfer_available(from, to, amount, None))?;
        tracing::info!(%from, %to, amount, "Transferred credits");
        Ok(())
    }

    /// Retire available credits
    pub fn retire(&self, organization: &OrganizationId, amount: u64) -> Result<CreditBalance> {
        let balance = self.transaction(|txn| {
            txn.retire(organization, amount)?;
            Ok::<_, Error>(txn.balance(organization))
        })?;
        tracing::info!(%organization, amount, "Retired credits");
        Ok(balance)
    }

    /// Append a transaction to the immutable log
    pub fn record_transaction(&self, tx: Transaction) -> Result<()> {
        self.transaction(|txn| txn.record_transaction(tx))
    }

    /// Balance of an organization (never fails)
    pub fn get_balance(&self, organization: &OrganizationId) -> CreditBalance {
        self.read(|state| state.balance(organization))
    }

    /// Transactions involving an organization, oldest first
    pub fn transactions_for(&self, organization: &OrganizationId) -> Vec<Transaction> {
        self.read(|state| state.transactions_for(organization).cloned().collect())
    }

    /// Project by ID
    pub fn project(&self, id: ProjectId) -> Result<Project> {
        self.read(|state| state.project(id).cloned())
            .ok_or_else(|| Error::NotFound(format!("project {}", id)))
    }

    /// Projects owned by an organization
    pub fn projects_owned_by(&self, owner: &OrganizationId) -> Vec<Project> {
        self.read(|state| state.projects_owned_by(owner))
    }

    /// Revenue ledger of a seller
    pub fn revenue(&self, organization: &OrganizationId) -> RevenueLedger {
        self.read(|state| state.revenue(organization))
    }

    /// Validate and store an organization's emissions report
    pub fn record_emissions(
        &self,
        organization: &OrganizationId,
        report: EmissionsReport,
    ) -> Result<EmissionsProfile> {
        let profile = EmissionsProfile::from_report(organization.clone(), report, Utc::now())?;
        self.transaction(|txn| {
            txn.put_emissions(profile.clone());
            Ok::<_, Error>(())
        })?;
        tracing::info!(
            %organization,
            year = profile.reporting_year,
            total = %profile.total_emissions,
            "Recorded emissions profile"
        );
        Ok(profile)
    }

    /// Emissions profile of an organization
    pub fn emissions(&self, organization: &OrganizationId) -> Result<EmissionsProfile> {
        self.read(|state| state.emissions(organization).cloned())
            .ok_or_else(|| Error::NotFound(format!("emissions profile of {}", organization)))
    }

    /// Credit movement audit log
    pub fn events(&self) -> Vec<CreditEvent> {
        self.read(|state| state.events().to_vec())
    }

    /// Check credit conservation over committed state
    pub fn check_conservation(&self) -> Result<()> {
        self.read(LedgerState::check_conservation)
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerStore")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewProject, ProjectStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn org(id: &str) -> OrganizationId {
        OrganizationId::new(id)
    }

    fn sample_transaction(id: TransactionId) -> Transaction {
        Transaction {
            id,
            project_id: ProjectId::new(),
            buyer_id: org("corp-b"),
            seller_id: org("ngo-a"),
            credit_amount: 500,
            unit_price: dec!(20),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_mint_increases_available() {
        let store = LedgerStore::new();
        let balance = store.mint(&org("ngo-a"), 2400).unwrap();

        assert_eq!(balance.available, 2400);
        assert_eq!(balance.received, 2400);
        assert_eq!(store.get_balance(&org("ngo-a")).available, 2400);
        assert_eq!(store.read(|s| s.total_minted()), 2400);
    }

    #[test]
    fn test_mint_rejects_zero() {
        let store = LedgerStore::new();
        let err = store.mint(&org("ngo-a"), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_unknown_organization_has_zero_balance() {
        let store = LedgerStore::new();
        let balance = store.get_balance(&org("nobody"));
        assert_eq!(balance, CreditBalance::empty(org("nobody")));
    }

    #[test]
    fn test_transfer_moves_available() {
        let store = LedgerStore::new();
        store.mint(&org("ngo-a"), 2400).unwrap();
        store
            .transfer_available(&org("ngo-a"), &org("corp-b"), 500)
            .unwrap();

        assert_eq!(store.get_balance(&org("ngo-a")).available, 1900);
        let buyer = store.get_balance(&org("corp-b"));
        assert_eq!(buyer.available, 500);
        assert_eq!(buyer.received, 500);
        store.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_insufficient_balance_changes_nothing() {
        let store = LedgerStore::new();
        store.mint(&org("ngo-a"), 500).unwrap();

        let err = store
            .transfer_available(&org("ngo-a"), &org("corp-b"), 600)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientBalance {
                available: 500,
                requested: 600,
                ..
            }
        ));
        assert_eq!(store.get_balance(&org("ngo-a")).available, 500);
        assert_eq!(store.get_balance(&org("corp-b")).available, 0);
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let store = LedgerStore::new();
        store.mint(&org("ngo-a"), 100).unwrap();
        let err = store
            .transfer_available(&org("ngo-a"), &org("ngo-a"), 10)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
    }

    #[test]
    fn test_retire_moves_to_retired() {
        let store = LedgerStore::new();
        store.mint(&org("corp-b"), 2400).unwrap();
        let balance = store.retire(&org("corp-b"), 300).unwrap();

        assert_eq!(balance.available, 2100);
        assert_eq!(balance.retired, 300);
        assert_eq!(balance.owned(), 2400);
        store.check_conservation().unwrap();
    }

    #[test]
    fn test_retire_insufficient_and_zero() {
        let store = LedgerStore::new();
        store.mint(&org("corp-b"), 100).unwrap();

        assert!(matches!(
            store.retire(&org("corp-b"), 101).unwrap_err(),
            Error::InsufficientBalance { .. }
        ));
        assert!(matches!(
            store.retire(&org("corp-b"), 0).unwrap_err(),
            Error::InvalidAmount(_)
        ));
        assert_eq!(store.get_balance(&org("corp-b")).retired, 0);
    }

    #[test]
    fn test_record_transaction_duplicate_id() {
        let store = LedgerStore::new();
        let id = TransactionId::new();

        store.record_transaction(sample_transaction(id)).unwrap();
        let err = store.record_transaction(sample_transaction(id)).unwrap_err();

        assert!(matches!(err, Error::DuplicateId(_)));
        assert_eq!(store.read(|s| s.transactions().len()), 1);
        assert!(store.read(|s| s.transaction(id).is_some()));
    }

    #[test]
    fn test_failed_transaction_discards_all_staged_changes() {
        let store = LedgerStore::new();
        store.mint(&org("ngo-a"), 1000).unwrap();

        let result: Result<()> = store.transaction(|txn| {
            txn.mint(&org("ngo-a"), 50, None)?;
            txn.transfer_available(&org("ngo-a"), &org("corp-b"), 400, None)?;
            // Fails after two successful staged operations
            txn.retire(&org("corp-b"), 401)
        });

        assert!(result.is_err());
        assert_eq!(store.get_balance(&org("ngo-a")).available, 1000);
        assert_eq!(store.get_balance(&org("corp-b")).available, 0);
        assert_eq!(store.read(|s| s.total_minted()), 1000);
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_staged_reads_see_own_writes() {
        let store = LedgerStore::new();

        store
            .transaction(|txn| {
                txn.mint(&org("ngo-a"), 100, None)?;
                assert_eq!(txn.balance(&org("ngo-a")).available, 100);
                txn.transfer_available(&org("ngo-a"), &org("corp-b"), 100, None)?;
                txn.retire(&org("corp-b"), 40)
            })
            .unwrap();

        let buyer = store.get_balance(&org("corp-b"));
        assert_eq!((buyer.available, buyer.retired), (60, 40));
        store.check_conservation().unwrap();
    }

    #[test]
    fn test_event_log_sequence() {
        let store = LedgerStore::new();
        store.mint(&org("ngo-a"), 100).unwrap();
        store
            .transfer_available(&org("ngo-a"), &org("corp-b"), 30)
            .unwrap();
        store.retire(&org("corp-b"), 10).unwrap();

        let events = store.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.iter().map(|e| e.sequence).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(matches!(events[2].movement, CreditMovement::Retired { amount: 10, .. }));
    }

    #[test]
    fn test_project_insert_and_update() {
        let store = LedgerStore::new();
        let data = NewProject {
            owner: org("ngo-a"),
            name: "Seagrass Conservation - Gulf of Mannar".to_string(),
            location: "Tamil Nadu, India".to_string(),
            hectares: dec!(85),
            upload_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            communities: 5,
        };
        let project = Project::draft(ProjectId::new(), data, Utc::now());
        let id = project.id;

        store
            .transaction(|txn| txn.insert_project(project.clone()))
            .unwrap();
        let err = store
            .transaction(|txn| txn.insert_project(project.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));

        let mut updated = store.project(id).unwrap();
        updated.status = ProjectStatus::PendingVerification;
        store
            .transaction(|txn| txn.update_project(updated))
            .unwrap();

        assert_eq!(
            store.project(id).unwrap().status,
            ProjectStatus::PendingVerification
        );
        assert_eq!(store.projects_owned_by(&org("ngo-a")).len(), 1);
        assert!(matches!(
            store.project(ProjectId::new()).unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_emissions_profile_replaced_on_report() {
        use crate::emissions::EmissionCategory;

        let store = LedgerStore::new();
        assert!(matches!(
            store.emissions(&org("corp-b")).unwrap_err(),
            Error::NotFound(_)
        ));

        let report = |year, emissions| EmissionsReport {
            reporting_year: year,
            categories: vec![EmissionCategory {
                category: "Energy".to_string(),
                emissions,
            }],
            reduction_target: dec!(25),
        };
        store.record_emissions(&org("corp-b"), report(2023, dec!(3200))).unwrap();
        store.record_emissions(&org("corp-b"), report(2024, dec!(2900))).unwrap();

        let profile = store.emissions(&org("corp-b")).unwrap();
        assert_eq!(profile.reporting_year, 2024);
        assert_eq!(profile.total_emissions, dec!(2900));

        assert!(store
            .record_emissions(&org("corp-b"), report(2025, dec!(-1)))
            .is_err());
        assert_eq!(store.emissions(&org("corp-b")).unwrap().reporting_year, 2024);
    }

    #[test]
    fn test_metrics_follow_committed_movements() {
        let store = LedgerStore::new().with_metrics(Metrics::new().unwrap());
        store.mint(&org("ngo-a"), 100).unwrap();
        let _ = store.retire(&org("ngo-a"), 500);
        store.retire(&org("ngo-a"), 25).unwrap();

        let metrics = store.metrics().unwrap();
        assert_eq!(metrics.credits_minted.get(), 100);
        assert_eq!(metrics.credits_retired.get(), 25);
    }
}
