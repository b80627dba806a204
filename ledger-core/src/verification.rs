//! Project verification state machine
//!
//! ```text
//!   Draft ──submit──► PendingVerification ──approve──► Verified (terminal, credits minted)
//!                        ▲          │
//!                        │        reject
//!                      submit       │
//!                        │          ▼
//!                        └─────── Rejected
//! ```
//!
//! Approval converts verified hectares into credits at a configured rate and
//! mints them into the owner's available balance in the same write
//! transaction that flips the status.

use crate::{
    config::VerificationConfig,
    store::LedgerStore,
    types::{NewProject, Project, ProjectId, ProjectStatus},
    Error, Result,
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

/// Verification step requested on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationAction {
    /// Send for verification
    Submit,
    /// Accept and issue credits
    Approve,
    /// Decline
    Reject,
}

/// Status reached by applying an action, or `InvalidStateTransition`
pub fn next_status(current: ProjectStatus, action: VerificationAction) -> Result<ProjectStatus> {
    use ProjectStatus::*;
    use VerificationAction::*;

    match (current, action) {
        (Draft | Rejected, Submit) => Ok(PendingVerification),
        (PendingVerification, Approve) => Ok(Verified),
        (PendingVerification, Reject) => Ok(Rejected),
        (status, action) => Err(Error::InvalidStateTransition(format!(
            "cannot {:?} a project in status {}",
            action, status
        ))),
    }
}

/// Hectare-to-credit conversion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    credits_per_hectare: Decimal,
}

impl VerificationPolicy {
    /// Create policy (rate must be positive)
    pub fn new(credits_per_hectare: Decimal) -> Result<Self> {
        if credits_per_hectare <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "credits_per_hectare must be positive, got {}",
                credits_per_hectare
            )));
        }
        Ok(Self {
            credits_per_hectare,
        })
    }

    /// Build from configuration
    pub fn from_config(config: &VerificationConfig) -> Result<Self> {
        Self::new(config.credits_per_hectare)
    }

    /// Configured rate
    pub fn credits_per_hectare(&self) -> Decimal {
        self.credits_per_hectare
    }

    /// `round(hectares × rate)`, halves rounded away from zero
    pub fn credits_for(&self, hectares: Decimal) -> Result<u64> {
        if hectares <= Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "hectares must be positive, got {}",
                hectares
            )));
        }

        hectares
            .checked_mul(self.credits_per_hectare)
            .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|c| c.to_u64())
            .ok_or_else(|| Error::InvalidAmount(format!("{} hectares is out of range", hectares)))
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            credits_per_hectare: VerificationConfig::default().credits_per_hectare,
        }
    }
}

/// Entry point for the project lifecycle
#[derive(Debug, Clone)]
pub struct Verifier {
    store: Arc<LedgerStore>,
    policy: VerificationPolicy,
}

impl Verifier {
    /// Create verifier over a store
    pub fn new(store: Arc<LedgerStore>, policy: VerificationPolicy) -> Self {
        Self { store, policy }
    }

    /// Conversion policy in use
    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Create a project in `Draft`
    pub fn register_project(&self, data: NewProject) -> Result<Project> {
        if data.hectares <= Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "hectares must be positive, got {}",
                data.hectares
            )));
        }
        if data.name.trim().is_empty() {
            return Err(Error::Validation("project name must not be empty".to_string()));
        }

        let project = Project::draft(ProjectId::new(), data, Utc::now());
        self.store.transaction(|txn| txn.insert_project(project.clone()))?;

        self.record_transition(ProjectStatus::Draft);
        tracing::info!(project = %project.id, owner = %project.owner, "Registered project");
        Ok(project)
    }

    /// Send a draft or rejected project for verification
    pub fn submit(&self, id: ProjectId) -> Result<Project> {
        let project = self.store.transaction(|txn| {
            let mut project = txn.project(id)?;
            project.status = next_status(project.status, VerificationAction::Submit)?;
            project.rejection_reason = None;
            project.updated_at = Utc::now();
            txn.update_project(project.clone())?;
            Ok::<_, Error>(project)
        })?;

        self.record_transition(project.status);
        tracing::info!(project = %id, "Submitted project for verification");
        Ok(project)
    }

    /// Approve a pending project and mint its credits
    pub fn approve(&self, id: ProjectId, verified_hectares: Decimal) -> Result<Project> {
        let project = self.store.transaction(|txn| {
            let mut project = txn.project(id)?;
            let status = next_status(project.status, VerificationAction::Approve)?;

            if verified_hectares > project.hectares {
                return Err(Error::InvalidAmount(format!(
                    "verified hectares {} exceed declared {}",
                    verified_hectares, project.hectares
                )));
            }

            let credits = self.policy.credits_for(verified_hectares)?;
            if credits == 0 {
                return Err(Error::InvalidAmount(format!(
                    "{} verified hectares yield no credits",
                    verified_hectares
                )));
            }

            project.status = status;
            project.issued_credits = credits;
            project.verified_hectares = Some(verified_hectares);
            project.updated_at = Utc::now();

            txn.mint(&project.owner, credits, Some(project.id))?;
            txn.update_project(project.clone())?;
            Ok::<_, Error>(project)
        })?;

        self.record_transition(project.status);
        tracing::info!(
            project = %id,
            owner = %project.owner,
            credits = project.issued_credits,
            "Approved project and minted credits"
        );
        Ok(project)
    }

    /// Reject a pending project
    pub fn reject(&self, id: ProjectId, reason: impl Into<String>) -> Result<Project> {
        let reason = reason.into();
        let project = self.store.transaction(|txn| {
            let mut project = txn.project(id)?;
            project.status = next_status(project.status, VerificationAction::Reject)?;
            project.rejection_reason = Some(reason.clone());
            project.updated_at = Utc::now();
            txn.update_project(project.clone())?;
            Ok::<_, Error>(project)
        })?;

        self.record_transition(project.status);
        tracing::info!(project = %id, %reason, "Rejected project");
        Ok(project)
    }

    fn record_transition(&self, status: ProjectStatus) {
        if let Some(metrics) = self.store.metrics() {
            metrics.record_transition(status);
        }
    }
}
