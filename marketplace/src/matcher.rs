//! Credit purchase matching
//!
//! A purchase moves credits from the seller's available pool to the buyer,
//! splits the sale value into revenue buckets and appends a transaction.
//! Validation that does not depend on ledger state happens up front; the
//! balance check, debit, revenue posting and log append share a single
//! write transaction.

use crate::{allocator::RevenueAllocator, Error, Result};
use chrono::Utc;
use ledger_core::{
    LedgerStore, LedgerTxn, OrganizationId, Project, ProjectId, ProjectStatus, Transaction,
    TransactionId,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Marketplace matcher
#[derive(Debug, Clone)]
pub struct Marketplace {
    store: Arc<LedgerStore>,
    allocator: RevenueAllocator,
}

impl Marketplace {
    /// Create matcher over a store
    pub fn new(store: Arc<LedgerStore>, allocator: RevenueAllocator) -> Self {
        Self { store, allocator }
    }

    /// Revenue allocator in use
    pub fn allocator(&self) -> &RevenueAllocator {
        &self.allocator
    }

    /// Buy `amount` credits of `project_id` from `seller` at `unit_price`
    pub fn purchase(
        &self,
        buyer: &OrganizationId,
        seller: &OrganizationId,
        project_id: ProjectId,
        amount: u64,
        unit_price: Decimal,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(ledger_core::Error::InvalidAmount(
                "Purchase amount must be positive".to_string(),
            )
            .into());
        }
        if unit_price <= Decimal::ZERO {
            return Err(ledger_core::Error::InvalidAmount(format!(
                "Unit price must be positive, got {}",
                unit_price
            ))
            .into());
        }
        if buyer == seller {
            return Err(ledger_core::Error::InvalidAmount(format!(
                "{} cannot buy its own credits",
                buyer
            ))
            .into());
        }

        let total_value = Decimal::from(amount)
            .checked_mul(unit_price)
            .ok_or_else(|| Error::InvalidAmount("Purchase value is out of range".to_string()))?;
        let allocation = self.allocator.allocate(total_value)?;

        let result: ledger_core::Result<Transaction> = self.store.transaction(|txn| {
            let mut project = txn.project(project_id)?;
            if &project.owner != seller {
                return Err(ledger_core::Error::NotFound(format!(
                    "project {} of {}",
                    project_id, seller
                )));
            }
            if project.status != ProjectStatus::Verified {
                return Err(ledger_core::Error::InvalidStateTransition(format!(
                    "project {} is {} and cannot be sold",
                    project_id, project.status
                )));
            }

            // Running totals that cannot absorb the sale reject it as InvalidAmount
            txn.credit_revenue(seller, &allocation)?;
            project.revenue = project.revenue.checked_add(total_value).ok_or_else(|| {
                ledger_core::Error::InvalidAmount(format!(
                    "revenue of project {} is out of range",
                    project_id
                ))
            })?;

            let available = txn.balance(seller).available;
            if available < amount {
                return Err(ledger_core::Error::InsufficientBalance {
                    organization: seller.clone(),
                    available,
                    requested: amount,
                });
            }

            // Log order matches timestamp order
            let tx = Transaction {
                id: TransactionId::new(),
                project_id,
                buyer_id: buyer.clone(),
                seller_id: seller.clone(),
                credit_amount: amount,
                unit_price,
                timestamp: Utc::now(),
            };

            settle(txn, &tx, project).map_err(|err| match err {
                err @ ledger_core::Error::InvariantViolation(_) => err,
                other => {
                    tracing::error!(transaction = %tx.id, error = %other, "Purchase failed after balance check");
                    ledger_core::Error::InvariantViolation(format!(
                        "purchase {} failed after balance check: {}",
                        tx.id, other
                    ))
                }
            })?;
            Ok(tx)
        });

        let tx = match result {
            Ok(tx) => tx,
            Err(err) => {
                tracing::warn!(%buyer, %seller, project = %project_id, amount, error = %err, "Purchase rejected");
                return Err(err.into());
            }
        };

        if let Some(metrics) = self.store.metrics() {
            metrics.record_purchase(total_value.to_f64().unwrap_or_default());
        }

        tracing::info!(
            transaction = %tx.id,
            %buyer,
            %seller,
            project = %project_id,
            amount,
            %total_value,
            "Purchase completed"
        );

        Ok(tx)
    }
}

/// Apply a validated sale inside the write transaction
fn settle(txn: &mut LedgerTxn<'_>, tx: &Transaction, mut project: Project) -> ledger_core::Result<()> {
    txn.transfer_available(&tx.seller_id, &tx.buyer_id, tx.credit_amount, Some(tx.id))?;

    project.credits_sold = project
        .credits_sold
        .checked_add(tx.credit_amount)
        .ok_or_else(|| {
            ledger_core::Error::InvariantViolation(format!("credits sold overflow on {}", project.id))
        })?;
    project.updated_at = tx.timestamp;
    txn.update_project(project)?;

    txn.record_transaction(tx.clone())
}
