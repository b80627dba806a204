//! Blue Carbon Ledger Core
//!
//! Bookkeeping engine for blue-carbon credits: restoration projects move
//! through verification, verified hectares become credits, and credits are
//! transferred and retired between organizations.
//!
//! # Architecture
//!
//! - **Staged write transactions**: every mutation is validated and staged, then committed whole
//! - **Single lock**: one `RwLock` serializes writers; readers never see half-applied changes
//! - **Append-only logs**: transactions and credit movements are never modified or deleted
//!
//! # Invariants
//!
//! - Credit conservation: Σ(available + retired) == Σ(minted) for all time
//! - `issued_credits > 0` exactly when a project is `Verified`
//! - Balances never go negative (unsigned arithmetic, checked before debit)

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod emissions;
pub mod error;
pub mod metrics;
pub mod store;
pub mod types;
pub mod verification;

// Re-exports
pub use config::Config;
pub use emissions::{EmissionCategory, EmissionsProfile, EmissionsReport};
pub use error::{Error, ErrorKind, Result};
pub use metrics::Metrics;
pub use store::{LedgerState, LedgerStore, LedgerTxn};
pub use types::{
    CreditBalance, CreditEvent, CreditMovement, NewProject, OrganizationId, Project, ProjectId,
    ProjectStatus, RevenueAllocation, RevenueBucket, RevenueLedger, Transaction, TransactionId,
};
pub use verification::{VerificationPolicy, Verifier};
