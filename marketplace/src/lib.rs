//! Blue Carbon Marketplace
//!
//! Credit purchases and revenue accounting on top of `ledger-core`.
//!
//! # Purchase flow
//!
//! 1. **Validation**: positive amount and price, distinct buyer and seller
//! 2. **Allocation**: sale value split into community, operations,
//!    verification and platform buckets
//! 3. **Settlement**: in one ledger write transaction the seller's project
//!    and balance are checked, credits move to the buyer, revenue is posted
//!    and the transaction is appended
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ledger_core::{LedgerStore, NewProject, OrganizationId, VerificationPolicy, Verifier};
//! use marketplace::{Marketplace, RevenueAllocator};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! fn main() -> marketplace::Result<()> {
//!     let store = Arc::new(LedgerStore::new());
//!     let verifier = Verifier::new(store.clone(), VerificationPolicy::default());
//!
//!     // 120 verified hectares issue 2400 credits to the NGO
//!     let project = verifier.register_project(NewProject {
//!         owner: OrganizationId::new("ngo-a"),
//!         name: "Mangrove Restoration - Sundarbans".to_string(),
//!         location: "West Bengal, India".to_string(),
//!         hectares: Decimal::from(120),
//!         upload_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
//!         communities: 8,
//!     })?;
//!     verifier.submit(project.id)?;
//!     verifier.approve(project.id, Decimal::from(120))?;
//!
//!     let marketplace = Marketplace::new(store, RevenueAllocator::default());
//!     let tx = marketplace.purchase(
//!         &OrganizationId::new("corp-b"),
//!         &OrganizationId::new("ngo-a"),
//!         project.id,
//!         500,
//!         Decimal::from(20),
//!     )?;
//!     assert_eq!(tx.total_value(), Decimal::from(10000));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod allocator;
pub mod error;
pub mod matcher;
pub mod reports;

// Re-exports
pub use allocator::RevenueAllocator;
pub use error::{Error, Result};
pub use matcher::Marketplace;
pub use reports::{
    CategoryShare, CreditPortfolio, NgoSummary, OffsetReport, PartnerSummary, ProjectRevenue,
    Reports, RevenueOverview,
};
