//! Credit Gateway
//!
//! HTTP/JSON boundary of the blue-carbon credit ledger. Mutating requests
//! are serialized through a single-writer command actor; reads are served
//! straight from the ledger store.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod api;
pub mod error;
pub mod service;

// Re-exports
pub use actor::{spawn_command_actor, CommandHandle};
pub use api::{router, AppState};
pub use error::{Error, Result};
pub use service::{CreditService, PurchaseRequest};
