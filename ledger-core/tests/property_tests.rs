//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Credit conservation: Σ(available + retired) == Σ(minted)
//! - Atomicity: failed operations leave committed state untouched
//! - Issuance: issued_credits > 0 exactly when a project is verified
//! - Idempotency: a verified project never mints twice

use chrono::NaiveDate;
use ledger_core::{
    verification::{VerificationAction, VerificationPolicy},
    Error, LedgerStore, NewProject, OrganizationId, ProjectStatus, Verifier,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

const ORGANIZATIONS: [&str; 4] = ["ngo-a", "ngo-b", "corp-b", "corp-c"];

/// Ledger operation applied by the generated scenarios
#[derive(Debug, Clone)]
enum Op {
    Mint(usize, u64),
    Transfer(usize, usize, u64),
    Retire(usize, u64),
}

/// Strategy for generating organization indices
fn org_strategy() -> impl Strategy<Value = usize> {
    0..ORGANIZATIONS.len()
}

/// Strategy for generating ledger operations (amounts may be zero or oversized)
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (org_strategy(), 0u64..5_000).prop_map(|(o, a)| Op::Mint(o, a)),
        (org_strategy(), org_strategy(), 0u64..3_000).prop_map(|(f, t, a)| Op::Transfer(f, t, a)),
        (org_strategy(), 0u64..3_000).prop_map(|(o, a)| Op::Retire(o, a)),
    ]
}

/// Strategy for generating verification actions
fn action_strategy() -> impl Strategy<Value = VerificationAction> {
    prop_oneof![
        Just(VerificationAction::Submit),
        Just(VerificationAction::Approve),
        Just(VerificationAction::Reject),
    ]
}

fn org(index: usize) -> OrganizationId {
    OrganizationId::new(ORGANIZATIONS[index])
}

fn apply(store: &LedgerStore, op: &Op) -> ledger_core::Result<()> {
    match *op {
        Op::Mint(o, amount) => store.mint(&org(o), amount).map(|_| ()),
        Op::Transfer(from, to, amount) => store.transfer_available(&org(from), &org(to), amount),
        Op::Retire(o, amount) => store.retire(&org(o), amount).map(|_| ()),
    }
}

fn sample_project(hectares: Decimal) -> NewProject {
    NewProject {
        owner: OrganizationId::new("ngo-a"),
        name: "Coastal Wetland Protection - Chilika".to_string(),
        location: "Odisha, India".to_string(),
        hectares,
        upload_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        communities: 12,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Mints with positive amounts are always accepted
    #[test]
    fn prop_positive_mints_accepted(amount in 1u64..1_000_000_000u64) {
        let store = LedgerStore::new();
        let balance = store.mint(&OrganizationId::new("ngo-a"), amount).unwrap();
        prop_assert_eq!(balance.available, amount);
        prop_assert_eq!(balance.received, amount);
    }

    /// Property: Credits are conserved across any sequence of operations
    #[test]
    fn prop_credit_conservation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let store = LedgerStore::new();
        let mut expected_minted = 0u64;

        for op in &ops {
            let ok = apply(&store, op).is_ok();
            if let (true, Op::Mint(_, amount)) = (ok, op) {
                expected_minted += amount;
            }
        }

        let snapshot = store.snapshot();
        let owned: u64 = snapshot.balances().map(|b| b.available + b.retired).sum();
        prop_assert_eq!(owned, expected_minted);
        prop_assert_eq!(snapshot.total_minted(), expected_minted);
        prop_assert!(store.check_conservation().is_ok());

        for balance in snapshot.balances() {
            prop_assert!(balance.available + balance.retired <= balance.received);
        }
    }

    /// Property: A failed operation leaves committed state unchanged
    #[test]
    fn prop_failed_operations_are_atomic(
        setup in prop::collection::vec(op_strategy(), 0..20),
        op in op_strategy(),
    ) {
        let store = LedgerStore::new();
        for op in &setup {
            let _ = apply(&store, op);
        }

        let before = store.snapshot();
        if apply(&store, &op).is_err() {
            let after = store.snapshot();
            for name in ORGANIZATIONS {
                let id = OrganizationId::new(name);
                prop_assert_eq!(before.balance(&id), after.balance(&id));
            }
            prop_assert_eq!(before.events().len(), after.events().len());
            prop_assert_eq!(before.total_minted(), after.total_minted());
        }
    }

    /// Property: Retirement moves credits one-for-one
    #[test]
    fn prop_retire_conserves_owned(minted in 1u64..10_000, retire in 1u64..10_000) {
        let store = LedgerStore::new();
        let corp = OrganizationId::new("corp-b");
        store.mint(&corp, minted).unwrap();

        let result = store.retire(&corp, retire);
        let balance = store.get_balance(&corp);

        if retire <= minted {
            prop_assert!(result.is_ok());
            prop_assert_eq!(balance.retired, retire);
        } else {
            let is_insufficient = matches!(result, Err(Error::InsufficientBalance { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(balance.retired, 0);
        }
        prop_assert_eq!(balance.owned(), minted);
    }

    /// Property: issued_credits > 0 exactly when the project is verified
    #[test]
    fn prop_issued_iff_verified(
        actions in prop::collection::vec(action_strategy(), 1..12),
        hectares in 1u32..500,
    ) {
        let store = Arc::new(LedgerStore::new());
        let verifier = Verifier::new(store.clone(), VerificationPolicy::default());
        let hectares = Decimal::from(hectares);
        let project = verifier.register_project(sample_project(hectares)).unwrap();

        for action in actions {
            let _ = match action {
                VerificationAction::Submit => verifier.submit(project.id),
                VerificationAction::Approve => verifier.approve(project.id, hectares),
                VerificationAction::Reject => verifier.reject(project.id, "insufficient evidence"),
            };

            let current = store.project(project.id).unwrap();
            prop_assert!(current.is_consistent());

            let balance = store.get_balance(&current.owner);
            prop_assert_eq!(balance.available, current.issued_credits);
        }

        prop_assert!(store.check_conservation().is_ok());
    }

    /// Property: Approving a verified project never mints again
    #[test]
    fn prop_double_approve_rejected(hectares in 1u32..1_000) {
        let store = Arc::new(LedgerStore::new());
        let verifier = Verifier::new(store.clone(), VerificationPolicy::default());
        let hectares = Decimal::from(hectares);
        let project = verifier.register_project(sample_project(hectares)).unwrap();
        verifier.submit(project.id).unwrap();
        let approved = verifier.approve(project.id, hectares).unwrap();
        prop_assert_eq!(approved.status, ProjectStatus::Verified);

        let second = verifier.approve(project.id, hectares);
        let is_invalid_transition = matches!(second, Err(Error::InvalidStateTransition(_)));
        prop_assert!(is_invalid_transition);
        prop_assert_eq!(store.read(|s| s.total_minted()), approved.issued_credits);
    }
}

#[test]
fn test_concurrent_transfers_never_overdraw() {
    let store = Arc::new(LedgerStore::new());
    let seller = OrganizationId::new("ngo-a");
    store.mint(&seller, 1_000).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            let seller = seller.clone();
            std::thread::spawn(move || {
                let buyer = OrganizationId::new(format!("corp-{}", i));
                (0..50)
                    .filter(|_| store.transfer_available(&seller, &buyer, 7).is_ok())
                    .count() as u64
            })
        })
        .collect();

    let moved: u64 = handles.into_iter().map(|h| h.join().unwrap() * 7).sum();

    assert_eq!(store.get_balance(&seller).available, 1_000 - moved);
    assert!(moved <= 1_000);
    assert_eq!(moved, 1_000 - 1_000 % 7);
    store.check_conservation().unwrap();
}
