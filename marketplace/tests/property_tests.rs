//! Property-based tests for the marketplace
//!
//! - Allocation: buckets always sum exactly to the sale value
//! - Conservation: purchases only move credits, never create or destroy them
//! - Revenue: seller gross equals the sum of its transactions' values

use chrono::NaiveDate;
use ledger_core::{
    config::RevenueConfig, ErrorKind, LedgerStore, NewProject, OrganizationId, ProjectId,
    VerificationPolicy, Verifier,
};
use marketplace::{Marketplace, RevenueAllocator};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Strategy for sale values with up to four decimal places
fn value_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000, 0u32..=4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Strategy for revenue policies whose fractions sum to one
fn policy_strategy() -> impl Strategy<Value = RevenueConfig> {
    (0i64..=100, 0i64..=100, 0i64..=100, 0u32..=4)
        .prop_filter("shares must fit in 100%", |(a, b, c, _)| a + b + c <= 100)
        .prop_map(|(operations, verification, platform, scale)| RevenueConfig {
            community: Decimal::new(100 - operations - verification - platform, 2),
            operations: Decimal::new(operations, 2),
            verification: Decimal::new(verification, 2),
            platform: Decimal::new(platform, 2),
            minor_unit_scale: scale,
        })
}

/// Buyer index, credits, price in cents
fn purchase_strategy() -> impl Strategy<Value = (usize, u64, i64)> {
    (0usize..3, 0u64..800, 0i64..5_000)
}

fn verified_project(store: &Arc<LedgerStore>, hectares: u32) -> ProjectId {
    let verifier = Verifier::new(store.clone(), VerificationPolicy::default());
    let project = verifier
        .register_project(NewProject {
            owner: OrganizationId::new("ngo-a"),
            name: "Mangrove Restoration - Sundarbans".to_string(),
            location: "West Bengal, India".to_string(),
            hectares: Decimal::from(hectares),
            upload_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            communities: 8,
        })
        .unwrap();
    verifier.submit(project.id).unwrap();
    verifier.approve(project.id, Decimal::from(hectares)).unwrap();
    project.id
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Default split sums exactly and never goes negative
    #[test]
    fn prop_default_allocation_sums_exactly(value in value_strategy()) {
        let allocation = RevenueAllocator::default().allocate(value).unwrap();

        prop_assert_eq!(allocation.total(), value);
        prop_assert!(allocation.community >= Decimal::ZERO);
        prop_assert!(allocation.operations >= Decimal::ZERO);
        prop_assert!(allocation.verification >= Decimal::ZERO);
        prop_assert!(allocation.platform >= Decimal::ZERO);
    }

    /// Property: Any valid policy sums exactly, and rounded buckets fit the minor unit
    #[test]
    fn prop_custom_allocation_sums_exactly(
        config in policy_strategy(),
        value in value_strategy(),
    ) {
        let allocator = RevenueAllocator::from_config(&config).unwrap();
        let allocation = allocator.allocate(value).unwrap();

        prop_assert_eq!(allocation.total(), value);
        for bucket in [allocation.operations, allocation.verification, allocation.platform] {
            prop_assert!(bucket.scale() <= config.minor_unit_scale || bucket.is_zero());
            prop_assert!(bucket <= value);
        }
    }

    /// Property: Purchases conserve credits and post matching revenue
    #[test]
    fn prop_purchases_conserve_credits(
        hectares in 1u32..200,
        purchases in prop::collection::vec(purchase_strategy(), 1..30),
    ) {
        let store = Arc::new(LedgerStore::new());
        let project = verified_project(&store, hectares);
        let minted = store.read(|s| s.total_minted());
        let marketplace = Marketplace::new(store.clone(), RevenueAllocator::default());
        let seller = OrganizationId::new("ngo-a");
        let buyers = ["corp-a", "corp-b", "corp-c"].map(OrganizationId::new);

        let mut sold = 0u64;
        let mut gross = Decimal::ZERO;
        for (buyer, amount, cents) in purchases {
            let before = store.get_balance(&seller).available;
            match marketplace.purchase(&buyers[buyer], &seller, project, amount, Decimal::new(cents, 2)) {
                Ok(tx) => {
                    sold += amount;
                    gross += tx.total_value();
                }
                Err(err) => {
                    prop_assert!(matches!(
                        err.kind(),
                        ErrorKind::InvalidAmount | ErrorKind::InsufficientBalance
                    ));
                    prop_assert_eq!(store.get_balance(&seller).available, before);
                }
            }
        }

        prop_assert_eq!(store.get_balance(&seller).available, minted - sold);
        let bought: u64 = buyers.iter().map(|b| store.get_balance(b).available).sum();
        prop_assert_eq!(bought, sold);
        prop_assert_eq!(store.revenue(&seller).gross, gross);
        prop_assert_eq!(store.project(project).unwrap().credits_sold, sold);
        prop_assert!(store.check_conservation().is_ok());
    }
}
