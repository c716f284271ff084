//! Property-based tests for the holdings ledger.
//!
//! These tests verify that the ledger arithmetic holds across generated
//! inputs, using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use stockfolio_core::constants::AVERAGE_COST_DECIMAL_PRECISION;
use stockfolio_core::portfolio::holdings::PositionSet;

// =============================================================================
// Generators
// =============================================================================

/// Strictly positive quantities with up to 4 decimal places.
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|units| Decimal::new(units, 4))
}

/// Prices in cents, zero allowed.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_acquisitions(max: usize) -> impl Strategy<Value = Vec<(Decimal, Decimal)>> {
    proptest::collection::vec((arb_quantity(), arb_price()), 1..=max)
}

fn arb_holdings(max: usize) -> impl Strategy<Value = Vec<(String, Decimal, Decimal)>> {
    proptest::collection::vec(("[A-Z]{1,6}", arb_quantity(), arb_price()), 0..=max)
}

/// Largest error a single half-even rounding step can introduce.
fn half_unit() -> Decimal {
    Decimal::new(5, AVERAGE_COST_DECIMAL_PRECISION + 1)
}

fn build_set(holdings: &[(String, Decimal, Decimal)]) -> PositionSet {
    let mut set = PositionSet::new("acc");
    for (symbol, qty, price) in holdings {
        set.acquire(symbol, symbol, *qty, *price).unwrap();
    }
    set
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After every acquisition the average cost equals the volume-weighted
    /// mean of all fills so far, rounded once.
    #[test]
    fn prop_average_cost_tracks_weighted_mean(fills in arb_acquisitions(20)) {
        let mut set = PositionSet::new("acc");
        let mut total_qty = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;

        let tolerance = half_unit() + Decimal::new(1, 12);
        for (step, (qty, price)) in fills.iter().enumerate() {
            let position = set.acquire("SYM", "Symbol", *qty, *price).unwrap();
            total_qty += *qty;
            total_cost += *qty * *price;

            let exact = total_cost / total_qty;
            prop_assert_eq!(position.quantity, total_qty);
            prop_assert_eq!(position.total_cost_basis, total_cost);
            prop_assert!(
                (position.average_cost - exact).abs() <= tolerance,
                "step {}: average {} vs exact {}", step, position.average_cost, exact
            );
        }
    }

    /// Average cost never carries more than the configured precision.
    #[test]
    fn prop_average_cost_precision_is_bounded(fills in arb_acquisitions(10)) {
        let mut set = PositionSet::new("acc");
        for (qty, price) in fills {
            let position = set.acquire("SYM", "Symbol", qty, price).unwrap();
            prop_assert!(position.average_cost.scale() <= AVERAGE_COST_DECIMAL_PRECISION);
        }
    }

    /// Total at cost equals the sum of quantity * average cost.
    #[test]
    fn prop_total_market_value_at_cost_is_sum(holdings in arb_holdings(30)) {
        let set = build_set(&holdings);

        let expected: Decimal = set.iter().map(|p| p.quantity * p.average_cost).sum();
        prop_assert_eq!(set.total_market_value_at_cost().unwrap(), expected);
    }

    /// Two merges into an already held position give the same result in
    /// either order.
    #[test]
    fn prop_two_merges_commute(
        (q0, p0) in (arb_quantity(), arb_price()),
        (q1, p1) in (arb_quantity(), arb_price()),
        (q2, p2) in (arb_quantity(), arb_price()),
    ) {
        let mut forward = PositionSet::new("acc");
        forward.acquire("SYM", "Symbol", q0, p0).unwrap();
        forward.acquire("SYM", "Symbol", q1, p1).unwrap();
        let a = forward.acquire("SYM", "Symbol", q2, p2).unwrap();

        let mut backward = PositionSet::new("acc");
        backward.acquire("SYM", "Symbol", q0, p0).unwrap();
        backward.acquire("SYM", "Symbol", q2, p2).unwrap();
        let b = backward.acquire("SYM", "Symbol", q1, p1).unwrap();

        prop_assert_eq!(a.quantity, b.quantity);
        prop_assert_eq!(a.total_cost_basis, b.total_cost_basis);
        prop_assert_eq!(a.average_cost, b.average_cost);
    }

    /// Any permutation of a fill sequence ends at the same position.
    #[test]
    fn prop_fill_order_is_irrelevant(
        fills in arb_acquisitions(8)
            .prop_flat_map(|f| (Just(f.clone()), Just(f).prop_shuffle())),
    ) {
        let (original, shuffled) = fills;
        let mut a = PositionSet::new("acc");
        let mut b = PositionSet::new("acc");
        for (qty, price) in &original {
            a.acquire("SYM", "Symbol", *qty, *price).unwrap();
        }
        for (qty, price) in &shuffled {
            b.acquire("SYM", "Symbol", *qty, *price).unwrap();
        }

        let a = a.get("SYM").unwrap();
        let b = b.get("SYM").unwrap();
        prop_assert_eq!(a.quantity, b.quantity);
        prop_assert_eq!(a.average_cost, b.average_cost);
    }

    /// Removing an absent symbol never changes the set.
    #[test]
    fn prop_remove_absent_is_noop(holdings in arb_holdings(10)) {
        let mut set = build_set(&holdings);
        let before = set.clone();

        prop_assert!(set.remove("not-a-held-symbol").is_none());
        prop_assert_eq!(set, before);
    }

    /// Rejected input leaves the set unchanged.
    #[test]
    fn prop_invalid_input_is_rejected(
        holdings in arb_holdings(5),
        bad_price in (1i64..1_000_000).prop_map(|c| -Decimal::new(c, 2)),
    ) {
        let mut set = build_set(&holdings);
        let before = set.clone();

        prop_assert!(set.acquire("SYM", "Symbol", Decimal::ZERO, Decimal::ONE).is_err());
        prop_assert!(set.acquire("SYM", "Symbol", Decimal::ONE, bad_price).is_err());
        prop_assert_eq!(set, before);
    }
}
