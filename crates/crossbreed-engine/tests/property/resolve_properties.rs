use std::collections::BTreeSet;
use std::sync::Arc;

use crossbreed_core::{normalize_key, CrossbreedConfig};
use crossbreed_engine::CrossEngine;
use proptest::prelude::*;
use test_fixtures::{og_kush_blue_dream, InMemoryGeneticsLookup, MockBackend};

const PARENTS: [&str; 4] = ["OG-Kush", "Blue-Dream", "Gelato", "Northern Lights"];

fn arb_pair() -> impl Strategy<Value = (usize, usize, bool)> {
    (0..PARENTS.len(), 0..PARENTS.len(), any::<bool>())
}

// ── One backend call per distinct unordered pair ─────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn backend_called_once_per_distinct_pair(pairs in prop::collection::vec(arb_pair(), 1..24)) {
        let backend = Arc::new(MockBackend::new(og_kush_blue_dream()));
        let store = Arc::new(InMemoryGeneticsLookup::from_fixtures());
        let engine = CrossEngine::new(CrossbreedConfig::default(), backend.clone(), store).unwrap();

        let mut seen = BTreeSet::new();
        for (a, b, swap) in pairs {
            let (first, second) = if swap { (PARENTS[b], PARENTS[a]) } else { (PARENTS[a], PARENTS[b]) };
            let result = engine.resolve(first, second).unwrap();
            let fresh = seen.insert(normalize_key(first, second).unwrap());
            prop_assert_eq!(result.cached, !fresh);
        }
        prop_assert_eq!(backend.calls(), seen.len());
    }
}

// ── Reversed order returns the identical payload ─────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reversed_order_returns_identical_payload((a, b, _) in arb_pair()) {
        let backend = Arc::new(MockBackend::new(og_kush_blue_dream()));
        let store = Arc::new(InMemoryGeneticsLookup::from_fixtures());
        let engine = CrossEngine::new(CrossbreedConfig::default(), backend.clone(), store).unwrap();

        let forward = engine.resolve(PARENTS[a], PARENTS[b]).unwrap();
        let reverse = engine.resolve(PARENTS[b], PARENTS[a]).unwrap();
        prop_assert!(reverse.cached);
        prop_assert!(reverse.same_payload(&forward));
        prop_assert_eq!(backend.calls(), 1);
    }
}
