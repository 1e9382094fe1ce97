use crossbreed_core::constants::KEY_SEPARATOR;
use crossbreed_core::{normalize_key, CrossError};
use proptest::prelude::*;

fn arb_ref() -> impl Strategy<Value = String> {
    "[A-Za-z0-9#&'.-]{1,12}( [A-Za-z0-9#&'.-]{1,12}){0,2}"
}

// ── Commutativity ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn key_is_order_independent(a in arb_ref(), b in arb_ref()) {
        let ab = normalize_key(&a, &b).unwrap();
        let ba = normalize_key(&b, &a).unwrap();
        prop_assert_eq!(ab, ba);
    }
}

// ── Determinism: same inputs, same key, every time ───────────────────────

proptest! {
    #[test]
    fn key_is_deterministic(a in arb_ref(), b in arb_ref()) {
        let first = normalize_key(&a, &b).unwrap();
        let second = normalize_key(a.clone(), b.clone()).unwrap();
        prop_assert_eq!(first.as_str(), second.as_str());
    }
}

// ── Separator appears exactly once, so parents() round-trips ─────────────

proptest! {
    #[test]
    fn separator_is_unambiguous(a in arb_ref(), b in arb_ref()) {
        let key = normalize_key(&a, &b).unwrap();
        prop_assert_eq!(key.as_str().matches(KEY_SEPARATOR).count(), 1);
        let (first, second) = key.parents();
        prop_assert!(first <= second);
        prop_assert!(!first.contains(char::is_whitespace));
        prop_assert!(!second.contains(char::is_whitespace));
    }
}

// ── Padding and case never change identity ──────────────────────────────

proptest! {
    #[test]
    fn padding_and_case_are_ignored(a in arb_ref(), b in arb_ref()) {
        let plain = normalize_key(&a, &b).unwrap();
        let noisy = normalize_key(format!("  {}  ", a.to_uppercase()), format!("\t{}", b.to_lowercase())).unwrap();
        prop_assert_eq!(plain, noisy);
    }
}

// ── Whitespace-only refs are always rejected ─────────────────────────────

proptest! {
    #[test]
    fn blank_refs_are_invalid(blank in "[ \t\n]{0,8}", b in arb_ref()) {
        let is_invalid = matches!(normalize_key(&blank, &b), Err(CrossError::InvalidInput { .. }));
        prop_assert!(is_invalid);
    }
}
