use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossbreed_cache::ResultCache;
use crossbreed_core::traits::ManualClock;
use crossbreed_core::{normalize_key, CrossKey, CrossResult, Prediction, StrainProfile};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put { slot: u8, weight: u64 },
    Get { slot: u8 },
    Invalidate { slot: u8 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12, 1u64..4).prop_map(|(slot, weight)| Op::Put { slot, weight }),
        (0u8..12).prop_map(|slot| Op::Get { slot }),
        (0u8..12).prop_map(|slot| Op::Invalidate { slot }),
    ]
}

fn key(slot: u8) -> CrossKey {
    normalize_key(format!("strain-{slot}"), "reference").unwrap()
}

fn value(slot: u8) -> CrossResult {
    CrossResult::from_prediction(
        key(slot),
        Prediction {
            strain: StrainProfile::named(format!("id-{slot}"), "x", format!("strain-{slot}"), "reference"),
            confidence: 0.5,
            alternatives: vec![],
            warnings: vec![],
        },
        Utc::now(),
    )
}

/// Reference LRU: (slot, access tick, insert tick, weight).
#[derive(Default)]
struct Model {
    entries: Vec<(u8, u64, u64, u64)>,
}

impl Model {
    fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.3).sum()
    }

    fn apply(&mut self, op: &Op, tick: u64, max: u64) {
        match *op {
            Op::Put { slot, weight } => {
                self.entries.retain(|e| e.0 != slot);
                if weight > max {
                    return;
                }
                self.entries.push((slot, tick, tick, weight));
                while self.total() > max {
                    let victim = self
                        .entries
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| e.0 != slot)
                        .min_by_key(|(_, e)| (e.1, e.2))
                        .map(|(i, _)| i);
                    match victim {
                        Some(i) => {
                            self.entries.remove(i);
                        }
                        None => break,
                    }
                }
            }
            Op::Get { slot } => {
                if let Some(e) = self.entries.iter_mut().find(|e| e.0 == slot) {
                    e.1 = tick;
                }
            }
            Op::Invalidate { slot } => self.entries.retain(|e| e.0 != slot),
        }
    }

    fn slots(&self) -> BTreeSet<u8> {
        self.entries.iter().map(|e| e.0).collect()
    }
}

// ── LRU eviction matches a reference model ───────────────────────────────

proptest! {
    #[test]
    fn lru_matches_reference_model(ops in prop::collection::vec(arb_op(), 1..60), max in 2u64..8) {
        let clock = Arc::new(ManualClock::default());
        let cache = ResultCache::with_clock(max, Duration::from_secs(86_400), clock.clone());
        let mut model = Model::default();

        for (tick, op) in ops.iter().enumerate() {
            clock.advance(chrono::Duration::seconds(1));
            match *op {
                Op::Put { slot, weight } => {
                    cache.put(key(slot), value(slot), weight);
                }
                Op::Get { slot } => {
                    let _ = cache.get(&key(slot));
                }
                Op::Invalidate { slot } => {
                    cache.invalidate(&key(slot));
                }
            }
            model.apply(op, tick as u64, max);

            let actual: BTreeSet<u8> = (0u8..12).filter(|s| cache.contains(&key(*s))).collect();
            prop_assert_eq!(&actual, &model.slots());
            prop_assert_eq!(cache.total_weight(), model.total());
            prop_assert!(cache.total_weight() <= max);
        }
    }
}
