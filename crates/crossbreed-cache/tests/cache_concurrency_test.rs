use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbreed_cache::ResultCache;
use crossbreed_core::{normalize_key, CrossResult, Prediction, StrainProfile};

fn value(a: &str, b: &str) -> CrossResult {
    let key = normalize_key(a, b).unwrap();
    CrossResult::from_prediction(
        key,
        Prediction {
            strain: StrainProfile::named(format!("{a}:{b}"), "hybrid", a, b),
            confidence: 0.6,
            alternatives: vec![],
            warnings: vec![],
        },
        Utc::now(),
    )
}

// ── Capacity holds under concurrent writers ──────────────────────────────

#[test]
fn concurrent_puts_never_exceed_capacity_after_settling() {
    let cache = Arc::new(ResultCache::with_capacity(50, Duration::from_secs(3600)));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    let a = format!("parent-{t}-{i}");
                    let key = normalize_key(&a, "mother").unwrap();
                    cache.put(key.clone(), value(&a, "mother"), 1);
                    let _ = cache.get(&key);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert!(cache.total_weight() <= 50, "weight {}", cache.total_weight());
    assert_eq!(cache.total_weight(), cache.len() as u64);
    assert!(cache.stats().evictions >= 1600 - 50);
}

// ── Readers and invalidators on the same keys keep accounting exact ──────

#[test]
fn concurrent_invalidation_keeps_weight_consistent() {
    let cache = Arc::new(ResultCache::with_capacity(1_000, Duration::from_secs(3600)));
    let keys: Vec<_> = (0..20)
        .map(|i| (format!("p{i}"), normalize_key(format!("p{i}"), "q").unwrap()))
        .collect();
    let keys = Arc::new(keys);
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let keys = Arc::clone(&keys);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..300 {
                    let (name, key) = &keys[(round + t) % keys.len()];
                    match (round + t) % 3 {
                        0 => {
                            cache.put(key.clone(), value(name, "q"), 3);
                        }
                        1 => {
                            cache.invalidate(key);
                        }
                        _ => {
                            let _ = cache.get(key);
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(cache.total_weight(), cache.len() as u64 * 3);
    cache.invalidate_all();
    assert_eq!(cache.total_weight(), 0);
}
