//! Test doubles and fixture loading shared by the crossbreed crates.
//!
//! Provides a scriptable prediction backend, an in-memory genetics store,
//! sample records, and typed loading of the JSON files under `fixtures/`.

mod genetics_store;
mod mock_backend;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;

use crossbreed_core::models::{GeneticProfile, StrainType, Terpene};
use crossbreed_core::{ParentGenetics, ParentRef, Prediction, StrainProfile};

pub use crossbreed_core::traits::ManualClock;
pub use genetics_store::InMemoryGeneticsLookup;
pub use mock_backend::MockBackend;

/// Root directory of the JSON fixtures.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Parent records from `genetics/parents.json`.
pub fn fixture_parents() -> Vec<ParentGenetics> {
    load_fixture("genetics/parents.json")
}

/// The canonical OG-Kush × Blue-Dream prediction: `OGBD-Hybrid` at 0.82
/// with one alternative phenotype and no warnings.
pub fn og_kush_blue_dream() -> Prediction {
    load_fixture("predictions/og_kush_blue_dream.json")
}

/// A plain prediction for any pair.
pub fn prediction_for(parent_a: &str, parent_b: &str, confidence: f64, alternatives: &[&str]) -> Prediction {
    Prediction {
        strain: StrainProfile::named(
            uuid::Uuid::new_v4().to_string(),
            format!("{parent_a} x {parent_b}"),
            parent_a,
            parent_b,
        ),
        confidence,
        alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
        warnings: Vec::new(),
    }
}

/// A hybrid parent record with one terpene and default grow traits.
pub fn sample_genetics(parent: &str) -> ParentGenetics {
    ParentGenetics {
        parent: ParentRef::from(parent),
        strain_type: StrainType::Hybrid,
        thc: 20.0,
        cbd: 0.5,
        terpenes: vec![Terpene {
            name: "Myrcene".to_string(),
            percentage: 0.8,
            effects: vec!["relaxing".to_string()],
        }],
        genetics: GeneticProfile {
            phenotypes: vec![format!("{parent} pheno #1")],
            flowering_time_weeks: 9,
            ..GeneticProfile::default()
        },
    }
}

/// A manual clock pinned to a fixed instant.
pub fn fixed_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 20, 16, 20, 0).single().unwrap_or_else(Utc::now))
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
pub fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
