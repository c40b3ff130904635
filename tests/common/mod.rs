// tests/common/mod.rs
//! Shared setup for the integration tests.

use std::sync::Once;

use ftn::sema::EquivalenceSet;
use ftn::sema::fixtures::Fixture;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Send `tracing` output to the test writer when `FTN_LOG` holds a filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if let Ok(filter) = EnvFilter::try_from_env("FTN_LOG") {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_test_writer()
                .try_init();
        }
    });
}

/// Each set rendered in source form and sorted, with the sets sorted too.
#[allow(dead_code)]
pub fn partition(fx: &Fixture, sets: &[EquivalenceSet]) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = sets
        .iter()
        .map(|set| {
            let mut objects: Vec<String> = set.iter().map(|o| o.display(&fx.ctx)).collect();
            objects.sort();
            objects
        })
        .collect();
    out.sort();
    out
}
