#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use sg_artifacts::{ManualClock, MemoryBlobStore};
use sg_domain::config::Config;
use sg_gateway::bootstrap;
use sg_gateway::state::AppState;

pub struct Harness {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryBlobStore>,
}

pub fn harness_with(config: Config) -> Harness {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(MemoryBlobStore::new());
    let state = bootstrap::with_store(Arc::new(config), store.clone(), clock.clone());
    Harness { state, clock, store }
}

pub fn harness() -> Harness {
    harness_with(Config::default())
}

/// Two micros of 16h and 24h under one macro.
pub fn forty_hour_payload() -> Value {
    json!({
        "project": { "name": "Apollo", "owner": "Ana" },
        "macros": [{
            "name": "Build",
            "responsible": "Bo",
            "micros": [
                { "name": "Backend", "hours": 16, "responsible": "Cy" },
                { "name": "Frontend", "hours": 24 }
            ]
        }]
    })
}
