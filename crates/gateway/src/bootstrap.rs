//! AppState construction and background-task spawning.
//!
//! Shared by `serve` and `mcp` so both boot the same runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;

use sg_artifacts::{ArtifactRegistry, BlobStore, Clock, DiskBlobStore, MemoryBlobStore, SystemClock};
use sg_domain::config::{Config, ConfigSeverity, StorageKind};

use crate::state::AppState;

/// Validate config, open artifact storage and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Artifact storage ─────────────────────────────────────────────
    let store: Arc<dyn BlobStore> = match config.artifacts.storage {
        StorageKind::Disk => {
            let dir = &config.artifacts.output_dir;
            let store = DiskBlobStore::open(dir)
                .with_context(|| format!("opening artifact directory {}", dir.display()))?;
            tracing::info!(path = %dir.display(), "disk artifact store ready");
            Arc::new(store)
        }
        StorageKind::Memory => {
            tracing::info!("in-memory artifact store ready");
            Arc::new(MemoryBlobStore::new())
        }
    };

    Ok(with_store(config, store, Arc::new(SystemClock)))
}

/// Assemble state around an explicit store and clock.
pub fn with_store(config: Arc<Config>, store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> AppState {
    let registry = Arc::new(ArtifactRegistry::new(store, clock.clone()));
    tracing::info!(
        ttl_minutes = config.artifacts.ttl_minutes,
        max_rows = config.schedule.max_rows,
        "artifact registry ready"
    );

    AppState {
        config,
        registry,
        clock,
        started_at: Instant::now(),
    }
}

/// Spawn the periodic expired-artifact reaper, if configured.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic artifact sweep ──────────────────────────────────────
    let secs = state.config.artifacts.sweep_interval_secs;
    if secs == 0 {
        tracing::info!("artifact reaper disabled; expired files are reclaimed on registration");
        return;
    }

    let registry = state.registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let registry = registry.clone();
            match tokio::task::spawn_blocking(move || registry.sweep()).await {
                Ok(0) => {}
                Ok(reclaimed) => tracing::info!(reclaimed, "expired artifacts reclaimed"),
                Err(e) => tracing::warn!(error = %e, "artifact sweep task failed"),
            }
        }
    });
    tracing::info!(interval_secs = secs, "artifact reaper started");
}
