use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Artifact registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory rendered workbooks are written to when `storage = "disk"`.
    #[serde(default = "d_output_dir")]
    pub output_dir: PathBuf,
    /// Lifetime of a download link.
    #[serde(default = "d_30")]
    pub ttl_minutes: u64,
    /// Period of the background reaper.  `0` disables it; expired entries
    /// are then reclaimed only by the sweep that precedes each registration.
    #[serde(default = "d_60")]
    pub sweep_interval_secs: u64,
    #[serde(default)]
    pub storage: StorageKind,
    /// Embed the rendered workbook as base64 in generation responses.
    #[serde(default = "d_true")]
    pub inline_base64: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Disk,
    Memory,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            output_dir: d_output_dir(),
            ttl_minutes: 30,
            sweep_interval_secs: 60,
            storage: StorageKind::Disk,
            inline_base64: true,
        }
    }
}

impl ArtifactsConfig {
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

fn d_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}
fn d_30() -> u64 {
    30
}
fn d_60() -> u64 {
    60
}
fn d_true() -> bool {
    true
}
