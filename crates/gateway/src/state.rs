use std::sync::Arc;
use std::time::Instant;

use sg_artifacts::{ArtifactRegistry, Clock};
use sg_domain::config::Config;

/// Shared application state passed to all API handlers and MCP tools.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Download tokens → rendered workbooks.
    pub registry: Arc<ArtifactRegistry>,
    /// Same clock the registry uses; filenames are dated from it.
    pub clock: Arc<dyn Clock>,
    pub started_at: Instant,
}
