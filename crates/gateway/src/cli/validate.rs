//! `schedgen validate <file>`: the preview endpoint, offline.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use sg_domain::config::Config;

use crate::service;

/// Print the preview or the `{ ok: false }` body as pretty JSON.  Returns
/// `false` when the payload is rejected.
pub fn run(config: &Config, file: &Path) -> anyhow::Result<bool> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
    };
    let payload: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {} as JSON", file.display()))?;

    let (body, ok) = match service::validate_preview(&payload, &config.schedule) {
        Ok(preview) => (serde_json::to_string_pretty(&preview)?, true),
        Err(e) => (serde_json::to_string_pretty(&e.to_failure())?, false),
    };
    println!("{body}");
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_acceptance_by_return_value() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.json");
        let bad = tmp.path().join("bad.json");
        std::fs::write(
            &good,
            r#"{"project":{"name":"P"},"macros":[{"name":"A","micros":[{"name":"a","hours":2}]}]}"#,
        )
        .unwrap();
        std::fs::write(&bad, r#"{"project":{"name":"P"},"macros":[]}"#).unwrap();

        let config = Config::default();
        assert!(run(&config, &good).unwrap());
        assert!(!run(&config, &bad).unwrap());
        assert!(run(&config, &tmp.path().join("missing.json")).is_err());
    }
}
