mod artifacts;
mod observability;
mod schedule;
mod server;

pub use artifacts::*;
pub use observability::*;
pub use schedule::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Parse a TOML document, filling every missing field with its default.
    pub fn from_toml_str(raw: &str) -> crate::Result<Self> {
        toml::from_str(raw).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Apply the `SCHEDGEN_*` environment overrides on top of the file config.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the process environment in
    /// production, a map in tests).  Unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SCHEDGEN_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            self.artifacts.output_dir = dir.into();
        }
        if let Some(url) = lookup("SCHEDGEN_BASE_URL").filter(|v| !v.is_empty()) {
            self.server.public_base_url = url;
        }
        override_parsed(&lookup, "SCHEDGEN_MAX_ROWS", &mut self.schedule.max_rows);
        override_parsed(&lookup, "SCHEDGEN_TTL_MINUTES", &mut self.artifacts.ttl_minutes);
        override_parsed(&lookup, "SCHEDGEN_HTTP_PORT", &mut self.server.port);
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparseable environment override"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        let base = &self.server.public_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.public_base_url".into(),
                message: format!("'{base}' must be an absolute http(s) URL"),
            });
        }

        if self.schedule.max_rows < 2 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "schedule.max_rows".into(),
                message: "max_rows must leave room for the header and at least one row".into(),
            });
        }

        if !is_valid_sheet_name(&self.schedule.sheet_name) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "schedule.sheet_name".into(),
                message: format!(
                    "'{}' is not a valid worksheet name (1..={SHEET_NAME_MAX_CHARS} characters, none of []:*?/\\, no leading or trailing apostrophe)",
                    self.schedule.sheet_name
                ),
            });
        }

        if self.artifacts.ttl_minutes == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "artifacts.ttl_minutes".into(),
                message: "ttl_minutes must be greater than 0 or no download link would ever resolve"
                    .into(),
            });
        }

        if self.artifacts.sweep_interval_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "artifacts.sweep_interval_secs".into(),
                message: "background reaper disabled; expired artifacts are reclaimed only on the next generation".into(),
            });
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "observability.sample_rate".into(),
                message: "sample_rate must be within 0.0..=1.0".into(),
            });
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let issues = Config::default().validate();
        assert!(
            issues.iter().all(|i| i.severity == ConfigSeverity::Warning),
            "unexpected errors: {issues:?}"
        );
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = Config::default();
        cfg.apply_overrides_from(lookup(&[
            ("SCHEDGEN_MAX_ROWS", "42"),
            ("SCHEDGEN_TTL_MINUTES", "5"),
            ("SCHEDGEN_HTTP_PORT", "9000"),
            ("SCHEDGEN_OUTPUT_DIR", "/tmp/out"),
            ("SCHEDGEN_BASE_URL", "https://files.example.com"),
        ]));
        assert_eq!(cfg.schedule.max_rows, 42);
        assert_eq!(cfg.artifacts.ttl_minutes, 5);
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.artifacts.output_dir, std::path::PathBuf::from("/tmp/out"));
        assert_eq!(cfg.server.public_base_url, "https://files.example.com");
    }

    #[test]
    fn unparseable_override_is_ignored() {
        let mut cfg = Config::default();
        cfg.apply_overrides_from(lookup(&[("SCHEDGEN_MAX_ROWS", "lots")]));
        assert_eq!(cfg.schedule.max_rows, 500);
    }

    #[test]
    fn zero_ttl_is_an_error() {
        let mut cfg = Config::default();
        cfg.artifacts.ttl_minutes = 0;
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|i| i.field == "artifacts.ttl_minutes" && i.severity == ConfigSeverity::Error));
    }

    #[test]
    fn relative_base_url_is_an_error() {
        let mut cfg = Config::default();
        cfg.server.public_base_url = "files.example.com".into();
        let issues = cfg.validate();
        assert!(issues.iter().any(|i| i.field == "server.public_base_url"));
    }

    #[test]
    fn unrenderable_sheet_name_is_an_error() {
        for name in ["x".repeat(40), "'Plan'".to_owned(), "a/b".to_owned()] {
            let mut cfg = Config::default();
            cfg.schedule.sheet_name = name.clone();
            let issues = cfg.validate();
            assert!(
                issues
                    .iter()
                    .any(|i| i.field == "schedule.sheet_name" && i.severity == ConfigSeverity::Error),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn from_toml_str_reports_config_error() {
        let err = Config::from_toml_str("[schedule]\nmax_rows = \"many\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "a.b".into(),
            message: "careful".into(),
        };
        assert_eq!(e.to_string(), "[WARN] a.b: careful");
    }
}
