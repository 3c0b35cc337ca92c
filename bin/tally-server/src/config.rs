//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for tally-server.
///
/// Every field has a default so the server works out-of-the-box without any
/// environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// Directory holding uploads and generated reports (default: `"uploads"`).
    pub upload_dir: String,

    /// Number of reports built concurrently.
    pub workers: usize,

    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs are also written to daily-rolling files in this directory.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_upload_mb: usize = parse_or(&lookup, "TALLY_MAX_UPLOAD_SIZE_MB", 100);
        Self {
            bind_address: lookup("TALLY_BIND").unwrap_or_else(|| "0.0.0.0:8000".to_owned()),
            upload_dir: lookup("TALLY_UPLOAD_DIR").unwrap_or_else(|| "uploads".to_owned()),
            workers: parse_or(&lookup, "TALLY_WORKERS", 4usize).max(1),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            log_level: lookup("TALLY_LOG").unwrap_or_else(|| "info".to_owned()),
            log_json: flag_or(&lookup, "TALLY_LOG_JSON", false),
            log_dir: lookup("TALLY_LOG_DIR").filter(|v| !v.trim().is_empty()),
            cors_allowed_origins: lookup("TALLY_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_swagger: flag_or(&lookup, "TALLY_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn flag_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key) {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        None => default,
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with uploads placed in `upload_dir`.
    pub fn for_tests(upload_dir: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            enable_swagger: false,
            ..Self::from_lookup(|_| None)
        }
    }
}
