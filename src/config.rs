use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://export.arxiv.org/api/query";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;

/// Exporter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = var("ARXIV_EXPORT_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_url);
        let output_dir = var("ARXIV_EXPORT_OUTPUT_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        Self {
            api_url,
            probe_timeout: secs_var(&var, "ARXIV_EXPORT_PROBE_TIMEOUT_SECS", defaults.probe_timeout),
            fetch_timeout: secs_var(&var, "ARXIV_EXPORT_FETCH_TIMEOUT_SECS", defaults.fetch_timeout),
            output_dir,
        }
    }
}

fn secs_var(var: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    match var(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                tracing::warn!("Ignoring {}={:?}: expected a positive number of seconds", key, raw);
                default
            }
        },
    }
}
