//! Authoring client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

const DEFAULT_ENGINE_URL: &str = "http://localhost:3000";
const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1_500;
const DEFAULT_ENGINE_REQUEST_TIMEOUT_MS: u64 = 30_000;
const FALLBACK_SNAPSHOT_DIR: &str = ".sessioncraft/drafts";

#[derive(Debug, Clone)]
pub struct AuthorConfig {
    pub engine_url: String,
    pub autosave_debounce: Duration,
    pub request_timeout: Duration,
    /// Where local draft snapshots are written when the engine is unreachable.
    pub snapshot_dir: PathBuf,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AuthorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            engine_url: get("SESSIONCRAFT_ENGINE_URL")
                .unwrap_or_else(|| DEFAULT_ENGINE_URL.into()),
            autosave_debounce: Duration::from_millis(parse_or(
                "AUTOSAVE_DEBOUNCE_MS",
                get("AUTOSAVE_DEBOUNCE_MS"),
                DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            )),
            request_timeout: Duration::from_millis(parse_or(
                "ENGINE_REQUEST_TIMEOUT_MS",
                get("ENGINE_REQUEST_TIMEOUT_MS"),
                DEFAULT_ENGINE_REQUEST_TIMEOUT_MS,
            )),
            snapshot_dir: get("SESSIONCRAFT_SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_snapshot_dir),
        }
    }
}

/// Platform data directory, e.g. `~/.local/share/sessioncraft/drafts` on Linux.
fn default_snapshot_dir() -> PathBuf {
    match ProjectDirs::from("io", "sessioncraft", "author") {
        Some(dirs) => dirs.data_dir().join("drafts"),
        None => {
            tracing::warn!(
                fallback = FALLBACK_SNAPSHOT_DIR,
                "No platform data directory, using relative snapshot path"
            );
            PathBuf::from(FALLBACK_SNAPSHOT_DIR)
        }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
        None => default,
    }
}
