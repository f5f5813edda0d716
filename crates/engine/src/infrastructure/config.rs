//! Engine configuration from environment variables.

use std::time::Duration;

use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use crate::use_cases::GenerationConfig;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DATABASE_PATH: &str = "sessioncraft.db";
const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_LLM_MAX_RETRIES: u32 = 2;
const DEFAULT_RAG_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_TOPIC_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// SQLite file holding topics and drafts.
    pub database_path: String,
    /// JSON array of topics imported into the store at startup.
    pub topics_seed_path: Option<String>,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    /// `None` disables retrieval entirely.
    pub rag_base_url: Option<String>,
    pub rag_timeout: Duration,
    pub topic_search_limit: usize,
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl EngineConfig {
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
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port: parse_or(
                "SERVER_PORT",
                get("SERVER_PORT").or_else(|| get("PORT")),
                DEFAULT_SERVER_PORT,
            ),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.into()),
            topics_seed_path: get("TOPICS_SEED_PATH"),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .or_else(|| get("OLLAMA_URL"))
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.into()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
            llm_timeout: Duration::from_millis(parse_or(
                "LLM_TIMEOUT_MS",
                get("LLM_TIMEOUT_MS"),
                DEFAULT_LLM_TIMEOUT_MS,
            )),
            llm_max_retries: parse_or(
                "LLM_MAX_RETRIES",
                get("LLM_MAX_RETRIES"),
                DEFAULT_LLM_MAX_RETRIES,
            ),
            rag_base_url: get("RAG_BASE_URL"),
            rag_timeout: Duration::from_millis(parse_or(
                "RAG_TIMEOUT_MS",
                get("RAG_TIMEOUT_MS"),
                DEFAULT_RAG_TIMEOUT_MS,
            )),
            topic_search_limit: parse_or(
                "TOPIC_SEARCH_LIMIT",
                get("TOPIC_SEARCH_LIMIT"),
                DEFAULT_TOPIC_SEARCH_LIMIT,
            ),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            rag_timeout: self.rag_timeout,
            llm_timeout: self.llm_timeout,
            topic_limit: self.topic_search_limit,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_path, "sessioncraft.db");
        assert_eq!(config.llm_timeout, Duration::from_secs(60));
        assert_eq!(config.rag_timeout, Duration::from_secs(5));
        assert_eq!(config.topic_search_limit, 10);
        assert!(config.rag_base_url.is_none());
        assert!(config.topics_seed_path.is_none());
    }

    #[test]
    fn reads_aliases_and_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("OLLAMA_URL", "http://gpu:11434"),
            ("RAG_BASE_URL", "http://rag:9000"),
            ("RAG_TIMEOUT_MS", "250"),
            ("TOPICS_SEED_PATH", "seed/topics.json"),
        ]);
        assert_eq!(config.topics_seed_path.as_deref(), Some("seed/topics.json"));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.ollama_base_url, "http://gpu:11434");
        assert_eq!(config.rag_base_url.as_deref(), Some("http://rag:9000"));
        assert_eq!(config.rag_timeout, Duration::from_millis(250));
        assert_eq!(config.generation_config().rag_timeout, Duration::from_millis(250));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = config(&[("LLM_MAX_RETRIES", "lots"), ("RAG_BASE_URL", "  ")]);
        assert_eq!(config.llm_max_retries, 2);
        assert!(config.rag_base_url.is_none());
    }
}
