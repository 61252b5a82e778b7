//! Settings loaded from the environment.

use anyhow::{Context, Result};
use std::time::Duration;

use agentic_rag::backends::{DEFAULT_COLLECTION, DEFAULT_RETRIEVAL_URL};

/// Retrieval service settings.
///
/// The LLM endpoint is configured separately through `LLM_API_KEY`,
/// `LLM_BASE_URL`, `LLM_MODEL` and `LLM_TIMEOUT_SECS`, read by
/// [`chat_client::ChatClient::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub retrieval_base_url: String,
    pub collection_name: String,
    pub retrieval_timeout: Duration,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let retrieval_timeout = match lookup("RETRIEVAL_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .context("RETRIEVAL_TIMEOUT_SECS must be a valid number")?,
            ),
            None => Duration::from_secs(30),
        };

        Ok(Self {
            retrieval_base_url: lookup("RETRIEVAL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_RETRIEVAL_URL.to_string()),
            collection_name: lookup("COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            retrieval_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.retrieval_base_url, DEFAULT_RETRIEVAL_URL);
        assert_eq!(settings.collection_name, "papers_chunks_collection");
        assert_eq!(settings.retrieval_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("RETRIEVAL_BASE_URL", "http://search:9000/v2"),
            ("COLLECTION_NAME", "theses"),
            ("RETRIEVAL_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(settings.retrieval_base_url, "http://search:9000/v2");
        assert_eq!(settings.collection_name, "theses");
        assert_eq!(settings.retrieval_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_is_error() {
        let err = Settings::from_lookup(lookup(&[("RETRIEVAL_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("RETRIEVAL_TIMEOUT_SECS"));
    }
}
