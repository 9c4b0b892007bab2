use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GrammarConfig;
use crate::verify::VerifierError;

/// One match returned by the grammar/spell service: an offset range into the
/// checked text, a rule id, a message, and optional suggestions/certainty.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarMatch {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    pub rule: GrammarRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrammarRule {
    pub id: String,
    #[serde(rename = "issueType", default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub category: Option<GrammarCategory>,
    /// Certainty is optional in the contract; absent for stock LanguageTool.
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrammarCategory {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<GrammarMatch>,
}

/// HTTP client for a LanguageTool-compatible check endpoint, with a
/// concurrent response cache keyed by content hash so batch runs do not
/// re-check identical text.
pub struct LanguageToolClient {
    http: Client,
    server_url: String,
    cache: DashMap<String, Arc<Vec<GrammarMatch>>>,
}

impl LanguageToolClient {
    pub fn new(config: &GrammarConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            cache: DashMap::new(),
        }
    }

    pub async fn check(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Arc<Vec<GrammarMatch>>, VerifierError> {
        let cache_key = format!("{:x}", md5::compute(format!("{language}:{text}")));
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("grammar cache hit for {} chars", text.len());
            return Ok(cached.clone());
        }

        let endpoint = format!("{}/v2/check", self.server_url);
        let params = [("text", text), ("language", language)];
        let response = self
            .http
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| VerifierError::GrammarService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifierError::GrammarService(format!(
                "grammar service returned {}",
                response.status()
            )));
        }

        let parsed: CheckResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::GrammarService(format!("malformed response: {e}")))?;

        let matches = Arc::new(parsed.matches);
        self.cache.insert(cache_key, matches.clone());
        Ok(matches)
    }
}
