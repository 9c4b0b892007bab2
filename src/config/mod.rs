//! Configuration handling for the analysis pipeline.
//!
//! All tunables live in one immutable [`AnalyzerConfig`] value that is
//! threaded explicitly through every stage call; nothing reads ambient
//! global state. `AnalyzerConfig::from_env` loads overrides from
//! `TRANSLINT_*` environment variables with sensible development defaults.

use std::collections::BTreeSet;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable names, public so tests and glue code can refer to them.
pub const ENV_TARGET_LANGUAGE: &str = "TRANSLINT_TARGET_LANGUAGE";
pub const ENV_RENDER_JS: &str = "TRANSLINT_RENDER_JS";
pub const ENV_LEAK_THRESHOLD: &str = "TRANSLINT_LEAK_THRESHOLD";
pub const ENV_IGNORE_SELECTORS: &str = "TRANSLINT_IGNORE_SELECTORS";
pub const ENV_WHITELIST: &str = "TRANSLINT_WHITELIST";
pub const ENV_LT_SERVER_URL: &str = "TRANSLINT_LANGUAGETOOL_URL";
pub const ENV_MIN_BLOCK_CHARS: &str = "TRANSLINT_MIN_BLOCK_CHARS";
pub const ENV_BATCH_CONCURRENCY: &str = "TRANSLINT_BATCH_CONCURRENCY";

const DEFAULT_TARGET_LANGUAGE: &str = "en";
const DEFAULT_LEAK_THRESHOLD: f64 = 0.08;
const DEFAULT_LT_SERVER_URL: &str = "http://localhost:8081";
const DEFAULT_MIN_BLOCK_CHARS: usize = 10;
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Expected target language and rendering mode for a page under analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// ISO 639-1 language code the page is supposed to be in.
    pub language: String,
    /// Whether the content source should render JavaScript before extraction.
    pub render_js: bool,
}

/// Rule tunables shared by the verifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Maximum tolerated non-target probability mass (0-1) before a
    /// document-level leakage issue is emitted.
    pub leak_threshold: f64,
    /// CSS selectors whose subtrees are excluded from extraction.
    pub ignore_selectors: Vec<String>,
    /// Foreign terms and phrases that never count as leakage.
    pub whitelist: BTreeSet<String>,
    /// Minimum occurrences of the majority translation before a terminology
    /// inconsistency is reported.
    pub repetition_threshold: usize,
}

/// Grammar/spell service endpoint (LanguageTool-compatible HTTP contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarConfig {
    pub server_url: String,
    pub timeout_secs: u64,
    /// Confidence assigned to matches whose rule reports no certainty.
    pub default_confidence: f64,
    pub enabled: bool,
}

/// Language detection tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Blocks shorter than this (in chars) are excluded from the document
    /// language mix; they still flow through to the verifiers untouched.
    pub min_block_chars: usize,
}

/// Per-verifier minimum confidence before an issue is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFloors {
    pub leakage: f64,
    pub placeholder: f64,
}

/// HTTP fetch limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_body_bytes: u64,
    /// Retries for retriable fetch failures (5xx, DNS, timeouts).
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_body_bytes: 5 * 1024 * 1024,
            max_retries: 2,
        }
    }
}

/// Batch analysis pool size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub concurrency: usize,
}

/// Complete analyzer configuration, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub target: TargetConfig,
    pub rules: RulesConfig,
    pub grammar: GrammarConfig,
    pub detection: DetectionConfig,
    pub confidence_floors: ConfidenceFloors,
    pub fetch: FetchConfig,
    pub batch: BatchConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig {
                language: DEFAULT_TARGET_LANGUAGE.to_string(),
                render_js: false,
            },
            rules: RulesConfig {
                leak_threshold: DEFAULT_LEAK_THRESHOLD,
                ignore_selectors: Vec::new(),
                whitelist: BTreeSet::new(),
                repetition_threshold: 2,
            },
            grammar: GrammarConfig {
                server_url: DEFAULT_LT_SERVER_URL.to_string(),
                timeout_secs: 30,
                default_confidence: 0.7,
                enabled: true,
            },
            detection: DetectionConfig {
                min_block_chars: DEFAULT_MIN_BLOCK_CHARS,
            },
            confidence_floors: ConfidenceFloors {
                leakage: 0.8,
                placeholder: 0.6,
            },
            fetch: FetchConfig::default(),
            batch: BatchConfig {
                concurrency: DEFAULT_BATCH_CONCURRENCY,
            },
        }
    }
}

impl AnalyzerConfig {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(lang) = env::var(ENV_TARGET_LANGUAGE) {
            config.target.language = lang;
        }
        if let Ok(render) = env::var(ENV_RENDER_JS) {
            config.target.render_js = matches!(render.as_str(), "1" | "true" | "yes");
        }
        if let Ok(raw) = env::var(ENV_LEAK_THRESHOLD) {
            let value: f64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "rules.leak_threshold",
                reason: format!("'{raw}' is not a number"),
            })?;
            config.rules.leak_threshold = value;
        }
        if let Ok(raw) = env::var(ENV_IGNORE_SELECTORS) {
            config.rules.ignore_selectors = split_list(&raw);
        }
        if let Ok(raw) = env::var(ENV_WHITELIST) {
            config.rules.whitelist = split_list(&raw).into_iter().collect();
        }
        if let Ok(url) = env::var(ENV_LT_SERVER_URL) {
            config.grammar.server_url = url;
        }
        if let Ok(raw) = env::var(ENV_MIN_BLOCK_CHARS) {
            config.detection.min_block_chars =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "detection.min_block_chars",
                    reason: format!("'{raw}' is not an integer"),
                })?;
        }
        if let Ok(raw) = env::var(ENV_BATCH_CONCURRENCY) {
            config.batch.concurrency = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "batch.concurrency",
                reason: format!("'{raw}' is not an integer"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values outside their documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rules.leak_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "rules.leak_threshold",
                reason: format!("{} is outside [0, 1]", self.rules.leak_threshold),
            });
        }
        for (field, value) in [
            ("confidence_floors.leakage", self.confidence_floors.leakage),
            (
                "confidence_floors.placeholder",
                self.confidence_floors.placeholder,
            ),
            ("grammar.default_confidence", self.grammar.default_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
