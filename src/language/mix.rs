use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::extractor::TextBlock;
use crate::language::detector::LanguageDetect;

/// Bucket for blocks the detector could not decide on.
pub const UNKNOWN_LANG: &str = "unknown";

/// Document-level histogram of detected language probability mass. Mass per
/// language lies in [0, 1] and the total sums to at most 1. The BTreeMap
/// keys give deterministic lexical iteration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LanguageMix {
    mass: BTreeMap<String, f64>,
}

impl LanguageMix {
    /// Build a mix directly from per-language probability mass. Intended for
    /// callers that already hold a distribution (and for tests).
    pub fn from_probabilities(mass: BTreeMap<String, f64>) -> Self {
        Self { mass }
    }

    /// Probability mass for one language code, zero when absent.
    pub fn probability(&self, language: &str) -> f64 {
        self.mass.get(language).copied().unwrap_or(0.0)
    }

    /// Language with the highest mass; ties resolve to the lexically
    /// smallest code.
    pub fn dominant(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (lang, &mass) in &self.mass {
            if best.is_none_or(|(_, m)| mass > m) {
                best = Some((lang.as_str(), mass));
            }
        }
        best
    }

    /// Percentages 0-100 per language, for report display.
    pub fn percentages(&self) -> BTreeMap<String, f64> {
        self.mass
            .iter()
            .map(|(lang, mass)| (lang.clone(), mass * 100.0))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.mass.iter().map(|(l, &m)| (l.as_str(), m))
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }
}

/// Aggregate per-block detections into the document language mix. Each
/// block's weight is its character count; blocks shorter than the configured
/// minimum carry too little signal and are excluded here (they still flow to
/// the verifiers untouched). Detection failure degrades to [`UNKNOWN_LANG`].
pub fn aggregate(
    blocks: &[TextBlock],
    detector: &dyn LanguageDetect,
    config: &AnalyzerConfig,
) -> LanguageMix {
    let min_chars = config.detection.min_block_chars;
    let mut mass: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_chars = 0usize;

    for block in blocks {
        let chars = block.text.chars().count();
        if chars < min_chars {
            continue;
        }
        total_chars += chars;

        match detector.detect(&block.text).top() {
            Some((lang, probability)) => {
                *mass.entry(lang.to_string()).or_insert(0.0) += probability * chars as f64;
            }
            None => {
                *mass.entry(UNKNOWN_LANG.to_string()).or_insert(0.0) += chars as f64;
            }
        }
    }

    if total_chars == 0 {
        debug!("no blocks long enough for language aggregation");
        return LanguageMix::default();
    }

    for value in mass.values_mut() {
        *value /= total_chars as f64;
    }
    LanguageMix { mass }
}
