use std::sync::Arc;

use translint::config::AnalyzerConfig;
use translint::language::{Detection, LanguageDetect};
use translint::verify::default_chain;
use translint::{Analyzer, fetcher::HttpSource};

/// Marker-based detector for deterministic end-to-end tests: Spanish
/// diacritics or common Spanish function words mean `es`, recognizable
/// English words mean `en`, anything else is undecidable.
pub struct StubDetector;

const SPANISH_MARKERS: [&str; 12] = [
    "ñ", "á", "é", "í", "ó", "¿", "hola", "bienvenido", "nuestro", "sitio", "gracias", "enviar",
];
const ENGLISH_MARKERS: [&str; 6] = ["the ", "welcome", " our ", " and ", " to ", "website"];

impl LanguageDetect for StubDetector {
    fn detect(&self, text: &str) -> Detection {
        let lower = text.to_lowercase();
        if SPANISH_MARKERS.iter().any(|m| lower.contains(m)) {
            return Detection::single("es", 1.0);
        }
        if ENGLISH_MARKERS
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()))
        {
            return Detection::single("en", 1.0);
        }
        Detection::unknown()
    }
}

/// Analyzer wired with real HTTP fetching and the full default chain, but
/// the deterministic stub detector.
pub fn stub_analyzer(config: AnalyzerConfig) -> Analyzer {
    let detector = Arc::new(StubDetector);
    let verifiers = default_chain(detector.clone(), &config);
    let source = Arc::new(HttpSource::new(&config.fetch));
    Analyzer::with_components(config, source, detector, verifiers)
}
