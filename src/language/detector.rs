use std::collections::BTreeMap;

use whatlang::{Lang, detect};

/// Outcome of language detection on one piece of text: a per-language
/// probability distribution. Empty when the detector cannot decide; callers
/// degrade that to the `unknown` bucket rather than aborting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    distribution: BTreeMap<String, f64>,
}

impl Detection {
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Degenerate distribution with all mass on one language. The trigram
    /// backend only reports its top candidate; richer backends can use
    /// [`Detection::from_distribution`].
    pub fn single(language: &str, confidence: f64) -> Self {
        let mut distribution = BTreeMap::new();
        distribution.insert(language.to_string(), confidence);
        Self { distribution }
    }

    pub fn from_distribution(distribution: BTreeMap<String, f64>) -> Self {
        Self { distribution }
    }

    /// Most probable language and its mass; ties resolve to the lexically
    /// smallest code. `None` when detection failed.
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (lang, &mass) in &self.distribution {
            if best.is_none_or(|(_, m)| mass > m) {
                best = Some((lang.as_str(), mass));
            }
        }
        best
    }

    pub fn probability(&self, language: &str) -> f64 {
        self.distribution.get(language).copied().unwrap_or(0.0)
    }

    pub fn is_unknown(&self) -> bool {
        self.distribution.is_empty()
    }
}

/// Pure, side-effect-free language identification. Trait-level so tests and
/// alternative backends (larger models, remote services) can substitute for
/// the built-in trigram detector.
pub trait LanguageDetect: Send + Sync {
    fn detect(&self, text: &str) -> Detection;
}

const MIN_CONFIDENCE: f64 = 0.25;

/// Default detector backed by whatlang trigram profiles.
#[derive(Debug, Default)]
pub struct WhatlangDetector;

impl LanguageDetect for WhatlangDetector {
    fn detect(&self, text: &str) -> Detection {
        let Some(info) = detect(text) else {
            return Detection::unknown();
        };
        if info.confidence() < MIN_CONFIDENCE {
            return Detection::unknown();
        }
        Detection::single(&lang_to_code(info.lang()), info.confidence())
    }
}

fn lang_to_code(lang: Lang) -> String {
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Rus => "ru".to_string(),
        Lang::Cmn => "zh".to_string(),
        Lang::Spa => "es".to_string(),
        Lang::Fra => "fr".to_string(),
        Lang::Deu => "de".to_string(),
        Lang::Jpn => "ja".to_string(),
        Lang::Kor => "ko".to_string(),
        Lang::Por => "pt".to_string(),
        Lang::Ita => "it".to_string(),
        Lang::Nld => "nl".to_string(),
        Lang::Pol => "pl".to_string(),
        Lang::Tur => "tr".to_string(),
        Lang::Swe => "sv".to_string(),
        Lang::Dan => "da".to_string(),
        Lang::Fin => "fi".to_string(),
        Lang::Heb => "he".to_string(),
        Lang::Ara => "ar".to_string(),
        Lang::Hin => "hi".to_string(),
        Lang::Tha => "th".to_string(),
        Lang::Vie => "vi".to_string(),
        _ => format!("{:?}", lang).to_lowercase(),
    }
}
