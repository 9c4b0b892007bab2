//! Language identification and document-level aggregation.

pub mod detector;
pub mod mix;

pub use detector::{Detection, LanguageDetect, WhatlangDetector};
pub use mix::{LanguageMix, UNKNOWN_LANG, aggregate};
