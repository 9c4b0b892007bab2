use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extractor::locator::Locator;

/// A contiguous unit of visible, whitespace-normalized text plus its
/// structural locator. Blocks are produced in document order; hidden or
/// denylisted content never becomes a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub locator: Locator,
    pub tag: String,
    /// Attributes of interest: inherited `lang`, `data-i18n` term keys,
    /// `class`. Other attributes are not retained.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub is_visible: bool,
}

impl TextBlock {
    /// Inherited or direct `lang` attribute, if any ancestor declared one.
    pub fn declared_lang(&self) -> Option<&str> {
        self.attributes.get("lang").map(String::as_str)
    }

    /// Translation key from a `data-i18n` attribute, if present.
    pub fn term_key(&self) -> Option<&str> {
        self.attributes.get("data-i18n").map(String::as_str)
    }
}

/// Output of text extraction: the ordered block sequence plus page metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub blocks: Vec<TextBlock>,
    pub title: Option<String>,
    /// `lang` attribute of the root element, when declared.
    pub declared_language: Option<String>,
}
