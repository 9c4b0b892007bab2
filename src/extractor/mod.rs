//! Text extraction: parsed markup in, ordered [`TextBlock`] sequence out.
//!
//! The walk honors a static tag denylist, the configured CSS-selector
//! denylist, and inline hidden-state heuristics; anything excluded is
//! dropped before downstream stages ever see it. Repeated identical text at
//! different locators stays separate, since each occurrence is a distinct
//! correction target.

pub mod locator;
pub mod model;
mod visibility;
mod walker;

#[cfg(test)]
mod tests;

pub use locator::Locator;
pub use model::{Extraction, TextBlock};

use std::sync::LazyLock;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::config::AnalyzerConfig;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));

/// Unparseable markup. Fatal to the analysis of the URL it occurs on.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("input does not look like markup")]
    NotMarkup,
}

/// Extract the visible text blocks and page metadata from raw markup.
pub fn extract(raw_markup: &str, config: &AnalyzerConfig) -> Result<Extraction, ExtractionError> {
    let trimmed = raw_markup.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }
    if !trimmed.contains('<') {
        return Err(ExtractionError::NotMarkup);
    }

    let doc = Html::parse_document(raw_markup);

    let title = doc
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| normalize_ws(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());
    let declared_language = doc
        .root_element()
        .value()
        .attr("lang")
        .map(str::to_string);

    let ignore = visibility::compile_ignore_selectors(&config.rules.ignore_selectors);
    let blocks = walker::walk(&doc, &ignore);
    debug!("extracted {} text blocks", blocks.len());

    Ok(Extraction {
        blocks,
        title,
        declared_language,
    })
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
