use scraper::{ElementRef, Selector};
use tracing::warn;

/// Tags whose content is never visible text. A subtree rooted at any of
/// these is dropped before downstream stages, never marked and passed
/// through.
const DENY_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "title", "iframe",
    "svg", "canvas", "object", "embed",
];

/// Inline elements whose text merges into the enclosing block-level ancestor.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark",
    "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

pub(super) fn is_denied_tag(tag: &str) -> bool {
    DENY_TAGS.contains(&tag)
}

pub(super) fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

/// Inline hidden-state heuristics: `hidden`, `aria-hidden="true"`,
/// `type="hidden"`, and `display:none`/`visibility:hidden` style fragments.
pub(super) fn is_hidden(element: &ElementRef) -> bool {
    let value = element.value();

    if value.attr("hidden").is_some() {
        return true;
    }
    if value.attr("aria-hidden") == Some("true") {
        return true;
    }
    if value.attr("type") == Some("hidden") {
        return true;
    }
    if let Some(style) = value.attr("style") {
        let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        let style = style.to_ascii_lowercase();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }
    false
}

/// Compile the configured selector denylist, skipping invalid selectors with
/// a warning rather than failing extraction.
pub(super) fn compile_ignore_selectors(raw: &[String]) -> Vec<Selector> {
    raw.iter()
        .filter_map(|s| match Selector::parse(s) {
            Ok(selector) => Some(selector),
            Err(err) => {
                warn!("ignoring unparseable selector '{}': {}", s, err);
                None
            }
        })
        .collect()
}

/// A block is dropped if ANY rule fires: tag denylist, selector denylist, or
/// hidden-state heuristics.
pub(super) fn is_excluded(element: &ElementRef, ignore: &[Selector]) -> bool {
    let tag = element.value().name();
    if is_denied_tag(tag) || is_hidden(element) {
        return true;
    }
    ignore.iter().any(|selector| selector.matches(element))
}
