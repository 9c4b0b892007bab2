use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html, Selector};

use crate::extractor::{locator::Locator, model::TextBlock, normalize_ws, visibility};

/// Depth-first document-order walk producing the flat ordered block
/// sequence. Adjacent inline content (text nodes plus inline descendant
/// elements) within one block-level ancestor merges into a single block;
/// each block-level descendant starts a block of its own.
pub(super) fn walk(doc: &Html, ignore: &[Selector]) -> Vec<TextBlock> {
    let root = doc.root_element();
    let mut blocks = Vec::new();
    let locator = Locator::document().child(root.value().name(), 1);
    let lang = root.value().attr("lang");
    visit(root, &locator, lang, ignore, &mut blocks);
    blocks
}

fn visit(
    element: ElementRef,
    locator: &Locator,
    inherited_lang: Option<&str>,
    ignore: &[Selector],
    out: &mut Vec<TextBlock>,
) {
    let lang = element.value().attr("lang").or(inherited_lang);

    let mut pieces = Vec::new();
    collect_inline_text(element, ignore, &mut pieces);
    let text = normalize_ws(&pieces.join(" "));
    if !text.is_empty() {
        out.push(TextBlock {
            text,
            locator: locator.clone(),
            tag: element.value().name().to_string(),
            attributes: attributes_of_interest(&element, lang),
            is_visible: true,
        });
    }

    // Sibling indices count every same-tag element child, including excluded
    // ones, so locators stay stable when the denylist changes.
    let mut tag_counts: HashMap<String, usize> = HashMap::new();
    for child in element.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = child_el.value().name().to_string();
        let count = tag_counts.entry(tag.clone()).or_insert(0);
        *count += 1;
        let index = *count;

        if visibility::is_inline_tag(&tag) || visibility::is_excluded(&child_el, ignore) {
            continue;
        }
        visit(child_el, &locator.child(&tag, index), lang, ignore, out);
    }
}

fn collect_inline_text(element: ElementRef, ignore: &[Selector], out: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let tag = child_el.value().name();
            if !visibility::is_inline_tag(tag) || visibility::is_excluded(&child_el, ignore) {
                continue;
            }
            collect_inline_text(child_el, ignore, out);
        }
    }
}

fn attributes_of_interest(
    element: &ElementRef,
    lang: Option<&str>,
) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    if let Some(lang) = lang {
        attributes.insert("lang".to_string(), lang.to_string());
    }
    for key in ["data-i18n", "class"] {
        if let Some(value) = element.value().attr(key) {
            attributes.insert(key.to_string(), value.to_string());
        }
    }
    attributes
}
