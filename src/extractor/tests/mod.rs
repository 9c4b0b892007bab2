use crate::config::AnalyzerConfig;
use crate::extractor::{ExtractionError, extract};

fn config() -> AnalyzerConfig {
    AnalyzerConfig::default()
}

fn config_with_selectors(selectors: &[&str]) -> AnalyzerConfig {
    let mut cfg = AnalyzerConfig::default();
    cfg.rules.ignore_selectors = selectors.iter().map(|s| s.to_string()).collect();
    cfg
}

#[test]
fn test_blocks_in_document_order_with_locators() {
    let html = r#"<html><head><title>Order</title></head><body>
        <div><h1>First heading</h1><p>Second paragraph</p></div>
        <p>Third paragraph</p>
    </body></html>"#;

    let extraction = extract(html, &config()).unwrap();
    let texts: Vec<&str> = extraction.blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["First heading", "Second paragraph", "Third paragraph"]
    );
    assert_eq!(
        extraction.blocks[0].locator.to_string(),
        "/html[1]/body[1]/div[1]/h1[1]"
    );
    assert_eq!(
        extraction.blocks[1].locator.to_string(),
        "/html[1]/body[1]/div[1]/p[1]"
    );
    assert_eq!(
        extraction.blocks[2].locator.to_string(),
        "/html[1]/body[1]/p[1]"
    );
    assert_eq!(extraction.title.as_deref(), Some("Order"));
}

#[test]
fn test_inline_elements_merge_into_one_block() {
    let html = r#"<html><body>
        <p>Visit <a href="/about">our <strong>about</strong> page</a> today.</p>
    </body></html>"#;

    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.blocks.len(), 1);
    assert_eq!(extraction.blocks[0].text, "Visit our about page today.");
    assert_eq!(extraction.blocks[0].tag, "p");
}

#[test]
fn test_script_style_and_hidden_dropped() {
    let html = r#"<html><body>
        <script>var x = "not text";</script>
        <style>.a { color: red }</style>
        <p hidden>invisible</p>
        <p aria-hidden="true">also invisible</p>
        <p style="display: none">styled away</p>
        <p>the only visible paragraph</p>
    </body></html>"#;

    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.blocks.len(), 1);
    assert_eq!(extraction.blocks[0].text, "the only visible paragraph");
}

#[test]
fn test_ignore_selector_drops_subtree() {
    let html = r#"<html><body>
        <div class="cookie-banner"><p>Accept all cookies</p></div>
        <div id="main"><p>Real content here</p></div>
    </body></html>"#;

    let extraction = extract(html, &config_with_selectors(&[".cookie-banner"])).unwrap();
    assert_eq!(extraction.blocks.len(), 1);
    assert_eq!(extraction.blocks[0].text, "Real content here");
}

#[test]
fn test_lang_attribute_inherited() {
    let html = r#"<html lang="es"><body>
        <p>Hola mundo</p>
        <div lang="en"><p>Hello world</p></div>
    </body></html>"#;

    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.declared_language.as_deref(), Some("es"));
    assert_eq!(extraction.blocks[0].declared_lang(), Some("es"));
    assert_eq!(extraction.blocks[1].declared_lang(), Some("en"));
}

#[test]
fn test_repeated_text_kept_at_distinct_locators() {
    let html = r#"<html><body>
        <button data-i18n="submit">Enviar</button>
        <button data-i18n="submit">Enviar</button>
    </body></html>"#;

    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.blocks.len(), 2);
    assert_eq!(extraction.blocks[0].text, extraction.blocks[1].text);
    assert_ne!(extraction.blocks[0].locator, extraction.blocks[1].locator);
    assert_eq!(extraction.blocks[0].term_key(), Some("submit"));
}

#[test]
fn test_whitespace_normalized() {
    let html = "<html><body><p>  spaced \n\t  out   text </p></body></html>";
    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.blocks[0].text, "spaced out text");
}

#[test]
fn test_sibling_indices_stable_under_denylist() {
    // The hidden first paragraph still counts toward sibling indices, so the
    // visible paragraph keeps the same locator whether or not its sibling is
    // excluded.
    let html = r#"<html><body><p hidden>gone</p><p>kept</p></body></html>"#;
    let extraction = extract(html, &config()).unwrap();
    assert_eq!(extraction.blocks.len(), 1);
    assert_eq!(
        extraction.blocks[0].locator.to_string(),
        "/html[1]/body[1]/p[2]"
    );
}

#[test]
fn test_empty_input_is_error() {
    assert!(matches!(
        extract("   ", &config()),
        Err(ExtractionError::EmptyDocument)
    ));
    assert!(matches!(
        extract("just plain words, no markup at all", &config()),
        Err(ExtractionError::NotMarkup)
    ));
}

#[test]
fn test_extraction_is_deterministic() {
    let html = r#"<html lang="en"><head><title>Det</title></head><body>
        <div><p>alpha</p><p>beta</p><span>stray</span></div>
        <ul><li>one</li><li>two</li></ul>
    </body></html>"#;

    let first = extract(html, &config()).unwrap();
    let second = extract(html, &config()).unwrap();
    assert_eq!(first, second);
}
