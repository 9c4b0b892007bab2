use std::sync::LazyLock;

use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use url::Url;

use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageContent},
};

static HEADER_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// Decode a raw HTTP body into UTF-8 markup, resolving the charset from the
/// Content-Type header, a `<meta charset>` declaration, or byte sniffing.
pub fn decode_response(
    final_url: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> Result<PageContent, FetchError> {
    let encoding = resolve_encoding(content_type, &body_bytes);
    let charset = Charset::from_encoding(encoding);

    let (decoded, _, had_errors) = encoding.decode(&body_bytes);
    if had_errors && decoded.trim().is_empty() {
        return Err(FetchError::Charset(format!(
            "body could not be decoded as {}",
            encoding.name()
        )));
    }

    Ok(PageContent {
        final_url,
        status,
        raw_markup: decoded.into_owned(),
        charset,
        fetched_at: Utc::now(),
    })
}

fn resolve_encoding(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    // 1. Content-Type header charset
    if let Some(captures) = HEADER_CHARSET_REGEX.captures(content_type)
        && let Some(label) = captures.get(1)
        && let Some(encoding) = Encoding::for_label(label.as_str().as_bytes())
    {
        return encoding;
    }

    // 2. <meta charset> in the first 4KB
    let head = &body_bytes[..body_bytes.len().min(4096)];
    let head_str = String::from_utf8_lossy(head);
    if let Some(captures) = META_CHARSET_REGEX.captures(&head_str)
        && let Some(label) = captures.get(1)
        && let Some(encoding) = Encoding::for_label(label.as_str().as_bytes())
    {
        return encoding;
    }

    // 3. Byte-frequency sniffing
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body_bytes.len() <= 4096);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_decode_utf8_from_header() {
        let body = Bytes::from("<html><body>Héllo</body></html>".as_bytes().to_vec());
        let page = decode_response(url(), StatusCode::OK, body, "text/html; charset=utf-8")
            .unwrap();
        assert_eq!(page.charset, Charset::Utf8);
        assert!(page.raw_markup.contains("Héllo"));
    }

    #[test]
    fn test_decode_meta_charset() {
        let mut body = b"<html><head><meta charset=\"windows-1252\"></head><body>caf".to_vec();
        body.push(0xE9); // 'é' in windows-1252
        body.extend_from_slice(b"</body></html>");
        let page = decode_response(url(), StatusCode::OK, Bytes::from(body), "text/html").unwrap();
        assert_eq!(page.charset, Charset::Windows1252);
        assert!(page.raw_markup.contains("café"));
    }

    #[test]
    fn test_decode_sniffed_fallback() {
        let body = Bytes::from("<html><body>plain ascii</body></html>".as_bytes().to_vec());
        let page = decode_response(url(), StatusCode::OK, body, "text/html").unwrap();
        assert!(page.raw_markup.contains("plain ascii"));
    }
}
