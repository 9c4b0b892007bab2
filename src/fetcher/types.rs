use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gb2312,
    Big5,
    Other(String),
}

impl Charset {
    // `Encoding::name` wants the 'static references encoding_rs hands out.
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gb2312
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }
}

/// Raw page content as produced by a [`super::ContentSource`].
#[derive(Debug)]
pub struct PageContent {
    pub final_url: Url,
    pub status: StatusCode,
    pub raw_markup: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}

/// Per-call fetch options, derived from the analyzer configuration.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub render_js: bool,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_body_bytes: u64,
}

impl FetchOptions {
    pub fn from_config(config: &crate::config::AnalyzerConfig) -> Self {
        Self {
            render_js: config.target.render_js,
            timeout: Duration::from_secs(config.fetch.timeout_secs),
            max_retries: config.fetch.max_retries,
            max_body_bytes: config.fetch.max_body_bytes,
        }
    }
}
