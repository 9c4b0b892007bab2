//! Content fetching: the [`ContentSource`] contract plus the static-HTTP
//! implementation. Browser-rendered sources plug in behind the same trait.

pub mod backoff;
pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::HttpSource;
pub use errors::FetchError;
pub use types::{Charset, FetchOptions, PageContent};

use async_trait::async_trait;

/// Fetches raw page markup for a URL. Implementations own all network
/// concerns (timeouts, retries, rendering); callers only see the decoded
/// markup, the effective URL, and the status code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<PageContent, FetchError>;
}
