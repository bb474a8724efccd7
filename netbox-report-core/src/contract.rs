//! # contract: the seam between the report pipeline and the NetBox API
//!
//! The pipeline never talks to reqwest directly. It asks a [`PageFetcher`] for
//! one page at a time and follows the `next` link itself (see
//! [`crate::fetch::fetch_all`]). The production implementation is
//! [`crate::fetch::NetBoxClient`]; tests use the generated `MockPageFetcher`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; the mock is exported when the
//!   `test-export-mocks` feature is on (default), so integration tests and the
//!   CLI crate can build pipelines without a network.

use async_trait::async_trait;
use serde::Deserialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::FetchError;

/// One page of a NetBox list endpoint.
///
/// Results are kept as raw JSON so the same page can be written to the debug
/// dump verbatim and decoded into [`crate::model`] types afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Fetches a single page of a paginated NetBox endpoint.
///
/// `url` is absolute: either the first page URL built from the base URL, or
/// the `next` link returned by the previous page.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_page(&self, url: &str) -> Result<Page, FetchError>;
}
