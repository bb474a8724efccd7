use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::contract::{Page, PageFetcher};
use crate::error::FetchError;

pub const DEFAULT_PAGE_LIMIT: u32 = 1000;
pub const DEFAULT_AUTH_SCHEME: &str = "Token";

/// List endpoints the reports read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Devices,
    VirtualMachines,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Devices => "/api/dcim/devices/",
            Endpoint::VirtualMachines => "/api/virtualization/virtual-machines/",
        }
    }

    /// URL of the first page for a NetBox instance rooted at `base_url`.
    pub fn first_page_url(self, base_url: &str, page_limit: u32) -> String {
        format!(
            "{}{}?limit={}",
            base_url.trim_end_matches('/'),
            self.path(),
            page_limit
        )
    }
}

/// NetBox API client
pub struct NetBoxClient {
    token: String,
    auth_scheme: String,
    client: Client,
}

impl NetBoxClient {
    pub fn new(token: &str, auth_scheme: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            token: token.to_string(),
            auth_scheme: auth_scheme.to_string(),
            client,
        })
    }

    fn auth_header(&self) -> String {
        format!("{} {}", self.auth_scheme, self.token)
    }
}

#[async_trait]
impl PageFetcher for NetBoxClient {
    async fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        debug!(url = %url, "Requesting NetBox page");
        let resp = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| {
                error!(error = ?source, url = %url, "Failed to reach NetBox");
                FetchError::Transport {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, url = %url, "NetBox API returned error");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Page>().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to parse NetBox page JSON");
            FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Follows `next` links from `first_url` until the API reports no further
/// page, returning every result in the order received.
pub async fn fetch_all<F>(fetcher: &F, first_url: &str) -> Result<Vec<serde_json::Value>, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let mut results = Vec::new();
    let mut next = Some(first_url.to_string());
    let mut page_no = 0usize;

    while let Some(url) = next {
        page_no += 1;
        let page = fetcher.get_page(&url).await?;
        info!(
            url = %url,
            page = page_no,
            items = page.results.len(),
            total = ?page.count,
            "Fetched NetBox page"
        );
        results.extend(page.results);
        next = page.next.map(|link| resolve_next(first_url, &link));
    }

    Ok(results)
}

/// NetBox normally returns absolute `next` links; relative ones are resolved
/// against the origin of the first request.
fn resolve_next(first_url: &str, next: &str) -> String {
    if !next.starts_with('/') {
        return next.to_string();
    }
    let origin_end = first_url
        .find("://")
        .map(|scheme_end| {
            let after = scheme_end + 3;
            first_url[after..]
                .find('/')
                .map(|i| after + i)
                .unwrap_or(first_url.len())
        })
        .unwrap_or(0);
    format!("{}{}", &first_url[..origin_end], next)
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub page_limit: u32,
    pub include_virtual_machines: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            include_virtual_machines: true,
        }
    }
}

/// Raw API payloads as received, before decoding.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawInventory {
    pub devices: Vec<serde_json::Value>,
    pub virtual_machines: Vec<serde_json::Value>,
}

/// Fetches devices and then, if enabled, virtual machines. Requests are made
/// one after the other; any failure aborts the whole fetch.
pub async fn fetch_inventory<F>(
    fetcher: &F,
    base_url: &str,
    options: FetchOptions,
) -> Result<RawInventory, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let devices_url = Endpoint::Devices.first_page_url(base_url, options.page_limit);
    let devices = fetch_all(fetcher, &devices_url).await?;
    info!(count = devices.len(), "Fetched all devices");

    let virtual_machines = if options.include_virtual_machines {
        let vms_url = Endpoint::VirtualMachines.first_page_url(base_url, options.page_limit);
        let vms = fetch_all(fetcher, &vms_url).await?;
        info!(count = vms.len(), "Fetched all virtual machines");
        vms
    } else {
        Vec::new()
    };

    Ok(RawInventory {
        devices,
        virtual_machines,
    })
}

/// Writes the raw payloads as pretty JSON. Failures are logged and ignored:
/// the dump is a debugging aid, not part of the report.
pub fn write_debug_dump(path: &Path, raw: &RawInventory) {
    let json = match serde_json::to_string_pretty(raw) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = ?e, "Failed to serialise debug dump");
            return;
        }
    };
    match std::fs::write(path, json) {
        Ok(()) => info!(
            path = %path.display(),
            devices = raw.devices.len(),
            virtual_machines = raw.virtual_machines.len(),
            "Wrote raw API debug dump"
        ),
        Err(e) => warn!(error = ?e, path = %path.display(), "Failed to write debug dump"),
    }
}
