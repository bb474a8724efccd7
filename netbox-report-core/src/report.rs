//! High-level pipeline: fetch → classify → aggregate → render → write.
//!
//! Two report shapes are produced from the same building blocks:
//!   - [`generate_counts_report`]: devices counted per site and role name, PDF only
//!   - [`generate_inventory_report`]: devices and virtual machines classified
//!     into the heading/subheading taxonomy, PDF or XLSX
//!
//! # Error Handling
//! Fail fast: the first fetch, decode, render or write error is returned and
//! nothing is written. The only tolerated failure is the debug dump.
//!
//! # Callable From
//! - The CLI crate, with a real [`crate::fetch::NetBoxClient`]
//! - Integration tests, with `MockPageFetcher`

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{error, info};

use crate::aggregate::{Inventory, RoleCounts};
use crate::config::{OutputFormat, ReportConfig};
use crate::contract::PageFetcher;
use crate::error::{FetchError, ReportError};
use crate::fetch::{fetch_all, fetch_inventory, write_debug_dump, Endpoint, RawInventory};
use crate::layout::{counts_document, inventory_document};
use crate::model::{CustomFieldKeys, Item, NbDevice, NbVirtualMachine};
use crate::render::{pdf::render_pdf, xlsx::render_xlsx};

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Items that made it into the report.
    pub items: usize,
    pub sites: usize,
    pub bytes: usize,
}

/// Decodes raw payloads into report items, devices first.
pub fn decode_items(raw: RawInventory, keys: &CustomFieldKeys) -> Result<Vec<Item>, FetchError> {
    let mut items = Vec::with_capacity(raw.devices.len() + raw.virtual_machines.len());
    for value in raw.devices {
        let device: NbDevice = serde_json::from_value(value).map_err(|e| FetchError::Decode {
            url: Endpoint::Devices.path().to_string(),
            message: e.to_string(),
        })?;
        items.push(Item::from_device(device, keys));
    }
    for value in raw.virtual_machines {
        let vm: NbVirtualMachine = serde_json::from_value(value).map_err(|e| FetchError::Decode {
            url: Endpoint::VirtualMachines.path().to_string(),
            message: e.to_string(),
        })?;
        items.push(Item::from_virtual_machine(vm, keys));
    }
    Ok(items)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    };
    write().map_err(|source| {
        error!(error = ?source, path = %path.display(), "[REPORT][ERROR] Failed to write report");
        ReportError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "[REPORT] Wrote report");
    Ok(())
}

pub async fn generate_counts_report<F>(
    config: &ReportConfig,
    fetcher: &F,
    date: NaiveDate,
) -> Result<ReportOutcome, ReportError>
where
    F: PageFetcher + ?Sized,
{
    info!("[REPORT] Starting device count report");

    let url = Endpoint::Devices.first_page_url(&config.base_url, config.fetch.page_limit);
    let raw = RawInventory {
        devices: fetch_all(fetcher, &url).await?,
        virtual_machines: Vec::new(),
    };
    if let Some(path) = &config.debug_dump {
        write_debug_dump(path, &raw);
    }

    let items = decode_items(raw, &config.custom_fields)?;
    let counts = RoleCounts::accumulate(&items);
    info!(
        sites = counts.sites.len(),
        devices = counts.total(),
        "[REPORT] Counted devices by site and role"
    );

    let bytes = render_pdf(&counts_document(&counts, date));
    write_output(&config.output, &bytes)?;

    Ok(ReportOutcome {
        output: config.output.clone(),
        format: OutputFormat::Pdf,
        items: counts.total(),
        sites: counts.sites.len(),
        bytes: bytes.len(),
    })
}

pub async fn generate_inventory_report<F>(
    config: &ReportConfig,
    fetcher: &F,
    date: NaiveDate,
) -> Result<ReportOutcome, ReportError>
where
    F: PageFetcher + ?Sized,
{
    info!(format = ?config.format, "[REPORT] Starting classified inventory report");

    let raw = fetch_inventory(fetcher, &config.base_url, config.fetch).await?;
    if let Some(path) = &config.debug_dump {
        write_debug_dump(path, &raw);
    }

    let items = decode_items(raw, &config.custom_fields)?;
    let fetched = items.len();
    let inventory = Inventory::accumulate(items, &config.taxonomy);
    info!(
        fetched,
        classified = inventory.total(),
        "[REPORT] Classified inventory"
    );

    let bytes = match config.format {
        OutputFormat::Pdf => render_pdf(&inventory_document(&inventory, &config.taxonomy, date)),
        OutputFormat::Xlsx => render_xlsx(&inventory, &config.taxonomy, date).map_err(|e| {
            error!(error = ?e, "[REPORT][ERROR] Spreadsheet rendering failed");
            ReportError::from(e)
        })?,
    };
    write_output(&config.output, &bytes)?;

    Ok(ReportOutcome {
        output: config.output.clone(),
        format: config.format,
        items: inventory.total(),
        sites: inventory.sites.len(),
        bytes: bytes.len(),
    })
}
