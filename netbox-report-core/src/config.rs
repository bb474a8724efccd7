use std::path::PathBuf;

use tracing::{debug, info};

use crate::fetch::FetchOptions;
use crate::model::CustomFieldKeys;
use crate::taxonomy::Taxonomy;

pub const DEFAULT_DEBUG_DUMP: &str = "/tmp/device_debug.json";
pub const DEFAULT_COUNTS_OUTPUT: &str = "netbox_device_report.pdf";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Xlsx,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    pub fn default_inventory_output(self) -> PathBuf {
        PathBuf::from(format!("netbox_inventory_report.{}", self.extension()))
    }
}

/// Everything a report run needs apart from the HTTP client itself.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub base_url: String,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Where raw API payloads are dumped; `None` disables the dump.
    pub debug_dump: Option<PathBuf>,
    pub fetch: FetchOptions,
    pub custom_fields: CustomFieldKeys,
    pub taxonomy: Taxonomy,
}

impl ReportConfig {
    /// Defaults for an inventory report against `base_url`.
    pub fn new(base_url: &str) -> Self {
        let format = OutputFormat::default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            output: format.default_inventory_output(),
            format,
            debug_dump: Some(PathBuf::from(DEFAULT_DEBUG_DUMP)),
            fetch: FetchOptions::default(),
            custom_fields: CustomFieldKeys::default(),
            taxonomy: Taxonomy::builtin(),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            output = %self.output.display(),
            format = ?self.format,
            page_limit = self.fetch.page_limit,
            include_virtual_machines = self.fetch.include_virtual_machines,
            "Loaded ReportConfig"
        );
        debug!(?self, "ReportConfig loaded (full debug)");
    }
}
