/// `load_config` module: reads the optional YAML file and the required
/// environment variables and merges them into the core `ReportConfig`.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into typed sections; every section and
///   key is optional and falls back to the built-in defaults
/// - Read `NETBOX_API` and `NETBOX_TOKEN` from the environment (secrets never
///   live in the YAML file)
/// - Produce clear diagnostics: any failure here is surfaced at the CLI
///   boundary as an `anyhow::Error`
///
/// Accepted schema:
///
/// ```yaml
/// netbox:
///   page_limit: 1000
///   auth_scheme: Token
/// report:
///   debug_dump: /tmp/device_debug.json   # null disables the dump
///   include_virtual_machines: true
/// custom_fields:
///   backup: backup
///   monitoring: monitoring
/// taxonomy:
///   headings: [Network, Compute]
///   roles:
///     - { id: 1, heading: Network, subheading: Switches }
///   excluded_roles: [50]
/// ```
use anyhow::Result;
use netbox_report_core::config::{OutputFormat, ReportConfig, DEFAULT_DEBUG_DUMP};
use netbox_report_core::fetch::{FetchOptions, DEFAULT_AUTH_SCHEME, DEFAULT_PAGE_LIMIT};
use netbox_report_core::model::CustomFieldKeys;
use netbox_report_core::taxonomy::Taxonomy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ENV_API: &str = "NETBOX_API";
pub const ENV_TOKEN: &str = "NETBOX_TOKEN";
pub const MISSING_ENV_MESSAGE: &str = "Missing NETBOX_API or NETBOX_TOKEN environment variables.";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub netbox: NetboxSection,
    pub report: ReportSection,
    pub custom_fields: CustomFieldsSection,
    /// Replaces the built-in role table when present.
    pub taxonomy: Option<Taxonomy>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetboxSection {
    pub page_limit: u32,
    pub auth_scheme: String,
}

impl Default for NetboxSection {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            auth_scheme: DEFAULT_AUTH_SCHEME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub debug_dump: Option<PathBuf>,
    pub include_virtual_machines: bool,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            debug_dump: Some(PathBuf::from(DEFAULT_DEBUG_DUMP)),
            include_virtual_machines: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomFieldsSection {
    pub backup: String,
    pub monitoring: String,
}

impl Default for CustomFieldsSection {
    fn default() -> Self {
        let keys = CustomFieldKeys::default();
        Self {
            backup: keys.backup,
            monitoring: keys.monitoring,
        }
    }
}

impl CliConfig {
    /// Merges the file config with the NetBox URL into a core config.
    /// The output path is left at the format's default; callers override it.
    pub fn into_report_config(self, base_url: &str, format: OutputFormat) -> ReportConfig {
        let mut config = ReportConfig::new(base_url);
        config.format = format;
        config.output = format.default_inventory_output();
        config.debug_dump = self.report.debug_dump;
        config.fetch = FetchOptions {
            page_limit: self.netbox.page_limit,
            include_virtual_machines: self.report.include_virtual_machines,
        };
        config.custom_fields = CustomFieldKeys {
            backup: self.custom_fields.backup,
            monitoring: self.custom_fields.monitoring,
        };
        if let Some(taxonomy) = self.taxonomy {
            config.taxonomy = taxonomy;
        }
        config
    }
}

/// Loads the YAML config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.netbox.page_limit == 0 {
        error!(config_path = ?path_ref, "netbox.page_limit must be positive");
        anyhow::bail!("netbox.page_limit must be a positive integer");
    }
    if let Some(taxonomy) = &config.taxonomy {
        taxonomy.trace_loaded();
    }

    Ok(config)
}

/// Uses the file at `path` if given, otherwise the built-in defaults.
pub fn load_optional_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            info!("No config file given, using built-in defaults");
            Ok(CliConfig::default())
        }
    }
}

/// NetBox connection secrets, read from the environment only.
#[derive(Clone)]
pub struct Credentials {
    pub base_url: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        match (read(ENV_API), read(ENV_TOKEN)) {
            (Some(base_url), Some(token)) => {
                info!(base_url = %base_url, token_set = true, "NetBox credentials found in env");
                Ok(Self { base_url, token })
            }
            (api, token) => {
                error!(
                    api_set = api.is_some(),
                    token_set = token.is_some(),
                    "NetBox credentials missing in environment"
                );
                anyhow::bail!(MISSING_ENV_MESSAGE)
            }
        }
    }
}
