///
/// This module implements the CLI interface for netbox-report: command
/// parsing, config/env loading, and handing a real NetBox client to the core
/// report pipeline.
///
/// All business logic (fetching, classification, aggregation, rendering)
/// lives in the [`netbox-report-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: run the `netbox-report` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`netbox-report-core`]: ../../netbox-report-core/
use crate::load_config::{load_optional_config, Credentials};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use netbox_report_core::config::{OutputFormat, DEFAULT_COUNTS_OUTPUT};
use netbox_report_core::fetch::NetBoxClient;
use netbox_report_core::report::{generate_counts_report, generate_inventory_report, ReportOutcome};
use std::path::PathBuf;

/// CLI for netbox-report: render NetBox inventory reports.
#[derive(Parser)]
#[clap(
    name = "netbox-report",
    version,
    about = "Render NetBox devices and virtual machines as PDF or spreadsheet reports"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Xlsx,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Xlsx => OutputFormat::Xlsx,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count devices per site and role name (PDF)
    Counts {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Where to write the report
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Classify active devices and virtual machines by role per site
    Inventory {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Where to write the report
        #[clap(long)]
        output: Option<PathBuf>,
        #[clap(long, value_enum, default_value = "pdf")]
        format: FormatArg,
        /// Only report devices
        #[clap(long)]
        no_virtual_machines: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let today = Local::now().date_naive();

    let outcome: ReportOutcome = match cli.command {
        Commands::Counts { config, output } => {
            let credentials = Credentials::from_env()?;
            let file_config = load_optional_config(config.as_deref())?;
            let auth_scheme = file_config.netbox.auth_scheme.clone();
            let mut report_config =
                file_config.into_report_config(&credentials.base_url, OutputFormat::Pdf);
            report_config.output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_COUNTS_OUTPUT));
            report_config.trace_loaded();

            let client = NetBoxClient::new(&credentials.token, &auth_scheme)?;
            tracing::info!(command = "counts", "Starting device count report");
            generate_counts_report(&report_config, &client, today)
                .await
                .context("Device count report failed")?
        }
        Commands::Inventory {
            config,
            output,
            format,
            no_virtual_machines,
        } => {
            let credentials = Credentials::from_env()?;
            let file_config = load_optional_config(config.as_deref())?;
            let auth_scheme = file_config.netbox.auth_scheme.clone();
            let format = OutputFormat::from(format);
            let mut report_config = file_config.into_report_config(&credentials.base_url, format);
            if let Some(output) = output {
                report_config.output = output;
            }
            if no_virtual_machines {
                report_config.fetch.include_virtual_machines = false;
            }
            report_config.trace_loaded();

            let client = NetBoxClient::new(&credentials.token, &auth_scheme)?;
            tracing::info!(command = "inventory", "Starting inventory report");
            generate_inventory_report(&report_config, &client, today)
                .await
                .context("Inventory report failed")?
        }
    };

    tracing::info!(
        output = %outcome.output.display(),
        items = outcome.items,
        sites = outcome.sites,
        "Report complete"
    );
    println!("Report generated: {}", outcome.output.display());
    Ok(())
}
