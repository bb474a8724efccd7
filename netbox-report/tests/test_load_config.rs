use netbox_report::load_config::{load_config, load_optional_config, Credentials, MISSING_ENV_MESSAGE};
use netbox_report_core::config::OutputFormat;
use netbox_report_core::taxonomy::{Classification, Taxonomy};
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
fn full_config_overrides_every_default() {
    let file = config_file(
        r#"
netbox:
  page_limit: 250
  auth_scheme: Bearer
report:
  debug_dump: ./tmp/raw.json
  include_virtual_machines: false
custom_fields:
  backup: veeam_job
  monitoring: zabbix_enabled
taxonomy:
  headings: [Compute, Network]
  roles:
    - { id: 7, heading: Network, subheading: Switches }
    - { id: 8, heading: Compute, subheading: Hosts }
  excluded_roles: [99]
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.netbox.auth_scheme, "Bearer");

    let report = config.into_report_config("https://netbox.example.com/", OutputFormat::Xlsx);
    assert_eq!(report.base_url, "https://netbox.example.com");
    assert_eq!(report.format, OutputFormat::Xlsx);
    assert_eq!(report.output, PathBuf::from("netbox_inventory_report.xlsx"));
    assert_eq!(report.debug_dump, Some(PathBuf::from("./tmp/raw.json")));
    assert_eq!(report.fetch.page_limit, 250);
    assert!(!report.fetch.include_virtual_machines);
    assert_eq!(report.custom_fields.backup, "veeam_job");
    assert_eq!(report.custom_fields.monitoring, "zabbix_enabled");
    assert_eq!(
        report.taxonomy.classify(Some(7)),
        Classification::new("Network", "Switches")
    );
    assert_eq!(report.taxonomy.classify(Some(1)), Classification::other());
    assert!(report.taxonomy.is_excluded(Some(99)));
    assert_eq!(report.taxonomy.heading_order(), vec!["Compute", "Network", "Other"]);
}

#[test]
fn empty_sections_fall_back_to_builtin_defaults() {
    let file = config_file("report:\n  debug_dump: null\n");
    let report = load_config(file.path())
        .unwrap()
        .into_report_config("https://nb", OutputFormat::Pdf);

    assert_eq!(report.debug_dump, None);
    assert_eq!(report.fetch.page_limit, 1000);
    assert!(report.fetch.include_virtual_machines);
    assert_eq!(report.taxonomy, Taxonomy::builtin());
    assert_eq!(report.output, PathBuf::from("netbox_inventory_report.pdf"));
}

#[test]
fn no_config_file_means_defaults() {
    let report = load_optional_config(None)
        .unwrap()
        .into_report_config("https://nb", OutputFormat::Pdf);
    assert_eq!(
        report.debug_dump,
        Some(PathBuf::from("/tmp/device_debug.json"))
    );
    assert_eq!(report.custom_fields.backup, "backup");
}

#[test]
fn unknown_keys_and_bad_values_are_rejected() {
    let typo = config_file("netbox:\n  page_limt: 5\n");
    let err = load_config(typo.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));

    let zero = config_file("netbox:\n  page_limit: 0\n");
    assert!(load_config(zero.path()).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[serial]
fn credentials_require_both_env_vars() {
    env::set_var("NETBOX_API", "https://netbox.example.com");
    env::remove_var("NETBOX_TOKEN");
    let err = Credentials::from_env().unwrap_err();
    assert_eq!(err.to_string(), MISSING_ENV_MESSAGE);

    env::set_var("NETBOX_TOKEN", "   ");
    assert!(Credentials::from_env().is_err(), "blank token counts as missing");

    env::set_var("NETBOX_TOKEN", "0123456789abcdef");
    let creds = Credentials::from_env().expect("both set");
    assert_eq!(creds.base_url, "https://netbox.example.com");
    assert!(!format!("{creds:?}").contains("0123456789abcdef"), "token is redacted");

    env::remove_var("NETBOX_API");
    env::remove_var("NETBOX_TOKEN");
}
