use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::tempdir;

fn netbox_report() -> Command {
    let mut cmd = Command::cargo_bin("netbox-report").expect("Binary exists");
    cmd.env_remove("NETBOX_API").env_remove("NETBOX_TOKEN");
    cmd
}

#[test]
fn help_lists_both_reports() {
    netbox_report()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("counts").and(predicate::str::contains("inventory")));
}

#[test]
fn missing_env_vars_fail_with_message_on_stderr() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("report.pdf");

    netbox_report()
        .current_dir(dir.path())
        .arg("inventory")
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing NETBOX_API or NETBOX_TOKEN environment variables.",
        ));

    assert!(!output.exists(), "no report is written on failure");
}

#[test]
fn missing_token_alone_is_enough_to_fail() {
    let dir = tempdir().unwrap();
    netbox_report()
        .current_dir(dir.path())
        .env("NETBOX_API", "http://127.0.0.1:9")
        .arg("counts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NETBOX_TOKEN"));
}

#[test]
fn unknown_format_is_rejected_by_argument_parsing() {
    netbox_report()
        .args(["inventory", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn unreachable_netbox_fails_fast_without_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("counts.pdf");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "report:\n  debug_dump: null\n").unwrap();

    netbox_report()
        .current_dir(dir.path())
        .env("NETBOX_API", "http://127.0.0.1:9")
        .env("NETBOX_TOKEN", "not-a-real-token")
        .arg("counts")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Device count report failed"));

    assert!(!output.exists());
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
#[serial]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use netbox_report::cli::{run, Cli, Commands};

    std::env::remove_var("NETBOX_API");
    std::env::remove_var("NETBOX_TOKEN");
    let cli = Cli {
        command: Commands::Counts {
            config: None,
            output: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "credentials are missing");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
