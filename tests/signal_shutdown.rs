//! Delivers real termination signals to the test process.
//!
//! Kept in its own test binary: once registered, the handlers stay installed
//! for the life of the process.
#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use iot_orchestrator::lifecycle::startup;

mod common;
use common::RecordingFactory;

fn send(signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(std::process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn sigterm_stops_every_unit_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config(
        dir.path(),
        r#"{
            "logging": { "level": "debug", "format": "compact" },
            "config_db_path": "db.json",
            "process_groups": [10, 20, 30]
        }"#,
    );
    let factory = RecordingFactory::default();

    let orchestrator = startup::initialize(Some(&path), &factory)
        .unwrap()
        .with_poll_interval(Duration::from_millis(20));
    let handle = tokio::spawn(orchestrator.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(factory.log.starts(), vec![10, 20, 30]);
    assert!(!handle.is_finished());

    send("TERM");
    send("INT");

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("orchestrator should stop after SIGTERM")
        .unwrap()
        .unwrap();

    assert_eq!(factory.log.stops(), vec![10, 20, 30]);
}
