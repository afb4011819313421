//! Loading and saving viewer configuration files.

use std::io::Write;
use std::time::Duration;

use balance_errors::{ErrorCategory, ViewerError};
use balance_test_helpers::prelude::*;
use balance_viewer::ViewerConfig;

#[test]
fn test_load_json_file() -> TestResult {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    writeln!(
        file,
        r#"{{"broker": "192.168.4.1", "bufferSize": 2000, "pollIntervalMs": 50}}"#
    )?;

    let config = ViewerConfig::load(file.path())?;

    assert_eq!(config.broker, "192.168.4.1");
    assert_eq!(config.buffer_size, 2000);
    assert_eq!(config.poll_interval(), Duration::from_millis(50));
    assert_eq!(config.gains_topic, "ESP32/gains");
    Ok(())
}

#[test]
fn test_load_yaml_file() -> TestResult {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile()?;
    writeln!(file, "dataTopic: robot/telemetry")?;
    writeln!(file, "gainsTopic: robot/gains")?;
    writeln!(file, "lookbackSeconds: 30")?;

    let config = ViewerConfig::load(file.path())?;

    assert_eq!(config.data_topic, "robot/telemetry");
    assert_eq!(config.gains_topic, "robot/gains");
    assert_eq!(config.publisher_config().topic, "robot/gains");
    Ok(())
}

#[test]
fn test_save_then_load() -> TestResult {
    let dir = tempfile::tempdir()?;
    let saved = ViewerConfig {
        broker: "broker.local".to_string(),
        quiescence_seconds: 1.5,
        ..ViewerConfig::default()
    };

    for name in ["nested/viewer.json", "viewer.yaml"] {
        let path = dir.path().join(name);
        saved.save(&path)?;
        assert_eq!(ViewerConfig::load(&path)?, saved);
    }
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let err = must_some(
        ViewerConfig::load(dir.path().join("absent.json")).err(),
        "missing file loaded",
    );
    assert!(matches!(err, ViewerError::Io(_)));
    assert_eq!(err.category(), ErrorCategory::IO);
    Ok(())
}

#[test]
fn test_invalid_file_names_path() -> TestResult {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    writeln!(file, r#"{{"gainMin": 10.0, "gainMax": 1.0}}"#)?;

    let err = must_some(ViewerConfig::load(file.path()).err(), "invalid config loaded");

    let ViewerError::Config(message) = &err else {
        return Err(format!("expected config error, got {err:?}").into());
    };
    assert!(message.contains("load config"));
    assert!(message.contains("gainMin"));
    assert_eq!(err.category(), ErrorCategory::Config);
    Ok(())
}
