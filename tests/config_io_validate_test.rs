use meterstream::config::{Config, TransportKind};
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.transport.host = "10.0.0.5".to_string();
    cfg.transport.kind = TransportKind::Poll;
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.transport.host, "10.0.0.5");
    assert_eq!(loaded.transport.kind, TransportKind::Poll);
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        b"transport:\n  kind: poll\n  host: meters.local\n  reconnect_delay_ms: 2500\n",
    )
    .unwrap();

    let cfg = Config::from_file(tmp.path()).unwrap();
    assert_eq!(cfg.transport.kind, TransportKind::Poll);
    assert_eq!(cfg.transport.port, 8080);
    assert_eq!(cfg.transport.reconnect_delay_ms, 2500);
    assert_eq!(cfg.transport.poll_url(), "http://meters.local:8080/firehose");
    assert_eq!(
        cfg.transport.poll_query(Some(7)),
        vec![
            ("timeout", "45".to_string()),
            ("category", "all".to_string()),
            ("since_time", "7".to_string()),
        ]
    );
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();

    // Empty host
    cfg.transport.host.clear();
    assert!(cfg.validate().is_err());

    // Invalid port
    cfg = Config::default();
    cfg.transport.port = 0;
    assert!(cfg.validate().is_err());

    // Zero reconnect delay
    cfg = Config::default();
    cfg.transport.reconnect_delay_ms = 0;
    assert!(cfg.validate().is_err());

    // Zero connect timeout would time out every handshake
    cfg = Config::default();
    cfg.transport.connect_timeout_ms = 0;
    let err = cfg.validate().unwrap_err();
    assert!(format!("{}", err).contains("transport.connect_timeout_ms"));

    // Empty category only matters for the poll transport
    cfg = Config::default();
    cfg.transport.category = " ".to_string();
    assert!(cfg.validate().is_ok());
    cfg.transport.kind = TransportKind::Poll;
    assert!(cfg.validate().is_err());

    // Zero poll timeout only matters for the poll transport
    cfg = Config::default();
    cfg.transport.poll_timeout_secs = 0;
    assert!(cfg.validate().is_ok());
    cfg.transport.kind = TransportKind::Poll;
    assert!(cfg.validate().is_err());

    // Relative endpoint path
    cfg = Config::default();
    cfg.transport.socket_path = "ws".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn from_file_missing_is_io_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(tmp_dir.path().join("absent.yaml")).unwrap_err();
    assert!(format!("{}", err).contains("I/O error"));
}
