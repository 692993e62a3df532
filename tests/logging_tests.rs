use meterstream::logging::{LogContext, get_logger, get_logger_with_context, parse_log_level};
use tracing::Level;

#[test]
fn parse_log_level_is_case_insensitive() {
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("Warning").unwrap(), Level::WARN);
    assert!(parse_log_level("loud").is_err());
}

#[test]
fn loggers_carry_their_component() {
    let logger = get_logger("transport");
    assert_eq!(logger.component(), "transport");

    let ctx = LogContext::new("dashboard")
        .with_device("m1")
        .with_field("code", "VoltageL1".to_string());
    let logger = get_logger_with_context(ctx);
    assert_eq!(logger.component(), "dashboard");
    // emitting without an installed subscriber is a no-op
    logger.info("merged reading");
}
