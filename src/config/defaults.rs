use super::*;

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Socket,
            host: "localhost".to_string(),
            port: 8080,
            socket_path: "/ws".to_string(),
            poll_path: "/firehose".to_string(),
            poll_timeout_secs: 45,
            category: "all".to_string(),
            reconnect_delay_ms: 1000,
            connect_timeout_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/meterstream.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
