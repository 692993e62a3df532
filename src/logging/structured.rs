use std::collections::BTreeMap;
use std::fmt;
use tracing::Level;

/// Who a log line is about: a component, optionally one device, plus extras
#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub device: Option<String>,
    /// Sorted so rendered fields are stable
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            device: None,
            extra_fields: BTreeMap::new(),
        }
    }

    pub fn with_device(mut self, device: &str) -> Self {
        self.device = Some(device.to_string());
        self
    }

    pub fn with_field(mut self, key: &str, value: String) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}

/// Renders as `component=..,device=..,k=v` for the `fields` value
impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component={}", self.component)?;
        if let Some(device) = &self.device {
            write!(f, ",device={}", device)?;
        }
        for (key, value) in &self.extra_fields {
            write!(f, ",{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Logger bound to a `LogContext`
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    pub fn component(&self) -> &str {
        &self.context.component
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::INFO, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::WARN, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Level::ERROR, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::DEBUG, message);
    }

    pub fn trace(&self, message: &str) {
        self.emit(Level::TRACE, message);
    }

    // tracing macros need the level as a constant, hence the match
    fn emit(&self, level: Level, message: &str) {
        let fields = &self.context;
        match level {
            Level::ERROR => tracing::error!(%fields, "{}", message),
            Level::WARN => tracing::warn!(%fields, "{}", message),
            Level::INFO => tracing::info!(%fields, "{}", message),
            Level::DEBUG => tracing::debug!(%fields, "{}", message),
            _ => tracing::trace!(%fields, "{}", message),
        }
    }
}

/// Logger for a bare component name
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
