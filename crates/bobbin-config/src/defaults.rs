use crate::logging::LogFormat;

/// Model loaded when neither the peer nor the configuration names one.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Default log filter expression for the worker.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default upper bound on a single request line (1 MiB).
pub const DEFAULT_REQUEST_BYTE_LIMIT: usize = 1024 * 1024;

/// Default model name.
pub fn default_model() -> &'static str {
    DEFAULT_MODEL
}

/// Owned default model name used where allocation is required (e.g. serde).
pub fn default_model_string() -> String {
    DEFAULT_MODEL.to_string()
}

/// Default log filter expression.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the worker.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
