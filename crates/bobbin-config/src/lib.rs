//! Shared configuration for the bobbin embedding worker.
//!
//! Values merge from three layers with the usual precedence: command-line
//! flags beat `BOBBIN_*` environment variables, which beat an optional TOML
//! configuration file (`--config-path`). Both the worker binary and its
//! tests load configuration through [`Config`].

mod defaults;
mod logging;

use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MODEL, DEFAULT_REQUEST_BYTE_LIMIT, default_log_filter,
    default_log_format, default_model,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BOBBIN_")]
pub struct Config {
    /// Model loaded when a request does not name one.
    #[ortho_config(default = defaults::default_model_string())]
    pub default_model: String,

    /// Filter expression for the diagnostic log stream.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,

    /// Output format for the diagnostic log stream.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,

    /// Upper bound on a single request line, in bytes.
    #[ortho_config(default = defaults::DEFAULT_REQUEST_BYTE_LIMIT)]
    pub max_request_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: defaults::default_model_string(),
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            max_request_bytes: defaults::DEFAULT_REQUEST_BYTE_LIMIT,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment and arguments.
    ///
    /// # Errors
    ///
    /// Returns the underlying loader error when any layer fails to parse or
    /// merge.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(env::args_os())
    }

    /// Loads configuration from an explicit argument list.
    ///
    /// The first element is treated as the program name, mirroring
    /// `std::env::args_os`.
    ///
    /// # Errors
    ///
    /// Returns the underlying loader error when any layer fails to parse or
    /// merge.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Model name used when a request omits the `model` field.
    #[must_use]
    pub fn default_model(&self) -> &str {
        self.default_model.as_str()
    }

    /// Filter expression for the diagnostic log stream.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for the diagnostic log stream.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Upper bound on a single request line, in bytes.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }
}
