// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the modreg binary.

use std::time::Duration;

use modreg_config::ConfigError;
use modreg_modbus::ModbusError;
use thiserror::Error;

/// Result type alias for modreg-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the modreg binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Device or register operation failed.
    #[error("Device error: {0}")]
    Device(#[from] ModbusError),

    /// A command argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be produced.
    #[error("Output error: {0}")]
    Output(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an output error.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    ///
    /// Device errors map to one code per error category so scripts can
    /// tell an unreachable device from a bad register name.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::InvalidArgument(_) => 2,
            Self::Device(e) => match e {
                ModbusError::Connection(_) => 3,
                ModbusError::Registry(_) => 4,
                ModbusError::Registration(_) => 5,
                ModbusError::Operation(_) => 6,
                ModbusError::Conversion(_) => 7,
                ModbusError::Configuration(_) => 1,
            },
            Self::Output(_) => 8,
            Self::Runtime(_) => 9,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Returns recovery hints from the underlying device error, if any.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Device(e) => e.recovery_hints(),
            Self::WithContext { source, .. } => source.recovery_hints(),
            _ => Vec::new(),
        }
    }

    /// Returns how long to wait before running the command again, if the
    /// underlying device error is transient.
    pub fn suggested_retry_delay(&self) -> Option<Duration> {
        match self {
            Self::Device(e) => e.suggested_retry_delay(),
            Self::WithContext { source, .. } => source.suggested_retry_delay(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<serde_json::Error> for BinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{err:#}"))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain, recovery hints and retry delay.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }

    for hint in error.recovery_hints() {
        eprintln!("  Hint: {}", hint);
    }

    if let Some(delay) = error.suggested_retry_delay() {
        eprintln!("  Retry after: {:?}", delay);
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
