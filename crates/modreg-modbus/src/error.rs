// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the register pipeline and device lifecycle.
//!
//! # Error Categories
//!
//! ```text
//! ModbusError
//! ├── Connection    - retry exhaustion, terminal failure, not connected
//! ├── Registry      - duplicate / unknown register names
//! ├── Registration  - probe read failed while declaring a register
//! ├── Operation     - register read/write failures
//! ├── Conversion    - values that do not fit the register's word length
//! └── Configuration - invalid device or register declarations
//! ```
//!
//! Transports report failures as [`TransportError`], which read and write
//! failures carry as their `source`.
//!
//! # Examples
//!
//! ```
//! use modreg_modbus::error::{ConversionError, ModbusError};
//!
//! let error = ModbusError::conversion(ConversionError::out_of_range(70_000, 1, false));
//! assert!(error.is_value_out_of_range());
//! assert!(!error.is_retryable());
//! assert_eq!(error.error_code().to_string(), "MR-0501");
//! ```

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::types::ConnectionState;

// =============================================================================
// ModbusError - Main Error Type
// =============================================================================

/// The main error type for device and register operations.
#[derive(Debug, Error)]
pub enum ModbusError {
    /// Connection lifecycle errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Register registry misuse.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// Probe read failed while registering a register.
    #[error("{0}")]
    Registration(#[from] RegistrationError),

    /// Register read/write failures.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// Value conversion errors.
    #[error("{0}")]
    Conversion(#[from] ConversionError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl ModbusError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a registry error.
    #[inline]
    pub fn registry(error: RegistryError) -> Self {
        Self::Registry(error)
    }

    /// Creates an operation error.
    #[inline]
    pub fn operation(error: OperationError) -> Self {
        Self::Operation(error)
    }

    /// Creates a conversion error.
    #[inline]
    pub fn conversion(error: ConversionError) -> Self {
        Self::Conversion(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a duplicate register name error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::Registry(RegistryError::DuplicateName { name: name.into() })
    }

    /// Creates an unknown register name error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::Registry(RegistryError::NotFound { name: name.into() })
    }

    /// Wraps a failed probe read into a registration error.
    pub fn registration(name: impl Into<String>, source: ModbusError) -> Self {
        Self::Registration(RegistrationError {
            name: name.into(),
            source: Box::new(source),
        })
    }

    // =========================================================================
    // Taxonomy Predicates
    // =========================================================================

    /// Returns `true` for connection lifecycle errors.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if a register name was declared twice.
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::DuplicateName { .. }))
    }

    /// Returns `true` if a register name was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NotFound { .. }))
    }

    /// Returns `true` if a probe read failed during registration.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::Registration(_))
    }

    /// Returns `true` for read failures (transport error or word count mismatch).
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            Self::Operation(OperationError::ReadFailed { .. })
                | Self::Operation(OperationError::WordCountMismatch { .. })
        )
    }

    /// Returns `true` for write failures reported by the transport.
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::Operation(OperationError::WriteFailed { .. }))
    }

    /// Returns `true` if a value did not fit the register's word length.
    pub fn is_value_out_of_range(&self) -> bool {
        matches!(self, Self::Conversion(ConversionError::ValueOutOfRange { .. }))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if retrying the same call may succeed.
    ///
    /// Only transport-level read/write failures are transient; everything
    /// else indicates a configuration or programming mistake, or a device
    /// that has to be rebuilt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Operation(e) => e.is_retryable(),
            Self::Registration(e) => e.source.is_retryable(),
            Self::Connection(_)
            | Self::Registry(_)
            | Self::Conversion(_)
            | Self::Configuration(_) => false,
        }
    }

    /// Returns the suggested delay before retrying, if retryable.
    pub fn suggested_retry_delay(&self) -> Option<Duration> {
        if !self.is_retryable() {
            return None;
        }
        match self {
            Self::Operation(e) => e.transport_source().map(|t| t.suggested_retry_delay()),
            Self::Registration(e) => e.source.suggested_retry_delay(),
            _ => None,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(e) => e.severity(),
            Self::Registry(_) => ErrorSeverity::Error,
            Self::Registration(_) => ErrorSeverity::Error,
            Self::Operation(_) => ErrorSeverity::Warning,
            Self::Conversion(_) => ErrorSeverity::Error,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Registry(_) => "registry",
            Self::Registration(_) => "registration",
            Self::Operation(_) => "operation",
            Self::Conversion(_) => "conversion",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connection(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::Registration(_) => ErrorCode::new(3, 1),
            Self::Operation(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Connection(e) => e.recovery_hints(),
            Self::Registry(RegistryError::DuplicateName { .. }) => {
                vec!["Choose a unique register name", "Remove the existing register first"]
            }
            Self::Registry(RegistryError::NotFound { .. }) => {
                vec!["Check the register name for typos", "Declare the register before using it"]
            }
            Self::Registration(e) => {
                let mut hints = vec!["Verify the register address and length against the device manual"];
                hints.extend(e.source.recovery_hints());
                hints
            }
            Self::Operation(e) => e.recovery_hints(),
            Self::Conversion(_) => vec![
                "Check the value against the register's word length and signedness",
                "Check the register's scaling factor",
            ],
            Self::Configuration(_) => vec!["Fix the declaration and try again"],
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection lifecycle errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Every connection attempt failed.
    #[error("Failed to connect to {target} after {attempts} attempt(s)")]
    RetriesExhausted {
        /// Connection target (`host:port`).
        target: String,
        /// Number of attempts made.
        attempts: u32,
        /// The error reported by the last attempt, if any.
        #[source]
        last_error: Option<TransportError>,
    },

    /// The device exhausted its retries earlier and cannot be reused.
    #[error("Device {target} is in the failed state; create a new device to reconnect")]
    Failed {
        /// Connection target (`host:port`).
        target: String,
    },

    /// An operation was attempted on a device that is not connected.
    #[error("Device {target} is not connected (state: {state})")]
    NotConnected {
        /// Connection target (`host:port`).
        target: String,
        /// State at the time of the call.
        state: ConnectionState,
    },
}

impl ConnectionError {
    /// Returns the severity of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RetriesExhausted { .. } | Self::Failed { .. } => ErrorSeverity::Critical,
            Self::NotConnected { .. } => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::RetriesExhausted { .. } => 1,
            Self::Failed { .. } => 2,
            Self::NotConnected { .. } => 3,
        };
        ErrorCode::new(1, code)
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::RetriesExhausted { .. } => vec![
                "Check that the device is powered on and reachable",
                "Verify the host, port and unit id",
                "Increase connect_retries or retry_backoff",
            ],
            Self::Failed { .. } => vec!["Create a new device instance to retry the connection"],
            Self::NotConnected { .. } => vec!["Call connect() before reading or writing registers"],
        }
    }
}

// =============================================================================
// RegistryError
// =============================================================================

/// Errors from misuse of the register registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A register with this name already exists.
    #[error("Register '{name}' already exists")]
    DuplicateName {
        /// The duplicated name.
        name: String,
    },

    /// No register with this name exists.
    #[error("Register '{name}' not found")]
    NotFound {
        /// The unknown name.
        name: String,
    },
}

impl RegistryError {
    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DuplicateName { .. } => ErrorCode::new(2, 1),
            Self::NotFound { .. } => ErrorCode::new(2, 2),
        }
    }
}

// =============================================================================
// RegistrationError
// =============================================================================

/// A register declaration was rejected because its probe read failed.
#[derive(Debug, Error)]
#[error("Registration of '{name}' failed: probe read error: {source}")]
pub struct RegistrationError {
    /// The rejected register name.
    pub name: String,
    /// The probe failure.
    #[source]
    pub source: Box<ModbusError>,
}

// =============================================================================
// OperationError
// =============================================================================

/// Register read/write failures.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The transport failed to read the register.
    #[error("Read failed for register '{name}' at address {address}: {source}")]
    ReadFailed {
        /// Register name.
        name: String,
        /// Register start address.
        address: u16,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// The transport returned the wrong number of words.
    #[error("Register '{name}' at address {address} returned {actual} word(s), expected {expected}")]
    WordCountMismatch {
        /// Register name.
        name: String,
        /// Register start address.
        address: u16,
        /// Declared length.
        expected: u16,
        /// Words received.
        actual: usize,
    },

    /// The transport failed to write the register.
    #[error("Write failed for register '{name}' at address {address}: {source}")]
    WriteFailed {
        /// Register name.
        name: String,
        /// Register start address.
        address: u16,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
}

impl OperationError {
    /// Creates a read failure.
    pub fn read_failed(name: impl Into<String>, address: u16, source: TransportError) -> Self {
        Self::ReadFailed {
            name: name.into(),
            address,
            source,
        }
    }

    /// Creates a write failure.
    pub fn write_failed(name: impl Into<String>, address: u16, source: TransportError) -> Self {
        Self::WriteFailed {
            name: name.into(),
            address,
            source,
        }
    }

    /// Returns the transport error behind this failure, if any.
    pub fn transport_source(&self) -> Option<&TransportError> {
        match self {
            Self::ReadFailed { source, .. } | Self::WriteFailed { source, .. } => Some(source),
            Self::WordCountMismatch { .. } => None,
        }
    }

    /// Returns `true` if the operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self.transport_source() {
            Some(source) => source.is_retryable(),
            None => false,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::ReadFailed { .. } => 1,
            Self::WordCountMismatch { .. } => 2,
            Self::WriteFailed { .. } => 3,
        };
        ErrorCode::new(4, code)
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ReadFailed { source, .. } | Self::WriteFailed { source, .. } => {
                source.recovery_hints()
            }
            Self::WordCountMismatch { .. } => {
                vec!["Check the declared register length against the device manual"]
            }
        }
    }
}

// =============================================================================
// ConversionError
// =============================================================================

/// Errors converting between words and integer values.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value cannot be represented in the register's word length.
    #[error("Value {value} does not fit in {length} {} word(s)", signedness(.signed))]
    ValueOutOfRange {
        /// The offending value, as text (may be non-finite).
        value: String,
        /// Register word length.
        length: u16,
        /// Register signedness.
        signed: bool,
    },

    /// A decoded integer times the register's factor leaves the `i128` range.
    #[error("Raw value {raw} scaled by {factor} is not representable as an integer")]
    ScaledOutOfRange {
        /// The decoded raw integer.
        raw: i128,
        /// Register factor.
        factor: f64,
    },

    /// The word count is outside the supported range.
    #[error("Unsupported word count {count} (supported: 1-{max})")]
    InvalidWordCount {
        /// The word count that was requested.
        count: usize,
        /// Maximum supported word count.
        max: u16,
    },
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}

impl ConversionError {
    /// Creates a value-out-of-range error.
    pub fn out_of_range(value: impl fmt::Display, length: u16, signed: bool) -> Self {
        Self::ValueOutOfRange {
            value: value.to_string(),
            length,
            signed,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ValueOutOfRange { .. } => ErrorCode::new(5, 1),
            Self::InvalidWordCount { .. } => ErrorCode::new(5, 2),
            Self::ScaledOutOfRange { .. } => ErrorCode::new(5, 3),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Invalid device or register declarations.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required field is missing or empty.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// Invalid unit id.
    #[error("Invalid unit ID: {unit_id} (valid: 1-255)")]
    InvalidUnitId {
        /// The rejected unit id.
        unit_id: u8,
    },

    /// Invalid retry bound.
    #[error("Invalid connect retries: {retries} (must be at least 1)")]
    InvalidRetries {
        /// The rejected retry count.
        retries: u32,
    },

    /// Invalid timeout.
    #[error("Invalid timeout {duration:?}: {reason}")]
    InvalidTimeout {
        /// The rejected duration.
        duration: Duration,
        /// Why it was rejected.
        reason: String,
    },

    /// Invalid register length.
    #[error("Invalid length {length} for register '{name}' (valid: 1-{max})")]
    InvalidLength {
        /// Register name.
        name: String,
        /// Rejected length.
        length: u16,
        /// Maximum supported length.
        max: u16,
    },

    /// Invalid scaling factor.
    #[error("Invalid factor {factor} for register '{name}': must be finite and non-zero")]
    InvalidFactor {
        /// Register name.
        name: String,
        /// Rejected factor.
        factor: f64,
    },

    /// Unknown value type tag.
    #[error("Invalid value type '{value_type}' (expected: int, float, bool)")]
    InvalidValueType {
        /// The rejected tag.
        value_type: String,
    },

    /// Register span runs past the end of the address space.
    #[error("Register '{name}' at address {address} with length {length} exceeds the address space")]
    AddressOverflow {
        /// Register name.
        name: String,
        /// Start address.
        address: u16,
        /// Declared length.
        length: u16,
    },
}

impl ConfigurationError {
    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Creates an invalid value type error.
    pub fn invalid_value_type(value_type: impl Into<String>) -> Self {
        Self::InvalidValueType {
            value_type: value_type.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::MissingField { .. } => 1,
            Self::InvalidUnitId { .. } => 2,
            Self::InvalidRetries { .. } => 3,
            Self::InvalidTimeout { .. } => 4,
            Self::InvalidLength { .. } => 5,
            Self::InvalidFactor { .. } => 6,
            Self::InvalidValueType { .. } => 7,
            Self::AddressOverflow { .. } => 8,
        };
        ErrorCode::new(6, code)
    }
}

// =============================================================================
// TransportError
// =============================================================================

/// Errors reported by a [`HoldingRegisterTransport`](crate::client::HoldingRegisterTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has no open connection.
    #[error("Transport is not connected")]
    NotConnected,

    /// The connection was refused.
    #[error("Connection refused by {target}")]
    Refused {
        /// Connection target.
        target: String,
        /// Underlying error.
        #[source]
        source: Option<io::Error>,
    },

    /// The operation did not complete in time.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Configured timeout.
        duration: Duration,
    },

    /// The device answered with a Modbus exception response.
    #[error("Modbus exception {code:#04x} ({})", exception_label(.code))]
    Exception {
        /// Exception code.
        code: u8,
    },

    /// The connection was closed by the peer.
    #[error("Connection closed: {reason}")]
    Closed {
        /// Reason for closure.
        reason: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying error.
        #[from]
        source: io::Error,
    },
}

fn exception_label(code: &u8) -> &'static str {
    TransportError::exception_name(*code)
}

impl TransportError {
    /// Returns the standard name of a Modbus exception code.
    pub fn exception_name(code: u8) -> &'static str {
        match code {
            0x01 => "Illegal Function",
            0x02 => "Illegal Data Address",
            0x03 => "Illegal Data Value",
            0x04 => "Slave Device Failure",
            0x05 => "Acknowledge",
            0x06 => "Slave Device Busy",
            0x08 => "Memory Parity Error",
            0x0A => "Gateway Path Unavailable",
            0x0B => "Gateway Target Device Failed to Respond",
            _ => "Unknown Exception",
        }
    }

    /// Returns `true` if the failure is transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Closed { .. } | Self::Io { .. } | Self::Refused { .. } => true,
            // Acknowledge, busy and gateway target errors clear up on their own
            Self::Exception { code } => matches!(code, 0x05 | 0x06 | 0x0B),
            Self::NotConnected => false,
        }
    }

    /// Returns the suggested delay before retrying.
    pub fn suggested_retry_delay(&self) -> Duration {
        match self {
            Self::Exception { code: 0x06 } => Duration::from_millis(500),
            Self::Timeout { .. } => Duration::from_millis(200),
            _ => Duration::from_secs(1),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::NotConnected => vec!["Reconnect the device"],
            Self::Refused { .. } => vec![
                "Check that the device is powered on",
                "Verify the host and port",
            ],
            Self::Timeout { .. } => vec![
                "Check network connectivity",
                "Increase the operation timeout",
            ],
            Self::Exception { code: 0x02 } => vec!["The device does not expose this register address"],
            Self::Exception { code: 0x03 } => vec!["The device rejected the value; check its valid range"],
            Self::Exception { .. } => vec!["Consult the device manual for this exception code"],
            Self::Closed { .. } | Self::Io { .. } => vec!["Check network connectivity and reconnect"],
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Severity level of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational.
    Info,
    /// Recoverable; the caller may retry.
    Warning,
    /// The operation failed.
    Error,
    /// The device or configuration is unusable.
    Critical,
}

impl ErrorSeverity {
    /// Maps this severity to a tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the severity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Error code formatted as `MR-CCNN` (category, code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Error category.
    pub category: u8,
    /// Code within the category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the code packed into a `u16`.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | self.code as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MR-{:02}{:02}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with ModbusError.
pub type ModbusResult<T> = Result<T, ModbusError>;

/// A Result type with TransportError.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// Tests
// =============================================================================
