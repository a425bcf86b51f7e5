// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core types: connection state, register declarations, values and device
//! configuration.
//!
//! # Register Declaration
//!
//! ```
//! use modreg_modbus::types::{RegisterSpec, ValueType};
//!
//! let spec = RegisterSpec::builder("grid_voltage", 66)
//!     .factor(0.1)
//!     .value_type(ValueType::Float)
//!     .unit("V")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.length, 1);
//! assert!(!spec.signed);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ExponentialBackoff, RetryConfig, RetryStrategy};
use crate::codec::MAX_REGISTER_WORDS;
use crate::error::{ConfigurationError, ModbusError};

/// Default Modbus TCP port used when a device omits the port.
pub const DEFAULT_PORT: u16 = 502;

// =============================================================================
// ConnectionState
// =============================================================================

/// Connection state of a device.
///
/// ```text
/// Disconnected ──connect()──▶ Connecting ──success──▶ Connected
///      ▲                          │                       │
///      └──────────close()─────────┼───────────────────────┘
///                                 └──retries exhausted──▶ Failed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection is open.
    #[default]
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected and ready for register operations.
    Connected,
    /// Retries were exhausted; the device cannot be reused.
    Failed,
}

impl ConnectionState {
    /// Returns `true` if the device is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

// =============================================================================
// ValueType
// =============================================================================

/// Logical type a register's scaled value is cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ValueType {
    /// Truncated to an integer.
    #[default]
    Int,
    /// Kept as a floating value.
    Float,
    /// `false` iff the scaled value is zero.
    Bool,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        };
        f.write_str(s)
    }
}

impl FromStr for ValueType {
    type Err = ModbusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int" | "integer" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            _ => Err(ModbusError::configuration(
                ConfigurationError::invalid_value_type(s),
            )),
        }
    }
}

impl TryFrom<String> for ValueType {
    type Error = ModbusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// RegisterValue
// =============================================================================

/// A decoded, scaled and typed register value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RegisterValue {
    /// Integer value. Wide enough for any 4-word register, signed or not.
    Int(i128),
    /// Floating value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl RegisterValue {
    /// Casts a scaled value to the given type.
    ///
    /// `Int` truncates toward zero (saturating beyond the `i128` range);
    /// `Bool` is `false` only for zero.
    pub fn cast(scaled: f64, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Float => Self::Float(scaled),
            ValueType::Int => Self::Int(scaled.trunc() as i128),
            ValueType::Bool => Self::Bool(scaled != 0.0),
        }
    }

    /// Returns the value as `f64` (`true` is `1.0`).
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Bool(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Returns the value type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    /// Returns the integer value, if this is an `Int`.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an `Int` that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Returns the boolean value, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            // Whole floats keep their decimal point: 23.0, not 23
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for RegisterValue {
    fn from(value: i64) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for RegisterValue {
    fn from(value: u64) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for RegisterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RegisterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// =============================================================================
// RegisterReading
// =============================================================================

/// One entry of a device-wide read: name, value and display unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterReading {
    /// Register name.
    pub name: String,
    /// Value rounded to two decimals.
    pub value: RegisterValue,
    /// Display unit (empty when unset).
    pub unit: String,
}

impl RegisterReading {
    /// Creates a new reading.
    pub fn new(name: impl Into<String>, value: RegisterValue, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

impl fmt::Display for RegisterReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.name, self.value, self.unit)
    }
}

// =============================================================================
// RegisterSpec
// =============================================================================

/// Declaration of one named holding register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSpec {
    /// Unique register name.
    pub name: String,

    /// Start address (0-based).
    pub address: u16,

    /// Word count (default: 1).
    #[serde(default = "default_length")]
    pub length: u16,

    /// Two's-complement interpretation (default: false).
    #[serde(default)]
    pub signed: bool,

    /// Scaling factor (default: 1).
    #[serde(default = "default_factor")]
    pub factor: f64,

    /// Logical value type (default: int).
    #[serde(default, rename = "type", alias = "value_type")]
    pub value_type: ValueType,

    /// Display unit (default: empty).
    #[serde(default)]
    pub unit: String,
}

fn default_length() -> u16 {
    1
}

fn default_factor() -> f64 {
    1.0
}

impl RegisterSpec {
    /// Creates a builder for a register at `address`.
    pub fn builder(name: impl Into<String>, address: u16) -> RegisterSpecBuilder {
        RegisterSpecBuilder::new(name, address)
    }

    /// Creates a single-word unsigned integer register.
    pub fn new(name: impl Into<String>, address: u16) -> Self {
        Self {
            name: name.into(),
            address,
            length: default_length(),
            signed: false,
            factor: default_factor(),
            value_type: ValueType::default(),
            unit: String::new(),
        }
    }

    /// Validates this declaration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.name.trim().is_empty() {
            return Err(ModbusError::configuration(ConfigurationError::missing_field(
                "name",
            )));
        }

        if self.length == 0 || self.length > MAX_REGISTER_WORDS {
            return Err(ModbusError::configuration(ConfigurationError::InvalidLength {
                name: self.name.clone(),
                length: self.length,
                max: MAX_REGISTER_WORDS,
            }));
        }

        if !self.factor.is_finite() || self.factor == 0.0 {
            return Err(ModbusError::configuration(ConfigurationError::InvalidFactor {
                name: self.name.clone(),
                factor: self.factor,
            }));
        }

        if u32::from(self.address) + u32::from(self.length) > u32::from(u16::MAX) + 1 {
            return Err(ModbusError::configuration(ConfigurationError::AddressOverflow {
                name: self.name.clone(),
                address: self.address,
                length: self.length,
            }));
        }

        Ok(())
    }
}

/// Builder for [`RegisterSpec`].
#[derive(Debug, Clone)]
pub struct RegisterSpecBuilder {
    spec: RegisterSpec,
}

impl RegisterSpecBuilder {
    fn new(name: impl Into<String>, address: u16) -> Self {
        Self {
            spec: RegisterSpec::new(name, address),
        }
    }

    /// Sets the word count.
    pub fn length(mut self, length: u16) -> Self {
        self.spec.length = length;
        self
    }

    /// Sets the signedness.
    pub fn signed(mut self, signed: bool) -> Self {
        self.spec.signed = signed;
        self
    }

    /// Sets the scaling factor.
    pub fn factor(mut self, factor: f64) -> Self {
        self.spec.factor = factor;
        self
    }

    /// Sets the value type.
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.spec.value_type = value_type;
        self
    }

    /// Sets the display unit.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.spec.unit = unit.into();
        self
    }

    /// Validates and builds the declaration.
    pub fn build(self) -> Result<RegisterSpec, ModbusError> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}

// =============================================================================
// DeviceConfig
// =============================================================================

/// Backoff shape between connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// The same delay after every failed attempt.
    #[default]
    Fixed,
    /// Doubling delay capped at `max_backoff`.
    Exponential,
}

/// Connection identity and retry policy of one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Target host address.
    pub host: String,

    /// Target port (None = transport default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Unit ID (default: 1).
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Connection attempts before giving up (default: 10).
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Delay after a failed connection attempt (default: 2s).
    #[serde(default = "default_retry_backoff", with = "humantime_serde")]
    pub retry_backoff: Duration,

    /// Backoff shape (default: fixed).
    #[serde(default)]
    pub retry_strategy: BackoffKind,

    /// Upper bound for exponential backoff (default: 30s).
    #[serde(default = "default_max_backoff", with = "humantime_serde")]
    pub max_backoff: Duration,

    /// Jitter factor for exponential backoff, 0.0-1.0 (default: 0).
    #[serde(default)]
    pub backoff_jitter: f64,

    /// TCP connect timeout (default: 5s).
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Read/write timeout (default: 3s).
    #[serde(default = "default_operation_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,
}

fn default_unit_id() -> u8 {
    1
}

fn default_connect_retries() -> u32 {
    10
}

fn default_retry_backoff() -> Duration {
    Duration::from_secs(2)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(3)
}

impl DeviceConfig {
    /// Creates a new builder.
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    /// Creates a configuration with just a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Returns the port, falling back to the Modbus TCP default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns the connection target as `host:port`.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.effective_port())
    }

    /// Returns the retry policy for `connect()`.
    pub fn retry_config(&self) -> RetryConfig {
        let strategy = match self.retry_strategy {
            BackoffKind::Fixed => RetryStrategy::Fixed(self.retry_backoff),
            BackoffKind::Exponential => RetryStrategy::Exponential(
                ExponentialBackoff::new(self.retry_backoff, self.max_backoff)
                    .with_jitter(self.backoff_jitter),
            ),
        };
        RetryConfig::new(self.connect_retries).with_strategy(strategy)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.host.trim().is_empty() {
            return Err(ModbusError::configuration(ConfigurationError::missing_field(
                "host",
            )));
        }

        if self.unit_id == 0 {
            return Err(ModbusError::configuration(ConfigurationError::InvalidUnitId {
                unit_id: self.unit_id,
            }));
        }

        if self.connect_retries == 0 {
            return Err(ModbusError::configuration(ConfigurationError::InvalidRetries {
                retries: self.connect_retries,
            }));
        }

        if self.connect_timeout.is_zero() {
            return Err(ModbusError::configuration(ConfigurationError::InvalidTimeout {
                duration: self.connect_timeout,
                reason: "Connect timeout must be greater than 0".to_string(),
            }));
        }

        if self.operation_timeout.is_zero() {
            return Err(ModbusError::configuration(ConfigurationError::InvalidTimeout {
                duration: self.operation_timeout,
                reason: "Operation timeout must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            unit_id: default_unit_id(),
            connect_retries: default_connect_retries(),
            retry_backoff: default_retry_backoff(),
            retry_strategy: BackoffKind::default(),
            max_backoff: default_max_backoff(),
            backoff_jitter: 0.0,
            connect_timeout: default_connect_timeout(),
            operation_timeout: default_operation_timeout(),
        }
    }
}

impl fmt::Display for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (unit {})", self.target(), self.unit_id)
    }
}

// =============================================================================
// DeviceConfigBuilder
// =============================================================================

/// Builder for [`DeviceConfig`].
#[derive(Debug, Default)]
pub struct DeviceConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    unit_id: Option<u8>,
    connect_retries: Option<u32>,
    retry_backoff: Option<Duration>,
    retry_strategy: Option<BackoffKind>,
    max_backoff: Option<Duration>,
    backoff_jitter: Option<f64>,
    connect_timeout: Option<Duration>,
    operation_timeout: Option<Duration>,
}

impl DeviceConfigBuilder {
    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the unit ID.
    pub fn unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    /// Sets the number of connection attempts.
    pub fn connect_retries(mut self, retries: u32) -> Self {
        self.connect_retries = Some(retries);
        self
    }

    /// Sets the delay after a failed connection attempt.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Switches to exponential backoff capped at `max`.
    pub fn exponential_backoff(mut self, max: Duration, jitter: f64) -> Self {
        self.retry_strategy = Some(BackoffKind::Exponential);
        self.max_backoff = Some(max);
        self.backoff_jitter = Some(jitter);
        self
    }

    /// Sets the TCP connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read/write timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<DeviceConfig, ModbusError> {
        let host = self.host.ok_or_else(|| {
            ModbusError::configuration(ConfigurationError::missing_field("host"))
        })?;

        let config = DeviceConfig {
            host,
            port: self.port,
            unit_id: self.unit_id.unwrap_or_else(default_unit_id),
            connect_retries: self.connect_retries.unwrap_or_else(default_connect_retries),
            retry_backoff: self.retry_backoff.unwrap_or_else(default_retry_backoff),
            retry_strategy: self.retry_strategy.unwrap_or_default(),
            max_backoff: self.max_backoff.unwrap_or_else(default_max_backoff),
            backoff_jitter: self.backoff_jitter.unwrap_or(0.0),
            connect_timeout: self.connect_timeout.unwrap_or_else(default_connect_timeout),
            operation_timeout: self.operation_timeout.unwrap_or_else(default_operation_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_parse() {
        assert_eq!("int".parse::<ValueType>().unwrap(), ValueType::Int);
        assert_eq!("Float".parse::<ValueType>().unwrap(), ValueType::Float);
        assert_eq!("BOOLEAN".parse::<ValueType>().unwrap(), ValueType::Bool);

        let err = "string".parse::<ValueType>().unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Configuration(ConfigurationError::InvalidValueType { .. })
        ));
    }

    #[test]
    fn test_value_cast() {
        assert_eq!(RegisterValue::cast(23.0, ValueType::Float), RegisterValue::Float(23.0));
        assert_eq!(RegisterValue::cast(23.99, ValueType::Int), RegisterValue::Int(23));
        assert_eq!(RegisterValue::cast(-23.99, ValueType::Int), RegisterValue::Int(-23));
        assert_eq!(RegisterValue::cast(0.0, ValueType::Bool), RegisterValue::Bool(false));
        assert_eq!(RegisterValue::cast(0.01, ValueType::Bool), RegisterValue::Bool(true));
        assert_eq!(RegisterValue::cast(-1.0, ValueType::Bool), RegisterValue::Bool(true));
    }

    #[test]
    fn test_value_wide_int() {
        let value = RegisterValue::from(u64::MAX);
        assert_eq!(value.as_i128(), Some(u64::MAX as i128));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.to_string(), "18446744073709551615");
        assert_eq!(RegisterValue::from(-5i64).as_i64(), Some(-5));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(RegisterValue::Float(23.0).to_string(), "23.0");
        assert_eq!(RegisterValue::Float(23.45).to_string(), "23.45");
        assert_eq!(RegisterValue::Int(1000).to_string(), "1000");
        assert_eq!(RegisterValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_reading_display() {
        let reading = RegisterReading::new("voltage", RegisterValue::Float(230.0), "V");
        assert_eq!(reading.to_string(), "voltage: 230.0 V");

        let unitless = RegisterReading::new("count", RegisterValue::Int(3), "");
        assert_eq!(unitless.to_string(), "count: 3 ");
    }

    #[test]
    fn test_register_spec_defaults() {
        let spec: RegisterSpec =
            serde_json::from_str(r#"{"name": "test", "address": 66}"#).unwrap();
        assert_eq!(spec.length, 1);
        assert!(!spec.signed);
        assert_eq!(spec.factor, 1.0);
        assert_eq!(spec.value_type, ValueType::Int);
        assert_eq!(spec.unit, "");
    }

    #[test]
    fn test_register_spec_rejects_unknown_type() {
        let result: Result<RegisterSpec, _> =
            serde_json::from_str(r#"{"name": "test", "address": 66, "type": "text"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_register_spec_validation() {
        assert!(RegisterSpec::builder("a", 0).length(0).build().is_err());
        assert!(RegisterSpec::builder("a", 0).length(5).build().is_err());
        assert!(RegisterSpec::builder("a", 0).factor(0.0).build().is_err());
        assert!(RegisterSpec::builder("a", 0).factor(f64::NAN).build().is_err());
        assert!(RegisterSpec::builder(" ", 0).build().is_err());
        assert!(RegisterSpec::builder("a", u16::MAX).length(2).build().is_err());
        assert!(RegisterSpec::builder("a", u16::MAX).build().is_ok());
        assert!(RegisterSpec::builder("a", 100).length(4).signed(true).build().is_ok());
    }

    #[test]
    fn test_device_config_defaults() {
        let config = DeviceConfig::builder().host("192.168.1.10").build().unwrap();
        assert_eq!(config.port, None);
        assert_eq!(config.effective_port(), DEFAULT_PORT);
        assert_eq!(config.unit_id, 1);
        assert_eq!(config.connect_retries, 10);
        assert_eq!(config.retry_backoff, Duration::from_secs(2));
        assert_eq!(config.target(), "192.168.1.10:502");
    }

    #[test]
    fn test_device_config_validation() {
        assert!(DeviceConfig::builder().build().is_err());
        assert!(DeviceConfig::builder().host("h").unit_id(0).build().is_err());
        assert!(DeviceConfig::builder().host("h").connect_retries(0).build().is_err());
        assert!(DeviceConfig::builder()
            .host("h")
            .connect_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_device_config_accepts_full_unit_id_range() {
        // Gateways address downstream devices with ids up to 255.
        for unit_id in [1u8, 247, 248, 255] {
            let config = DeviceConfig::builder().host("h").unit_id(unit_id).build().unwrap();
            assert_eq!(config.unit_id, unit_id);
        }
    }

    #[test]
    fn test_device_config_retry_policy() {
        let fixed = DeviceConfig::builder()
            .host("h")
            .connect_retries(4)
            .retry_backoff(Duration::from_millis(250))
            .build()
            .unwrap()
            .retry_config();
        assert_eq!(fixed.max_attempts, 4);
        assert_eq!(fixed.strategy.delay(0), Duration::from_millis(250));
        assert_eq!(fixed.strategy.delay(3), Duration::from_millis(250));

        let exponential = DeviceConfig::builder()
            .host("h")
            .retry_backoff(Duration::from_millis(100))
            .exponential_backoff(Duration::from_millis(300), 0.0)
            .build()
            .unwrap()
            .retry_config();
        assert_eq!(exponential.strategy.delay(0), Duration::from_millis(100));
        assert_eq!(exponential.strategy.delay(1), Duration::from_millis(200));
        assert_eq!(exponential.strategy.delay(5), Duration::from_millis(300));
    }

    #[test]
    fn test_device_config_deserialize_durations() {
        let config: DeviceConfig = serde_json::from_str(
            r#"{"host": "plc.local", "port": 1502, "retry_backoff": "500ms"}"#,
        )
        .unwrap();
        assert_eq!(config.port, Some(1502));
        assert_eq!(config.retry_backoff, Duration::from_millis(500));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_connection_state() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(ConnectionState::Failed.is_terminal());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::Failed.to_string(), "failed");
    }
}
