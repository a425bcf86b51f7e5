// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # modreg-modbus
//!
//! Named, typed, scaled access to Modbus-TCP holding registers.
//!
//! A [`ModbusDevice`] owns a transport and a registry of named registers.
//! Each register knows its address, word length, signedness, scaling
//! factor, value type and display unit, and converts between raw 16-bit
//! words and application values.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ModbusDevice                             │
//! │        (connection state machine, bounded connect retry)        │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                     │
//!            ▼                                     ▼
//! ┌─────────────────────┐             ┌─────────────────────────────┐
//! │  RegisterRegistry   │             │  HoldingRegisterTransport   │
//! │  Register (scale,   │────────────▶│  (tokio-modbus TCP / mock)  │
//! │  cast, cache)       │             └─────────────────────────────┘
//! └─────────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │     codec           │
//! │ (big-endian words)  │
//! └─────────────────────┘
//! ```
//!
//! ## Features
//!
//! - `tcp` (default): Modbus TCP transport via `tokio-modbus`
//! - `mock`: in-memory [`client::MockTransport`] for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use modreg_modbus::{DeviceConfig, ModbusDevice, RegisterSpec};
//!
//! let config = DeviceConfig::builder().host("192.168.178.107").build()?;
//! let mut device = ModbusDevice::open_tcp(config).await?;
//!
//! device.new_register(RegisterSpec::new("status", 0)).await?;
//! for reading in device.read_all().await? {
//!     println!("{reading}");
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! if let Err(error) = device.write("setpoint", 12.0).await {
//!     error.log("write");
//!     for hint in error.recovery_hints() {
//!         eprintln!("Hint: {}", hint);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod client;
pub mod codec;
pub mod device;
pub mod error;
pub mod register;
pub mod registry;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigurationError, ConnectionError, ConversionError, ErrorCode, ErrorSeverity, ModbusError,
    ModbusResult, OperationError, RegistrationError, RegistryError, TransportError,
    TransportResult,
};

pub use types::{
    BackoffKind, ConnectionState, DeviceConfig, DeviceConfigBuilder, RegisterReading,
    RegisterSpec, RegisterSpecBuilder, RegisterValue, ValueType, DEFAULT_PORT,
};

pub use client::{ExponentialBackoff, HoldingRegisterTransport, RetryConfig, RetryStrategy};

#[cfg(feature = "tcp")]
pub use client::ModbusTcpTransport;

pub use device::ModbusDevice;

#[cfg(feature = "tcp")]
pub use device::TcpDevice;

pub use register::Register;
pub use registry::RegisterRegistry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
