// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The device: connection lifecycle plus a registry of named registers.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──▶ Connected ──close()──▶ Disconnected
//!                                  │
//!                                  └──retries exhausted──▶ Failed
//! ```
//!
//! `Failed` is terminal: `connect()` on a failed device returns
//! [`ConnectionError::Failed`] without touching the transport.
//!
//! # Logging
//!
//! Every event is recorded inside the span passed at construction. The
//! default span is `modbus_device` with `host`, `port` and `unit_id` fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use modreg_modbus::{DeviceConfig, ModbusDevice, RegisterSpec, ValueType};
//!
//! let config = DeviceConfig::builder().host("192.168.178.107").build()?;
//! let mut device = ModbusDevice::open_tcp(config).await?;
//!
//! device
//!     .new_register(
//!         RegisterSpec::builder("grid_voltage", 66)
//!             .factor(0.1)
//!             .value_type(ValueType::Float)
//!             .unit("V")
//!             .build()?,
//!     )
//!     .await?;
//!
//! println!("{}", device.read_string("grid_voltage").await?);
//! device.close().await;
//! ```

use std::fmt;

use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::client::HoldingRegisterTransport;
use crate::error::{ConnectionError, ModbusError, ModbusResult};
use crate::register::Register;
use crate::registry::RegisterRegistry;
use crate::types::{ConnectionState, DeviceConfig, RegisterReading, RegisterSpec, RegisterValue};

#[cfg(feature = "tcp")]
use crate::client::ModbusTcpTransport;

/// A Modbus device reached through a transport it owns exclusively.
///
/// All methods take `&mut self`; share a device between tasks behind a
/// `tokio::sync::Mutex`.
pub struct ModbusDevice<T: HoldingRegisterTransport> {
    config: DeviceConfig,
    transport: T,
    state: ConnectionState,
    registers: RegisterRegistry,
    span: Span,
}

/// A device over Modbus TCP.
#[cfg(feature = "tcp")]
pub type TcpDevice = ModbusDevice<ModbusTcpTransport>;

impl<T: HoldingRegisterTransport> ModbusDevice<T> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a disconnected device.
    pub fn new(config: DeviceConfig, transport: T) -> ModbusResult<Self> {
        let span = info_span!(
            "modbus_device",
            host = %config.host,
            port = config.effective_port(),
            unit_id = config.unit_id
        );
        Self::with_span(config, transport, span)
    }

    /// Creates a disconnected device that logs inside `span`.
    pub fn with_span(config: DeviceConfig, transport: T, span: Span) -> ModbusResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            state: ConnectionState::Disconnected,
            registers: RegisterRegistry::new(),
            span,
        })
    }

    /// Creates a device and connects it.
    pub async fn open(config: DeviceConfig, transport: T) -> ModbusResult<Self> {
        let mut device = Self::new(config, transport)?;
        device.connect().await?;
        Ok(device)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` if connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Device configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The span events are recorded in.
    pub fn span(&self) -> &Span {
        &self.span
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Connects, retrying with the configured backoff.
    ///
    /// The backoff is slept after every failed attempt, including the last.
    /// When all attempts fail the device becomes [`ConnectionState::Failed`].
    pub async fn connect(&mut self) -> ModbusResult<()> {
        let span = self.span.clone();
        self.connect_with_retry().instrument(span).await
    }

    async fn connect_with_retry(&mut self) -> ModbusResult<()> {
        match self.state {
            ConnectionState::Connected => return Ok(()),
            ConnectionState::Failed => {
                return Err(ModbusError::connection(ConnectionError::Failed {
                    target: self.config.target(),
                }));
            }
            ConnectionState::Disconnected | ConnectionState::Connecting => {}
        }

        let retry = self.config.retry_config();
        self.state = ConnectionState::Connecting;
        debug!(
            max_attempts = retry.max_attempts,
            backoff_budget = %humantime::format_duration(retry.total_backoff()),
            "Connecting"
        );

        let mut last_error = None;
        for attempt in 0..retry.max_attempts {
            match self.transport.connect().await {
                Ok(true) => {
                    self.state = ConnectionState::Connected;
                    info!(
                        transport = %self.transport.display_name(),
                        attempt = attempt + 1,
                        "Connected"
                    );
                    return Ok(());
                }
                Ok(false) => {
                    last_error = None;
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = retry.max_attempts,
                        "Connection attempt refused"
                    );
                }
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = retry.max_attempts,
                        error = %e,
                        "Connection attempt failed"
                    );
                    last_error = Some(e);
                }
            }

            let delay = retry.strategy.delay(attempt);
            debug!(delay = %humantime::format_duration(delay), "Backing off");
            tokio::time::sleep(delay).await;
        }

        self.state = ConnectionState::Failed;
        let error = ModbusError::connection(ConnectionError::RetriesExhausted {
            target: self.config.target(),
            attempts: retry.max_attempts,
            last_error,
        });
        error.log("connect");
        Err(error)
    }

    /// Releases the transport. Never fails.
    ///
    /// The device ends `Disconnected`, except a failed device stays `Failed`.
    pub async fn close(&mut self) {
        let span = self.span.clone();
        async {
            if let Err(e) = self.transport.close().await {
                warn!(error = %e, "Error closing transport");
            }

            if self.state != ConnectionState::Failed {
                self.state = ConnectionState::Disconnected;
            }
            info!(state = %self.state, "Closed");
        }
        .instrument(span)
        .await
    }

    fn ensure_connected(&self) -> ModbusResult<()> {
        if self.state.is_connected() {
            Ok(())
        } else {
            Err(ModbusError::connection(ConnectionError::NotConnected {
                target: self.config.target(),
                state: self.state,
            }))
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Declares a register, probe-reading it before it is committed.
    ///
    /// Returns the probed value. A failed probe leaves the registry unchanged
    /// and returns [`ModbusError::Registration`] wrapping the read error.
    pub async fn new_register(&mut self, spec: RegisterSpec) -> ModbusResult<RegisterValue> {
        let span = self.span.clone();
        async {
            if self.registers.contains(&spec.name) {
                return Err(ModbusError::duplicate_name(&spec.name));
            }

            let mut register = Register::new(spec)?;
            self.ensure_connected()?;

            let value = match register.read(&mut self.transport, self.config.unit_id).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(register = register.name(), error = %e, "Probe read failed");
                    return Err(ModbusError::registration(register.name(), e));
                }
            };

            info!(
                register = register.name(),
                address = register.address(),
                length = register.length(),
                value = %value,
                "Register added"
            );
            self.registers.insert(register)?;
            Ok(value)
        }
        .instrument(span)
        .await
    }

    /// Removes a register.
    pub fn remove_register(&mut self, name: &str) -> ModbusResult<()> {
        let _entered = self.span.enter();
        self.registers.remove(name)?;
        info!(register = name, "Register removed");
        Ok(())
    }

    /// Returns a read-only view of a register.
    pub fn register(&self, name: &str) -> ModbusResult<&Register> {
        self.registers.get(name)
    }

    /// Register names in declaration order.
    pub fn register_names(&self) -> Vec<&str> {
        self.registers.names()
    }

    /// Returns `true` if `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.registers.contains(name)
    }

    /// Number of declared registers.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Returns `true` if no register is declared.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    // =========================================================================
    // Register Operations
    // =========================================================================

    /// Reads a register's scaled, typed value.
    pub async fn read(&mut self, name: &str) -> ModbusResult<RegisterValue> {
        let span = self.span.clone();
        async {
            self.ensure_connected()?;
            let register = self.registers.get_mut(name)?;
            register
                .read(&mut self.transport, self.config.unit_id)
                .await
                .map_err(|e| {
                    e.log("read");
                    e
                })
        }
        .instrument(span)
        .await
    }

    /// Reads a register's raw words.
    pub async fn read_raw(&mut self, name: &str) -> ModbusResult<Vec<u16>> {
        let span = self.span.clone();
        async {
            self.ensure_connected()?;
            let register = self.registers.get_mut(name)?;
            register
                .read_raw(&mut self.transport, self.config.unit_id)
                .await
                .map_err(|e| {
                    e.log("read_raw");
                    e
                })
        }
        .instrument(span)
        .await
    }

    /// Writes an application value; it is divided by the factor and rounded.
    pub async fn write(&mut self, name: &str, value: f64) -> ModbusResult<()> {
        let span = self.span.clone();
        async {
            self.ensure_connected()?;
            let register = self.registers.get_mut(name)?;
            register
                .write(&mut self.transport, self.config.unit_id, value)
                .await
                .map_err(|e| {
                    e.log("write");
                    e
                })
        }
        .instrument(span)
        .await
    }

    /// Reads every register in declaration order.
    ///
    /// Stops at the first failing read and returns its error.
    pub async fn read_all(&mut self) -> ModbusResult<Vec<RegisterReading>> {
        let span = self.span.clone();
        async {
            self.ensure_connected()?;
            let unit_id = self.config.unit_id;
            let mut readings = Vec::with_capacity(self.registers.len());

            for register in self.registers.iter_mut() {
                let value = register
                    .read(&mut self.transport, unit_id)
                    .await
                    .map_err(|e| {
                        e.log("read_all");
                        e
                    })?;
                readings.push(RegisterReading::new(register.name(), value, register.unit()));
            }

            Ok(readings)
        }
        .instrument(span)
        .await
    }

    /// Reads a register and formats it as `"{name}: {value} {unit}"`.
    pub async fn read_string(&mut self, name: &str) -> ModbusResult<String> {
        let value = self.read(name).await?;
        let unit = self.registers.get(name)?.unit();
        Ok(RegisterReading::new(name, value, unit).to_string())
    }
}

#[cfg(feature = "tcp")]
impl ModbusDevice<ModbusTcpTransport> {
    /// Creates a disconnected Modbus TCP device.
    pub fn tcp(config: DeviceConfig) -> ModbusResult<Self> {
        let transport = ModbusTcpTransport::from_config(&config);
        Self::new(config, transport)
    }

    /// Creates a Modbus TCP device and connects it.
    pub async fn open_tcp(config: DeviceConfig) -> ModbusResult<Self> {
        let transport = ModbusTcpTransport::from_config(&config);
        Self::open(config, transport).await
    }
}

impl<T: HoldingRegisterTransport> fmt::Debug for ModbusDevice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModbusDevice")
            .field("target", &self.config.target())
            .field("unit_id", &self.config.unit_id)
            .field("state", &self.state)
            .field("registers", &self.registers.names())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
