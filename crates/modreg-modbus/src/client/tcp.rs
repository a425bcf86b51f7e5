// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus TCP transport.
//!
//! Uses the `tokio-modbus` crate for framing; this module only adds
//! timeouts and error mapping.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_modbus::client::Context as ModbusContext;
use tokio_modbus::prelude::*;
use tokio_modbus::{Error as TokioModbusError, ExceptionCode};

use crate::error::{TransportError, TransportResult};
use crate::types::{DeviceConfig, DEFAULT_PORT};

use super::transport::HoldingRegisterTransport;

/// Modbus TCP transport using tokio-modbus.
///
/// # Example
///
/// ```rust,ignore
/// use modreg_modbus::client::{HoldingRegisterTransport, ModbusTcpTransport};
///
/// let mut transport = ModbusTcpTransport::new("192.168.1.100", None);
/// transport.connect().await?;
/// let words = transport.read_holding_registers(66, 1, 1).await?;
/// ```
pub struct ModbusTcpTransport {
    host: String,
    port: u16,
    connect_timeout: Duration,
    operation_timeout: Duration,
    context: Option<ModbusContext>,
}

impl ModbusTcpTransport {
    /// Creates a transport; `None` selects port 502.
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port: port.unwrap_or(DEFAULT_PORT),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(3),
            context: None,
        }
    }

    /// Creates a transport from a device configuration.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.host.clone(), config.port)
            .with_connect_timeout(config.connect_timeout)
            .with_operation_timeout(config.operation_timeout)
    }

    /// Sets the TCP connect timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Sets the read/write timeout.
    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    /// Returns `host:port`.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `true` while a session is open.
    pub fn is_connected(&self) -> bool {
        self.context.is_some()
    }

    /// Resolves `host:port`, preferring a literal socket address.
    ///
    /// Takes the target by value so the connect future never borrows the
    /// transport, whose session is `Send` but not `Sync`.
    async fn resolve_address(target: String) -> TransportResult<SocketAddr> {
        if let Ok(addr) = target.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let mut addrs = tokio::net::lookup_host(target.clone())
            .await
            .map_err(|e| TransportError::Refused {
                target: target.clone(),
                source: Some(e),
            })?;

        addrs.next().ok_or(TransportError::Refused {
            target,
            source: None,
        })
    }

    fn map_modbus_error(error: TokioModbusError) -> TransportError {
        match error {
            TokioModbusError::Transport(io_error) => match io_error.kind() {
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof => TransportError::Closed {
                    reason: io_error.to_string(),
                },
                io::ErrorKind::NotConnected => TransportError::NotConnected,
                _ => TransportError::Io { source: io_error },
            },
            TokioModbusError::Protocol(protocol_error) => TransportError::Io {
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("protocol error: {:?}", protocol_error),
                ),
            },
        }
    }

    fn exception_code_to_u8(code: &ExceptionCode) -> u8 {
        match code {
            ExceptionCode::IllegalFunction => 0x01,
            ExceptionCode::IllegalDataAddress => 0x02,
            ExceptionCode::IllegalDataValue => 0x03,
            ExceptionCode::ServerDeviceFailure => 0x04,
            ExceptionCode::Acknowledge => 0x05,
            ExceptionCode::ServerDeviceBusy => 0x06,
            ExceptionCode::MemoryParityError => 0x08,
            ExceptionCode::GatewayPathUnavailable => 0x0A,
            ExceptionCode::GatewayTargetDevice => 0x0B,
            _ => 0xFF,
        }
    }

    /// Drops the session after errors that leave the socket unusable.
    fn settle(&mut self, error: &TransportError) {
        if matches!(error, TransportError::Closed { .. } | TransportError::Io { .. }) {
            self.context = None;
        }
    }
}

#[async_trait]
impl HoldingRegisterTransport for ModbusTcpTransport {
    async fn connect(&mut self) -> TransportResult<bool> {
        if self.context.is_some() {
            return Ok(true);
        }

        let target = self.socket_addr();
        let socket_addr = Self::resolve_address(target.clone()).await?;

        let stream = timeout(self.connect_timeout, TcpStream::connect(socket_addr))
            .await
            .map_err(|_| TransportError::Timeout {
                operation: "connect",
                duration: self.connect_timeout,
            })?
            .map_err(|e| TransportError::Refused {
                target: target.clone(),
                source: Some(e),
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(target = %target, error = %e, "Failed to set TCP_NODELAY");
        }

        self.context = Some(tcp::attach(stream));

        tracing::debug!(target = %target, "Modbus TCP session opened");
        Ok(true)
    }

    async fn close(&mut self) -> TransportResult<()> {
        let Some(mut ctx) = self.context.take() else {
            return Ok(());
        };

        ctx.disconnect()
            .await
            .map_err(|source| TransportError::Io { source })?;

        tracing::debug!(target = %self.socket_addr(), "Modbus TCP session closed");
        Ok(())
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit_id: u8,
    ) -> TransportResult<Vec<u16>> {
        let ctx = self.context.as_mut().ok_or(TransportError::NotConnected)?;
        ctx.set_slave(Slave(unit_id));

        let result = timeout(
            self.operation_timeout,
            ctx.read_holding_registers(address, count),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            operation: "read_holding_registers",
            duration: self.operation_timeout,
        })
        .and_then(|r| r.map_err(Self::map_modbus_error))
        .and_then(|r| {
            r.map_err(|code| TransportError::Exception {
                code: Self::exception_code_to_u8(&code),
            })
        });

        if let Err(e) = &result {
            self.settle(e);
        }
        result
    }

    async fn write_registers(
        &mut self,
        address: u16,
        words: &[u16],
        unit_id: u8,
    ) -> TransportResult<()> {
        let ctx = self.context.as_mut().ok_or(TransportError::NotConnected)?;
        ctx.set_slave(Slave(unit_id));

        let result = timeout(
            self.operation_timeout,
            ctx.write_multiple_registers(address, words),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            operation: "write_multiple_registers",
            duration: self.operation_timeout,
        })
        .and_then(|r| r.map_err(Self::map_modbus_error))
        .and_then(|r| {
            r.map_err(|code| TransportError::Exception {
                code: Self::exception_code_to_u8(&code),
            })
        });

        if let Err(e) = &result {
            self.settle(e);
        }
        result
    }

    fn display_name(&self) -> String {
        format!("Modbus TCP {}", self.socket_addr())
    }
}

impl std::fmt::Debug for ModbusTcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusTcpTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connected", &self.context.is_some())
            .finish()
    }
}
