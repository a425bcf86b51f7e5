// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport for holding-register access.
//!
//! A [`ModbusDevice`](crate::device::ModbusDevice) never talks to the
//! network directly; it drives a [`HoldingRegisterTransport`] it owns
//! exclusively.

use async_trait::async_trait;

use crate::error::TransportResult;

/// Raw holding-register I/O against one Modbus endpoint.
///
/// # Implementors
///
/// - [`ModbusTcpTransport`](super::tcp::ModbusTcpTransport): Modbus TCP via `tokio-modbus`
/// - `MockTransport` (feature `mock`): scriptable in-memory transport
///
/// # Example
///
/// ```rust,ignore
/// use modreg_modbus::client::HoldingRegisterTransport;
///
/// async fn first_word<T: HoldingRegisterTransport>(transport: &mut T) -> Option<u16> {
///     let words = transport.read_holding_registers(0, 1, 1).await.ok()?;
///     words.first().copied()
/// }
/// ```
#[async_trait]
pub trait HoldingRegisterTransport: Send {
    /// Opens the connection.
    ///
    /// `Ok(false)` means the endpoint was reachable but refused the session;
    /// the device treats it like an error and retries.
    async fn connect(&mut self) -> TransportResult<bool>;

    /// Releases the connection.
    async fn close(&mut self) -> TransportResult<()>;

    /// Reads `count` holding registers (FC 03) starting at `address`.
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit_id: u8,
    ) -> TransportResult<Vec<u16>>;

    /// Writes `words` to consecutive holding registers (FC 16) starting at `address`.
    async fn write_registers(
        &mut self,
        address: u16,
        words: &[u16],
        unit_id: u8,
    ) -> TransportResult<()>;

    /// Returns a display name for logs.
    fn display_name(&self) -> String;
}

#[async_trait]
impl<T: HoldingRegisterTransport + ?Sized> HoldingRegisterTransport for Box<T> {
    async fn connect(&mut self) -> TransportResult<bool> {
        (**self).connect().await
    }

    async fn close(&mut self) -> TransportResult<()> {
        (**self).close().await
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit_id: u8,
    ) -> TransportResult<Vec<u16>> {
        (**self).read_holding_registers(address, count, unit_id).await
    }

    async fn write_registers(
        &mut self,
        address: u16,
        words: &[u16],
        unit_id: u8,
    ) -> TransportResult<()> {
        (**self).write_registers(address, words, unit_id).await
    }

    fn display_name(&self) -> String {
        (**self).display_name()
    }
}
