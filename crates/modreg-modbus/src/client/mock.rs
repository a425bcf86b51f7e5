// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory transport for tests.
//!
//! `MockTransport` is a cheap handle over shared state: clone it before
//! handing it to a device and keep the clone to script failures and inspect
//! calls afterwards.
//!
//! ```rust,ignore
//! let mock = MockTransport::new();
//! mock.set_words(66, &[230]).await;
//!
//! let mut device = ModbusDevice::open(config, mock.clone()).await?;
//! device.new_register(spec).await?;
//! assert_eq!(mock.read_count(), 1);
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::{TransportError, TransportResult};

use super::transport::HoldingRegisterTransport;

/// How a scripted connection attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectFailure {
    /// `connect()` returns `Ok(false)`.
    #[default]
    Refused,
    /// `connect()` returns an I/O error.
    Error,
}

#[derive(Debug, Default)]
struct MockState {
    words: RwLock<HashMap<u16, u16>>,
    write_history: Mutex<Vec<(u16, Vec<u16>)>>,
    read_history: Mutex<Vec<(u16, u16, u8)>>,
    read_latency: Mutex<Duration>,

    connected: AtomicBool,
    connect_failure: Mutex<ConnectFailure>,
    /// Remaining failing connection attempts; `u32::MAX` fails forever.
    failing_connects: AtomicU32,
    fail_close: AtomicBool,
    fail_next_read: AtomicBool,
    fail_all_reads: AtomicBool,
    fail_all_writes: AtomicBool,
    short_reads: AtomicBool,

    connect_count: AtomicU64,
    close_count: AtomicU64,
    read_count: AtomicU64,
    write_count: AtomicU64,
}

/// Scriptable holding-register transport.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    /// Creates a mock whose registers all read as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets consecutive words starting at `address`.
    pub async fn set_words(&self, address: u16, words: &[u16]) {
        let mut store = self.state.words.write().await;
        for (offset, word) in words.iter().enumerate() {
            store.insert(address.wrapping_add(offset as u16), *word);
        }
    }

    /// Returns `count` words starting at `address`.
    pub async fn words(&self, address: u16, count: u16) -> Vec<u16> {
        let store = self.state.words.read().await;
        (0..count)
            .map(|offset| store.get(&address.wrapping_add(offset)).copied().unwrap_or(0))
            .collect()
    }

    /// Makes every connection attempt fail.
    pub async fn fail_connection(&self, failure: ConnectFailure) {
        self.fail_connects(u32::MAX, failure).await;
    }

    /// Makes the next `attempts` connection attempts fail.
    pub async fn fail_connects(&self, attempts: u32, failure: ConnectFailure) {
        *self.state.connect_failure.lock().await = failure;
        self.state.failing_connects.store(attempts, Ordering::SeqCst);
    }

    /// Makes `close()` return an error.
    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Forces the next read to fail.
    pub fn fail_next_read(&self) {
        self.state.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Forces all reads to fail.
    pub fn fail_all_reads(&self, fail: bool) {
        self.state.fail_all_reads.store(fail, Ordering::SeqCst);
    }

    /// Forces all writes to fail.
    pub fn fail_all_writes(&self, fail: bool) {
        self.state.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes reads return one word fewer than requested.
    pub fn short_reads(&self, enabled: bool) {
        self.state.short_reads.store(enabled, Ordering::SeqCst);
    }

    /// Sets the simulated read latency.
    pub async fn set_read_latency(&self, latency: Duration) {
        *self.state.read_latency.lock().await = latency;
    }

    /// Returns `true` while connected.
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Number of `connect()` calls.
    pub fn connect_count(&self) -> u64 {
        self.state.connect_count.load(Ordering::SeqCst)
    }

    /// Number of `close()` calls.
    pub fn close_count(&self) -> u64 {
        self.state.close_count.load(Ordering::SeqCst)
    }

    /// Number of read calls.
    pub fn read_count(&self) -> u64 {
        self.state.read_count.load(Ordering::SeqCst)
    }

    /// Number of write calls.
    pub fn write_count(&self) -> u64 {
        self.state.write_count.load(Ordering::SeqCst)
    }

    /// Successful writes as `(address, words)`.
    pub async fn write_history(&self) -> Vec<(u16, Vec<u16>)> {
        self.state.write_history.lock().await.clone()
    }

    /// Read requests as `(address, count, unit_id)`.
    pub async fn read_history(&self) -> Vec<(u16, u16, u8)> {
        self.state.read_history.lock().await.clone()
    }

    fn take_connect_failure(&self) -> bool {
        self.state
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| match remaining {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[async_trait]
impl HoldingRegisterTransport for MockTransport {
    async fn connect(&mut self) -> TransportResult<bool> {
        self.state.connect_count.fetch_add(1, Ordering::SeqCst);

        if self.take_connect_failure() {
            return match *self.state.connect_failure.lock().await {
                ConnectFailure::Refused => Ok(false),
                ConnectFailure::Error => Err(TransportError::Refused {
                    target: self.display_name(),
                    source: Some(io::Error::from(io::ErrorKind::ConnectionRefused)),
                }),
            };
        }

        self.state.connected.store(true, Ordering::SeqCst);
        Ok(true)
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.state.close_count.fetch_add(1, Ordering::SeqCst);
        self.state.connected.store(false, Ordering::SeqCst);

        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(TransportError::Closed {
                reason: "mock close failure".to_string(),
            });
        }
        Ok(())
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit_id: u8,
    ) -> TransportResult<Vec<u16>> {
        self.state.read_count.fetch_add(1, Ordering::SeqCst);
        self.state
            .read_history
            .lock()
            .await
            .push((address, count, unit_id));

        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        if self.state.fail_all_reads.load(Ordering::SeqCst)
            || self.state.fail_next_read.swap(false, Ordering::SeqCst)
        {
            return Err(TransportError::Io {
                source: io::Error::new(io::ErrorKind::Other, "mock read failure"),
            });
        }

        let latency = *self.state.read_latency.lock().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut words = self.words(address, count).await;
        if self.state.short_reads.load(Ordering::SeqCst) {
            words.pop();
        }
        Ok(words)
    }

    async fn write_registers(
        &mut self,
        address: u16,
        words: &[u16],
        _unit_id: u8,
    ) -> TransportResult<()> {
        self.state.write_count.fetch_add(1, Ordering::SeqCst);

        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        if self.state.fail_all_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Exception { code: 0x04 });
        }

        self.state
            .write_history
            .lock()
            .await
            .push((address, words.to_vec()));
        self.set_words(address, words).await;
        Ok(())
    }

    fn display_name(&self) -> String {
        "mock".to_string()
    }
}
