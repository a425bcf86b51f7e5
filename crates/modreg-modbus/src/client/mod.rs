// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transport layer and connection retry policy.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ModbusDevice                             │
//! │           (registry, value pipeline, retry loop)                │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  HoldingRegisterTransport                       │
//! │                 (FC 03 reads, FC 16 writes)                     │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                     │
//!            ▼                                     ▼
//! ┌─────────────────────┐             ┌─────────────────────┐
//! │  ModbusTcpTransport │             │    MockTransport    │
//! │   (tokio-modbus)    │             │   (feature mock)    │
//! └─────────────────────┘             └─────────────────────┘
//! ```

mod retry;
mod transport;

#[cfg(feature = "tcp")]
mod tcp;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use retry::{ExponentialBackoff, RetryConfig, RetryStrategy};
pub use transport::HoldingRegisterTransport;

#[cfg(feature = "tcp")]
pub use tcp::ModbusTcpTransport;

#[cfg(any(test, feature = "mock"))]
pub use mock::{ConnectFailure, MockTransport};
