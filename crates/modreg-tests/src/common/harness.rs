// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Device Harness
//!
//! Pairs a [`ModbusDevice`] with a handle on its [`MockTransport`], so a
//! test can script the device's registers and inspect the traffic after the
//! device has taken ownership of the transport.

use modreg_modbus::client::MockTransport;
use modreg_modbus::{DeviceConfig, ModbusDevice, RegisterSpec, RegisterValue};

use super::fixtures::DeviceFixtures;

/// A mock-backed device under test.
pub struct DeviceHarness {
    /// Shared handle on the transport the device owns.
    pub mock: MockTransport,
    /// The device under test.
    pub device: ModbusDevice<MockTransport>,
}

impl DeviceHarness {
    /// Creates a disconnected device.
    pub fn new(config: DeviceConfig) -> Self {
        let mock = MockTransport::new();
        let device =
            ModbusDevice::new(config, mock.clone()).expect("Failed to create device under test");
        Self { mock, device }
    }

    /// Creates a device with the default fixture config and connects it.
    pub async fn connected() -> Self {
        let mut harness = Self::new(DeviceFixtures::inverter());
        harness
            .device
            .connect()
            .await
            .expect("Failed to connect device under test");
        harness
    }

    /// Scripts `words` at the register's address and declares it.
    pub async fn declare(&mut self, spec: RegisterSpec, words: &[u16]) -> RegisterValue {
        self.mock.set_words(spec.address, words).await;
        let name = spec.name.clone();
        self.device
            .new_register(spec)
            .await
            .unwrap_or_else(|e| panic!("Failed to declare '{name}': {e}"))
    }

    /// Updates the words the mock returns at `address`.
    pub async fn set_words(&self, address: u16, words: &[u16]) {
        self.mock.set_words(address, words).await;
    }
}
