// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Device session setup.
//!
//! Every device command follows the same sequence:
//!
//! 1. Load and validate the configuration file
//! 2. Connect to the device with bounded retry
//! 3. Declare the registers the command needs (each one probe-read)
//! 4. Run the command
//! 5. Close the connection, whether or not the command succeeded

use std::path::Path;

use tracing::{debug, info};

use modreg_config::{load_config, ModregConfig};
use modreg_modbus::{HoldingRegisterTransport, ModbusDevice, ModbusError, RegisterSpec, TcpDevice};

use crate::error::BinResult;

/// Loads and validates the configuration at `path`.
pub fn load(path: &Path) -> BinResult<ModregConfig> {
    let config = load_config(path)?;
    info!(
        path = %path.display(),
        device = %config.device,
        registers = config.registers.len(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Picks the declarations a command needs.
///
/// With `only = Some(name)` just that register is declared, so a broken
/// declaration elsewhere in the file does not block a single read or write.
pub fn select_registers(config: &ModregConfig, only: Option<&str>) -> BinResult<Vec<RegisterSpec>> {
    match only {
        None => Ok(config.registers.clone()),
        Some(name) => config
            .register(name)
            .cloned()
            .map(|spec| vec![spec])
            .ok_or_else(|| ModbusError::not_found(name).into()),
    }
}

/// Declares `specs` on `device` in order, stopping at the first failure.
pub async fn declare_registers<T>(device: &mut ModbusDevice<T>, specs: &[RegisterSpec]) -> BinResult<()>
where
    T: HoldingRegisterTransport,
{
    for spec in specs {
        let value = device.new_register(spec.clone()).await?;
        debug!(register = %spec.name, address = spec.address, %value, "Register declared");
    }
    Ok(())
}

/// Connects `device` and declares `specs`, closing it again on failure.
pub async fn prepare<T>(device: &mut ModbusDevice<T>, specs: &[RegisterSpec]) -> BinResult<()>
where
    T: HoldingRegisterTransport,
{
    device.connect().await?;
    if let Err(e) = declare_registers(device, specs).await {
        device.close().await;
        return Err(e);
    }
    Ok(())
}

/// Opens a TCP session for `config`, declaring the selected registers.
pub async fn open_device(config: &ModregConfig, only: Option<&str>) -> BinResult<TcpDevice> {
    let specs = select_registers(config, only)?;
    let mut device = ModbusDevice::tcp(config.device.clone())?;
    prepare(&mut device, &specs).await?;
    Ok(device)
}

// =============================================================================
// Tests
// =============================================================================
