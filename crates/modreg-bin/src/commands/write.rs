// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `write` command.

use anyhow::{bail, Context};
use tracing::info;

use modreg_modbus::{HoldingRegisterTransport, ModbusDevice};

use crate::cli::{Cli, WriteArgs};
use crate::error::{BinError, BinResult};
use crate::runtime;

/// Executes the `write` command.
pub async fn write(cli: &Cli, args: WriteArgs) -> BinResult<()> {
    let value = parse_value(&args.value)
        .map_err(|e| BinError::invalid_argument(format!("{e:#}")))?;

    let config = runtime::load(&cli.config)?;
    let mut device = runtime::open_device(&config, Some(&args.name)).await?;

    let result = write_one(&mut device, &args.name, value).await;
    device.close().await;
    result?;

    println!("{} <- {}", args.name, args.value);
    Ok(())
}

/// Writes `value` to a declared register.
pub async fn write_one<T>(device: &mut ModbusDevice<T>, name: &str, value: f64) -> BinResult<()>
where
    T: HoldingRegisterTransport,
{
    device.write(name, value).await?;
    info!(register = name, value, "Value written");
    Ok(())
}

/// Parses a command-line value: a finite number, `true` or `false`.
pub fn parse_value(raw: &str) -> anyhow::Result<f64> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return Ok(1.0),
        "false" => return Ok(0.0),
        _ => {}
    }

    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("'{raw}' is not a number or boolean"))?;
    if !value.is_finite() {
        bail!("'{raw}' is not a finite number");
    }
    Ok(value)
}
