// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read` command.

use modreg_modbus::{HoldingRegisterTransport, ModbusDevice};

use crate::cli::{Cli, ReadArgs};
use crate::error::BinResult;
use crate::runtime;

/// Executes the `read` command: prints `"{name}: {value} {unit}"`.
pub async fn read(cli: &Cli, args: ReadArgs) -> BinResult<()> {
    let config = runtime::load(&cli.config)?;
    let mut device = runtime::open_device(&config, Some(&args.name)).await?;

    let result = read_one(&mut device, &args.name).await;
    device.close().await;

    println!("{}", result?);
    Ok(())
}

/// Reads one declared register and formats it for display.
pub async fn read_one<T>(device: &mut ModbusDevice<T>, name: &str) -> BinResult<String>
where
    T: HoldingRegisterTransport,
{
    Ok(device.read_string(name).await?)
}
