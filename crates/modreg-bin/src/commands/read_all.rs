// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read-all` command.

use modreg_modbus::RegisterReading;

use crate::cli::{Cli, OutputFormat, ReadAllArgs};
use crate::error::BinResult;
use crate::runtime;

/// Executes the `read-all` command.
pub async fn read_all(cli: &Cli, args: ReadAllArgs) -> BinResult<()> {
    let config = runtime::load(&cli.config)?;
    let mut device = runtime::open_device(&config, None).await?;

    let result = device.read_all().await;
    device.close().await;

    println!("{}", render_readings(&result?, args.format)?);
    Ok(())
}

/// Renders readings in the requested format.
pub fn render_readings(readings: &[RegisterReading], format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text => Ok(readings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(readings)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modreg_modbus::RegisterValue;

    fn readings() -> Vec<RegisterReading> {
        vec![
            RegisterReading::new("a", RegisterValue::Int(1000), ""),
            RegisterReading::new("b", RegisterValue::Float(250.0), "V"),
        ]
    }

    #[test]
    fn test_render_text() {
        let text = render_readings(&readings(), OutputFormat::Text).unwrap();
        assert_eq!(text, "a: 1000 \nb: 250.0 V");
    }

    #[test]
    fn test_render_json() {
        let json = render_readings(&readings(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                { "name": "a", "value": 1000, "unit": "" },
                { "name": "b", "value": 250.0, "unit": "V" },
            ])
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_readings(&[], OutputFormat::Text).unwrap(), "");
        assert_eq!(render_readings(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
