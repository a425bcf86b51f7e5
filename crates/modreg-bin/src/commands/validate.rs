// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::fmt::Write as _;
use std::path::Path;

use modreg_config::ModregConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::runtime;

/// Executes the `validate` command. Never touches the network.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config = runtime::load(&cli.config)?;
    println!("{}", render_validation(&cli.config, &config, &args)?);
    Ok(())
}

/// Renders the validation report for a configuration that loaded cleanly.
pub fn render_validation(path: &Path, config: &ModregConfig, args: &ValidateArgs) -> BinResult<String> {
    let warnings = collect_warnings(config);

    match args.format {
        OutputFormat::Text => {
            let mut out = String::new();
            render_text(&mut out, path, config, &warnings, args.show_config)
                .map_err(|e| BinError::output(e.to_string()))?;
            Ok(out)
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": path.display().to_string(),
                "summary": {
                    "target": config.device.target(),
                    "unit_id": config.device.unit_id,
                    "connect_retries": config.device.connect_retries,
                    "register_count": config.registers.len(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(config) } else { None },
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

fn render_text(
    out: &mut String,
    path: &Path,
    config: &ModregConfig,
    warnings: &[String],
    show_config: bool,
) -> std::fmt::Result {
    writeln!(out, "✓ Configuration is valid: {}", path.display())?;
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "  Device:    {}", config.device)?;
    writeln!(out, "  Registers: {}", config.registers.len())?;
    for spec in &config.registers {
        writeln!(
            out,
            "    {:<20} @{:<5} len={} {} x{} {}",
            spec.name,
            spec.address,
            spec.length,
            spec.value_type,
            spec.factor,
            spec.unit
        )?;
    }

    if !warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "Warnings:")?;
        for warning in warnings {
            writeln!(out, "  ⚠ {}", warning)?;
        }
    }

    if show_config {
        writeln!(out)?;
        writeln!(out, "Parsed configuration:")?;
        match serde_json::to_string_pretty(config) {
            Ok(json) => writeln!(out, "{json}")?,
            Err(_) => writeln!(out, "(serialization error)")?,
        }
    }

    Ok(())
}

/// Flags declarations that load fine but are probably mistakes.
fn collect_warnings(config: &ModregConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.registers.is_empty() {
        warnings.push("No registers configured".to_string());
    }

    for (i, a) in config.registers.iter().enumerate() {
        let a_end = u32::from(a.address) + u32::from(a.length);
        for b in &config.registers[i + 1..] {
            let b_end = u32::from(b.address) + u32::from(b.length);
            if u32::from(a.address) < b_end && u32::from(b.address) < a_end {
                warnings.push(format!(
                    "Registers '{}' and '{}' overlap",
                    a.name, b.name
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use modreg_modbus::{DeviceConfig, RegisterSpec};

    fn config() -> ModregConfig {
        let device = DeviceConfig::builder().host("10.0.0.5").build().unwrap();
        ModregConfig::new(device)
            .with_register(RegisterSpec::builder("energy", 10).length(2).build().unwrap())
            .with_register(RegisterSpec::new("status", 11))
    }

    #[test]
    fn test_overlap_warning() {
        let warnings = collect_warnings(&config());
        assert_eq!(warnings, ["Registers 'energy' and 'status' overlap"]);
    }

    #[test]
    fn test_adjacent_registers_do_not_overlap() {
        let device = DeviceConfig::builder().host("10.0.0.5").build().unwrap();
        let config = ModregConfig::new(device)
            .with_register(RegisterSpec::builder("energy", 10).length(2).build().unwrap())
            .with_register(RegisterSpec::new("status", 12));
        assert!(collect_warnings(&config).is_empty());
    }

    #[test]
    fn test_no_registers_warning() {
        let device = DeviceConfig::builder().host("10.0.0.5").build().unwrap();
        let warnings = collect_warnings(&ModregConfig::new(device));
        assert_eq!(warnings, ["No registers configured"]);
    }

    #[test]
    fn test_render_text() {
        let text = render_validation(Path::new("modreg.yaml"), &config(), &ValidateArgs::default()).unwrap();
        assert!(text.starts_with("✓ Configuration is valid: modreg.yaml"));
        assert!(text.contains("Registers: 2"));
        assert!(text.contains("overlap"));
        assert!(!text.contains("Parsed configuration"));
    }

    #[test]
    fn test_render_json() {
        let args = ValidateArgs {
            format: OutputFormat::Json,
            show_config: true,
        };
        let json = render_validation(Path::new("modreg.yaml"), &config(), &args).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["valid"], true);
        assert_eq!(parsed["summary"]["target"], "10.0.0.5:502");
        assert_eq!(parsed["summary"]["register_count"], 2);
        assert_eq!(parsed["config"]["registers"][0]["name"], "energy");
    }
}
