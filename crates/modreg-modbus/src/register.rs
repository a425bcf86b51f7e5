// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! A named holding register and its value pipeline.
//!
//! ```text
//! read:  transport ─▶ raw words ─▶ decode ─▶ × factor ─▶ round(2) ─▶ cast
//! write: value ─▶ ÷ factor ─▶ round ─▶ encode ─▶ transport
//! ```
//!
//! Rounding uses [`f64::round`] (half away from zero).

use tracing::debug;

use crate::client::HoldingRegisterTransport;
use crate::codec;
use crate::error::{ConversionError, ModbusError, ModbusResult, OperationError};
use crate::types::{RegisterSpec, RegisterValue, ValueType};

/// Rounds to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scales a decoded integer for an `Int` register, truncating toward zero.
///
/// Whole factors stay in integer arithmetic, so 64-bit counters keep every
/// digit instead of passing through an `f64` mantissa.
fn scale_int(integer: i128, factor: f64) -> Option<i128> {
    if factor.fract() == 0.0 && factor.abs() <= i64::MAX as f64 {
        return integer.checked_mul(factor as i128);
    }

    let scaled = round2(integer as f64 * factor).trunc();
    (scaled.is_finite() && scaled.abs() < i128::MAX as f64).then_some(scaled as i128)
}

/// A declared register plus the state cached by its last operations.
#[derive(Debug, Clone)]
pub struct Register {
    spec: RegisterSpec,
    last_raw_words: Option<Vec<u16>>,
    last_value: Option<RegisterValue>,
    last_written: Option<Vec<u16>>,
    last_error: bool,
}

impl Register {
    /// Creates a register from a validated declaration.
    pub fn new(spec: RegisterSpec) -> ModbusResult<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            last_raw_words: None,
            last_value: None,
            last_written: None,
            last_error: false,
        })
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The declaration this register was built from.
    pub fn spec(&self) -> &RegisterSpec {
        &self.spec
    }

    /// Start address.
    pub fn address(&self) -> u16 {
        self.spec.address
    }

    /// Word count.
    pub fn length(&self) -> u16 {
        self.spec.length
    }

    /// Value type.
    pub fn value_type(&self) -> ValueType {
        self.spec.value_type
    }

    /// Display unit.
    pub fn unit(&self) -> &str {
        &self.spec.unit
    }

    /// Raw words of the last successful read.
    pub fn last_raw_words(&self) -> Option<&[u16]> {
        self.last_raw_words.as_deref()
    }

    /// Value of the last successful read.
    pub fn last_value(&self) -> Option<RegisterValue> {
        self.last_value
    }

    /// Words sent by the last successful write.
    pub fn last_written(&self) -> Option<&[u16]> {
        self.last_written.as_deref()
    }

    /// `true` if the most recent transport operation failed.
    pub fn last_error(&self) -> bool {
        self.last_error
    }

    /// Converts raw words into a scaled, typed value.
    pub fn decode_value(&self, words: &[u16]) -> ModbusResult<RegisterValue> {
        let integer = codec::decode(words, self.spec.signed)?;
        match self.spec.value_type {
            ValueType::Int => scale_int(integer, self.spec.factor)
                .map(RegisterValue::Int)
                .ok_or_else(|| {
                    ModbusError::conversion(ConversionError::ScaledOutOfRange {
                        raw: integer,
                        factor: self.spec.factor,
                    })
                }),
            value_type => Ok(RegisterValue::cast(
                round2(integer as f64 * self.spec.factor),
                value_type,
            )),
        }
    }

    /// Converts an application value into the words to write.
    pub fn encode_value(&self, value: f64) -> ModbusResult<Vec<u16>> {
        let raw = (value / self.spec.factor).round();
        if !raw.is_finite() {
            return Err(ModbusError::conversion(ConversionError::out_of_range(
                value,
                self.spec.length,
                self.spec.signed,
            )));
        }

        codec::encode(raw as i128, self.spec.length, self.spec.signed).map_err(|e| match e {
            // Report the caller's value, not the unscaled integer
            ConversionError::ValueOutOfRange { length, signed, .. } => {
                ModbusError::conversion(ConversionError::out_of_range(value, length, signed))
            }
            other => ModbusError::conversion(other),
        })
    }

    /// Reads the raw words from the transport and caches them.
    pub async fn read_raw<T>(&mut self, transport: &mut T, unit_id: u8) -> ModbusResult<Vec<u16>>
    where
        T: HoldingRegisterTransport + ?Sized,
    {
        let words = match transport
            .read_holding_registers(self.spec.address, self.spec.length, unit_id)
            .await
        {
            Ok(words) => words,
            Err(source) => {
                self.last_error = true;
                return Err(ModbusError::operation(OperationError::read_failed(
                    &self.spec.name,
                    self.spec.address,
                    source,
                )));
            }
        };

        if words.len() != self.spec.length as usize {
            self.last_error = true;
            return Err(ModbusError::operation(OperationError::WordCountMismatch {
                name: self.spec.name.clone(),
                address: self.spec.address,
                expected: self.spec.length,
                actual: words.len(),
            }));
        }

        self.last_raw_words = Some(words.clone());
        self.last_error = false;
        Ok(words)
    }

    /// Reads, decodes, scales and casts the current value.
    pub async fn read<T>(&mut self, transport: &mut T, unit_id: u8) -> ModbusResult<RegisterValue>
    where
        T: HoldingRegisterTransport + ?Sized,
    {
        let words = self.read_raw(transport, unit_id).await?;
        let value = self.decode_value(&words)?;

        debug!(
            register = %self.spec.name,
            address = self.spec.address,
            raw = ?words,
            value = %value,
            "Register read"
        );

        self.last_value = Some(value);
        Ok(value)
    }

    /// Scales, encodes and writes an application value.
    ///
    /// Out-of-range values fail before the transport is called.
    pub async fn write<T>(&mut self, transport: &mut T, unit_id: u8, value: f64) -> ModbusResult<()>
    where
        T: HoldingRegisterTransport + ?Sized,
    {
        let words = self.encode_value(value)?;

        if let Err(source) = transport
            .write_registers(self.spec.address, &words, unit_id)
            .await
        {
            self.last_error = true;
            return Err(ModbusError::operation(OperationError::write_failed(
                &self.spec.name,
                self.spec.address,
                source,
            )));
        }

        debug!(
            register = %self.spec.name,
            address = self.spec.address,
            value,
            raw = ?words,
            "Register written"
        );

        self.last_written = Some(words);
        self.last_error = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;

    fn register(spec: RegisterSpec) -> Register {
        Register::new(spec).unwrap()
    }

    async fn connected_mock() -> MockTransport {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();
        mock
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(23.000000000000004), 23.0);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(0.333333), 0.33);
    }

    #[test]
    fn test_decode_scaling() {
        let reg = register(
            RegisterSpec::builder("voltage", 66)
                .factor(0.1)
                .value_type(ValueType::Float)
                .build()
                .unwrap(),
        );
        assert_eq!(reg.decode_value(&[230]).unwrap(), RegisterValue::Float(23.0));
    }

    #[test]
    fn test_decode_signed_int() {
        let reg = register(RegisterSpec::builder("temp", 0).signed(true).build().unwrap());
        assert_eq!(reg.decode_value(&[0xFFFF]).unwrap(), RegisterValue::Int(-1));

        let reg = register(
            RegisterSpec::builder("temp", 0)
                .signed(true)
                .factor(0.1)
                .build()
                .unwrap(),
        );
        // -12.3 truncates toward zero
        assert_eq!(reg.decode_value(&[0xFF85]).unwrap(), RegisterValue::Int(-12));
    }

    #[test]
    fn test_decode_full_width_unsigned_int() {
        let reg = register(RegisterSpec::builder("counter", 0).length(4).build().unwrap());

        assert_eq!(
            reg.decode_value(&[0xFFFF; 4]).unwrap(),
            RegisterValue::Int(u64::MAX as i128)
        );
        assert_eq!(
            reg.decode_value(&[0x8000, 0, 0, 0]).unwrap(),
            RegisterValue::Int(1 << 63)
        );
        assert_eq!(reg.decode_value(&[0x8000, 0, 0, 0]).unwrap().as_i64(), None);
    }

    #[test]
    fn test_decode_full_width_signed_int() {
        let reg = register(
            RegisterSpec::builder("offset", 0)
                .length(4)
                .signed(true)
                .build()
                .unwrap(),
        );

        assert_eq!(reg.decode_value(&[0xFFFF; 4]).unwrap(), RegisterValue::Int(-1));
        assert_eq!(
            reg.decode_value(&[0x8000, 0, 0, 0]).unwrap(),
            RegisterValue::Int(i64::MIN.into())
        );
    }

    #[test]
    fn test_decode_whole_factor_keeps_precision() {
        let reg = register(
            RegisterSpec::builder("energy_wh", 0)
                .length(4)
                .factor(1000.0)
                .build()
                .unwrap(),
        );

        // 2^53 + 1 is not representable as f64
        let raw: u64 = (1 << 53) + 1;
        let words = [(raw >> 48) as u16, (raw >> 32) as u16, (raw >> 16) as u16, raw as u16];
        assert_eq!(
            reg.decode_value(&words).unwrap(),
            RegisterValue::Int(i128::from(raw) * 1000)
        );
    }

    #[test]
    fn test_decode_int_beyond_i128_is_rejected() {
        let reg = register(
            RegisterSpec::builder("absurd", 0)
                .length(4)
                .factor(1e30)
                .build()
                .unwrap(),
        );

        let err = reg.decode_value(&[0xFFFF; 4]).unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Conversion(ConversionError::ScaledOutOfRange { .. })
        ));
    }

    #[test]
    fn test_decode_bool() {
        let reg = register(
            RegisterSpec::builder("relay", 0)
                .value_type(ValueType::Bool)
                .build()
                .unwrap(),
        );
        assert_eq!(reg.decode_value(&[0]).unwrap(), RegisterValue::Bool(false));
        assert_eq!(reg.decode_value(&[2]).unwrap(), RegisterValue::Bool(true));
    }

    #[test]
    fn test_encode_scaling() {
        let reg = register(RegisterSpec::builder("setpoint", 10).factor(0.1).build().unwrap());
        assert_eq!(reg.encode_value(12.0).unwrap(), vec![120]);
    }

    #[test]
    fn test_encode_out_of_range() {
        let reg = register(RegisterSpec::new("small", 0));
        let err = reg.encode_value(70_000.0).unwrap_err();
        assert!(err.is_value_out_of_range());
        assert!(err.to_string().contains("70000"));

        assert!(reg.encode_value(-1.0).unwrap_err().is_value_out_of_range());
        assert!(reg.encode_value(f64::NAN).unwrap_err().is_value_out_of_range());
        assert!(reg.encode_value(f64::INFINITY).unwrap_err().is_value_out_of_range());
    }

    #[tokio::test]
    async fn test_read_caches_value() {
        let mut mock = connected_mock().await;
        mock.set_words(100, &[0x0001, 0x0000]).await;

        let mut reg = register(RegisterSpec::builder("energy", 100).length(2).build().unwrap());
        let value = reg.read(&mut mock, 1).await.unwrap();

        assert_eq!(value, RegisterValue::Int(65_536));
        assert_eq!(reg.last_value(), Some(RegisterValue::Int(65_536)));
        assert_eq!(reg.last_raw_words(), Some(&[0x0001, 0x0000][..]));
        assert!(!reg.last_error());
        assert_eq!(mock.read_history().await, vec![(100, 2, 1)]);
    }

    #[tokio::test]
    async fn test_failed_read_keeps_cache() {
        let mut mock = connected_mock().await;
        mock.set_words(0, &[42]).await;

        let mut reg = register(RegisterSpec::new("value", 0));
        reg.read(&mut mock, 1).await.unwrap();

        mock.fail_next_read();
        let err = reg.read(&mut mock, 1).await.unwrap_err();
        assert!(err.is_read_error());
        assert!(reg.last_error());
        assert_eq!(reg.last_value(), Some(RegisterValue::Int(42)));
        assert_eq!(reg.last_raw_words(), Some(&[42][..]));
    }

    #[tokio::test]
    async fn test_short_read_is_read_error() {
        let mut mock = connected_mock().await;
        mock.short_reads(true);

        let mut reg = register(RegisterSpec::builder("pair", 0).length(2).build().unwrap());
        let err = reg.read(&mut mock, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Operation(OperationError::WordCountMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(reg.last_value().is_none());
    }

    #[tokio::test]
    async fn test_write_out_of_range_skips_transport() {
        let mut mock = connected_mock().await;
        let mut reg = register(RegisterSpec::new("small", 0));

        let err = reg.write(&mut mock, 1, 70_000.0).await.unwrap_err();
        assert!(err.is_value_out_of_range());
        assert_eq!(mock.write_count(), 0);
        assert!(reg.last_written().is_none());
    }

    #[tokio::test]
    async fn test_write_caches_words() {
        let mut mock = connected_mock().await;
        let mut reg = register(
            RegisterSpec::builder("offset", 5)
                .signed(true)
                .length(2)
                .build()
                .unwrap(),
        );

        reg.write(&mut mock, 1, -2.0).await.unwrap();
        assert_eq!(reg.last_written(), Some(&[0xFFFF, 0xFFFE][..]));
        assert_eq!(mock.write_history().await, vec![(5, vec![0xFFFF, 0xFFFE])]);
    }

    #[tokio::test]
    async fn test_failed_write_is_write_error() {
        let mut mock = connected_mock().await;
        mock.fail_all_writes(true);

        let mut reg = register(RegisterSpec::new("value", 0));
        let err = reg.write(&mut mock, 1, 1.0).await.unwrap_err();
        assert!(err.is_write_error());
        assert!(reg.last_error());
    }
}
