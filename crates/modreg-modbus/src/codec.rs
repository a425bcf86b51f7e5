// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Word codec: multi-word big-endian integers over 16-bit registers.
//!
//! The first word is the most significant. Signed values use two's
//! complement over the full width, so `[0xFFFF]` decodes to `-1` and
//! `[0x0000, 0x0001]` to `1`.
//!
//! ```
//! use modreg_modbus::codec::{decode, encode};
//!
//! assert_eq!(decode(&[0x0001, 0x0000], false).unwrap(), 65_536);
//! assert_eq!(encode(-2, 2, true).unwrap(), vec![0xFFFF, 0xFFFE]);
//! ```

use crate::error::ConversionError;

/// Maximum word count of a single register (64 bits).
pub const MAX_REGISTER_WORDS: u16 = 4;

/// Decodes big-endian words into an integer.
///
/// Returns [`ConversionError::InvalidWordCount`] for an empty slice or one
/// longer than [`MAX_REGISTER_WORDS`].
pub fn decode(words: &[u16], signed: bool) -> Result<i128, ConversionError> {
    if words.is_empty() || words.len() > MAX_REGISTER_WORDS as usize {
        return Err(ConversionError::InvalidWordCount {
            count: words.len(),
            max: MAX_REGISTER_WORDS,
        });
    }

    let unsigned = words
        .iter()
        .fold(0i128, |acc, &word| (acc << 16) | i128::from(word));

    let bits = 16 * words.len() as u32;
    let sign_bit = 1i128 << (bits - 1);
    if signed && unsigned & sign_bit != 0 {
        Ok(unsigned - (1i128 << bits))
    } else {
        Ok(unsigned)
    }
}

/// Encodes an integer into exactly `length` big-endian words.
///
/// Fails with [`ConversionError::ValueOutOfRange`] when `value` is not
/// representable in `length` words with the given signedness.
pub fn encode(value: i128, length: u16, signed: bool) -> Result<Vec<u16>, ConversionError> {
    if length == 0 || length > MAX_REGISTER_WORDS {
        return Err(ConversionError::InvalidWordCount {
            count: length as usize,
            max: MAX_REGISTER_WORDS,
        });
    }

    let (min, max) = bounds(length, signed);
    if value < min || value > max {
        return Err(ConversionError::out_of_range(value, length, signed));
    }

    let bits = 16 * u32::from(length);
    let raw = value.rem_euclid(1i128 << bits);
    let words = (0..u32::from(length))
        .rev()
        .map(|index| ((raw >> (16 * index)) & 0xFFFF) as u16)
        .collect();

    Ok(words)
}

/// Inclusive value range of a `length`-word register.
pub fn bounds(length: u16, signed: bool) -> (i128, i128) {
    let bits = 16 * u32::from(length.clamp(1, MAX_REGISTER_WORDS));
    if signed {
        let half = 1i128 << (bits - 1);
        (-half, half - 1)
    } else {
        (0, (1i128 << bits) - 1)
    }
}
