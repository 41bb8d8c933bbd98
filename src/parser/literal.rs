// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexers for the literals that appear inside arguments.
//!
//! All of them scan the raw bytes left to right and fail with the
//! [`Classification`] of the first problem they encounter.

use std::{net::Ipv4Addr, ops::RangeInclusive};

use crate::{error::Classification, Parity, Word};

/// Maximum length of a dotted-quad IPv4 literal.
pub(crate) const MAX_IP_LEN: usize = 15;

/// Maximum length of a serial device path in bytes.
pub(crate) const MAX_DEVICE_LEN: usize = 63;

type Result<T> = std::result::Result<T, Classification>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    W16,
    W32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signedness {
    Signed,
    Unsigned,
}

/// Declared domain of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberSpec {
    width: Width,
    signedness: Signedness,
}

impl NumberSpec {
    pub(crate) const U16: Self = Self::new(Width::W16, Signedness::Unsigned);
    pub(crate) const I16: Self = Self::new(Width::W16, Signedness::Signed);
    pub(crate) const U32: Self = Self::new(Width::W32, Signedness::Unsigned);
    #[cfg(test)]
    pub(crate) const I32: Self = Self::new(Width::W32, Signedness::Signed);

    pub(crate) const fn new(width: Width, signedness: Signedness) -> Self {
        Self { width, signedness }
    }

    /// Inclusive bounds. Signed domains are symmetric.
    const fn bounds(self) -> (i64, i64) {
        match (self.width, self.signedness) {
            (Width::W16, Signedness::Unsigned) => (0, 65_535),
            (Width::W16, Signedness::Signed) => (-32_767, 32_767),
            (Width::W32, Signedness::Unsigned) => (0, 4_294_967_295),
            (Width::W32, Signedness::Signed) => (-2_147_483_647, 2_147_483_647),
        }
    }

    /// Number of hexadecimal digits that fit into the width.
    const fn hex_digits(self) -> usize {
        match self.width {
            Width::W16 => 4,
            Width::W32 => 8,
        }
    }
}

/// Lexes a decimal or `0x`/`0X` prefixed hexadecimal literal.
///
/// A leading `-` is only accepted for signed domains and never together
/// with a hexadecimal prefix. Hexadecimal literals are limited to the
/// digits of the width, leading zeros included. The accumulated value is
/// checked after every digit, so an overflow is reported as soon as it
/// happens.
pub(crate) fn number(token: &[u8], spec: NumberSpec) -> Result<i64> {
    let (min, max) = spec.bounds();
    let (negative, unsigned) = match token {
        [b'-', rest @ ..] if spec.signedness == Signedness::Signed => (true, rest),
        _ => (false, token),
    };
    let (radix, digits) = match unsigned {
        [b'0', b'x' | b'X', digits @ ..] if !negative => (16, digits),
        _ => (10, unsigned),
    };
    if digits.is_empty() {
        return Err(Classification::Syntax);
    }
    let limit = if negative { -min } else { max };
    let mut value: i64 = 0;
    for (index, &byte) in digits.iter().enumerate() {
        let digit = char::from(byte)
            .to_digit(radix)
            .ok_or(Classification::Syntax)?;
        if radix == 16 && index >= spec.hex_digits() {
            return Err(Classification::Range);
        }
        value = value * i64::from(radix) + i64::from(digit);
        if value > limit {
            return Err(Classification::Range);
        }
    }
    Ok(if negative { -value } else { value })
}

pub(crate) fn u16_value(token: &[u8]) -> Result<u16> {
    let value = number(token, NumberSpec::U16)?;
    u16::try_from(value).map_err(|_| Classification::Range)
}

pub(crate) fn u32_value(token: &[u8]) -> Result<u32> {
    let value = number(token, NumberSpec::U32)?;
    u32::try_from(value).map_err(|_| Classification::Range)
}

/// A register value: unsigned 16 bit, or signed 16 bit in two's
/// complement if written with a leading `-`.
pub(crate) fn word(token: &[u8]) -> Result<Word> {
    match token {
        [b'-', ..] => {
            let value = number(token, NumberSpec::I16)?;
            let value = i16::try_from(value).map_err(|_| Classification::Range)?;
            Ok(Word::from_be_bytes(value.to_be_bytes()))
        }
        _ => u16_value(token),
    }
}

/// A coil value, either `0` or `1`.
pub(crate) fn coil(token: &[u8]) -> Result<Word> {
    match u16_value(token)? {
        value @ (0 | 1) => Ok(value),
        _ => Err(Classification::Range),
    }
}

/// A non-zero unsigned value.
pub(crate) fn positive<T>(value: T) -> Result<T>
where
    T: Default + PartialEq,
{
    if value == T::default() {
        return Err(Classification::Range);
    }
    Ok(value)
}

/// A dotted-quad IPv4 address, e.g. `192.168.0.10`.
pub(crate) fn ipv4(token: &[u8]) -> Result<Ipv4Addr> {
    if token.len() > MAX_IP_LEN {
        return Err(Classification::Length);
    }
    let mut octets = [0u8; 4];
    let mut index = 0;
    let mut value: u16 = 0;
    let mut digits = 0;
    for &byte in token {
        match byte {
            b'0'..=b'9' => {
                if digits == 3 {
                    return Err(Classification::Syntax);
                }
                value = value * 10 + u16::from(byte - b'0');
                digits += 1;
            }
            b'.' if digits > 0 && index < 3 => {
                octets[index] = octet(value)?;
                index += 1;
                value = 0;
                digits = 0;
            }
            _ => return Err(Classification::Syntax),
        }
    }
    if digits == 0 || index != 3 {
        return Err(Classification::Syntax);
    }
    octets[index] = octet(value)?;
    Ok(Ipv4Addr::from(octets))
}

fn octet(value: u16) -> Result<u8> {
    u8::try_from(value).map_err(|_| Classification::Range)
}

/// A path of a serial device, e.g. `/dev/ttyUSB0`.
pub(crate) fn device_path(token: &[u8]) -> Result<String> {
    if token.len() > MAX_DEVICE_LEN {
        return Err(Classification::Length);
    }
    match token {
        [] | [b'-', ..] => Err(Classification::Syntax),
        _ => String::from_utf8(token.to_vec()).map_err(|_| Classification::Syntax),
    }
}

fn single_byte(token: &[u8]) -> Result<u8> {
    match token {
        [] => Err(Classification::Syntax),
        [byte] => Ok(*byte),
        _ => Err(Classification::Length),
    }
}

/// One of `N`, `E` or `O`.
pub(crate) fn parity(token: &[u8]) -> Result<Parity> {
    Parity::from_byte(single_byte(token)?).ok_or(Classification::Syntax)
}

/// A single decimal digit within `range`.
pub(crate) fn digit_in(token: &[u8], range: RangeInclusive<u8>) -> Result<u8> {
    let byte = single_byte(token)?;
    if !byte.is_ascii_digit() {
        return Err(Classification::Syntax);
    }
    let digit = byte - b'0';
    if !range.contains(&digit) {
        return Err(Classification::Range);
    }
    Ok(digit)
}
