// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exact conversion between human-decimal strings and token base units.
//!
//! Amounts never pass through `f64`: a base-unit quantity of an 18-decimal
//! token leaves the exactly representable range of a double after ~0.009
//! tokens.

use crate::error::{SwapError, SwapResult};
use alloy::primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Highest decimal precision a token may declare.
pub const MAX_DECIMALS: u8 = 18;

/// Fixed-point scale of [`Slippage`]: percent * 10^6.
const SLIPPAGE_SCALE: u64 = 1_000_000;

/// 100% expressed in the same scale.
const SLIPPAGE_HUNDRED: u64 = 100 * SLIPPAGE_SCALE;

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Split `digits[.digits]` into its integer and fractional parts.
fn split_decimal(amount: &str) -> SwapResult<(&str, &str)> {
    if amount.is_empty() {
        return Err(SwapError::invalid_amount(amount, "empty"));
    }
    let (int, frac) = match amount.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (amount, ""),
    };
    if int.is_empty() && frac.is_empty() {
        return Err(SwapError::invalid_amount(amount, "no digits"));
    }
    if !int.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SwapError::invalid_amount(amount, "expected digits with an optional '.'"));
    }
    Ok((int, frac))
}

/// Convert a decimal string like `"1.5"` to base units for a token with
/// `decimals` places of precision.
///
/// Rejects more fractional digits than the token can represent instead of
/// truncating them.
pub fn to_base_units(amount: &str, decimals: u8) -> SwapResult<U256> {
    if decimals > MAX_DECIMALS {
        return Err(SwapError::config(format!("decimals {decimals} exceed {MAX_DECIMALS}")));
    }
    let trimmed = amount.trim();
    let (int, frac) = split_decimal(trimmed)?;

    let significant = frac.trim_end_matches('0');
    if significant.len() > decimals as usize {
        return Err(SwapError::invalid_amount(
            amount,
            format!("more than {decimals} decimal places"),
        ));
    }

    let int_units = if int.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int, 10).map_err(|e| SwapError::invalid_amount(amount, e))?
    };
    let frac_units = if significant.is_empty() {
        U256::ZERO
    } else {
        let raw =
            U256::from_str_radix(significant, 10).map_err(|e| SwapError::invalid_amount(amount, e))?;
        raw * pow10(decimals - significant.len() as u8)
    };

    int_units
        .checked_mul(pow10(decimals))
        .and_then(|scaled| scaled.checked_add(frac_units))
        .ok_or_else(|| SwapError::invalid_amount(amount, "overflows uint256"))
}

/// Render base units as a decimal string with exactly `decimals` fractional
/// digits, e.g. `3501150000` at 6 decimals becomes `"3501.150000"`.
pub fn from_base_units(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = pow10(decimals);
    let int = amount / scale;
    let frac = (amount % scale).to_string();
    format!("{int}.{frac:0>width$}", width = decimals as usize)
}

/// Slippage tolerance as a percentage in `[0, 100)`.
///
/// Held as an integer scaled by 10^6 so that applying it to a base-unit
/// amount is exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slippage(u64);

impl Slippage {
    /// No slippage allowed.
    pub const ZERO: Slippage = Slippage(0);

    /// Build from a whole number of basis points (50 bps = 0.5%).
    pub fn from_bps(bps: u32) -> SwapResult<Self> {
        let scaled = u64::from(bps) * (SLIPPAGE_SCALE / 100);
        if scaled >= SLIPPAGE_HUNDRED {
            return Err(SwapError::InvalidSlippage(format!("{bps} bps")));
        }
        Ok(Self(scaled))
    }

    /// Minimum acceptable output: `amount * (1 - pct/100)`, rounded down.
    pub fn apply(&self, amount: U256) -> U256 {
        let keep = U256::from(SLIPPAGE_HUNDRED - self.0);
        let hundred = U256::from(SLIPPAGE_HUNDRED);
        // split to keep the product inside 256 bits
        let (q, r) = (amount / hundred, amount % hundred);
        q * keep + r * keep / hundred
    }
}

impl Default for Slippage {
    fn default() -> Self {
        // 0.5%
        Self(SLIPPAGE_SCALE / 2)
    }
}

impl FromStr for Slippage {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SwapError::InvalidSlippage(s.to_string());
        let trimmed = s.trim().trim_end_matches('%');
        let (int, frac) = split_decimal(trimmed).map_err(|_| invalid())?;
        let frac = frac.trim_end_matches('0');
        if frac.len() > 6 || int.len() > 3 {
            return Err(invalid());
        }
        let int: u64 = if int.is_empty() { 0 } else { int.parse().map_err(|_| invalid())? };
        let frac_scaled: u64 = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<6}").parse().map_err(|_| invalid())?
        };
        let scaled = int * SLIPPAGE_SCALE + frac_scaled;
        if scaled >= SLIPPAGE_HUNDRED {
            return Err(invalid());
        }
        Ok(Self(scaled))
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / SLIPPAGE_SCALE;
        let frac = self.0 % SLIPPAGE_SCALE;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let frac = format!("{frac:06}");
        write!(f, "{int}.{}", frac.trim_end_matches('0'))
    }
}

impl Serialize for Slippage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts `"0.5"`, `"0.5%"`, `1` or `0.5`. JSON numbers go through their
/// shortest decimal rendering, never through float arithmetic on amounts.
impl<'de> Deserialize<'de> for Slippage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SlippageVisitor;

        impl Visitor<'_> for SlippageVisitor {
            type Value = Slippage;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a percentage in [0, 100)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Slippage, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Slippage, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Slippage, E> {
                self.visit_str(&v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Slippage, E> {
                self.visit_str(&v.to_string())
            }
        }

        deserializer.deserialize_any(SlippageVisitor)
    }
}
