//! Fixed-point conversion between user-entered strings and on-chain `U256`
//! token amounts.

use ethers::types::{Address, U256};

use crate::error::{Result, StakingError};

/// Parse a positive decimal amount (e.g. `"30"`, `"1.5"`) into base units,
/// scaling by `10^decimals`.
pub fn parse_amount(input: &str, decimals: u32) -> Result<U256> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(StakingError::InvalidAmount("amount is empty".into()));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(trimmed));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(trimmed));
    }
    if fraction.len() > decimals as usize {
        return Err(StakingError::InvalidAmount(format!(
            "at most {decimals} decimal places allowed"
        )));
    }

    let scale = pow10(decimals)?;
    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| overflow())?
    };

    // Right-pad the fraction so "1.5" with 3 decimals reads as 500.
    let fraction_units = if fraction.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{fraction:0<width$}", width = decimals as usize);
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    let value = whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_units))
        .ok_or_else(overflow)?;

    if value.is_zero() {
        return Err(StakingError::InvalidAmount(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(value)
}

/// Render base units as a decimal string with `decimals` fractional digits,
/// trailing zeros trimmed.
pub fn format_amount(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let Ok(scale) = pow10(decimals) else {
        return value.to_string();
    };
    let (whole, rem) = value.div_mod(scale);
    if rem.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", rem.to_string(), width = decimals as usize);
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

/// Shorten an address for compact display, e.g. `0x2DC3...8544`.
pub fn truncate_address(address: &Address) -> String {
    let full = format!("{address:?}");
    if full.len() > 12 {
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    } else {
        full
    }
}

fn pow10(decimals: u32) -> Result<U256> {
    // 10^77 is the largest power of ten that fits in 256 bits.
    if decimals > 77 {
        return Err(StakingError::InvalidAmount(format!(
            "unsupported decimals: {decimals}"
        )));
    }
    Ok(U256::exp10(decimals as usize))
}

fn invalid(input: &str) -> StakingError {
    StakingError::InvalidAmount(format!("'{input}' is not a number"))
}

fn overflow() -> StakingError {
    StakingError::InvalidAmount("amount is too large".into())
}
