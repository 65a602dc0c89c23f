//! Unit Conversion
//! Human-readable decimal amounts ↔ raw uint256 in the token's smallest
//! unit. Decimals are always supplied by the caller, freshly fetched.

use primitive_types::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitsError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount overflows uint256")]
    Overflow,
}

fn pow10(exp: u32) -> Result<U256, UnitsError> {
    U256::from(10u64)
        .checked_pow(U256::from(exp))
        .ok_or(UnitsError::Overflow)
}

/// "1.5" with 18 decimals → 1_500_000_000_000_000_000.
/// Fractional digits beyond `decimals` are rejected rather than silently
/// truncated.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }

    let (integral, fraction) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    if integral.is_empty() && fraction.is_empty() {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if !integral.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }

    let scale = pow10(decimals)?;
    let integral_part = if integral.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(integral).map_err(|_| UnitsError::InvalidAmount(amount.to_string()))?
    };
    let fraction_part = if fraction.is_empty() {
        U256::zero()
    } else {
        let padded = pow10(decimals - fraction.len() as u32)?;
        U256::from_dec_str(fraction)
            .map_err(|_| UnitsError::InvalidAmount(amount.to_string()))?
            .checked_mul(padded)
            .ok_or(UnitsError::Overflow)?
    };

    integral_part
        .checked_mul(scale)
        .and_then(|v| v.checked_add(fraction_part))
        .ok_or(UnitsError::Overflow)
}

/// Raw uint256 → human-readable decimal string with trailing zeros trimmed.
pub fn format_units(raw: U256, decimals: u32) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    // pow10 only overflows far beyond any real token's decimals
    let scale = match pow10(decimals) {
        Ok(scale) => scale,
        Err(_) => return raw.to_string(),
    };
    let integral = raw / scale;
    let remainder = raw % scale;
    if remainder.is_zero() {
        return integral.to_string();
    }

    let digits = remainder.to_string();
    let padded = format!("{}{}", "0".repeat(decimals as usize - digits.len()), digits);
    let trimmed = padded.trim_end_matches('0');
    format!("{}.{}", integral, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional_amounts() {
        assert_eq!(parse_units("1", 18).unwrap(), U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(parse_units("0.1", 1).unwrap(), U256::from(1u64));
        assert_eq!(
            parse_units("1.5", 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(parse_units("0", 18).unwrap(), U256::zero());
    }

    #[test]
    fn parse_rejects_garbage_and_excess_precision() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units("1.23", 1).is_err());
        assert!(parse_units("-1", 18).is_err());
    }

    #[test]
    fn format_trims_trailing_zeros() {
        let one_and_a_half = U256::from_dec_str("1500000000000000000").unwrap();
        assert_eq!(format_units(one_and_a_half, 18), "1.5");
        assert_eq!(format_units(U256::from(10u64).pow(U256::from(18u64)), 18), "1");
        assert_eq!(format_units(U256::zero(), 18), "0");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
    }

    #[test]
    fn parse_and_format_roundtrip() {
        for amount in ["0.1", "42", "3.14159"] {
            let raw = parse_units(amount, 18).unwrap();
            assert_eq!(format_units(raw, 18), amount);
        }
    }
}
