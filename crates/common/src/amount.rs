//! Decimal ether <-> wei conversion.
//!
//! Claim amounts arrive as decimal ether strings ("0.01") and are carried
//! on-chain as wei. 18 fractional digits, u128 arithmetic.

use thiserror::Error;

const DECIMALS: u32 = 18;

/// One ether in wei.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid decimal amount: {0}")]
    Invalid(String),

    #[error("too many decimal places (max {DECIMALS})")]
    TooPrecise,

    #[error("amount out of range")]
    Overflow,
}

/// Parse a decimal ether string into wei.
///
/// Accepts plain digits with an optional single fractional part
/// ("1", "0.01", "2.5"). Signs, exponents and separators are rejected.
pub fn parse_ether(s: &str) -> Result<u128, AmountError> {
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::Invalid(s.to_string()));
    }
    if frac_part.len() > DECIMALS as usize {
        return Err(AmountError::TooPrecise);
    }

    let int_wei = if int_part.is_empty() {
        0u128
    } else {
        int_part
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(WEI_PER_ETHER)
            .ok_or(AmountError::Overflow)?
    };

    let frac_wei = if frac_part.is_empty() {
        0u128
    } else {
        let scale = 10u128.pow(DECIMALS - frac_part.len() as u32);
        frac_part
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
            .checked_mul(scale)
            .ok_or(AmountError::Overflow)?
    };

    int_wei.checked_add(frac_wei).ok_or(AmountError::Overflow)
}

/// Format a wei amount as a decimal ether string, trimming trailing zeros.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:018}", frac);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_ether() {
        assert_eq!(parse_ether("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_ether("0").unwrap(), 0);
        assert_eq!(parse_ether("42").unwrap(), 42 * WEI_PER_ETHER);
    }

    #[test]
    fn test_parse_fractional_ether() {
        assert_eq!(parse_ether("0.01").unwrap(), 10_000_000_000_000_000);
        assert_eq!(parse_ether("2.5").unwrap(), 2_500_000_000_000_000_000);
        assert_eq!(parse_ether(".5").unwrap(), 500_000_000_000_000_000);
        assert_eq!(parse_ether("1.").unwrap(), WEI_PER_ETHER);
        // full 18 digits
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_ether(""), Err(AmountError::Empty));
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("1e18").is_err());
        assert!(parse_ether("abc").is_err());
        assert!(parse_ether(".").is_err());
        assert!(parse_ether("1 ").is_err());
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(
            parse_ether("0.0000000000000000001"),
            Err(AmountError::TooPrecise)
        );
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(WEI_PER_ETHER), "1");
        assert_eq!(format_ether(10_000_000_000_000_000), "0.01");
        assert_eq!(format_ether(0), "0");
        assert_eq!(format_ether(1_500_000_000_000_000_000), "1.5");
    }
}
