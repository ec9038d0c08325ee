use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Pesos;

/// Basis points in one whole (100%).
pub const BASIS_POINTS_PER_UNIT: u32 = 10_000;

/// Withdrawal commission as a fixed-point rate in basis points, in [0, 1).
/// 0.10 (10%) is stored as 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CommissionRate(u32);

impl CommissionRate {
    pub const ZERO: CommissionRate = CommissionRate(0);

    pub fn from_basis_points(bps: u32) -> Result<Self, ParseCommissionError> {
        if bps >= BASIS_POINTS_PER_UNIT {
            return Err(ParseCommissionError::OutOfRange);
        }
        Ok(Self(bps))
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Fee for a withdrawal principal, rounded half-up to whole pesos.
    ///
    /// The product is taken in `i128` so no principal representable as
    /// `Pesos` can overflow. Callers only pass positive principals.
    pub fn fee_for(&self, amount: Pesos) -> Pesos {
        let scaled = amount as i128 * self.0 as i128;
        let half = (BASIS_POINTS_PER_UNIT / 2) as i128;
        let fee = (scaled + half).div_euclid(BASIS_POINTS_PER_UNIT as i128);
        // rate < 1, so |fee| <= |amount| and the cast is lossless
        fee as Pesos
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        // 10%
        Self(1_000)
    }
}

impl TryFrom<u32> for CommissionRate {
    type Error = ParseCommissionError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_basis_points(bps)
    }
}

impl From<CommissionRate> for u32 {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

/// Parses either a decimal fraction ("0.10") or a percentage ("10%", "2.5%").
impl FromStr for CommissionRate {
    type Err = ParseCommissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (number, scale) = match s.strip_suffix('%') {
            // percent: 4 decimals of a fraction are 2 decimals of a percentage
            Some(pct) => (pct.trim(), 2),
            None => (s, 4),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseCommissionError::InvalidFormat);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseCommissionError::InvalidFormat);
        }
        if fraction.len() > scale {
            return Err(ParseCommissionError::TooPrecise);
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseCommissionError::OutOfRange)?
        };
        let padded = format!("{:0<width$}", fraction, width = scale);
        let fraction: u32 = padded
            .parse()
            .map_err(|_| ParseCommissionError::InvalidFormat)?;

        let unit = 10u32.pow(scale as u32);
        let bps = whole
            .checked_mul(unit)
            .and_then(|w| w.checked_add(fraction))
            .ok_or(ParseCommissionError::OutOfRange)?;

        Self::from_basis_points(bps)
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct_whole = self.0 / 100;
        let pct_frac = self.0 % 100;
        if pct_frac == 0 {
            write!(f, "{}%", pct_whole)
        } else {
            let frac = format!("{:02}", pct_frac);
            write!(f, "{}.{}%", pct_whole, frac.trim_end_matches('0'))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommissionError {
    InvalidFormat,
    TooPrecise,
    OutOfRange,
}

impl fmt::Display for ParseCommissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCommissionError::InvalidFormat => write!(f, "invalid commission rate format"),
            ParseCommissionError::TooPrecise => {
                write!(f, "commission rate has more precision than a basis point")
            }
            ParseCommissionError::OutOfRange => {
                write!(f, "commission rate must be at least 0 and below 1")
            }
        }
    }
}

impl std::error::Error for ParseCommissionError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(s: &str) -> CommissionRate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_fraction_and_percent() {
        assert_eq!(rate("0.10").basis_points(), 1000);
        assert_eq!(rate("0.1").basis_points(), 1000);
        assert_eq!(rate(".05").basis_points(), 500);
        assert_eq!(rate("0").basis_points(), 0);
        assert_eq!(rate("0.0125").basis_points(), 125);
        assert_eq!(rate("10%").basis_points(), 1000);
        assert_eq!(rate("2.5%").basis_points(), 250);
        assert_eq!(rate(" 99.99% ").basis_points(), 9999);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            "1".parse::<CommissionRate>(),
            Err(ParseCommissionError::OutOfRange)
        );
        assert_eq!(
            "100%".parse::<CommissionRate>(),
            Err(ParseCommissionError::OutOfRange)
        );
        assert_eq!(
            "-0.1".parse::<CommissionRate>(),
            Err(ParseCommissionError::InvalidFormat)
        );
        assert_eq!(
            "0.00001".parse::<CommissionRate>(),
            Err(ParseCommissionError::TooPrecise)
        );
        assert_eq!(
            "abc".parse::<CommissionRate>(),
            Err(ParseCommissionError::InvalidFormat)
        );
        assert_eq!(
            "%".parse::<CommissionRate>(),
            Err(ParseCommissionError::InvalidFormat)
        );
    }

    #[test]
    fn test_fee_rounds_half_up() {
        let ten = CommissionRate::default();
        assert_eq!(ten.fee_for(100000), 10000);
        assert_eq!(ten.fee_for(5), 1); // 0.5 -> 1
        assert_eq!(ten.fee_for(4), 0); // 0.4 -> 0
        assert_eq!(ten.fee_for(15), 2); // 1.5 -> 2
        assert_eq!(ten.fee_for(14), 1); // 1.4 -> 1

        let odd = rate("0.0125");
        assert_eq!(odd.fee_for(1000), 13); // 12.5 -> 13
        assert_eq!(odd.fee_for(999), 12); // 12.4875 -> 12
    }

    #[test]
    fn test_fee_does_not_overflow() {
        let high = rate("0.9999");
        assert_eq!(high.fee_for(Pesos::MAX), 9_222_449_699_651_090_329);
        assert_eq!(CommissionRate::ZERO.fee_for(Pesos::MAX), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(rate("0.10").to_string(), "10%");
        assert_eq!(rate("0.025").to_string(), "2.5%");
        assert_eq!(rate("0.0125").to_string(), "1.25%");
        assert_eq!(CommissionRate::ZERO.to_string(), "0%");
    }

    #[test]
    fn test_rejects_whole_rate_from_basis_points() {
        assert!(CommissionRate::from_basis_points(10_000).is_err());
        assert!(CommissionRate::from_basis_points(9_999).is_ok());
    }
}
