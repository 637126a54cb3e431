//! OCC option symbol codec.
//!
//! OCC symbols are the fixed-width identifiers Alpaca uses for option
//! contracts, e.g. `AAPL240119C00190000`:
//! - underlying ticker (variable width)
//! - 6 digit expiry (YYMMDD)
//! - `C` or `P`
//! - 8 digit strike (price × 1000, zero-padded)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    /// Call option (right to buy).
    Call,
    /// Put option (right to sell).
    Put,
}

impl OptionRight {
    /// Single-character OCC code.
    #[must_use]
    pub const fn occ_code(&self) -> char {
        match self {
            Self::Call => 'C',
            Self::Put => 'P',
        }
    }

    /// Parse from a single OCC character, case-insensitive.
    pub fn from_occ_code(c: char) -> Result<Self, OccError> {
        match c.to_ascii_uppercase() {
            'C' => Ok(Self::Call),
            'P' => Ok(Self::Put),
            other => Err(OccError::InvalidRight(other)),
        }
    }
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "CALL"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Errors from encoding or decoding an OCC symbol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OccError {
    /// Expiry date was not a valid `YYYY-MM-DD` date.
    #[error("invalid expiry date: {0}")]
    InvalidDate(String),

    /// Option right was not `C` or `P`.
    #[error("invalid option right: {0:?}")]
    InvalidRight(char),

    /// Strike price was negative or not a number.
    #[error("invalid strike price: {0}")]
    InvalidStrike(String),

    /// Symbol could not be decoded.
    #[error("malformed OCC symbol: {0}")]
    Malformed(String),
}

/// A decoded option symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSymbol {
    /// Underlying ticker, upper-case.
    pub underlying: String,
    /// Expiration date.
    pub expiry: NaiveDate,
    /// Call or put.
    pub right: OptionRight,
    /// Strike price.
    pub strike: Decimal,
}

impl OptionSymbol {
    /// Build a symbol from its parts. The underlying is upper-cased.
    pub fn new(
        underlying: impl Into<String>,
        expiry: NaiveDate,
        right: OptionRight,
        strike: Decimal,
    ) -> Result<Self, OccError> {
        if strike.is_sign_negative() {
            return Err(OccError::InvalidStrike(strike.to_string()));
        }
        Ok(Self {
            underlying: underlying.into().to_ascii_uppercase(),
            expiry,
            right,
            strike,
        })
    }

    /// Encode into the fixed-width OCC format.
    ///
    /// The strike is multiplied by 1000 and truncated toward zero, so any
    /// precision below 0.001 is lost. A strike of 0 is legal and encodes
    /// as `00000000`.
    pub fn encode(&self) -> Result<String, OccError> {
        let thousandths = (self.strike * Decimal::from(1000))
            .trunc()
            .to_u64()
            .ok_or_else(|| OccError::InvalidStrike(self.strike.to_string()))?;
        if thousandths > 99_999_999 {
            return Err(OccError::InvalidStrike(self.strike.to_string()));
        }
        Ok(format!(
            "{}{}{}{:08}",
            self.underlying,
            self.expiry.format("%y%m%d"),
            self.right.occ_code(),
            thousandths
        ))
    }

    /// Decode a fixed-width OCC symbol.
    ///
    /// The underlying is everything before the first digit; the next six
    /// characters are the expiry (`YYMMDD`), then the right, then the
    /// zero-padded strike in thousandths. Any parse failure yields an
    /// error, never a partially-populated value.
    pub fn decode(symbol: &str) -> Result<Self, OccError> {
        let malformed = || OccError::Malformed(symbol.to_string());

        let digit_pos = symbol
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(malformed)?;
        if digit_pos == 0 {
            return Err(malformed());
        }

        let (underlying, rest) = symbol.split_at(digit_pos);
        // 6 date chars + 1 right char + at least 1 strike digit
        if rest.len() < 8 {
            return Err(malformed());
        }

        let (date_part, rest) = rest.split_at(6);
        let expiry = NaiveDate::parse_from_str(date_part, "%y%m%d").map_err(|_| malformed())?;

        let mut chars = rest.chars();
        let right_char = chars.next().ok_or_else(malformed)?;
        let right = OptionRight::from_occ_code(right_char).map_err(|_| malformed())?;

        let strike_part = chars.as_str();
        if strike_part.is_empty() || !strike_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let thousandths: i64 = strike_part.parse().map_err(|_| malformed())?;
        let strike = Decimal::new(thousandths, 3).normalize();

        Ok(Self {
            underlying: underlying.to_string(),
            expiry,
            right,
            strike,
        })
    }
}

/// Encode option symbol parts given as user-facing strings.
///
/// The expiry must be `YYYY-MM-DD` and the strike a non-negative number.
/// Used by the interactive prompts, which deal in raw text.
pub fn encode_occ(
    underlying: &str,
    expiry: &str,
    right: &str,
    strike: &str,
) -> Result<String, OccError> {
    let expiry = NaiveDate::parse_from_str(expiry, "%Y-%m-%d")
        .map_err(|_| OccError::InvalidDate(expiry.to_string()))?;

    let mut right_chars = right.chars();
    let right = match (right_chars.next(), right_chars.next()) {
        (Some(c), None) => OptionRight::from_occ_code(c)?,
        _ => return Err(OccError::InvalidRight(right.chars().next().unwrap_or('?'))),
    };

    let strike: Decimal = strike
        .parse()
        .map_err(|_| OccError::InvalidStrike(strike.to_string()))?;

    OptionSymbol::new(underlying, expiry, right, strike)?.encode()
}

impl std::fmt::Display for OptionSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.underlying,
            self.expiry.format("%Y-%m-%d"),
            self.right,
            self.strike
        )
    }
}
