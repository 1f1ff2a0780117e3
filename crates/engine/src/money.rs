use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Share};

/// Monetary amount represented as signed integer **minor units** of a
/// [`Currency`].
///
/// Estates and allocated amounts always go through this type so no value is
/// ever held as a float.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34, Currency::Eur);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34 EUR");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more decimals than the currency has):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse("10", Currency::Eur).unwrap().minor(), 1000);
/// assert_eq!(Money::parse("10,5", Currency::Eur).unwrap().minor(), 1050);
/// assert!(Money::parse("12.345", Currency::Eur).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in `currency`.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Creates an amount from whole major units (`1_000` EUR is `100_000` cents).
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn from_major(major: i64, currency: Currency) -> Option<Self> {
        major
            .checked_mul(currency.scale())
            .map(|minor| Self { minor, currency })
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.minor
    }

    #[must_use]
    pub const fn currency(self) -> Currency {
        self.currency
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minor == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.minor > 0
    }

    /// Returns `share × self`, rounded half up to the minor unit.
    ///
    /// Shares handled by the engine are always in `[0, 1]`, so the result
    /// never overflows.
    #[must_use]
    pub fn portion(self, share: Share) -> Money {
        let numerator = i128::from(self.minor) * i128::from(share.numerator());
        let denominator = i128::from(share.denominator());
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            -((-numerator + half) / denominator)
        };
        Money::new(
            i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN }),
            self.currency,
        )
    }

    /// Parses a decimal string into minor units of `currency`.
    ///
    /// Accepts `.` or `,` as decimal separator, `_` or `'` as digit group
    /// separators and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits
    /// - rejects empty/invalid strings
    pub fn parse(s: &str, currency: Currency) -> Result<Self, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidEstateValue(format!("{reason}: {s:?}"));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty amount"));
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest: String = rest
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '\'')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        if rest.is_empty() {
            return Err(invalid("empty amount"));
        }

        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(|| invalid("invalid amount"))?;
        let fraction_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid("invalid amount"));
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("invalid amount"));
        }
        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("amount too large"))?;

        let digits = usize::from(currency.minor_units());
        let fraction: i64 = match fraction_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("invalid amount"));
                }
                if frac.len() > digits {
                    return Err(invalid("too many decimals"));
                }
                let padded = format!("{frac:0<digits$}");
                padded.parse().map_err(|_| invalid("invalid amount"))?
            }
        };

        let total = major
            .checked_mul(currency.scale())
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money::new(if negative { -total } else { total }, currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        let scale = self.currency.scale().unsigned_abs();
        let major = abs / scale;
        let code = self.currency.code();
        match self.currency.minor_units() {
            0 => write!(f, "{sign}{major} {code}"),
            digits => {
                let fraction = abs % scale;
                let width = usize::from(digits);
                write!(f, "{sign}{major}.{fraction:0width$} {code}")
            }
        }
    }
}
