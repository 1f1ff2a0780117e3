//! Exact fractions of an estate.
//!
//! Every share the engine computes is a [`Share`]: a reduced rational
//! number. Sums of shares are exact, so "adds up to the whole estate" is an
//! equality test instead of a float comparison.
use std::{
    cmp::Ordering,
    fmt,
    iter::Sum,
    ops::{Add, Div, Mul, Sub},
};

use serde::{Deserialize, Serialize};

/// A reduced fraction `numerator / denominator` with `denominator > 0`.
///
/// # Examples
///
/// ```rust
/// use engine::Share;
///
/// let third = Share::new(1, 3);
/// let sixth = Share::new(1, 6);
/// assert_eq!(third + sixth, Share::new(1, 2));
/// assert_eq!(Share::new(2, 4).to_string(), "1/2");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Share {
    numerator: i64,
    denominator: i64,
}

impl Share {
    pub const ZERO: Share = Share {
        numerator: 0,
        denominator: 1,
    };
    pub const ONE: Share = Share {
        numerator: 1,
        denominator: 1,
    };

    /// Creates a new share, reducing it.
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero.
    #[must_use]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "share denominator must not be zero");
        Self::reduced(i128::from(numerator), i128::from(denominator))
    }

    /// Creates the whole number `value / 1`.
    #[must_use]
    pub const fn whole(value: i64) -> Self {
        Share {
            numerator: value,
            denominator: 1,
        }
    }

    fn reduced(numerator: i128, denominator: i128) -> Self {
        let sign = if denominator < 0 { -1 } else { 1 };
        let divisor = gcd(numerator.abs(), denominator.abs()).max(1);
        let numerator = sign * numerator / divisor;
        let denominator = sign * denominator / divisor;
        // Case sizes keep denominators tiny: a product of 2, 3 and heir
        // counts. Saturate instead of wrapping if that ever stops holding.
        Share {
            numerator: i64::try_from(numerator).unwrap_or(if numerator > 0 {
                i64::MAX
            } else {
                i64::MIN
            }),
            denominator: i64::try_from(denominator).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub const fn numerator(self) -> i64 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(self) -> i64 {
        self.denominator
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.numerator == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.numerator < 0
    }

    /// Returns `true` if the share lies in `[0, 1]`.
    #[must_use]
    pub fn is_proper(self) -> bool {
        !self.is_negative() && self <= Share::ONE
    }

    /// Divides the share equally among `parts` heirs.
    ///
    /// # Panics
    ///
    /// Panics if `parts` is zero.
    #[must_use]
    pub fn split(self, parts: usize) -> Share {
        self / Share::whole(i64::try_from(parts).unwrap_or(i64::MAX))
    }

    /// Lossy conversion for display purposes only.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Default for Share {
    fn default() -> Self {
        Share::ZERO
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl Ord for Share {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.numerator) * i128::from(other.denominator);
        let rhs = i128::from(other.numerator) * i128::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Share {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Share {
    type Output = Share;

    fn add(self, rhs: Share) -> Self::Output {
        let numerator = i128::from(self.numerator) * i128::from(rhs.denominator)
            + i128::from(rhs.numerator) * i128::from(self.denominator);
        let denominator = i128::from(self.denominator) * i128::from(rhs.denominator);
        Share::reduced(numerator, denominator)
    }
}

impl Sub for Share {
    type Output = Share;

    fn sub(self, rhs: Share) -> Self::Output {
        let numerator = i128::from(self.numerator) * i128::from(rhs.denominator)
            - i128::from(rhs.numerator) * i128::from(self.denominator);
        let denominator = i128::from(self.denominator) * i128::from(rhs.denominator);
        Share::reduced(numerator, denominator)
    }
}

impl Mul for Share {
    type Output = Share;

    fn mul(self, rhs: Share) -> Self::Output {
        Share::reduced(
            i128::from(self.numerator) * i128::from(rhs.numerator),
            i128::from(self.denominator) * i128::from(rhs.denominator),
        )
    }
}

impl Div for Share {
    type Output = Share;

    /// # Panics
    ///
    /// Panics when dividing by zero.
    fn div(self, rhs: Share) -> Self::Output {
        assert!(!rhs.is_zero(), "division of a share by zero");
        Share::reduced(
            i128::from(self.numerator) * i128::from(rhs.denominator),
            i128::from(self.denominator) * i128::from(rhs.numerator),
        )
    }
}

impl Sum for Share {
    fn sum<I: Iterator<Item = Share>>(iter: I) -> Self {
        iter.fold(Share::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Share> for Share {
    fn sum<I: Iterator<Item = &'a Share>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reduces_and_normalizes_sign() {
        assert_eq!(Share::new(2, 4), Share::new(1, 2));
        assert_eq!(Share::new(1, -2).numerator(), -1);
        assert_eq!(Share::new(1, -2).denominator(), 2);
        assert_eq!(Share::new(0, 7), Share::ZERO);
    }

    #[test]
    fn arithmetic_is_exact() {
        let total = Share::new(1, 6) + Share::new(1, 2) + Share::new(1, 6) + Share::new(1, 6);
        assert_eq!(total, Share::ONE);
        assert_eq!(Share::ONE - Share::new(1, 4), Share::new(3, 4));
        assert_eq!(Share::new(2, 3).split(2), Share::new(1, 3));
        assert_eq!(Share::ONE / Share::new(7, 6), Share::new(6, 7));
    }

    #[test]
    fn ordering_compares_values() {
        assert!(Share::new(1, 3) > Share::new(1, 4));
        assert!(Share::new(7, 6) > Share::ONE);
        assert!(Share::new(2, 3).is_proper());
        assert!(!Share::new(7, 6).is_proper());
        assert!(!Share::new(-1, 6).is_proper());
    }

    #[test]
    fn sum_of_iterator() {
        let shares = [Share::new(1, 8), Share::new(1, 2), Share::new(3, 8)];
        assert_eq!(shares.iter().sum::<Share>(), Share::ONE);
    }

    #[test]
    fn display_omits_unit_denominator() {
        assert_eq!(Share::new(1, 6).to_string(), "1/6");
        assert_eq!(Share::ONE.to_string(), "1");
    }
}
