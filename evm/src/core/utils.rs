use core::cmp::Ordering;
use core::ops::{Div, Rem};
use primitive_types::U256;

/// Precalculated `0` for `U256`.
pub const U256_ZERO: U256 = U256([0, 0, 0, 0]);
/// Precalculated `1` for `U256`.
pub const U256_ONE: U256 = U256([1, 0, 0, 0]);
/// Precalculated `usize::MAX` for `U256`
pub const USIZE_MAX: U256 = U256([usize::MAX as u64, 0, 0, 0]);

/// Sign of a two's complement reinterpreted word.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Sign {
    Plus,
    Minus,
    Zero,
}

const SIGN_BIT_MASK: U256 = U256([
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);

/// Signed view of a word: sign and magnitude.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct I256(pub Sign, pub U256);

impl I256 {
    /// Zero value of I256.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Sign::Zero, U256_ZERO)
    }
    /// Minimum value of I256, `-2^255`.
    #[must_use]
    pub fn min_value() -> Self {
        Self(Sign::Minus, (U256::MAX & SIGN_BIT_MASK) + U256_ONE)
    }
}

impl Ord for I256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Sign::Zero, Sign::Zero) => Ordering::Equal,
            (Sign::Zero | Sign::Minus, Sign::Plus) | (Sign::Minus, Sign::Zero) => Ordering::Less,
            (Sign::Minus, Sign::Minus) => self.1.cmp(&other.1).reverse(),
            (Sign::Zero | Sign::Plus, Sign::Minus) | (Sign::Plus, Sign::Zero) => Ordering::Greater,
            (Sign::Plus, Sign::Plus) => self.1.cmp(&other.1),
        }
    }
}

impl PartialOrd for I256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for I256 {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<U256> for I256 {
    fn from(val: U256) -> Self {
        if val.is_zero() {
            Self::zero()
        } else if val & SIGN_BIT_MASK == val {
            Self(Sign::Plus, val)
        } else {
            Self(Sign::Minus, (!val).overflowing_add(U256_ONE).0)
        }
    }
}

impl From<I256> for U256 {
    fn from(value: I256) -> Self {
        match value.0 {
            Sign::Zero => U256_ZERO,
            Sign::Plus => value.1,
            Sign::Minus => (!value.1).overflowing_add(U256_ONE).0,
        }
    }
}

impl Div for I256 {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        if other == Self::zero() {
            return Self::zero();
        }

        // -2^255 / -1 does not fit and wraps back to -2^255.
        if self == Self::min_value() && other.1 == U256_ONE {
            return Self::min_value();
        }

        let d = (self.1 / other.1) & SIGN_BIT_MASK;

        if d.is_zero() {
            return Self::zero();
        }

        match (self.0, other.0) {
            (Sign::Zero | Sign::Plus, Sign::Plus | Sign::Zero) | (Sign::Minus, Sign::Minus) => {
                Self(Sign::Plus, d)
            }
            (Sign::Zero | Sign::Plus, Sign::Minus) | (Sign::Minus, Sign::Plus | Sign::Zero) => {
                Self(Sign::Minus, d)
            }
        }
    }
}

impl Rem for I256 {
    type Output = Self;

    fn rem(self, other: Self) -> Self {
        if other.1.is_zero() {
            return Self::zero();
        }

        let r = (self.1 % other.1) & SIGN_BIT_MASK;

        if r.is_zero() {
            return Self::zero();
        }

        Self(self.0, r)
    }
}
