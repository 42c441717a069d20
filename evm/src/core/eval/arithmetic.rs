use crate::core::utils::{I256, U256_ONE, U256_ZERO};
use core::convert::TryFrom;
use core::ops::Rem;
use primitive_types::{U256, U512};

#[inline]
pub fn div(op1: U256, op2: U256) -> U256 {
    if op2.is_zero() {
        U256_ZERO
    } else {
        op1 / op2
    }
}

#[inline]
pub fn sdiv(op1: U256, op2: U256) -> U256 {
    let op1: I256 = op1.into();
    let op2: I256 = op2.into();
    let ret = op1 / op2;
    ret.into()
}

#[inline]
pub fn rem(op1: U256, op2: U256) -> U256 {
    if op2.is_zero() {
        U256_ZERO
    } else {
        op1.rem(op2)
    }
}

#[inline]
pub fn srem(op1: U256, op2: U256) -> U256 {
    if op2.is_zero() {
        U256_ZERO
    } else {
        let op1: I256 = op1.into();
        let op2: I256 = op2.into();
        let ret = op1.rem(op2);
        ret.into()
    }
}

#[inline]
pub fn addmod(op1: U256, op2: U256, op3: U256) -> U256 {
    if op3.is_zero() {
        return U256_ZERO;
    }
    let sum = U512::from(op1) + U512::from(op2);
    let v = sum % U512::from(op3);
    U256::try_from(v).unwrap_or(U256_ZERO)
}

#[inline]
pub fn mulmod(op1: U256, op2: U256, op3: U256) -> U256 {
    if op3.is_zero() {
        return U256_ZERO;
    }
    let product = op1.full_mul(op2);
    let v = product % U512::from(op3);
    U256::try_from(v).unwrap_or(U256_ZERO)
}

/// Wrapping exponentiation by squaring.
#[inline]
pub fn exp(op1: U256, op2: U256) -> U256 {
    let mut op1 = op1;
    let mut op2 = op2;
    let mut r = U256_ONE;

    while !op2.is_zero() {
        if op2 & U256_ONE != U256_ZERO {
            r = r.overflowing_mul(op1).0;
        }
        op2 >>= 1;
        op1 = op1.overflowing_mul(op1).0;
    }

    r
}

/// Extend the sign of the `op1 + 1` low bytes of `op2`. `op1 >= 32` leaves
/// `op2` as is.
#[inline]
pub fn signextend(op1: U256, op2: U256) -> U256 {
    if op1 >= U256::from(32) {
        return op2;
    }
    let bit_index = 8 * op1.low_u32() as usize + 7;
    let bit = op2.bit(bit_index);
    let mask = (U256_ONE << bit_index) - U256_ONE;
    if bit {
        op2 | !mask
    } else {
        op2 & mask
    }
}
