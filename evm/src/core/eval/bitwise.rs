use crate::core::utils::{I256, U256_ONE, U256_ZERO};
use primitive_types::U256;

#[inline]
const fn bool_to_u256(value: bool) -> U256 {
    if value {
        U256_ONE
    } else {
        U256_ZERO
    }
}

#[inline]
pub fn lt(op1: U256, op2: U256) -> U256 {
    bool_to_u256(op1 < op2)
}

#[inline]
pub fn gt(op1: U256, op2: U256) -> U256 {
    bool_to_u256(op1 > op2)
}

#[inline]
pub fn slt(op1: U256, op2: U256) -> U256 {
    let op1: I256 = op1.into();
    let op2: I256 = op2.into();

    bool_to_u256(op1.lt(&op2))
}

#[inline]
pub fn sgt(op1: U256, op2: U256) -> U256 {
    let op1: I256 = op1.into();
    let op2: I256 = op2.into();

    bool_to_u256(op1.gt(&op2))
}

#[inline]
pub fn eq(op1: U256, op2: U256) -> U256 {
    bool_to_u256(op1 == op2)
}

#[inline]
pub fn iszero(op1: U256) -> U256 {
    bool_to_u256(op1 == U256_ZERO)
}

#[inline]
pub fn not(op1: U256) -> U256 {
    !op1
}

/// Byte `op1` of `op2`, counting from the most significant one. Zero when
/// `op1 >= 32`.
#[inline]
pub fn byte(op1: U256, op2: U256) -> U256 {
    if op1 >= U256::from(32) {
        return U256_ZERO;
    }
    U256::from(op2.byte(31 - op1.as_usize()))
}
