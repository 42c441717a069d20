//! Dynamic gas costs. Static fees live in the opcode table.

pub mod consts;

use crate::core::ExitError;
use consts::{
    G_CONTRACTBYTE, G_COPY, G_EXPBYTE, G_LOGBYTE, G_MEMORY, G_QUAD_COEFF_DIV, G_SHA3WORD,
    G_SRESET, G_SSET, R_SCLEAR,
};
use primitive_types::{H256, U256};

/// Number of 32-byte words needed to hold `len` bytes.
#[inline]
#[must_use]
pub const fn num_words(len: usize) -> usize {
    len / 32 + if len % 32 == 0 { 0 } else { 1 }
}

/// Total cost of a memory of `words` words: `words * 3 + words^2 / 512`.
///
/// # Errors
/// Return `ExitError::OutOfGas` if the cost does not fit in `u64`.
pub fn memory_gas(words: usize) -> Result<u64, ExitError> {
    let words = u128::try_from(words).map_err(|_| ExitError::OutOfGas)?;
    let cost = words * u128::from(G_MEMORY) + words * words / u128::from(G_QUAD_COEFF_DIV);
    u64::try_from(cost).map_err(|_| ExitError::OutOfGas)
}

fn per_word(len: usize, fee: u64) -> Result<u64, ExitError> {
    u64::try_from(num_words(len))
        .ok()
        .and_then(|words| words.checked_mul(fee))
        .ok_or(ExitError::OutOfGas)
}

/// Cost of copying `len` bytes by `CALLDATACOPY`, `CODECOPY` or `EXTCODECOPY`.
///
/// # Errors
/// Return `ExitError::OutOfGas` on overflow.
pub fn copy_gas(len: usize) -> Result<u64, ExitError> {
    per_word(len, G_COPY)
}

/// Cost of hashing `len` bytes with `SHA3`, on top of the static fee.
///
/// # Errors
/// Return `ExitError::OutOfGas` on overflow.
pub fn sha3_gas(len: usize) -> Result<u64, ExitError> {
    per_word(len, G_SHA3WORD)
}

/// Cost of logging `len` bytes of data, on top of the static fee.
///
/// # Errors
/// Return `ExitError::OutOfGas` on overflow.
pub fn log_gas(len: usize) -> Result<u64, ExitError> {
    u64::try_from(len)
        .ok()
        .and_then(|len| len.checked_mul(G_LOGBYTE))
        .ok_or(ExitError::OutOfGas)
}

/// Cost of storing `len` bytes of contract code.
///
/// # Errors
/// Return `ExitError::OutOfGas` on overflow.
pub fn code_deposit_gas(len: usize) -> Result<u64, ExitError> {
    u64::try_from(len)
        .ok()
        .and_then(|len| len.checked_mul(G_CONTRACTBYTE))
        .ok_or(ExitError::OutOfGas)
}

/// `EXP` charge: `G_EXPBYTE` per significant byte of the exponent.
#[must_use]
pub fn exp_gas(power: U256) -> u64 {
    let bytes = (power.bits() as u64).div_ceil(8);
    bytes * G_EXPBYTE
}

/// `SSTORE` cost and refund given the current and the new value.
#[must_use]
pub fn sstore_cost(current: H256, new: H256) -> (u64, u64) {
    match (current.is_zero(), new.is_zero()) {
        (true, false) => (G_SSET, 0),
        (false, true) => (G_SRESET, R_SCLEAR),
        _ => (G_SRESET, 0),
    }
}

/// All but one 64th of `gas`.
#[inline]
#[must_use]
pub const fn all_but_one_64th(gas: u64) -> u64 {
    gas - gas / 64
}
