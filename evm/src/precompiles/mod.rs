//! Native contracts living at fixed addresses.

mod simple;

pub use simple::{ECRecover, Identity, Ripemd160, Sha256};

use crate::core::prelude::*;
use crate::core::{ExitError, ExitReason, ExitSucceed};
use primitive_types::H160;

/// A native contract.
#[auto_impl::auto_impl(&, Box)]
pub trait Precompile {
    /// Gas needed to run on `input`.
    fn required_gas(&self, input: &[u8]) -> u64;
    /// Run on `input`. Only called once the required gas is paid.
    fn execute(&self, input: &[u8]) -> Vec<u8>;
}

/// Result of running a precompile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrecompileOutput {
    /// Exit reason.
    pub reason: ExitReason,
    /// Gas left after paying the fee.
    pub gas_left: u64,
    /// Returned data.
    pub output: Vec<u8>,
}

/// Precompiles by address.
#[derive(Default)]
pub struct PrecompileSet {
    precompiles: BTreeMap<H160, Box<dyn Precompile>>,
}

impl PrecompileSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The four Frontier precompiles: `ECRECOVER`, `SHA256`, `RIPEMD160`
    /// and `IDENTITY` at addresses 1 to 4.
    #[must_use]
    pub fn frontier() -> Self {
        let mut set = Self::new();
        set.insert(address(1), Box::new(ECRecover));
        set.insert(address(2), Box::new(Sha256));
        set.insert(address(3), Box::new(Ripemd160));
        set.insert(address(4), Box::new(Identity));
        set
    }

    /// Register `precompile` at `address`, replacing any previous one.
    pub fn insert(&mut self, address: H160, precompile: Box<dyn Precompile>) {
        self.precompiles.insert(address, precompile);
    }

    /// Whether `address` holds a precompile.
    #[must_use]
    pub fn contains(&self, address: H160) -> bool {
        self.precompiles.contains_key(&address)
    }

    /// Addresses holding a precompile.
    pub fn addresses(&self) -> impl Iterator<Item = H160> + '_ {
        self.precompiles.keys().copied()
    }

    /// Run the precompile at `address` with `gas`, or `None` if there is none.
    ///
    /// Insufficient gas fails without running it and leaves no gas.
    #[must_use]
    pub fn execute(&self, address: H160, input: &[u8], gas: u64) -> Option<PrecompileOutput> {
        let precompile = self.precompiles.get(&address)?;
        let cost = precompile.required_gas(input);
        Some(match gas.checked_sub(cost) {
            Some(gas_left) => PrecompileOutput {
                reason: ExitSucceed::Returned.into(),
                gas_left,
                output: precompile.execute(input),
            },
            None => PrecompileOutput {
                reason: ExitError::OutOfGas.into(),
                gas_left: 0,
                output: Vec::new(),
            },
        })
    }
}

/// `base + word * ceil(len / 32)`, saturating so an absurd input is simply
/// unaffordable.
fn linear_cost(len: usize, base: u64, word: u64) -> u64 {
    let words = u64::try_from(len.div_ceil(32)).unwrap_or(u64::MAX);
    base.saturating_add(word.saturating_mul(words))
}

/// Address whose last byte is `last` and all others are zero.
#[must_use]
pub const fn address(last: u8) -> H160 {
    H160([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, last,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_echoes_input() {
        let set = PrecompileSet::frontier();
        let out = set.execute(address(4), b"abc", 100).unwrap();
        assert_eq!(out.reason, ExitSucceed::Returned.into());
        assert_eq!(out.output, b"abc".to_vec());
        assert_eq!(out.gas_left, 100 - 18);
    }

    #[test]
    fn insufficient_gas_consumes_everything() {
        let set = PrecompileSet::frontier();
        let out = set.execute(address(2), &[0; 33], 83).unwrap();
        assert_eq!(out.reason, ExitError::OutOfGas.into());
        assert_eq!(out.gas_left, 0);
        assert!(out.output.is_empty());
    }

    #[test]
    fn unknown_address() {
        let set = PrecompileSet::frontier();
        assert!(set.execute(address(5), &[], 1_000_000).is_none());
        assert_eq!(set.addresses().count(), 4);
    }

    #[test]
    fn linear_cost_rounds_up() {
        assert_eq!(linear_cost(0, 15, 3), 15);
        assert_eq!(linear_cost(1, 15, 3), 18);
        assert_eq!(linear_cost(33, 60, 12), 84);
    }
}
