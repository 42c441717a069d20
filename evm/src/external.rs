use crate::core::prelude::*;
use crate::core::{ExitError, ExitFatal, ExitReason};
use primitive_types::{H160, H256, U256};

/// Opaque token returned by [`ExternalContext::snapshot`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Snapshot(usize);

impl Snapshot {
    /// Wrap a backend-defined position.
    #[must_use]
    pub const fn new(position: usize) -> Self {
        Self(position)
    }

    /// Backend-defined position.
    #[must_use]
    pub const fn position(self) -> usize {
        self.0
    }
}

/// Read-only transaction and block environment.
#[auto_impl::auto_impl(&, &mut, Box)]
pub trait Environment {
    /// Sender of the transaction.
    fn origin(&self) -> H160;
    /// Gas price of the transaction.
    fn gas_price(&self) -> U256;
    /// Hash of the block with the given number, zero if unknown. The machine
    /// only asks for one of the 256 most recent ancestors.
    fn block_hash(&self, number: U256) -> H256;
    /// Beneficiary of the current block.
    fn block_coinbase(&self) -> H160;
    /// Timestamp of the current block.
    fn block_timestamp(&self) -> U256;
    /// Number of the current block.
    fn block_number(&self) -> U256;
    /// Difficulty of the current block.
    fn block_difficulty(&self) -> U256;
    /// Gas limit of the current block.
    fn block_gas_limit(&self) -> U256;
}

/// Account state and journal the machine reads and mutates.
///
/// Every mutation made after [`ExternalContext::snapshot`] must be undone by
/// the matching [`ExternalContext::revert`]. Snapshots nest: reverting to
/// one discards every later snapshot as well.
#[auto_impl::auto_impl(&mut, Box)]
pub trait ExternalContext: Environment {
    /// Get balance of address.
    fn balance(&self, address: H160) -> U256;
    /// Set balance of address.
    fn set_balance(&mut self, address: H160, balance: U256);
    /// Get nonce of address.
    fn nonce(&self, address: H160) -> U256;
    /// Set nonce of address.
    fn set_nonce(&mut self, address: H160, nonce: U256);
    /// Get code of address.
    fn code(&self, address: H160) -> Vec<u8>;
    /// Set code of address.
    fn set_code(&mut self, address: H160, code: Vec<u8>);
    /// Get storage value of address at index.
    fn storage(&self, address: H160, index: H256) -> H256;
    /// Set storage value of address at index.
    fn set_storage(&mut self, address: H160, index: H256, value: H256);
    /// Clear all storage of address.
    fn reset_storage(&mut self, address: H160);
    /// Create a log owned by address with given topics and data.
    fn log(&mut self, address: H160, topics: Vec<H256>, data: Vec<u8>);
    /// Add to the refund counter of the transaction.
    fn add_refund(&mut self, amount: u64);
    /// Mark an address to be deleted at the end of the transaction.
    fn mark_delete(&mut self, address: H160);
    /// Check whether an address exists.
    fn exists(&self, address: H160) -> bool;
    /// Take a snapshot of the current state.
    fn snapshot(&mut self) -> Snapshot;
    /// Undo every mutation made since `snapshot` was taken.
    fn revert(&mut self, snapshot: Snapshot);

    /// Check whether an address has no balance, no nonce and no code.
    fn is_empty(&self, address: H160) -> bool {
        self.balance(address).is_zero()
            && self.nonce(address).is_zero()
            && self.code(address).is_empty()
    }

    /// Increase the nonce of address by one.
    ///
    /// # Errors
    /// Return `ExitError::MaxNonce` if the nonce is already `2^64 - 1`.
    fn increment_nonce(&mut self, address: H160) -> Result<(), ExitError> {
        let nonce = self.nonce(address);
        if nonce >= U256::from(u64::MAX) {
            return Err(ExitError::MaxNonce);
        }
        self.set_nonce(address, nonce + 1);
        Ok(())
    }

    /// Move `value` from `source` to `target`.
    ///
    /// # Errors
    /// Return `ExitError::OutOfFund` if `source` cannot afford it, or
    /// `ExitFatal` if the target balance would overflow. Nothing changes on
    /// error.
    fn transfer(&mut self, source: H160, target: H160, value: U256) -> Result<(), ExitReason> {
        if value.is_zero() {
            return Ok(());
        }
        let source_balance = self.balance(source);
        if source_balance < value {
            return Err(ExitError::OutOfFund.into());
        }
        if source == target {
            return Ok(());
        }
        let target_balance = self
            .balance(target)
            .checked_add(value)
            .ok_or_else(|| ExitFatal::Other(Cow::from("balance overflow")))?;
        self.set_balance(source, source_balance - value);
        self.set_balance(target, target_balance);
        Ok(())
    }
}
