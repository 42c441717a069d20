use super::Log;
use crate::core::prelude::*;
use crate::{Environment, ExternalContext, Snapshot};
use primitive_types::{H160, H256, U256};

/// Vicinity value of a memory backend.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "with-codec",
    derive(scale_codec::Encode, scale_codec::Decode, scale_info::TypeInfo)
)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryVicinity {
    /// Gas price.
    pub gas_price: U256,
    /// Origin.
    pub origin: H160,
    /// Hashes of the most recent ancestors, parent first.
    pub block_hashes: Vec<H256>,
    /// Environmental block number.
    pub block_number: U256,
    /// Environmental coinbase.
    pub block_coinbase: H160,
    /// Environmental block timestamp.
    pub block_timestamp: U256,
    /// Environmental block difficulty.
    pub block_difficulty: U256,
    /// Environmental block gas limit.
    pub block_gas_limit: U256,
}

/// Account information of a memory backend.
#[derive(Default, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "with-codec",
    derive(scale_codec::Encode, scale_codec::Decode, scale_info::TypeInfo)
)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryAccount {
    /// Account nonce.
    pub nonce: U256,
    /// Account balance.
    pub balance: U256,
    /// Nonzero storage slots.
    pub storage: BTreeMap<H256, H256>,
    /// Account code.
    pub code: Vec<u8>,
}

/// Undo record of a single mutation.
#[derive(Clone, Debug)]
enum Change {
    Created(H160),
    Balance(H160, U256),
    Nonce(H160, U256),
    Code(H160, Vec<u8>),
    Storage(H160, H256, H256),
    StorageReset(H160, BTreeMap<H256, H256>),
    Log,
    Refund(u64),
    Deleted(H160),
}

/// Memory backend, storing all state values in a `BTreeMap` in memory.
///
/// Mutations are journaled; a snapshot is the journal length and reverting
/// replays the journal backwards down to it.
#[derive(Clone, Debug)]
pub struct MemoryBackend<'vicinity> {
    vicinity: &'vicinity MemoryVicinity,
    state: BTreeMap<H160, MemoryAccount>,
    logs: Vec<Log>,
    refund: u64,
    deleted: BTreeSet<H160>,
    journal: Vec<Change>,
}

impl<'vicinity> MemoryBackend<'vicinity> {
    /// Create a new memory backend.
    #[must_use]
    pub fn new(vicinity: &'vicinity MemoryVicinity, state: BTreeMap<H160, MemoryAccount>) -> Self {
        Self {
            vicinity,
            state,
            logs: Vec::new(),
            refund: 0,
            deleted: BTreeSet::new(),
            journal: Vec::new(),
        }
    }

    /// Get the underlying `BTreeMap` storing the state.
    #[must_use]
    pub const fn state(&self) -> &BTreeMap<H160, MemoryAccount> {
        &self.state
    }

    /// Account at address, if it exists.
    #[must_use]
    pub fn account(&self, address: H160) -> Option<&MemoryAccount> {
        self.state.get(&address)
    }

    /// Logs emitted so far.
    #[must_use]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Accumulated refund counter.
    #[must_use]
    pub const fn refund(&self) -> u64 {
        self.refund
    }

    /// Addresses marked for deletion.
    #[must_use]
    pub const fn deleted(&self) -> &BTreeSet<H160> {
        &self.deleted
    }

    /// Remove accounts marked for deletion and forget the journal. Earlier
    /// snapshots become invalid.
    pub fn commit(&mut self) {
        for address in core::mem::take(&mut self.deleted) {
            self.state.remove(&address);
        }
        self.journal.clear();
    }

    fn account_mut(&mut self, address: H160) -> &mut MemoryAccount {
        if !self.state.contains_key(&address) {
            self.journal.push(Change::Created(address));
        }
        self.state.entry(address).or_default()
    }

    fn undo(&mut self, change: Change) {
        match change {
            Change::Created(address) => {
                self.state.remove(&address);
            }
            Change::Balance(address, balance) => {
                if let Some(account) = self.state.get_mut(&address) {
                    account.balance = balance;
                }
            }
            Change::Nonce(address, nonce) => {
                if let Some(account) = self.state.get_mut(&address) {
                    account.nonce = nonce;
                }
            }
            Change::Code(address, code) => {
                if let Some(account) = self.state.get_mut(&address) {
                    account.code = code;
                }
            }
            Change::Storage(address, index, value) => {
                if let Some(account) = self.state.get_mut(&address) {
                    if value.is_zero() {
                        account.storage.remove(&index);
                    } else {
                        account.storage.insert(index, value);
                    }
                }
            }
            Change::StorageReset(address, storage) => {
                if let Some(account) = self.state.get_mut(&address) {
                    account.storage = storage;
                }
            }
            Change::Log => {
                self.logs.pop();
            }
            Change::Refund(amount) => {
                self.refund -= amount;
            }
            Change::Deleted(address) => {
                self.deleted.remove(&address);
            }
        }
    }
}

impl Environment for MemoryBackend<'_> {
    fn origin(&self) -> H160 {
        self.vicinity.origin
    }
    fn gas_price(&self) -> U256 {
        self.vicinity.gas_price
    }
    fn block_hash(&self, number: U256) -> H256 {
        if number >= self.vicinity.block_number
            || self.vicinity.block_number - number - U256::one()
                >= U256::from(self.vicinity.block_hashes.len())
        {
            H256::default()
        } else {
            let index = (self.vicinity.block_number - number - U256::one()).as_usize();
            self.vicinity.block_hashes[index]
        }
    }
    fn block_coinbase(&self) -> H160 {
        self.vicinity.block_coinbase
    }
    fn block_timestamp(&self) -> U256 {
        self.vicinity.block_timestamp
    }
    fn block_number(&self) -> U256 {
        self.vicinity.block_number
    }
    fn block_difficulty(&self) -> U256 {
        self.vicinity.block_difficulty
    }
    fn block_gas_limit(&self) -> U256 {
        self.vicinity.block_gas_limit
    }
}

impl ExternalContext for MemoryBackend<'_> {
    fn balance(&self, address: H160) -> U256 {
        self.state
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or_default()
    }

    fn set_balance(&mut self, address: H160, balance: U256) {
        let account = self.account_mut(address);
        let previous = core::mem::replace(&mut account.balance, balance);
        self.journal.push(Change::Balance(address, previous));
    }

    fn nonce(&self, address: H160) -> U256 {
        self.state
            .get(&address)
            .map(|a| a.nonce)
            .unwrap_or_default()
    }

    fn set_nonce(&mut self, address: H160, nonce: U256) {
        let account = self.account_mut(address);
        let previous = core::mem::replace(&mut account.nonce, nonce);
        self.journal.push(Change::Nonce(address, previous));
    }

    fn code(&self, address: H160) -> Vec<u8> {
        self.state
            .get(&address)
            .map(|v| v.code.clone())
            .unwrap_or_default()
    }

    fn set_code(&mut self, address: H160, code: Vec<u8>) {
        let account = self.account_mut(address);
        let previous = core::mem::replace(&mut account.code, code);
        self.journal.push(Change::Code(address, previous));
    }

    fn storage(&self, address: H160, index: H256) -> H256 {
        self.state
            .get(&address)
            .and_then(|v| v.storage.get(&index).copied())
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: H160, index: H256, value: H256) {
        let account = self.account_mut(address);
        let previous = if value.is_zero() {
            account.storage.remove(&index)
        } else {
            account.storage.insert(index, value)
        };
        self.journal
            .push(Change::Storage(address, index, previous.unwrap_or_default()));
    }

    fn reset_storage(&mut self, address: H160) {
        if let Some(account) = self.state.get_mut(&address) {
            let previous = core::mem::take(&mut account.storage);
            self.journal.push(Change::StorageReset(address, previous));
        }
    }

    fn log(&mut self, address: H160, topics: Vec<H256>, data: Vec<u8>) {
        self.logs.push(Log {
            address,
            topics,
            data,
        });
        self.journal.push(Change::Log);
    }

    fn add_refund(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.refund += amount;
        self.journal.push(Change::Refund(amount));
    }

    fn mark_delete(&mut self, address: H160) {
        if self.deleted.insert(address) {
            self.journal.push(Change::Deleted(address));
        }
    }

    fn exists(&self, address: H160) -> bool {
        self.state.contains_key(&address)
    }

    fn snapshot(&mut self) -> Snapshot {
        Snapshot::new(self.journal.len())
    }

    fn revert(&mut self, snapshot: Snapshot) {
        while self.journal.len() > snapshot.position() {
            if let Some(change) = self.journal.pop() {
                self.undo(change);
            }
        }
    }
}
