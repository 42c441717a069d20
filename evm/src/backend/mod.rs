//! Reference implementations of [`ExternalContext`](crate::ExternalContext).

mod memory;

pub use memory::{MemoryAccount, MemoryBackend, MemoryVicinity};

use crate::core::prelude::*;
use primitive_types::{H160, H256};

/// A log entry emitted by `LOGn`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "with-codec",
    derive(scale_codec::Encode, scale_codec::Decode, scale_info::TypeInfo)
)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
    /// Account that emitted the log.
    pub address: H160,
    /// Topics, in the order they were popped.
    pub topics: Vec<H256>,
    /// Log data.
    pub data: Vec<u8>,
}
