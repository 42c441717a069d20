//! Chunked, gas-metered Ethereum bytecode execution engine.
//!
//! Contract code is split once into straight-line chunks carrying their
//! static gas cost and stack bounds, so the dispatch loop validates a whole
//! chunk up front and then runs its instructions without per-opcode checks.
//! Nested `CALL`/`CREATE` messages are applied by an [`Executor`] against an
//! [`ExternalContext`] that owns accounts, storage and snapshots.
//!
//! Nested messages recurse on the native stack. Deep call chains need a
//! larger stack than threads get by default, see [`CALL_STACK_SIZE`].

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod backend;
pub mod core;
pub mod executor;
pub mod gasometer;
pub mod precompiles;

mod config;
mod external;

pub use crate::config::{Config, CreateScheme};
pub use crate::core::*;
#[cfg(feature = "std")]
pub use crate::executor::run_with_call_stack;
pub use crate::executor::{
    create_address, CreateResult, ExecutionResult, Executor, Message, CALL_STACK_SIZE,
};
pub use crate::external::{Environment, ExternalContext, Snapshot};
pub use crate::precompiles::{Precompile, PrecompileOutput, PrecompileSet};
