//! Core layer: machine state, code preprocessing and the dispatch loop.

#[cfg(not(feature = "std"))]
pub mod prelude {
    pub use alloc::{
        borrow::Cow,
        boxed::Box,
        collections::{BTreeMap, BTreeSet, VecDeque},
        rc::Rc,
        vec,
        vec::Vec,
    };
}
#[cfg(feature = "std")]
pub mod prelude {
    pub use std::{
        borrow::Cow,
        boxed::Box,
        collections::{BTreeMap, BTreeSet, VecDeque},
        rc::Rc,
        vec,
        vec::Vec,
    };
}

mod cache;
mod chunk;
mod error;
pub(crate) mod eval;
mod memory;
mod opcode;
mod stack;
pub mod utils;

pub use cache::{ChunkCache, DEFAULT_CHUNK_CACHE_CAPACITY};
pub use chunk::{preprocess, ChunkMap, CodeChunk, Instruction};
pub use error::{ExitError, ExitFatal, ExitReason, ExitRevert, ExitSucceed};
pub use memory::Memory;
pub use opcode::{Opcode, OpcodeInfo};
pub use stack::{Stack, STACK_LIMIT};

use crate::gasometer;
use prelude::*;
use primitive_types::U256;
use utils::USIZE_MAX;

/// Execution state of a single message frame.
///
/// The machine owns the operand stack and memory of one invocation and
/// shares the code and its preprocessed chunks with the cache.
pub struct Machine {
    /// Program code.
    code: Rc<Vec<u8>>,
    /// Chunks of the program code.
    chunks: Rc<ChunkMap>,
    /// Offset of the next chunk to run.
    pc: usize,
    /// Remaining gas.
    gas: u64,
    /// Memory.
    memory: Memory,
    /// Stack.
    stack: Stack,
    /// Data set by `RETURN` or `REVERT`.
    output: Vec<u8>,
}

impl Machine {
    /// Create a new machine for the given code, its chunks and a gas budget.
    #[must_use]
    pub fn new(code: Rc<Vec<u8>>, chunks: Rc<ChunkMap>, gas: u64) -> Self {
        Self {
            code,
            chunks,
            pc: 0,
            gas,
            memory: Memory::new(),
            stack: Stack::new(STACK_LIMIT),
            output: Vec::new(),
        }
    }

    /// Reference of machine stack.
    #[must_use]
    pub const fn stack(&self) -> &Stack {
        &self.stack
    }
    /// Mutable reference of machine stack.
    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }
    /// Reference of machine memory.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    /// Mutable reference of machine memory.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    /// Program code.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }
    /// Preprocessed chunks of the program code.
    #[must_use]
    pub fn chunks(&self) -> Rc<ChunkMap> {
        Rc::clone(&self.chunks)
    }
    /// Offset of the next chunk to run.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }
    /// Move the program counter.
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }
    /// Remaining gas.
    #[must_use]
    pub const fn gas(&self) -> u64 {
        self.gas
    }
    /// Output set by `RETURN` or `REVERT`.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
    /// Set the frame output.
    pub fn set_output(&mut self, output: Vec<u8>) {
        self.output = output;
    }
    /// Consume the machine, returning its gas and output.
    #[must_use]
    pub fn into_parts(self) -> (u64, Vec<u8>) {
        (self.gas, self.output)
    }

    /// Charge `cost` gas.
    ///
    /// # Errors
    /// Return `ExitError::OutOfGas` if the remaining gas is lower than `cost`.
    /// In that case the remaining gas is left untouched.
    #[inline]
    pub fn record_cost(&mut self, cost: u64) -> Result<(), ExitError> {
        self.gas = self.gas.checked_sub(cost).ok_or(ExitError::OutOfGas)?;
        Ok(())
    }

    /// Give back gas left over by a child frame.
    #[inline]
    pub fn refund_gas(&mut self, amount: u64) {
        self.gas = self.gas.saturating_add(amount);
    }

    /// Grow memory to cover `offset..offset + size`, charging for the new
    /// words. A zero `size` never grows memory nor costs gas.
    ///
    /// # Errors
    /// Return `ExitError::OutOfGas` if the range is not addressable or the
    /// expansion fee cannot be paid. Memory is not touched on failure.
    pub fn grow_memory(&mut self, offset: U256, size: U256) -> Result<(), ExitError> {
        if size.is_zero() {
            return Ok(());
        }
        let (end, overflow) = offset.overflowing_add(size);
        if overflow || end > USIZE_MAX {
            return Err(ExitError::OutOfGas);
        }

        let new_words = gasometer::num_words(end.as_usize());
        let old_words = self.memory.len() / 32;
        if new_words > old_words {
            let cost = gasometer::memory_gas(new_words)? - gasometer::memory_gas(old_words)?;
            self.record_cost(cost)?;
            self.memory
                .resize_end(end.as_usize())
                .map_err(|_| ExitError::OutOfGas)?;
        }
        Ok(())
    }

    /// Grow memory over `offset..offset + size` and return a copy of it.
    ///
    /// # Errors
    /// Return `ExitError::OutOfGas` if the expansion cannot be paid.
    pub fn read_memory(&mut self, offset: U256, size: U256) -> Result<Vec<u8>, ExitError> {
        self.grow_memory(offset, size)?;
        if size.is_zero() {
            return Ok(Vec::new());
        }
        Ok(self.memory.get(offset.as_usize(), size.as_usize()))
    }

    /// Grow memory over `offset..offset + size` and write `value` into it,
    /// zero filling past the end of `value`.
    ///
    /// # Errors
    /// Return `ExitError::OutOfGas` if the expansion cannot be paid.
    pub fn write_memory(&mut self, offset: U256, value: &[u8], size: U256) -> Result<(), ExitError> {
        self.grow_memory(offset, size)?;
        if size.is_zero() {
            return Ok(());
        }
        self.memory.set(offset.as_usize(), value, size.as_usize())
    }
}
