//! Message application: value transfer, precompile dispatch, code execution
//! and the snapshot discipline around them.

mod create;

pub use create::{create_address, CreateResult};

use crate::config::Config;
use crate::core::eval;
use crate::core::prelude::*;
use crate::core::{ChunkCache, ExitReason, Machine};
use crate::external::ExternalContext;
use crate::precompiles::{PrecompileOutput, PrecompileSet};
use log::debug;
use primitive_types::{H160, U256};

/// Native stack size needed to run a call chain 1024 frames deep.
///
/// Nested messages recurse on the native stack, so a thread with the
/// platform default stack can overflow long before the depth limit is hit.
pub const CALL_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Run `f` on a scoped thread with a [`CALL_STACK_SIZE`] stack and return
/// its result.
///
/// Build the executor inside `f`. A panic in `f` is resumed on the calling
/// thread.
///
/// # Errors
/// Return the error of the OS if the thread cannot be spawned.
#[cfg(feature = "std")]
pub fn run_with_call_stack<T, F>(f: F) -> std::io::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("evm-engine".into())
            .stack_size(CALL_STACK_SIZE)
            .spawn_scoped(scope, f)?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

/// A message call or contract creation.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Account the message is sent from.
    pub sender: H160,
    /// Account whose balance and storage the code acts on.
    pub to: H160,
    /// Account whose code runs. Differs from `to` for `CALLCODE` and
    /// `DELEGATECALL`.
    pub code_address: H160,
    /// Value moved from `sender` to `to`, or seen by `CALLVALUE`.
    pub value: U256,
    /// Gas budget.
    pub gas: u64,
    /// Call data, or init code for a creation.
    pub data: Vec<u8>,
    /// Nesting depth, zero for the top-level message.
    pub depth: usize,
    /// Whether this message runs init code.
    pub is_create: bool,
    /// Whether `value` is actually transferred.
    pub transfers_value: bool,
}

impl Message {
    /// Top-level call of `to` by `sender`.
    #[must_use]
    pub const fn call(sender: H160, to: H160, value: U256, gas: u64, data: Vec<u8>) -> Self {
        Self {
            sender,
            to,
            code_address: to,
            value,
            gas,
            data,
            depth: 0,
            is_create: false,
            transfers_value: true,
        }
    }

    /// Top-level creation by `sender`. The target address is derived by
    /// [`Executor::create`].
    #[must_use]
    pub fn create(sender: H160, value: U256, gas: u64, init_code: Vec<u8>) -> Self {
        Self {
            sender,
            to: H160::zero(),
            code_address: H160::zero(),
            value,
            gas,
            data: init_code,
            depth: 0,
            is_create: true,
            transfers_value: true,
        }
    }

    /// Set the nesting depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

/// Outcome of applying a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionResult {
    /// Why execution stopped.
    pub reason: ExitReason,
    /// Gas not consumed. Always zero after an error.
    pub gas_left: u64,
    /// Returned or reverted data. Always empty after an error.
    pub output: Vec<u8>,
}

impl ExecutionResult {
    /// Whether the message succeeded and its effects were kept.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.reason.is_succeed()
    }

    /// Whether the message ended with `REVERT`.
    #[must_use]
    pub const fn is_revert(&self) -> bool {
        self.reason.is_revert()
    }
}

impl From<PrecompileOutput> for ExecutionResult {
    fn from(out: PrecompileOutput) -> Self {
        Self {
            reason: out.reason,
            gas_left: out.gas_left,
            output: out.output,
        }
    }
}

/// Applies messages against an external context.
///
/// The executor owns the context for the duration of one top-level
/// invocation and recurses into itself for nested calls and creations.
pub struct Executor<'config, 'precompiles, E> {
    context: E,
    config: &'config Config,
    precompiles: &'precompiles PrecompileSet,
    cache: ChunkCache,
}

impl<'config, 'precompiles, E: ExternalContext> Executor<'config, 'precompiles, E> {
    /// Create an executor with a fresh chunk cache.
    pub fn new(context: E, config: &'config Config, precompiles: &'precompiles PrecompileSet) -> Self {
        Self::with_cache(context, config, precompiles, ChunkCache::default())
    }

    /// Create an executor reusing `cache`.
    pub const fn with_cache(
        context: E,
        config: &'config Config,
        precompiles: &'precompiles PrecompileSet,
        cache: ChunkCache,
    ) -> Self {
        Self {
            context,
            config,
            precompiles,
            cache,
        }
    }

    /// External context.
    #[must_use]
    pub const fn context(&self) -> &E {
        &self.context
    }

    /// Mutable external context.
    pub fn context_mut(&mut self) -> &mut E {
        &mut self.context
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &'config Config {
        self.config
    }

    /// Precompiles reachable by calls.
    #[must_use]
    pub const fn precompiles(&self) -> &'precompiles PrecompileSet {
        self.precompiles
    }

    /// Chunk cache.
    #[must_use]
    pub const fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Give back the context and the cache.
    pub fn into_parts(self) -> (E, ChunkCache) {
        (self.context, self.cache)
    }

    /// Apply `msg`, running the code stored at `msg.code_address`.
    ///
    /// Every state change made by a failed message is reverted before
    /// returning.
    ///
    /// Nested calls and creations recurse, using native stack per frame. A
    /// chain reaching the default depth limit needs about
    /// [`CALL_STACK_SIZE`] bytes of stack; run it through
    /// [`run_with_call_stack`] or lower [`Config::call_stack_limit`].
    pub fn apply_message(&mut self, msg: &Message) -> ExecutionResult {
        let code = self.context.code(msg.code_address);
        self.apply_message_with_code(msg, code)
    }

    /// Apply `msg` running `code` instead of the code stored at
    /// `msg.code_address`. Used for init code.
    pub fn apply_message_with_code(&mut self, msg: &Message, code: Vec<u8>) -> ExecutionResult {
        let snapshot = self.context.snapshot();
        debug!(
            target: "evm::executor",
            "apply depth {} {:?} -> {:?} code {:?} value {} gas {}",
            msg.depth,
            msg.sender,
            msg.to,
            msg.code_address,
            msg.value,
            msg.gas
        );

        if msg.transfers_value {
            if let Err(reason) = self.context.transfer(msg.sender, msg.to, msg.value) {
                debug!(target: "evm::executor", "transfer failed: {:?}", reason);
                self.context.revert(snapshot);
                return ExecutionResult {
                    reason,
                    gas_left: msg.gas,
                    output: Vec::new(),
                };
            }
        }

        let precompile = if msg.is_create {
            None
        } else {
            self.precompiles.execute(msg.code_address, &msg.data, msg.gas)
        };
        let result = match precompile {
            Some(out) => ExecutionResult::from(out),
            None => self.execute(msg, code),
        };

        if !result.is_success() {
            debug!(
                target: "evm::executor",
                "revert depth {}: {:?}, gas left {}",
                msg.depth,
                result.reason,
                result.gas_left
            );
            self.context.revert(snapshot);
        }
        result
    }

    /// Run `code` for `msg` without any transfer or snapshot.
    ///
    /// Success and `REVERT` keep the remaining gas and the output; any
    /// other exit consumes all gas and returns nothing.
    pub fn execute(&mut self, msg: &Message, code: Vec<u8>) -> ExecutionResult {
        let chunks = self.cache.get_or_preprocess(&code);
        let mut machine = Machine::new(Rc::new(code), chunks, msg.gas);
        let reason = eval::run(&mut machine, msg, self);
        let (gas_left, output) = machine.into_parts();

        match reason {
            ExitReason::Succeed(_) | ExitReason::Revert(_) => ExecutionResult {
                reason,
                gas_left,
                output,
            },
            ExitReason::Error(_) | ExitReason::Fatal(_) => ExecutionResult {
                reason,
                gas_left: 0,
                output: Vec::new(),
            },
        }
    }
}
