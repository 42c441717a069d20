use super::prelude::*;
use super::Opcode;

/// Exit reason of a message frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitReason {
    /// Machine has succeeded.
    Succeed(ExitSucceed),
    /// Machine returns a normal EVM error.
    Error(ExitError),
    /// Machine encountered an explicit revert.
    Revert(ExitRevert),
    /// Machine encountered an error that is not supposed to be a normal EVM
    /// error, such as a broken invariant of the external context.
    Fatal(ExitFatal),
}

impl ExitReason {
    /// Whether the exit is succeeded.
    #[must_use]
    pub const fn is_succeed(&self) -> bool {
        matches!(self, Self::Succeed(_))
    }

    /// Whether the exit is error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Whether the exit is revert.
    #[must_use]
    pub const fn is_revert(&self) -> bool {
        matches!(self, Self::Revert(_))
    }

    /// Whether the exit is fatal.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Exit succeed reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitSucceed {
    /// Machine encountered an explicit stop, or ran off the end of the code.
    Stopped,
    /// Machine encountered an explicit return.
    Returned,
    /// Machine encountered an explicit selfdestruct.
    Suicided,
}

impl From<ExitSucceed> for ExitReason {
    fn from(s: ExitSucceed) -> Self {
        Self::Succeed(s)
    }
}

/// Exit revert reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitRevert {
    /// Machine encountered an explicit revert. Remaining gas and output are
    /// handed back to the caller.
    Reverted,
}

impl From<ExitRevert> for ExitReason {
    fn from(s: ExitRevert) -> Self {
        Self::Revert(s)
    }
}

/// Exit error reason. Every error consumes all gas of the frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitError {
    /// Trying to pop from an empty stack, or a chunk needs more operands
    /// than the stack holds.
    StackUnderflow,
    /// Trying to push into a stack over stack limit.
    StackOverflow,
    /// Jump destination does not start with a `JUMPDEST`.
    InvalidJump,
    /// Execution resumed at an offset that does not start a chunk.
    InvalidStartPoint,
    /// An opcode accesses memory region, but the region is invalid.
    InvalidRange,
    /// Undefined byte or the designated `INVALID` opcode was executed.
    InvalidCode(Opcode),
    /// Opcode is not enabled by the active configuration.
    OpcodeInactive(Opcode),
    /// Not enough gas.
    OutOfGas,
    /// Not enough fund to start the execution.
    OutOfFund,
    /// Nonce reached maximum value of 2^64-1.
    MaxNonce,
    /// Other normal errors.
    Other(Cow<'static, str>),
}

impl From<ExitError> for ExitReason {
    fn from(s: ExitError) -> Self {
        Self::Error(s)
    }
}

/// Exit fatal reason.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExitFatal {
    /// The operation is not supported.
    NotSupported,
    /// The external context reported an impossible state.
    Other(Cow<'static, str>),
}

impl From<ExitFatal> for ExitReason {
    fn from(s: ExitFatal) -> Self {
        Self::Fatal(s)
    }
}
