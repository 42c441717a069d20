use core::fmt;

/// Decoded instruction.
///
/// The set is closed: every byte decodes to some variant, bytes without a
/// defined meaning decode to [`Opcode::Invalid`] and fail only when executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Opcode {
    Stop,
    Add,
    Mul,
    Sub,
    Div,
    SDiv,
    Mod,
    SMod,
    AddMod,
    MulMod,
    Exp,
    SignExtend,

    Lt,
    Gt,
    SLt,
    SGt,
    Eq,
    IsZero,
    And,
    Or,
    Xor,
    Not,
    Byte,

    Sha3,

    Address,
    Balance,
    Origin,
    Caller,
    CallValue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    CodeSize,
    CodeCopy,
    GasPrice,
    ExtCodeSize,
    ExtCodeCopy,

    BlockHash,
    Coinbase,
    Timestamp,
    Number,
    Difficulty,
    GasLimit,

    Pop,
    MLoad,
    MStore,
    MStore8,
    SLoad,
    SStore,
    Jump,
    JumpI,
    PC,
    MSize,
    Gas,
    JumpDest,

    /// `PUSH1`..`PUSH32`, carrying the number of immediate bytes.
    Push(u8),
    /// `DUP1`..`DUP16`.
    Dup(u8),
    /// `SWAP1`..`SWAP16`.
    Swap(u8),
    /// `LOG0`..`LOG4`, carrying the number of topics.
    Log(u8),

    Create,
    Call,
    CallCode,
    Return,
    DelegateCall,
    Revert,
    /// Designated `INVALID` (0xfe) or any undefined byte.
    Invalid(u8),
    SelfDestruct,
}

/// Static metadata of an opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OpcodeInfo {
    /// Mnemonic.
    pub name: &'static str,
    /// Words popped.
    pub inputs: usize,
    /// Words pushed.
    pub outputs: usize,
    /// Static gas charged before any dynamic cost.
    pub gas: u64,
}

const fn info(name: &'static str, inputs: usize, outputs: usize, gas: u64) -> OpcodeInfo {
    OpcodeInfo {
        name,
        inputs,
        outputs,
        gas,
    }
}

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];
const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];
const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];
const LOG_NAMES: [&str; 5] = ["LOG0", "LOG1", "LOG2", "LOG3", "LOG4"];

impl Opcode {
    /// Decode a single byte.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Self {
        match byte {
            0x00 => Self::Stop,
            0x01 => Self::Add,
            0x02 => Self::Mul,
            0x03 => Self::Sub,
            0x04 => Self::Div,
            0x05 => Self::SDiv,
            0x06 => Self::Mod,
            0x07 => Self::SMod,
            0x08 => Self::AddMod,
            0x09 => Self::MulMod,
            0x0a => Self::Exp,
            0x0b => Self::SignExtend,

            0x10 => Self::Lt,
            0x11 => Self::Gt,
            0x12 => Self::SLt,
            0x13 => Self::SGt,
            0x14 => Self::Eq,
            0x15 => Self::IsZero,
            0x16 => Self::And,
            0x17 => Self::Or,
            0x18 => Self::Xor,
            0x19 => Self::Not,
            0x1a => Self::Byte,

            0x20 => Self::Sha3,

            0x30 => Self::Address,
            0x31 => Self::Balance,
            0x32 => Self::Origin,
            0x33 => Self::Caller,
            0x34 => Self::CallValue,
            0x35 => Self::CallDataLoad,
            0x36 => Self::CallDataSize,
            0x37 => Self::CallDataCopy,
            0x38 => Self::CodeSize,
            0x39 => Self::CodeCopy,
            0x3a => Self::GasPrice,
            0x3b => Self::ExtCodeSize,
            0x3c => Self::ExtCodeCopy,

            0x40 => Self::BlockHash,
            0x41 => Self::Coinbase,
            0x42 => Self::Timestamp,
            0x43 => Self::Number,
            0x44 => Self::Difficulty,
            0x45 => Self::GasLimit,

            0x50 => Self::Pop,
            0x51 => Self::MLoad,
            0x52 => Self::MStore,
            0x53 => Self::MStore8,
            0x54 => Self::SLoad,
            0x55 => Self::SStore,
            0x56 => Self::Jump,
            0x57 => Self::JumpI,
            0x58 => Self::PC,
            0x59 => Self::MSize,
            0x5a => Self::Gas,
            0x5b => Self::JumpDest,

            0x60..=0x7f => Self::Push(byte - 0x5f),
            0x80..=0x8f => Self::Dup(byte - 0x7f),
            0x90..=0x9f => Self::Swap(byte - 0x8f),
            0xa0..=0xa4 => Self::Log(byte - 0xa0),

            0xf0 => Self::Create,
            0xf1 => Self::Call,
            0xf2 => Self::CallCode,
            0xf3 => Self::Return,
            0xf4 => Self::DelegateCall,
            0xfd => Self::Revert,
            0xff => Self::SelfDestruct,

            _ => Self::Invalid(byte),
        }
    }

    /// Encode back into a byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Stop => 0x00,
            Self::Add => 0x01,
            Self::Mul => 0x02,
            Self::Sub => 0x03,
            Self::Div => 0x04,
            Self::SDiv => 0x05,
            Self::Mod => 0x06,
            Self::SMod => 0x07,
            Self::AddMod => 0x08,
            Self::MulMod => 0x09,
            Self::Exp => 0x0a,
            Self::SignExtend => 0x0b,
            Self::Lt => 0x10,
            Self::Gt => 0x11,
            Self::SLt => 0x12,
            Self::SGt => 0x13,
            Self::Eq => 0x14,
            Self::IsZero => 0x15,
            Self::And => 0x16,
            Self::Or => 0x17,
            Self::Xor => 0x18,
            Self::Not => 0x19,
            Self::Byte => 0x1a,
            Self::Sha3 => 0x20,
            Self::Address => 0x30,
            Self::Balance => 0x31,
            Self::Origin => 0x32,
            Self::Caller => 0x33,
            Self::CallValue => 0x34,
            Self::CallDataLoad => 0x35,
            Self::CallDataSize => 0x36,
            Self::CallDataCopy => 0x37,
            Self::CodeSize => 0x38,
            Self::CodeCopy => 0x39,
            Self::GasPrice => 0x3a,
            Self::ExtCodeSize => 0x3b,
            Self::ExtCodeCopy => 0x3c,
            Self::BlockHash => 0x40,
            Self::Coinbase => 0x41,
            Self::Timestamp => 0x42,
            Self::Number => 0x43,
            Self::Difficulty => 0x44,
            Self::GasLimit => 0x45,
            Self::Pop => 0x50,
            Self::MLoad => 0x51,
            Self::MStore => 0x52,
            Self::MStore8 => 0x53,
            Self::SLoad => 0x54,
            Self::SStore => 0x55,
            Self::Jump => 0x56,
            Self::JumpI => 0x57,
            Self::PC => 0x58,
            Self::MSize => 0x59,
            Self::Gas => 0x5a,
            Self::JumpDest => 0x5b,
            Self::Push(n) => 0x5f + n,
            Self::Dup(n) => 0x7f + n,
            Self::Swap(n) => 0x8f + n,
            Self::Log(n) => 0xa0 + n,
            Self::Create => 0xf0,
            Self::Call => 0xf1,
            Self::CallCode => 0xf2,
            Self::Return => 0xf3,
            Self::DelegateCall => 0xf4,
            Self::Revert => 0xfd,
            Self::Invalid(byte) => byte,
            Self::SelfDestruct => 0xff,
        }
    }

    /// Static metadata: mnemonic, stack arity and base fee.
    #[must_use]
    pub const fn info(self) -> OpcodeInfo {
        match self {
            Self::Stop => info("STOP", 0, 0, 0),
            Self::Add => info("ADD", 2, 1, 3),
            Self::Mul => info("MUL", 2, 1, 5),
            Self::Sub => info("SUB", 2, 1, 3),
            Self::Div => info("DIV", 2, 1, 5),
            Self::SDiv => info("SDIV", 2, 1, 5),
            Self::Mod => info("MOD", 2, 1, 5),
            Self::SMod => info("SMOD", 2, 1, 5),
            Self::AddMod => info("ADDMOD", 3, 1, 8),
            Self::MulMod => info("MULMOD", 3, 1, 8),
            Self::Exp => info("EXP", 2, 1, 10),
            Self::SignExtend => info("SIGNEXTEND", 2, 1, 5),
            Self::Lt => info("LT", 2, 1, 3),
            Self::Gt => info("GT", 2, 1, 3),
            Self::SLt => info("SLT", 2, 1, 3),
            Self::SGt => info("SGT", 2, 1, 3),
            Self::Eq => info("EQ", 2, 1, 3),
            Self::IsZero => info("ISZERO", 1, 1, 3),
            Self::And => info("AND", 2, 1, 3),
            Self::Or => info("OR", 2, 1, 3),
            Self::Xor => info("XOR", 2, 1, 3),
            Self::Not => info("NOT", 1, 1, 3),
            Self::Byte => info("BYTE", 2, 1, 3),
            Self::Sha3 => info("SHA3", 2, 1, 30),
            Self::Address => info("ADDRESS", 0, 1, 2),
            Self::Balance => info("BALANCE", 1, 1, 20),
            Self::Origin => info("ORIGIN", 0, 1, 2),
            Self::Caller => info("CALLER", 0, 1, 2),
            Self::CallValue => info("CALLVALUE", 0, 1, 2),
            Self::CallDataLoad => info("CALLDATALOAD", 1, 1, 3),
            Self::CallDataSize => info("CALLDATASIZE", 0, 1, 2),
            Self::CallDataCopy => info("CALLDATACOPY", 3, 0, 3),
            Self::CodeSize => info("CODESIZE", 0, 1, 2),
            Self::CodeCopy => info("CODECOPY", 3, 0, 3),
            Self::GasPrice => info("GASPRICE", 0, 1, 2),
            Self::ExtCodeSize => info("EXTCODESIZE", 1, 1, 20),
            Self::ExtCodeCopy => info("EXTCODECOPY", 4, 0, 20),
            Self::BlockHash => info("BLOCKHASH", 1, 1, 20),
            Self::Coinbase => info("COINBASE", 0, 1, 2),
            Self::Timestamp => info("TIMESTAMP", 0, 1, 2),
            Self::Number => info("NUMBER", 0, 1, 2),
            Self::Difficulty => info("DIFFICULTY", 0, 1, 2),
            Self::GasLimit => info("GASLIMIT", 0, 1, 2),
            Self::Pop => info("POP", 1, 0, 2),
            Self::MLoad => info("MLOAD", 1, 1, 3),
            Self::MStore => info("MSTORE", 2, 0, 3),
            Self::MStore8 => info("MSTORE8", 2, 0, 3),
            Self::SLoad => info("SLOAD", 1, 1, 50),
            Self::SStore => info("SSTORE", 2, 0, 0),
            Self::Jump => info("JUMP", 1, 0, 8),
            Self::JumpI => info("JUMPI", 2, 0, 10),
            Self::PC => info("PC", 0, 1, 2),
            Self::MSize => info("MSIZE", 0, 1, 2),
            Self::Gas => info("GAS", 0, 1, 2),
            Self::JumpDest => info("JUMPDEST", 0, 0, 1),
            Self::Push(n) => info(PUSH_NAMES[(n - 1) as usize], 0, 1, 3),
            Self::Dup(n) => info(DUP_NAMES[(n - 1) as usize], n as usize, n as usize + 1, 3),
            Self::Swap(n) => info(SWAP_NAMES[(n - 1) as usize], n as usize + 1, n as usize + 1, 3),
            Self::Log(n) => info(LOG_NAMES[n as usize], n as usize + 2, 0, 375 + 375 * n as u64),
            Self::Create => info("CREATE", 3, 1, 32000),
            Self::Call => info("CALL", 7, 1, 40),
            Self::CallCode => info("CALLCODE", 7, 1, 40),
            Self::Return => info("RETURN", 2, 0, 0),
            Self::DelegateCall => info("DELEGATECALL", 6, 1, 40),
            Self::Revert => info("REVERT", 2, 0, 0),
            Self::Invalid(_) => info("INVALID", 0, 0, 0),
            Self::SelfDestruct => info("SUICIDE", 1, 0, 0),
        }
    }

    /// Whether a chunk must end right after this opcode.
    ///
    /// These either leave the straight-line flow (jumps, calls, halts) or
    /// observe the exact gas or position, which is only known between
    /// chunks.
    #[must_use]
    pub const fn ends_chunk(self) -> bool {
        matches!(
            self,
            Self::Jump
                | Self::JumpI
                | Self::Call
                | Self::CallCode
                | Self::DelegateCall
                | Self::Create
                | Self::SelfDestruct
                | Self::Stop
                | Self::Return
                | Self::Revert
                | Self::Invalid(_)
                | Self::Gas
                | Self::PC
        )
    }

    /// Whether a chunk must start at this opcode.
    #[must_use]
    pub const fn starts_chunk(self) -> bool {
        matches!(self, Self::JumpDest | Self::Gas | Self::PC)
    }

    /// Mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.info().name
    }
}

impl From<u8> for Opcode {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(byte) => write!(f, "INVALID(0x{byte:02x})"),
            _ => f.write_str(self.name()),
        }
    }
}
