/// Fee per word of memory.
pub const G_MEMORY: u64 = 3;
/// Divisor of the quadratic memory term.
pub const G_QUAD_COEFF_DIV: u64 = 512;
/// Fee per word copied by `*COPY` opcodes.
pub const G_COPY: u64 = 3;
/// Fee per word hashed by `SHA3`.
pub const G_SHA3WORD: u64 = 6;
/// Fee per byte of the `EXP` exponent.
pub const G_EXPBYTE: u64 = 10;
/// `SSTORE` of a nonzero value into an empty slot.
pub const G_SSET: u64 = 20_000;
/// Any other `SSTORE`.
pub const G_SRESET: u64 = 5_000;
/// Refund for clearing a slot.
pub const R_SCLEAR: u64 = 15_000;
/// Fee per byte of `LOG` data.
pub const G_LOGBYTE: u64 = 8;
/// Surcharge for a `CALL` that brings a new account into existence.
pub const G_CALLNEWACCOUNT: u64 = 25_000;
/// Surcharge for a call transferring a nonzero value.
pub const G_CALLVALUETRANSFER: u64 = 9_000;
/// Free gas given to a callee receiving value.
pub const G_STIPEND: u64 = 2_300;
/// Fee per byte of deployed contract code.
pub const G_CONTRACTBYTE: u64 = 200;
