use super::prelude::*;
use super::utils::U256_ZERO;
use super::{Opcode, STACK_LIMIT};
use core::cmp::{max, min};
use primitive_types::U256;
use smallvec::SmallVec;

/// A decoded instruction inside a chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Instruction {
    /// Decoded opcode.
    pub opcode: Opcode,
    /// Byte offset of the opcode in the code.
    pub position: usize,
    /// Immediate value of a `PUSHn`, zero for everything else.
    pub immediate: U256,
}

/// Straight-line run of instructions validated and charged as a unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodeChunk {
    /// Sum of the static fees of all instructions.
    pub gas: u64,
    /// Minimum stack height required on entry.
    pub min_stack: isize,
    /// Maximum stack height allowed on entry. Negative when no height can
    /// run the chunk without overflowing.
    pub max_stack: isize,
    /// Offset right after the last instruction; where execution continues
    /// unless the chunk jumps or halts.
    pub end: usize,
    /// Instructions in execution order.
    pub instructions: SmallVec<[Instruction; 8]>,
}

impl CodeChunk {
    /// Whether the chunk's first instruction is `JUMPDEST`.
    #[must_use]
    pub fn is_jump_destination(&self) -> bool {
        self.instructions
            .first()
            .is_some_and(|i| i.opcode == Opcode::JumpDest)
    }

    /// Whether a stack of `height` words is too low to enter the chunk.
    #[must_use]
    pub fn underflows(&self, height: usize) -> bool {
        isize::try_from(height).map_or(false, |height| height < self.min_stack)
    }

    /// Whether a stack of `height` words would overflow inside the chunk.
    #[must_use]
    pub fn overflows(&self, height: usize) -> bool {
        isize::try_from(height).map_or(true, |height| height > self.max_stack)
    }
}

/// Chunks of one code blob keyed by their start offset.
///
/// Always contains a sentinel `STOP` chunk at the offset where decoding
/// ran off the end of the code.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChunkMap {
    chunks: BTreeMap<usize, CodeChunk>,
}

impl ChunkMap {
    /// Chunk starting at `offset`, if any.
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&CodeChunk> {
        self.chunks.get(&offset)
    }

    /// Whether `offset` is a valid `JUMP`/`JUMPI` destination.
    #[must_use]
    pub fn is_jump_destination(&self, offset: usize) -> bool {
        self.get(offset).is_some_and(CodeChunk::is_jump_destination)
    }

    /// Number of chunks, sentinel included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether there are no chunks at all. Never true for preprocessed code.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate over `(start, chunk)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CodeChunk)> {
        self.chunks.iter().map(|(start, chunk)| (*start, chunk))
    }
}

struct ChunkBuilder {
    start: usize,
    gas: u64,
    stack_change: isize,
    min_stack: isize,
    max_stack: isize,
    instructions: SmallVec<[Instruction; 8]>,
}

impl ChunkBuilder {
    #[allow(clippy::cast_possible_wrap)]
    const LIMIT: isize = STACK_LIMIT as isize;

    fn new(start: usize) -> Self {
        Self {
            start,
            gas: 0,
            stack_change: 0,
            min_stack: 0,
            max_stack: Self::LIMIT,
            instructions: SmallVec::new(),
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn push(&mut self, instruction: Instruction) {
        let info = instruction.opcode.info();
        let (inputs, outputs) = (info.inputs as isize, info.outputs as isize);

        self.gas = self.gas.saturating_add(info.gas);
        self.min_stack = max(self.min_stack, inputs - self.stack_change);
        self.max_stack = min(
            self.max_stack,
            Self::LIMIT - self.stack_change + inputs - outputs,
        );
        self.stack_change += outputs - inputs;
        self.instructions.push(instruction);
    }

    fn finish(self, end: usize) -> (usize, CodeChunk) {
        (
            self.start,
            CodeChunk {
                gas: self.gas,
                min_stack: self.min_stack,
                max_stack: self.max_stack,
                end,
                instructions: self.instructions,
            },
        )
    }
}

/// Split `code` into chunks.
///
/// A single forward pass decodes every opcode, reading `PUSHn` immediates
/// (missing trailing bytes count as zero). A chunk is closed after any
/// opcode for which [`Opcode::ends_chunk`] holds, before any opcode for
/// which [`Opcode::starts_chunk`] holds, and at the end of the code. The
/// result is a pure function of `code`.
#[must_use]
pub fn preprocess(code: &[u8]) -> ChunkMap {
    let mut chunks = BTreeMap::new();
    let mut builder = ChunkBuilder::new(0);
    let mut position = 0;

    while position < code.len() {
        let opcode = Opcode::from_u8(code[position]);
        let mut next = position + 1;
        let mut immediate = U256_ZERO;

        if let Opcode::Push(n) = opcode {
            let n = usize::from(n);
            let available = &code[next..min(next + n, code.len())];
            let mut word = [0u8; 32];
            word[32 - n..32 - n + available.len()].copy_from_slice(available);
            immediate = U256::from_big_endian(&word);
            next += n;
        }

        builder.push(Instruction {
            opcode,
            position,
            immediate,
        });

        let next_starts = code
            .get(next)
            .is_some_and(|byte| Opcode::from_u8(*byte).starts_chunk());
        if opcode.ends_chunk() || next_starts || next >= code.len() {
            let (start, chunk) = builder.finish(next);
            chunks.insert(start, chunk);
            builder = ChunkBuilder::new(next);
        }

        position = next;
    }

    let mut sentinel = ChunkBuilder::new(position);
    sentinel.push(Instruction {
        opcode: Opcode::Stop,
        position,
        immediate: U256_ZERO,
    });
    let (start, chunk) = sentinel.finish(position);
    chunks.insert(start, chunk);

    ChunkMap { chunks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_has_only_sentinel() {
        let chunks = preprocess(&[]);
        assert_eq!(chunks.len(), 1);
        let sentinel = chunks.get(0).unwrap();
        assert_eq!(sentinel.instructions[0].opcode, Opcode::Stop);
        assert_eq!(sentinel.gas, 0);
    }

    #[test]
    fn straight_line_code_is_one_chunk() {
        // PUSH1 2 PUSH1 3 ADD PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
        let code = [
            0x60, 0x02, 0x60, 0x03, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
        ];
        let chunks = preprocess(&code);
        assert_eq!(chunks.len(), 2);

        let chunk = chunks.get(0).unwrap();
        assert_eq!(chunk.gas, 3 + 3 + 3 + 3 + 3 + 3 + 3);
        assert_eq!(chunk.end, code.len());
        assert_eq!(chunk.instructions.len(), 8);
        assert_eq!(chunk.instructions[1].immediate, U256::from(3));
        assert_eq!(chunk.instructions[2].position, 4);
        assert_eq!(chunk.min_stack, 0);
        // Peak excursion is two words above the entry height.
        assert_eq!(chunk.max_stack, 1022);

        assert!(chunks.get(code.len()).is_some());
    }

    #[test]
    fn breakpoints_split_chunks() {
        // PUSH1 4 JUMP JUMPDEST GAS POP STOP
        let code = [0x60, 0x04, 0x56, 0xfe, 0x5b, 0x5a, 0x50, 0x00];
        let chunks = preprocess(&code);
        let starts: Vec<usize> = chunks.iter().map(|(start, _)| start).collect();
        assert_eq!(starts, vec![0, 3, 4, 5, 6, 8]);

        assert!(chunks.is_jump_destination(4));
        assert!(!chunks.is_jump_destination(3));
        assert!(!chunks.is_jump_destination(0));
        assert!(!chunks.is_jump_destination(1));
        assert_eq!(chunks.get(0).unwrap().end, 3);
        assert_eq!(chunks.get(3).unwrap().instructions[0].opcode, Opcode::Invalid(0xfe));
    }

    #[test]
    fn push_data_is_not_decoded() {
        // PUSH2 0x5b5b JUMPDEST
        let code = [0x61, 0x5b, 0x5b, 0x5b];
        let chunks = preprocess(&code);
        assert!(chunks.get(1).is_none());
        assert!(chunks.get(2).is_none());
        assert!(chunks.is_jump_destination(3));
        assert_eq!(chunks.get(0).unwrap().instructions[0].immediate, U256::from(0x5b5b));
    }

    #[test]
    fn truncated_push_pads_low_bytes() {
        // PUSH3 0x01 0x02 <missing>
        let code = [0x62, 0x01, 0x02];
        let chunks = preprocess(&code);
        assert_eq!(chunks.get(0).unwrap().instructions[0].immediate, U256::from(0x010200));
        // Sentinel sits where decoding stopped, past the end of the code.
        assert!(chunks.get(4).is_some());
        assert_eq!(chunks.get(0).unwrap().end, 4);
    }

    #[test]
    fn stack_bounds() {
        // POP POP ADD: the ADD still needs two operands after two pops.
        let chunks = preprocess(&[0x50, 0x50, 0x01]);
        let chunk = chunks.get(0).unwrap();
        assert_eq!(chunk.min_stack, 4);
        assert!(chunk.underflows(3));
        assert!(!chunk.underflows(4));
        assert!(!chunk.overflows(1024));

        // DUP1 on a full stack overflows.
        let chunks = preprocess(&[0x80]);
        let chunk = chunks.get(0).unwrap();
        assert_eq!((chunk.min_stack, chunk.max_stack), (1, 1023));
        assert!(chunk.overflows(1024));
    }
}
