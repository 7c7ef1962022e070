use crate::arena::ALIGNMENT;

pub const WORD: usize = 8;

// The header is one size/status word padded out to the alignment boundary,
// so a block that starts on the boundary hands out an aligned payload.
pub const HEADER_SIZE: usize = ALIGNMENT;

// The footer is a copy of the size/status word in the last word of the
// block, so the previous block can be reached from any block start.
pub const FOOTER_SIZE: usize = WORD;

pub const OVERHEAD: usize = HEADER_SIZE + FOOTER_SIZE;

// A free block keeps two list links in its first payload words, so the
// smallest block must fit the overhead plus two words, rounded up.
pub const MIN_BLOCK_SIZE: usize = 48;

// Block sizes are multiples of the alignment, leaving the low bits of the
// size word free for status.
pub const ALLOCATED_BIT: u64 = 1;
pub const SIZE_MASK: u64 = !0xf;

// Link word value meaning "no neighbor". Offset zero is a real block.
pub const NO_BLOCK: u64 = u64::MAX;
