use super::constants::{
    ALLOCATED_BIT, FOOTER_SIZE, HEADER_SIZE, NO_BLOCK, OVERHEAD, SIZE_MASK, WORD,
};
use crate::arena::{Arena, ALIGNMENT};

/// A block's starting offset within the heap.
///
/// All bookkeeping lives in the heap bytes themselves. A Block is only a
/// view over them, so it is freely copied and never outlives anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block(pub usize);

impl Block {
    pub fn from_payload(payload: usize) -> Block {
        debug_assert!(payload >= HEADER_SIZE);

        Block(payload - HEADER_SIZE)
    }

    pub fn start(self) -> usize {
        self.0
    }

    pub fn payload(self) -> usize {
        self.0 + HEADER_SIZE
    }

    pub fn size(self, arena: &Arena) -> usize {
        (arena.read_word(self.0) & SIZE_MASK) as usize
    }

    pub fn is_allocated(self, arena: &Arena) -> bool {
        arena.read_word(self.0) & ALLOCATED_BIT != 0
    }

    /// Usable payload bytes, bookkeeping excluded.
    pub fn capacity(self, arena: &Arena) -> usize {
        self.size(arena) - OVERHEAD
    }

    pub fn end(self, arena: &Arena) -> usize {
        self.0 + self.size(arena)
    }

    /// Writes the header and footer in one step, so the two can only
    /// disagree through heap corruption, never through this API.
    pub fn set(self, arena: &mut Arena, size: usize, allocated: bool) {
        debug_assert!(size % ALIGNMENT == 0);

        let mut word = size as u64;
        if allocated {
            word |= ALLOCATED_BIT;
        }

        arena.write_word(self.0, word);
        arena.write_word(self.0 + size - FOOTER_SIZE, word);
    }

    pub fn header_word(self, arena: &Arena) -> u64 {
        arena.read_word(self.0)
    }

    pub fn footer_word(self, arena: &Arena) -> u64 {
        arena.read_word(self.0 + self.size(arena) - FOOTER_SIZE)
    }

    /// The heap-adjacent next block, or None when this block ends at the
    /// break.
    pub fn next(self, arena: &Arena) -> Option<Block> {
        let end = self.end(arena);

        if end < arena.size() {
            Some(Block(end))
        } else {
            None
        }
    }

    /// The heap-adjacent previous block, reached through its footer word.
    pub fn prev(self, arena: &Arena) -> Option<Block> {
        if self.0 == 0 {
            return None;
        }

        let prev_size = (arena.read_word(self.0 - FOOTER_SIZE) & SIZE_MASK) as usize;

        debug_assert!(prev_size <= self.0);

        Some(Block(self.0 - prev_size))
    }

    // Free list links live in the first two payload words of a free block.

    pub fn prev_free(self, arena: &Arena) -> Option<Block> {
        decode_link(arena.read_word(self.payload()))
    }

    pub fn next_free(self, arena: &Arena) -> Option<Block> {
        decode_link(arena.read_word(self.payload() + WORD))
    }

    pub fn set_prev_free(self, arena: &mut Arena, link: Option<Block>) {
        arena.write_word(self.payload(), encode_link(link));
    }

    pub fn set_next_free(self, arena: &mut Arena, link: Option<Block>) {
        arena.write_word(self.payload() + WORD, encode_link(link));
    }
}

fn encode_link(link: Option<Block>) -> u64 {
    match link {
        Some(block) => block.0 as u64,
        None => NO_BLOCK,
    }
}

fn decode_link(word: u64) -> Option<Block> {
    if word == NO_BLOCK {
        None
    } else {
        Some(Block(word as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with(brk: usize) -> Arena {
        let mut arena = Arena::new(brk);
        arena.grow(brk).unwrap();
        arena
    }

    #[test]
    fn header_round_trips() {
        let mut arena = arena_with(128);
        let block = Block(0);

        block.set(&mut arena, 128, true);

        assert_eq!(block.size(&arena), 128);
        assert!(block.is_allocated(&arena));
        assert_eq!(block.capacity(&arena), 128 - OVERHEAD);
        assert_eq!(block.header_word(&arena), block.footer_word(&arena));

        block.set(&mut arena, 128, false);

        assert!(!block.is_allocated(&arena));
        assert_eq!(block.size(&arena), 128);
    }

    #[test]
    fn payload_translation() {
        let block = Block(64);

        assert_eq!(block.payload(), 64 + HEADER_SIZE);
        assert_eq!(Block::from_payload(block.payload()), block);
    }

    #[test]
    fn heap_neighbors() {
        let mut arena = arena_with(192);
        let first = Block(0);
        let second = Block(64);

        first.set(&mut arena, 64, true);
        second.set(&mut arena, 128, false);

        assert_eq!(first.next(&arena), Some(second));
        assert_eq!(second.next(&arena), None);
        assert_eq!(second.prev(&arena), Some(first));
        assert_eq!(first.prev(&arena), None);
    }

    #[test]
    fn free_links_round_trip() {
        let mut arena = arena_with(128);
        let block = Block(0);

        block.set(&mut arena, 128, false);
        block.set_prev_free(&mut arena, None);
        block.set_next_free(&mut arena, Some(Block(64)));

        assert_eq!(block.prev_free(&arena), None);
        assert_eq!(block.next_free(&arena), Some(Block(64)));
    }
}
