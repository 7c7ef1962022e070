use super::block::Block;
use super::checker;
use super::constants::{HEADER_SIZE, MIN_BLOCK_SIZE, OVERHEAD};
use super::free_list::FreeList;
use crate::arena::{align, Arena, ALIGNMENT};
use crate::config::HeapConfig;
use crate::debug::heap_debug;
use crate::error::AllocError;
use crate::metrics::HeapStats;

/// A payload handle returned by [`Heap::allocate`]: the byte offset of the
/// payload within the heap. A handle stays valid until the block behind it
/// is released or moved by a resize.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Payload(pub(crate) usize);

impl Payload {
    /// The payload's byte offset within the heap.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A heap allocator over a simulated, monotonically growing arena.
///
/// The heap owns its arena, so independent heaps can coexist; there is no
/// process-wide state. Blocks tile the arena with no gaps, each wrapped in
/// a header and footer, and free blocks are indexed by segregated free
/// lists threaded through their own payload bytes.
///
/// Misuse of handles (releasing an offset that was never allocated,
/// releasing twice) is detected defensively where the block bookkeeping
/// allows it and panics with a diagnostic rather than corrupting the heap.
pub struct Heap {
    arena: Arena,
    free: FreeList,
    config: HeapConfig,
    grow_calls: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            arena: Arena::new(config.max_heap),
            free: FreeList::new(),
            config,
            grow_calls: 0,
        }
    }

    /// Resets the heap to empty. Idempotent, and leaves the heap ready for
    /// a fresh run of allocations.
    pub fn init(&mut self) {
        self.arena.reset();
        self.free.reset();
        self.grow_calls = 0;
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn heap_size(&self) -> usize {
        self.arena.size()
    }

    /// Allocates `size` payload bytes and returns the payload handle, or
    /// None once the arena cannot satisfy the growth this needs.
    ///
    /// A zero-byte request is given a distinct minimum-size block, so
    /// repeated zero-byte allocations never alias each other.
    pub fn allocate(&mut self, size: usize) -> Option<Payload> {
        let block_size = block_size_for(size).ok()?;

        match self.find_or_grow(block_size) {
            Ok(block) => Some(self.place(block, block_size)),
            Err(_) => None,
        }
    }

    /// Releases a payload previously returned by [`Heap::allocate`].
    ///
    /// Panics on an offset that is out of bounds, misaligned, not a block
    /// boundary, or not currently allocated (a double release lands here).
    pub fn release(&mut self, payload: Payload) {
        let block = self.checked_block(payload);

        if !block.is_allocated(&self.arena) {
            panic!(
                "release of free block at offset {} (double release?)",
                block.start()
            );
        }

        let merged = self.coalesce(block);
        self.free.insert(&mut self.arena, merged);
    }

    /// Resizes a payload with the conventional contract: no payload
    /// allocates, a zero size releases and returns None. Otherwise the
    /// block is grown in place whenever the heap-adjacent next block can
    /// absorb the growth, and only moved (allocate, copy, release) as a
    /// last resort. When the move fails the old block is left untouched
    /// and None is returned.
    pub fn resize(&mut self, payload: Option<Payload>, new_size: usize) -> Option<Payload> {
        let payload = match payload {
            Some(payload) => payload,
            None => return self.allocate(new_size),
        };

        if new_size == 0 {
            self.release(payload);
            return None;
        }

        let block = self.checked_block(payload);

        if !block.is_allocated(&self.arena) {
            panic!("resize of free block at offset {}", block.start());
        }

        let needed = block_size_for(new_size).ok()?;
        let current = block.size(&self.arena);

        if current >= needed {
            self.shrink(block, needed);
            return Some(payload);
        }

        if let Some(next) = block.next(&self.arena) {
            if !next.is_allocated(&self.arena) && current + next.size(&self.arena) >= needed {
                self.absorb_next(block, next, needed);
                return Some(payload);
            }
        }

        self.reallocate(block, payload, new_size)
    }

    /// The full usable byte span of an allocated payload.
    pub fn payload(&self, payload: Payload) -> &[u8] {
        let block = self.checked_block(payload);

        if !block.is_allocated(&self.arena) {
            panic!("payload read of free block at offset {}", block.start());
        }

        self.arena.bytes(payload.offset(), block.capacity(&self.arena))
    }

    pub fn payload_mut(&mut self, payload: Payload) -> &mut [u8] {
        let block = self.checked_block(payload);

        if !block.is_allocated(&self.arena) {
            panic!("payload write to free block at offset {}", block.start());
        }

        let capacity = block.capacity(&self.arena);
        self.arena.bytes_mut(payload.offset(), capacity)
    }

    /// Walks every block in heap order and verifies the structural
    /// invariants, panicking on the first violation. A verbosity above
    /// zero prints totals; above one, a line per block.
    pub fn check(&self, verbosity: i32) -> HeapStats {
        checker::check(self, verbosity)
    }

    pub fn stats(&self) -> HeapStats {
        self.check(0)
    }

    pub(super) fn free_list(&self) -> &FreeList {
        &self.free
    }

    pub(super) fn grow_calls(&self) -> usize {
        self.grow_calls
    }

    fn find_or_grow(&mut self, block_size: usize) -> Result<Block, AllocError> {
        if let Some(block) = self.free.find_fit(&self.arena, block_size) {
            return Ok(block);
        }

        self.extend(block_size.max(align(self.config.growth_chunk)))?;

        // the span just formatted fits the request by construction
        self.free
            .find_fit(&self.arena, block_size)
            .ok_or(AllocError::OOM)
    }

    /// Grows the arena and formats the new span as a single free block,
    /// merged with a free old top block so no two adjacent blocks are ever
    /// both free.
    fn extend(&mut self, incr: usize) -> Result<(), AllocError> {
        debug_assert!(incr % ALIGNMENT == 0 && incr >= MIN_BLOCK_SIZE);

        let old_brk = match self.arena.grow(incr) {
            Ok(brk) => brk,
            Err(err) => {
                heap_debug(&format!("arena exhausted growing by {} bytes", incr));
                return Err(err.into());
            }
        };

        self.grow_calls += 1;
        heap_debug(&format!(
            "heap grown by {} bytes to {}",
            incr,
            self.arena.size()
        ));

        let mut block = Block(old_brk);
        block.set(&mut self.arena, incr, false);

        if let Some(prev) = block.prev(&self.arena) {
            if !prev.is_allocated(&self.arena) {
                self.free.remove(&mut self.arena, prev);

                let merged = prev.size(&self.arena) + incr;
                prev.set(&mut self.arena, merged, false);
                block = prev;
            }
        }

        self.free.insert(&mut self.arena, block);
        Ok(())
    }

    /// Marks a free block allocated, splitting off a free tail when the
    /// remainder can stand as a block of its own.
    fn place(&mut self, block: Block, block_size: usize) -> Payload {
        self.free.remove(&mut self.arena, block);

        let total = block.size(&self.arena);
        let remainder = total - block_size;

        if remainder >= MIN_BLOCK_SIZE {
            block.set(&mut self.arena, block_size, true);

            let tail = Block(block.start() + block_size);
            tail.set(&mut self.arena, remainder, false);
            self.free.insert(&mut self.arena, tail);
        } else {
            block.set(&mut self.arena, total, true);
        }

        Payload(block.payload())
    }

    /// Merges a block with its free heap neighbors on both sides into one
    /// free block. The neighbors leave the free lists before merging; the
    /// caller inserts the result.
    fn coalesce(&mut self, block: Block) -> Block {
        let mut start = block.start();
        let mut size = block.size(&self.arena);

        if let Some(next) = block.next(&self.arena) {
            if !next.is_allocated(&self.arena) {
                self.free.remove(&mut self.arena, next);
                size += next.size(&self.arena);
            }
        }

        if let Some(prev) = block.prev(&self.arena) {
            if !prev.is_allocated(&self.arena) {
                self.free.remove(&mut self.arena, prev);
                start = prev.start();
                size += prev.size(&self.arena);
            }
        }

        let merged = Block(start);
        merged.set(&mut self.arena, size, false);
        merged
    }

    /// In-place shrink. The excess is split off only when it can stand as
    /// a block of its own, and rejoins the free space around it.
    fn shrink(&mut self, block: Block, needed: usize) {
        let excess = block.size(&self.arena) - needed;

        if excess < MIN_BLOCK_SIZE {
            return;
        }

        block.set(&mut self.arena, needed, true);

        let tail = Block(block.start() + needed);
        tail.set(&mut self.arena, excess, false);

        let merged = self.coalesce(tail);
        self.free.insert(&mut self.arena, merged);
    }

    /// In-place growth: absorbs the free next block without copying a
    /// byte, splitting off whatever the grown block does not need.
    fn absorb_next(&mut self, block: Block, next: Block, needed: usize) {
        self.free.remove(&mut self.arena, next);

        let combined = block.size(&self.arena) + next.size(&self.arena);
        let excess = combined - needed;

        if excess >= MIN_BLOCK_SIZE {
            block.set(&mut self.arena, needed, true);

            let tail = Block(block.start() + needed);
            tail.set(&mut self.arena, excess, false);
            self.free.insert(&mut self.arena, tail);
        } else {
            block.set(&mut self.arena, combined, true);
        }
    }

    /// The move path of a resize. The old block is untouched when the new
    /// allocation fails.
    fn reallocate(&mut self, block: Block, payload: Payload, new_size: usize) -> Option<Payload> {
        let new_payload = self.allocate(new_size)?;

        let copy = block.capacity(&self.arena).min(new_size);
        let src = payload.offset();
        self.arena.copy_within(src..src + copy, new_payload.offset());

        self.release(payload);
        Some(new_payload)
    }

    /// Translates a payload back to its governing block, panicking on
    /// anything that cannot be a live block boundary.
    fn checked_block(&self, payload: Payload) -> Block {
        let offset = payload.offset();
        let (lo, hi) = self.arena.bounds();

        if offset < lo + HEADER_SIZE || offset >= hi {
            panic!("payload offset {} outside heap bounds [{}, {})", offset, lo, hi);
        }

        if !self.arena.is_aligned(offset) {
            panic!("payload offset {} is not {}-byte aligned", offset, ALIGNMENT);
        }

        let block = Block::from_payload(offset);
        let size = block.size(&self.arena);

        if size < MIN_BLOCK_SIZE || size % ALIGNMENT != 0 || block.end(&self.arena) > hi {
            panic!("offset {} does not address a block (size {})", offset, size);
        }

        if block.header_word(&self.arena) != block.footer_word(&self.arena) {
            panic!(
                "corrupt block at offset {}: header and footer disagree",
                block.start()
            );
        }

        block
    }
}

/// Total block size for a payload request: overhead added, rounded up to
/// the alignment, never below the minimum block. Rejects requests the
/// rounding would overflow.
fn block_size_for(size: usize) -> Result<usize, AllocError> {
    let total = size.checked_add(OVERHEAD).ok_or(AllocError::BadRequest)?;
    let aligned = total
        .checked_add(ALIGNMENT - 1)
        .ok_or(AllocError::BadRequest)?
        & !(ALIGNMENT - 1);

    Ok(aligned.max(MIN_BLOCK_SIZE))
}
