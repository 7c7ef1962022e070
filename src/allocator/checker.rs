use super::block::Block;
use super::constants::MIN_BLOCK_SIZE;
use super::heap::Heap;
use super::size_class::{class_of, CLASS_COUNT};
use crate::arena::ALIGNMENT;
use crate::metrics::HeapStats;

const NORMAL_VERBOSE: i32 = 1;

/// Walks the heap from bottom to break strictly by block sizes and checks
/// every structural invariant: sizes aligned and at least the minimum,
/// blocks tiling the heap exactly, headers agreeing with footers, no two
/// adjacent free blocks, and the free lists agreeing with the walk.
///
/// Panics with the offending offset on the first violation. This is a
/// debugging facility, not a recoverable path.
pub fn check(heap: &Heap, verbosity: i32) -> HeapStats {
    let arena = heap.arena();
    let (lo, hi) = arena.bounds();

    let mut stats = HeapStats {
        heap_size: hi,
        budget: arena.budget(),
        grow_calls: heap.grow_calls(),
        ..HeapStats::default()
    };

    let mut offset = lo;
    let mut prev_free = false;

    while offset < hi {
        if offset + MIN_BLOCK_SIZE > hi {
            panic!("heap check: truncated block at offset {}", offset);
        }

        let block = Block(offset);
        let size = block.size(arena);

        if size < MIN_BLOCK_SIZE || size % ALIGNMENT != 0 {
            panic!("heap check: bad block size {} at offset {}", size, offset);
        }

        if offset + size > hi {
            panic!(
                "heap check: block at offset {} (size {}) runs past the break {}",
                offset, size, hi
            );
        }

        if block.header_word(arena) != block.footer_word(arena) {
            panic!("heap check: header/footer mismatch at offset {}", offset);
        }

        if !arena.is_aligned(block.payload()) {
            panic!("heap check: misaligned payload at offset {}", offset);
        }

        let free = !block.is_allocated(arena);

        if free && prev_free {
            panic!("heap check: adjacent free blocks at offset {}", offset);
        }

        if verbosity > NORMAL_VERBOSE {
            println!(
                "block at {:>8}: size {:>8} {}",
                offset,
                size,
                if free { "free" } else { "allocated" }
            );
        }

        if free {
            stats.free_blocks += 1;
            stats.free_bytes += size;
        } else {
            stats.allocated_blocks += 1;
            stats.allocated_bytes += size;
        }

        prev_free = free;
        offset += size;
    }

    // walking by sizes must land exactly on the break
    if offset != hi {
        panic!("heap check: blocks tile to {} but the break is {}", offset, hi);
    }

    check_free_lists(heap, stats.free_blocks);

    if verbosity > 0 {
        println!(
            "total allocated blocks {} bytes {}, total free blocks {} bytes {}",
            stats.allocated_blocks, stats.allocated_bytes, stats.free_blocks, stats.free_bytes
        );
    }

    stats
}

/// The tracker and the heap walk must agree: every linked block is free,
/// filed under the class matching its size, linked consistently, and every
/// free block in the heap is linked exactly once.
fn check_free_lists(heap: &Heap, free_blocks: usize) {
    let arena = heap.arena();
    let (_, hi) = arena.bounds();
    let mut linked = 0;

    for class in 0..CLASS_COUNT {
        let mut prev: Option<Block> = None;
        let mut cursor = heap.free_list().head(class);

        while let Some(block) = cursor {
            if block.start() >= hi || block.end(arena) > hi {
                panic!(
                    "heap check: free list entry at {} outside the heap",
                    block.start()
                );
            }

            if block.is_allocated(arena) {
                panic!(
                    "heap check: allocated block at {} on the free list",
                    block.start()
                );
            }

            if class_of(block.size(arena)) != class {
                panic!(
                    "heap check: block at {} (size {}) filed in class {}",
                    block.start(),
                    block.size(arena),
                    class
                );
            }

            if block.prev_free(arena) != prev {
                panic!("heap check: broken back link at {}", block.start());
            }

            linked += 1;

            if linked > free_blocks {
                panic!("heap check: free list cycle through {}", block.start());
            }

            prev = cursor;
            cursor = block.next_free(arena);
        }
    }

    if linked != free_blocks {
        panic!(
            "heap check: {} free blocks in the heap but {} on the lists",
            free_blocks, linked
        );
    }
}
