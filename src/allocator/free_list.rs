use super::block::Block;
use super::size_class::{class_of, CLASS_COUNT};
use crate::arena::Arena;

/// Segregated explicit free lists: one doubly linked list per size class.
///
/// The links are stored inside the free blocks' own payload bytes; the
/// class heads are the only state held here. Fits are answered first-fit
/// over ascending classes, each list scanned from its head, so the most
/// recently freed block of the smallest class holding a fit is the one
/// reused. That tie-break is part of the allocator's observable behavior.
pub struct FreeList {
    heads: [Option<Block>; CLASS_COUNT],
}

impl FreeList {
    pub fn new() -> Self {
        Self {
            heads: [None; CLASS_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.heads = [None; CLASS_COUNT];
    }

    /// Pushes a free block at the head of its class list.
    pub fn insert(&mut self, arena: &mut Arena, block: Block) {
        debug_assert!(!block.is_allocated(arena));

        let class = class_of(block.size(arena));
        let head = self.heads[class];

        block.set_prev_free(arena, None);
        block.set_next_free(arena, head);

        if let Some(head) = head {
            head.set_prev_free(arena, Some(block));
        }

        self.heads[class] = Some(block);
    }

    /// Unlinks a block from its class list.
    pub fn remove(&mut self, arena: &mut Arena, block: Block) {
        let class = class_of(block.size(arena));
        let prev = block.prev_free(arena);
        let next = block.next_free(arena);

        match prev {
            Some(prev) => prev.set_next_free(arena, next),
            None => {
                debug_assert!(self.heads[class] == Some(block));

                self.heads[class] = next;
            }
        }

        if let Some(next) = next {
            next.set_prev_free(arena, prev);
        }
    }

    /// Returns a free block of at least `min_size` bytes, or None. Never
    /// mutates the lists.
    pub fn find_fit(&self, arena: &Arena, min_size: usize) -> Option<Block> {
        for class in class_of(min_size)..CLASS_COUNT {
            let mut cursor = self.heads[class];

            while let Some(block) = cursor {
                if block.size(arena) >= min_size {
                    return Some(block);
                }

                cursor = block.next_free(arena);
            }
        }

        None
    }

    pub fn head(&self, class: usize) -> Option<Block> {
        self.heads[class]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Formats the arena as a strip of free blocks of the given sizes.
    fn build(sizes: &[usize]) -> (Arena, Vec<Block>) {
        let total = sizes.iter().sum();
        let mut arena = Arena::new(total);
        arena.grow(total).unwrap();

        let mut blocks = vec![];
        let mut offset = 0;

        for &size in sizes {
            let block = Block(offset);
            block.set(&mut arena, size, false);
            blocks.push(block);
            offset += size;
        }

        (arena, blocks)
    }

    #[test]
    fn insert_then_remove_leaves_nothing() {
        let (mut arena, blocks) = build(&[64, 64, 64]);
        let mut list = FreeList::new();

        for &block in &blocks {
            list.insert(&mut arena, block);
        }

        for &block in &blocks {
            list.remove(&mut arena, block);
        }

        assert_eq!(list.find_fit(&arena, 48), None);
    }

    #[test]
    fn fit_prefers_the_most_recently_inserted() {
        let (mut arena, blocks) = build(&[64, 64]);
        let mut list = FreeList::new();

        list.insert(&mut arena, blocks[0]);
        list.insert(&mut arena, blocks[1]);

        assert_eq!(list.find_fit(&arena, 48), Some(blocks[1]));
    }

    #[test]
    fn fit_skips_to_a_larger_class() {
        let (mut arena, blocks) = build(&[64, 512]);
        let mut list = FreeList::new();

        list.insert(&mut arena, blocks[0]);
        list.insert(&mut arena, blocks[1]);

        assert_eq!(list.find_fit(&arena, 256), Some(blocks[1]));
    }

    #[test]
    fn fit_scans_past_undersized_blocks_in_class() {
        // both blocks land in the 129..=256 class, only one fits
        let (mut arena, blocks) = build(&[256, 160]);
        let mut list = FreeList::new();

        list.insert(&mut arena, blocks[0]);
        list.insert(&mut arena, blocks[1]);

        assert_eq!(list.find_fit(&arena, 200), Some(blocks[0]));
    }

    #[test]
    fn remove_from_the_middle_relinks() {
        let (mut arena, blocks) = build(&[64, 64, 64]);
        let mut list = FreeList::new();

        for &block in &blocks {
            list.insert(&mut arena, block);
        }

        list.remove(&mut arena, blocks[1]);

        assert_eq!(list.head(0), Some(blocks[2]));
        assert_eq!(blocks[2].next_free(&arena), Some(blocks[0]));
        assert_eq!(blocks[0].prev_free(&arena), Some(blocks[2]));
    }

    #[test]
    fn miss_returns_none() {
        let (mut arena, blocks) = build(&[64]);
        let mut list = FreeList::new();

        list.insert(&mut arena, blocks[0]);

        assert_eq!(list.find_fit(&arena, 128), None);
    }
}
