/// A 'snapshot' of the heap's bookkeeping totals.
///
/// Obtained by calling [`crate::Heap::stats`], and returned by a successful
/// [`crate::Heap::check`]. Byte totals count whole blocks, bookkeeping
/// overhead included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of allocated blocks currently in the heap.
    pub allocated_blocks: usize,

    /// Total bytes spanned by allocated blocks.
    pub allocated_bytes: usize,

    /// Number of free blocks currently in the heap.
    pub free_blocks: usize,

    /// Total bytes spanned by free blocks.
    pub free_bytes: usize,

    /// Current size of the heap.
    pub heap_size: usize,

    /// The simulated budget the backing arena was created with.
    pub budget: usize,

    /// How many times the arena has been grown since the last init.
    pub grow_calls: usize,
}
