/// This structure contains the configuration settings for a heap.
#[derive(Copy, Clone, Debug)]
pub struct HeapConfig {
    /// The maximum number of bytes the backing arena may grow to. Once a
    /// growth request would pass this budget the arena reports exhaustion
    /// and the allocation that needed it fails.
    pub max_heap: usize,

    /// The minimum number of bytes requested from the arena when no free
    /// block fits an allocation. Requests larger than this are passed
    /// through as-is. Raising it trades slack space for fewer growth calls.
    pub growth_chunk: usize,
}

pub const HEAP_CONFIG_DEFAULT_MAX_HEAP: usize = 20 * (1 << 20);
pub const HEAP_CONFIG_DEFAULT_GROWTH_CHUNK: usize = 4096;

impl HeapConfig {
    /// Creates a default HeapConfig. Good for most use cases.
    pub fn default() -> Self {
        HeapConfig {
            max_heap: HEAP_CONFIG_DEFAULT_MAX_HEAP,
            growth_chunk: HEAP_CONFIG_DEFAULT_GROWTH_CHUNK,
        }
    }
}
