//! A malloc-style heap allocator built over a simulated, monotonically
//! growing arena.
//!
//! A [`Heap`] owns a single contiguous byte region and carves it into
//! blocks, each wrapped in a header and footer that record its size and
//! status. Free blocks are indexed by segregated free lists threaded
//! through their own payload bytes, oversized fits are split, and released
//! blocks are merged with their free neighbors. When no free block fits,
//! the backing [`Arena`] grows the region until a fixed simulated budget
//! is spent, at which point allocation fails recoverably.
//!
//! All addressing is done with byte offsets into the owned region, never
//! with pointers, so a handle can go stale but can never dangle. Callers
//! read and write their payloads through the heap:
//!
//! ```rust
//! use sandbar::Heap;
//!
//! let mut heap = Heap::new();
//! let p = heap.allocate(24).unwrap();
//!
//! heap.payload_mut(p)[..3].copy_from_slice(b"abc");
//! assert_eq!(&heap.payload(p)[..3], b"abc");
//!
//! heap.release(p);
//! heap.check(0);
//! ```
//!
//! [`Heap::check`] walks every block in heap order and panics on the first
//! structural invariant violation, which makes corruption loud in tests
//! instead of silent at a distance.

mod allocator;
mod arena;
mod config;
mod debug;
mod error;
mod metrics;

pub use allocator::{Heap, Payload};
pub use arena::Arena;
pub use config::HeapConfig;
pub use error::{AllocError, ArenaError};
pub use metrics::HeapStats;
