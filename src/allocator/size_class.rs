use super::constants::MIN_BLOCK_SIZE;

pub const CLASS_COUNT: usize = 10;

/// Maps a total block size to its free list index. Classes double from 64
/// bytes up; the last class is unbounded.
pub fn class_of(size: usize) -> usize {
    debug_assert!(size >= MIN_BLOCK_SIZE);

    match size {
        ..=64 => 0,
        ..=128 => 1,
        ..=256 => 2,
        ..=512 => 3,
        ..=1024 => 4,
        ..=2048 => 5,
        ..=4096 => 6,
        ..=8192 => 7,
        ..=16384 => 8,
        _ => 9,
    }
}
