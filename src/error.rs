/// Returned by [`crate::Arena::grow`] when a growth request would pass the
/// simulated memory budget. The heap is left untouched when this happens.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ArenaError {
    Exhausted,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AllocError {
    BadRequest,
    OOM,
}

impl From<ArenaError> for AllocError {
    fn from(error: ArenaError) -> AllocError {
        match error {
            ArenaError::Exhausted => AllocError::OOM,
        }
    }
}
