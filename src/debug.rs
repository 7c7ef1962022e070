use std::env;
use std::sync::OnceLock;

static HEAP_DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if HEAP_DEBUG environment variable is set and print the message if it is.
/// This function caches the environment variable check on first call.
#[inline]
pub fn heap_debug(msg: &str) {
    let enabled = *HEAP_DEBUG_ENABLED.get_or_init(|| env::var("HEAP_DEBUG").is_ok());
    if enabled {
        println!("HEAP_DEBUG: {}", msg);
    }
}
