//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the builder (over-restore), the raster backend (unsupported
//! features) and the CLI.

use std::collections::HashSet;
use std::sync::Mutex;

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a non-fatal condition (prints once per unique message).
///
/// Returns `true` if this call printed the warning, `false` if the same
/// message had already been reported.
///
/// # Example
/// ```ignore
/// warn_once("Builder", "restore() without matching save() ignored");
/// ```
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap()
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{YELLOW}[Tessera {component}] ⚠ {message}{RESET}");
    }
    should_print
}

/// Clear all recorded warnings (call between independent render passes).
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap();
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let first = warn_once("Test", "dedup-check unique message");
        let second = warn_once("Test", "dedup-check unique message");
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn test_distinct_components_are_distinct_keys() {
        assert!(warn_once("TestA", "component key message"));
        assert!(warn_once("TestB", "component key message"));
    }
}
