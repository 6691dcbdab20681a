//! Module for all helper functions that are not related in particular to any
//! other module.

/// Alias for `Box::new()` to make it shorter and easier
/// to use in manually-created trees.
pub fn boxed<T>(t: T) -> Box<T> {
    Box::new(t)
}
