//! Register caches over vertical accesses.

use super::accesses::VerticalExtent;

/// A per-thread register window over the vertical accesses of one field
/// inside one multistage.
///
/// A cache with window `minus..plus` keeps levels `k + minus` to `k + plus`
/// in registers while the k-loop advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KCache {
    /// Cached field.
    pub field: String,
    /// Vertical window kept in registers.
    pub window: VerticalExtent,
}
