//! Tracing/logging setup shared by every binary and test harness.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide tracing with the `info` default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with_filter("info");
}

pub use self::tracing::init_with_filter;
