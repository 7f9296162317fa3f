use chrono::{DateTime, Utc};

/// A domain-agnostic change event.
///
/// Events are:
/// - **immutable** (treat them as facts about a committed write)
/// - **versioned** (schema evolution)
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "inventory.item.inserted").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the change was committed.
    fn occurred_at(&self) -> DateTime<Utc>;
}
