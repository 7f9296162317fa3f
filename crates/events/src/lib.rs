//! Change events and their distribution.
//!
//! Writes produce typed change events; the store wraps each committed change
//! in a [`ChangeEnvelope`] and fans it out over an [`EventBus`] to live queries.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::ChangeEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
