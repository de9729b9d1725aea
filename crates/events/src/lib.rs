//! Domain events + distribution mechanics.
//!
//! The `Event` trait describes what a domain event must expose; the
//! `EventEnvelope` adds stream metadata; the `EventBus` abstraction (with an
//! in-memory implementation) distributes envelopes to collaborating observers.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
