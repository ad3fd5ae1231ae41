//! Best-effort fan-out of completed results.
//!
//! Publishers never wait: an event either fits in the bounded queue or is
//! dropped. A single fan-out task forwards queued events to every
//! subscriber.
mod event;
mod hub;


pub use event::{EventKind, encode_event};
pub use hub::{DEFAULT_EVENT_CAPACITY, Delivery, Notifier, Subscription};
