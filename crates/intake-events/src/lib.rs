#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]

//! Upload lifecycle events for the intake workspace.
//!
//! The bus provides a typed event enum, sequential identifiers, and support for
//! replaying recent events when display consumers attach late. Internally it
//! uses `tokio::broadcast` with a bounded buffer; when the ring overflows the
//! oldest events are dropped.
//!
//! Layout: `payloads.rs` (event types and envelope), `routing.rs` (`EventBus`).

pub mod payloads;
pub mod routing;

pub use payloads::{DEFAULT_REPLAY_CAPACITY, EventEnvelope, EventId, IntakeEvent};
pub use routing::{EventBus, EventStream};
