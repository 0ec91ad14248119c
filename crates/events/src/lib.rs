#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for the varia mutator engine
//!
//! Mutator phases report progress through events instead of printing.
//! Every event is logged through `tracing` when emitted and, if a
//! receiver is attached, forwarded over an unbounded channel.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, MutatorEvent, PhaseKind};

pub mod logging;
pub use logging::log_event_with_tracing;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Event payload paired with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let Some(mutator) = event.mutator() {
            meta = meta.with_mutator(mutator);
        }
        Self { meta, event }
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implementors only provide access to an optional sender; events are
/// logged through tracing whether or not a sender is attached.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let message = EventMessage::from_event(event);
        log_event_with_tracing(&message);
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(message);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a mutator event
    fn emit_mutator(&self, event: MutatorEvent) {
        self.emit(AppEvent::Mutator(event));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Implementation for an optional sender, so components can hold
/// `Option<EventSender>` and emit unconditionally.
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
