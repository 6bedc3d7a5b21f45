use serde_json::Value;
use std::fmt::Debug;

/// Trait for turning a raw `[event, data?]` pair into a namespace-specific
/// typed event before dispatch.
///
/// Decoding is infallible by contract: implementations attempt their strict
/// typed shape and fall back to a raw variant when it does not fit, logging
/// the mismatch. Event delivery always wins over strict typing.
pub trait EventDecoder: Send + Sync + 'static {
    /// The decoded event type handed to registered handlers.
    type Event: Clone + Send + Debug + 'static;

    /// Decode one event payload. `data` is `None` when the wire array
    /// carried only the event name.
    fn decode(&self, event: &str, data: Option<Value>) -> Self::Event;
}

/// An undecoded event: the original name plus whatever JSON came with it.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event: String,
    pub data: Option<Value>,
}

/// A decoder that performs no typing at all.
///
/// Used in tests and by namespaces whose payloads are consumed as plain
/// JSON.
pub struct PassthroughDecoder;

impl EventDecoder for PassthroughDecoder {
    type Event = RawEvent;

    fn decode(&self, event: &str, data: Option<Value>) -> RawEvent {
        RawEvent {
            event: event.to_string(),
            data,
        }
    }
}
