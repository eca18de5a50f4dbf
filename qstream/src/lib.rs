//! The ordered event channel a turn streams through, and the wire events it carries.
//!
//! Everything a client sees during a turn (assistant text, tool activity, document
//! generation deltas, suggestions) travels through one [`DataStreamWriter`] /
//! [`DataStreamReader`] pair in strict emission order.

mod channel;
mod event;

pub use channel::{
    ChannelClosed, DataStreamReader, DataStreamWriter, DrivenStream, HANDOFF_CAPACITY, channel,
    drive,
};
pub use event::{DataEvent, SequencedPart, StreamPart, SuggestionPayload};
