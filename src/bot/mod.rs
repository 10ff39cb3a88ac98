//! Bot core: command parsing, API aggregation and message routing.

pub mod commands;
pub mod formatter;
pub mod interpreter;
pub mod router;

pub use router::{ChatSink, EventSource, Router};
