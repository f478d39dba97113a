//! Invocation entry point
//!
//! Shared by the Lambda binary and the `invoke` command: classify the raw
//! event, run the pipeline, and wrap the outcome in a response envelope.

pub mod event;
pub mod response;

pub use event::{Trigger, SCHEDULED_SOURCE};
pub use response::{handle_event, InvocationResponse};
