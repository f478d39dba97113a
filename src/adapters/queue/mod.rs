//! Downstream message queue

pub mod sqs;
pub mod traits;

pub use sqs::{OutgoingMessage, SqsQueue};
pub use traits::MessageQueue;
