//! Broadcaster & subscription manager (§4.4): couples the ingest writer to
//! N live subscribers without ever blocking the writer on a slow consumer.

mod broadcaster;
mod subscriber;

pub use broadcaster::Broadcaster;
pub use subscriber::{Outbound, Subscriber, QUEUE_CAPACITY};
