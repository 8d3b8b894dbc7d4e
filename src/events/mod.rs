pub mod streams;
pub use streams::{EventStream, EventStreamStats, Subscriber};

/// Broadcast capacity for store event streams
pub const EVENT_STREAM_CAPACITY: usize = 64;
/// Number of recent events kept for replay
pub const EVENT_BUFFER_SIZE: usize = 32;
