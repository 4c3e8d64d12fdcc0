//! Reliable line delivery over an unreliable channel.
//!
//! - [`Channel`]: raw line I/O (TCP, in-memory, lossy wrapper)
//! - [`Transport`]: framing, acknowledgment, bounded retry, read timeout

mod channel;
mod link;

pub use channel::{Channel, DropPolicy, LossyChannel, MemoryChannel, TcpChannel};
pub use link::{ACK, Delivery, LinkTiming, Transport, TransportError};
