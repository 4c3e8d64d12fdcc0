//! Two-peer tic-tac-toe over an unreliable line channel.
//!
//! One peer (the host) owns the board and an automated opponent. The other
//! (the guest) relays a human's answers. They talk through a small
//! acknowledged line protocol that tolerates dropped writes.
//!
//! # Architecture
//!
//! - **Transport**: channels plus `ACK`/retry delivery
//! - **Orchestrator**: host and guest state machines
//! - **Engine**: in-process search or the HTTP search service
//! - **Server**: the search service itself
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_link::{
//!     Guest, Host, LinkTiming, LocalEngine, MemoryChannel, ScriptedInput, SessionConfig,
//!     Starter, Transport,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SessionConfig::default();
//! let (host_end, guest_end) = MemoryChannel::pair();
//!
//! let host = Host::new(
//!     Transport::new(host_end, LinkTiming::from(&config)),
//!     Box::new(LocalEngine::new()),
//!     config.clone(),
//! );
//! let input = ScriptedInput::new([Starter::Human], ["b2", "a1", "c3"], [false]);
//! let guest = Guest::new(
//!     Transport::new(guest_end, LinkTiming::from(&config)),
//!     Box::new(input),
//!     &config,
//! )?;
//!
//! let (host_summary, _guest_summary) = tokio::join!(host.run(), guest.run());
//! println!("{:?}", host_summary?.outcomes());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod orchestrator;
mod protocol;
pub mod server;
mod session;
mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, SessionConfig};

// Crate-level exports - Errors
pub use error::SessionError;

// Crate-level exports - Transport
pub use transport::{
    ACK, Channel, Delivery, DropPolicy, LinkTiming, LossyChannel, MemoryChannel, TcpChannel,
    Transport, TransportError,
};

// Crate-level exports - Protocol
pub use protocol::{Message, Starter, UnexpectedReply};

// Crate-level exports - Sessions
pub use orchestrator::{
    ConsoleInput, GameRecord, Guest, Host, HumanInput, ScriptedInput, SessionSummary,
};
pub use session::{GameSession, Phase, Side};

// Crate-level exports - Move engines
pub use engine::{EngineError, LocalEngine, MoveEngine, ServiceEngine};

// Crate-level exports - Game types
pub use tictactoe_core::{
    Board, CoordinateError, MAX_SEARCH_SIZE, Mark, Move, MoveError, Outcome, Position, Square,
    best_move,
};
