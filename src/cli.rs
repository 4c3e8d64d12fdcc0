//! Command-line interface for tictactoe_link.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tic-tac-toe between two peers over an unreliable line link
#[derive(Parser, Debug)]
#[command(name = "tictactoe_link")]
#[command(about = "Play tic-tac-toe across a lossy line channel", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the host peer (board owner and automated opponent)
    Host {
        /// Link settings
        #[command(flatten)]
        peer: PeerArgs,

        /// Where automated moves come from
        #[arg(long, value_enum, default_value = "local")]
        engine: EngineKind,

        /// Also run the search service on this local port
        #[arg(long)]
        serve_engine: Option<u16>,
    },

    /// Run the guest peer (human player)
    Guest {
        /// Link settings
        #[command(flatten)]
        peer: PeerArgs,
    },

    /// Run the search service
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5005")]
        port: u16,
    },
}

/// How a peer reaches the other one.
#[derive(Args, Debug)]
#[group(required = true, multiple = false, id = "endpoint")]
pub struct Endpoint {
    /// Connect to a listening peer at this address
    #[arg(long)]
    pub connect: Option<String>,

    /// Wait for the peer on this address
    #[arg(long)]
    pub listen: Option<String>,
}

/// Options shared by both peers.
#[derive(Args, Debug)]
pub struct PeerArgs {
    /// Peer address
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// Path to a TOML session config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Drop this fraction of outgoing writes (0.0 to 1.0)
    #[arg(long)]
    pub drop_rate: Option<f64>,
}

/// Move engine selection.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// In-process search
    Local,
    /// HTTP search service at `service_url`
    Service,
}
