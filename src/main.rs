//! tictactoe_link - unified CLI
//!
//! Runs the host peer, the guest peer or the search service.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, EngineKind, PeerArgs};
use std::net::SocketAddr;
use tictactoe_link::{
    Channel, ConsoleInput, Guest, Host, LinkTiming, LocalEngine, LossyChannel, MoveEngine,
    ServiceEngine, SessionConfig, SessionSummary, TcpChannel, Transport, server,
};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Host {
            peer,
            engine,
            serve_engine,
        } => run_host(peer, engine, serve_engine).await,
        Command::Guest { peer } => run_guest(peer).await,
        Command::Serve { host, port } => run_service(host, port).await,
    }
}

#[instrument(skip(peer))]
async fn run_host(peer: PeerArgs, engine: EngineKind, serve_engine: Option<u16>) -> Result<()> {
    let mut config = SessionConfig::load(peer.config.as_deref())?;

    if let Some(port) = serve_engine {
        let (addr, _service) = server::spawn(SocketAddr::from(([127, 0, 0, 1], port))).await?;
        let url = format!("http://{}{}", addr, server::SEARCH_PATH);
        info!(%url, "Search service running beside the host");
        config = config.with_service_url(url);
    }

    let engine: Box<dyn MoveEngine> = match engine {
        EngineKind::Local => Box::new(LocalEngine::new()),
        EngineKind::Service => Box::new(ServiceEngine::new(config.service_url().clone())),
    };

    let channel = open_channel(&peer).await?;
    let transport = Transport::new(channel, LinkTiming::from(&config));
    let summary = Host::new(transport, engine, config).run().await?;
    report(&summary);
    Ok(())
}

#[instrument(skip(peer))]
async fn run_guest(peer: PeerArgs) -> Result<()> {
    let config = SessionConfig::load(peer.config.as_deref())?;
    let channel = open_channel(&peer).await?;
    let transport = Transport::new(channel, LinkTiming::from(&config));
    let summary = Guest::new(transport, Box::new(ConsoleInput::new()), &config)?
        .run()
        .await?;
    report(&summary);
    Ok(())
}

/// Run the search service until interrupted
#[instrument]
async fn run_service(host: String, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = ?listener.local_addr()?, "Starting search service");
    server::serve(listener).await?;
    Ok(())
}

/// Opens the TCP link, wrapped in a lossy channel when a drop rate is given.
#[instrument(skip(peer))]
async fn open_channel(peer: &PeerArgs) -> Result<Box<dyn Channel>> {
    let tcp = match (&peer.endpoint.connect, &peer.endpoint.listen) {
        (Some(addr), _) => TcpChannel::connect(addr).await?,
        (None, Some(addr)) => {
            info!(%addr, "Waiting for the other peer");
            TcpChannel::accept(addr).await?
        }
        (None, None) => anyhow::bail!("either --connect or --listen is required"),
    };

    Ok(match peer.drop_rate {
        Some(rate) => {
            let seed = fastrand::u64(..);
            info!(rate, seed, "Simulating a lossy link");
            Box::new(LossyChannel::with_rate(tcp, rate, seed))
        }
        None => Box::new(tcp),
    })
}

fn report(summary: &SessionSummary) {
    for (i, game) in summary.games().iter().enumerate() {
        info!(game = i + 1, outcome = %game.outcome(), "Game result");
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictactoe_link=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
