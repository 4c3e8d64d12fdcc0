//! Raw line channels between two peers.
//!
//! A channel writes whole lines and hands back complete lines without
//! blocking. It may lose writes; it never reorders or splits them.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

/// Ordered, point-to-point, possibly lossy line channel.
#[async_trait]
pub trait Channel: Send {
    /// Writes `line` followed by a newline terminator.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Returns the next complete line if one is already buffered.
    ///
    /// Never waits for data. The terminator and any trailing `\r` or
    /// whitespace are stripped.
    async fn poll_line(&mut self) -> io::Result<Option<String>>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for Box<C> {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line).await
    }

    async fn poll_line(&mut self) -> io::Result<Option<String>> {
        (**self).poll_line().await
    }
}

/// Splits complete lines off a byte buffer.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

/// Channel over a TCP stream.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    buffer: LineBuffer,
    closed: bool,
}

impl TcpChannel {
    /// Wraps an established stream.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: LineBuffer::default(),
            closed: false,
        }
    }

    /// Connects to a listening peer.
    #[instrument]
    pub async fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        debug!(peer = ?stream.peer_addr().ok(), "Connected");
        Ok(Self::new(stream))
    }

    /// Waits for exactly one peer on `addr`.
    #[instrument]
    pub async fn accept(addr: &str) -> io::Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        debug!(local = ?listener.local_addr().ok(), "Waiting for peer");
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "Peer connected");
        Ok(Self::new(stream))
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; 512];
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    return Ok(());
                }
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        trace!(line, "tcp write");
        self.stream.write_all(format!("{}\n", line).as_bytes()).await?;
        self.stream.flush().await
    }

    async fn poll_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.buffer.next_line() {
            return Ok(Some(line));
        }
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed the channel"));
        }
        self.fill()?;
        Ok(self.buffer.next_line())
    }
}

/// One end of an in-process channel pair.
#[derive(Debug)]
pub struct MemoryChannel {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    buffer: LineBuffer,
}

impl MemoryChannel {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self {
                tx: a_tx,
                rx: a_rx,
                buffer: LineBuffer::default(),
            },
            Self {
                tx: b_tx,
                rx: b_rx,
                buffer: LineBuffer::default(),
            },
        )
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.tx
            .send(format!("{}\n", line).into_bytes())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer end dropped"))
    }

    async fn poll_line(&mut self) -> io::Result<Option<String>> {
        while let Ok(chunk) = self.rx.try_recv() {
            self.buffer.extend(&chunk);
        }
        Ok(self.buffer.next_line())
    }
}

/// Decides which writes a [`LossyChannel`] discards.
#[derive(Debug)]
pub enum DropPolicy {
    /// Consumes one flag per write, `true` drops it; writes pass once exhausted.
    Pattern(VecDeque<bool>),
    /// Drops each write with the given probability.
    Random {
        /// Probability in `0.0..=1.0`.
        rate: f64,
        /// Seeded generator.
        rng: fastrand::Rng,
    },
}

impl DropPolicy {
    fn should_drop(&mut self) -> bool {
        match self {
            DropPolicy::Pattern(flags) => flags.pop_front().unwrap_or(false),
            DropPolicy::Random { rate, rng } => rng.f64() < *rate,
        }
    }
}

/// Wraps a channel and silently loses some of its writes.
#[derive(Debug)]
pub struct LossyChannel<C> {
    inner: C,
    policy: DropPolicy,
    dropped: usize,
}

impl<C: Channel> LossyChannel<C> {
    /// Drops writes according to `pattern`, one flag per write.
    pub fn with_pattern(inner: C, pattern: impl IntoIterator<Item = bool>) -> Self {
        Self {
            inner,
            policy: DropPolicy::Pattern(pattern.into_iter().collect()),
            dropped: 0,
        }
    }

    /// Drops each write with probability `rate`, reproducibly for a given seed.
    pub fn with_rate(inner: C, rate: f64, seed: u64) -> Self {
        Self {
            inner,
            policy: DropPolicy::Random {
                rate: rate.clamp(0.0, 1.0),
                rng: fastrand::Rng::with_seed(seed),
            },
            dropped: 0,
        }
    }

    /// Number of writes lost so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[async_trait]
impl<C: Channel> Channel for LossyChannel<C> {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.policy.should_drop() {
            self.dropped += 1;
            debug!(line, dropped = self.dropped, "Channel lost a write");
            return Ok(());
        }
        self.inner.write_line(line).await
    }

    async fn poll_line(&mut self) -> io::Result<Option<String>> {
        self.inner.poll_line().await
    }
}
