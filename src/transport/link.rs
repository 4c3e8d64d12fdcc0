//! Acknowledged message delivery over a lossy [`Channel`].

use super::channel::Channel;
use crate::config::SessionConfig;
use derive_more::{Display, Error};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

/// Literal acknowledgment line.
pub const ACK: &str = "ACK";

/// Result of a send that did not fail at the I/O level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The peer acknowledged after `attempts` writes.
    Acknowledged {
        /// Writes performed, 1-based.
        attempts: u32,
    },
    /// No acknowledgment after `attempts` writes.
    Unacknowledged {
        /// Writes performed.
        attempts: u32,
    },
}

/// Transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TransportError {
    /// Nothing arrived within the receive window.
    #[display("No message received within {:?}", waited)]
    Timeout {
        /// How long the receive waited.
        waited: Duration,
    },
    /// The underlying channel failed.
    #[display("Channel I/O error: {}", message)]
    Io {
        /// Description of the I/O failure.
        message: String,
    },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
        }
    }
}

/// Retry and polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Writes attempted per send.
    pub max_attempts: u32,
    /// Ack window per attempt.
    pub attempt_delay: Duration,
    /// Longest receive wait.
    pub max_wait: Duration,
    /// Sleep between channel polls.
    pub poll_interval: Duration,
}

impl From<&SessionConfig> for LinkTiming {
    fn from(config: &SessionConfig) -> Self {
        Self {
            max_attempts: *config.ack_attempts(),
            attempt_delay: config.ack_delay(),
            max_wait: config.receive_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Reliable-delivery layer: framed lines, `ACK`, bounded retry, read timeout.
///
/// There are no sequence numbers. Both peers strictly alternate sends and
/// receives, so:
///
/// - any new line from the peer while awaiting an `ACK` proves our message
///   arrived, so it counts as the acknowledgment;
/// - a repeat of the last delivered line, seen before our next send has
///   finished, is a retry whose `ACK` was lost and is dropped.
#[derive(Debug)]
pub struct Transport<C> {
    channel: C,
    timing: LinkTiming,
    pending: VecDeque<String>,
    last_received: Option<String>,
}

impl<C: Channel> Transport<C> {
    /// Creates a transport over `channel`.
    pub fn new(channel: C, timing: LinkTiming) -> Self {
        Self {
            channel,
            timing,
            pending: VecDeque::new(),
            last_received: None,
        }
    }

    /// Returns the wrapped channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Sends with the configured attempts and ack window.
    pub async fn send(&mut self, message: &str) -> Result<Delivery, TransportError> {
        let LinkTiming {
            max_attempts,
            attempt_delay,
            ..
        } = self.timing;
        self.send_with(message, max_attempts, attempt_delay).await
    }

    /// Writes `message` and waits up to `attempt_delay` for `ACK`, retrying
    /// up to `max_attempts` writes.
    ///
    /// A reply from the peer seen while waiting also acknowledges the
    /// message; it is queued for the next [`receive`](Self::receive).
    /// Running out of attempts is not an error.
    #[instrument(skip(self, message), fields(line = message))]
    pub async fn send_with(
        &mut self,
        message: &str,
        max_attempts: u32,
        attempt_delay: Duration,
    ) -> Result<Delivery, TransportError> {
        for attempt in 1..=max_attempts {
            info!(line = message, attempt, "Sending message");
            self.channel.write_line(message).await?;

            if self.await_ack(attempt_delay).await? {
                info!(line = message, attempt, "Acknowledgment received");
                self.last_received = None;
                return Ok(Delivery::Acknowledged { attempts: attempt });
            }
            debug!(line = message, attempt, "No acknowledgment in window");
        }

        warn!(
            line = message,
            attempts = max_attempts,
            "Message was not acknowledged"
        );
        self.last_received = None;
        Ok(Delivery::Unacknowledged {
            attempts: max_attempts,
        })
    }

    async fn await_ack(&mut self, window: Duration) -> Result<bool, TransportError> {
        let deadline = Instant::now() + window;
        loop {
            while let Some(line) = self.channel.poll_line().await? {
                if line == ACK {
                    return Ok(true);
                }
                if line.is_empty() {
                    continue;
                }
                if self.is_repeat(&line) {
                    debug!(line = %line, "Dropping repeated message");
                    continue;
                }
                debug!(line = %line, "Peer replied before acknowledging");
                self.pending.push_back(line);
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(self.timing.poll_interval.min(deadline - now)).await;
        }
    }

    /// Receives with the configured window and poll interval.
    pub async fn receive(&mut self) -> Result<String, TransportError> {
        let LinkTiming {
            max_wait,
            poll_interval,
            ..
        } = self.timing;
        self.receive_within(max_wait, poll_interval).await
    }

    /// Polls every `poll_interval` for a line, up to `max_wait`.
    ///
    /// The line is acknowledged once, immediately, without retry. Stray
    /// `ACK` lines are discarded. A repeat of the previous line is
    /// acknowledged again and skipped.
    #[instrument(skip(self))]
    pub async fn receive_within(
        &mut self,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<String, TransportError> {
        let started = Instant::now();
        loop {
            if let Some(line) = self.next_message().await? {
                self.channel.write_line(ACK).await?;
                info!(line = %line, "Message received");
                self.last_received = Some(line.clone());
                return Ok(line);
            }

            let elapsed = started.elapsed();
            if elapsed >= max_wait {
                warn!(waited = ?elapsed, "No message received");
                return Err(TransportError::Timeout { waited: elapsed });
            }
            sleep(poll_interval.min(max_wait - elapsed)).await;
        }
    }

    async fn next_message(&mut self) -> Result<Option<String>, TransportError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }
        while let Some(line) = self.channel.poll_line().await? {
            if line == ACK {
                debug!("Discarding stray acknowledgment");
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if self.is_repeat(&line) {
                debug!(line = %line, "Acknowledging repeated message again");
                self.channel.write_line(ACK).await?;
                continue;
            }
            return Ok(Some(line));
        }
        Ok(None)
    }

    fn is_repeat(&self, line: &str) -> bool {
        self.last_received.as_deref() == Some(line)
    }
}
