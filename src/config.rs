//! Session configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tictactoe_core::{DEFAULT_SIZE, MAX_SEARCH_SIZE, MIN_SIZE};
use tracing::{debug, info, instrument};

/// Timing, board and engine settings shared by both peers.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Board edge length.
    board_size: usize,

    /// Writes attempted before a send is reported unacknowledged.
    ack_attempts: u32,

    /// How long each attempt waits for `ACK`, in milliseconds.
    ack_delay_ms: u64,

    /// Longest wait for an incoming message, in milliseconds.
    receive_timeout_ms: u64,

    /// Interval between channel polls, in milliseconds.
    poll_interval_ms: u64,

    /// Search service endpoint used by the service engine.
    service_url: String,

    /// Extra engine calls after a failed one.
    engine_retries: u32,

    /// Pause between engine retries, in milliseconds.
    engine_retry_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_SIZE,
            ack_attempts: 3,
            ack_delay_ms: 1000,
            receive_timeout_ms: 120_000,
            poll_interval_ms: 100,
            service_url: "http://127.0.0.1:5005/api/tictactoe".to_string(),
            engine_retries: 3,
            engine_retry_delay_ms: 500,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file and validates it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(board_size = config.board_size, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Rejects settings the session cannot run with.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Larger boards are valid coordinates but the search never finishes.
        if !(MIN_SIZE..=MAX_SEARCH_SIZE).contains(&self.board_size) {
            return Err(ConfigError::new(format!(
                "Unsupported board size {} (expected {}..={})",
                self.board_size, MIN_SIZE, MAX_SEARCH_SIZE
            )));
        }
        if self.ack_attempts == 0 {
            return Err(ConfigError::new("ack_attempts must be at least 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::new("poll_interval_ms must be positive".to_string()));
        }
        if self.ack_delay_ms < 2 * self.poll_interval_ms {
            return Err(ConfigError::new(format!(
                "ack_delay_ms ({}) must be at least twice poll_interval_ms ({})",
                self.ack_delay_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }

    /// Returns a copy with a different board size.
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    /// Returns a copy with different transport timings, in milliseconds.
    pub fn with_timing(
        mut self,
        ack_delay_ms: u64,
        poll_interval_ms: u64,
        receive_timeout_ms: u64,
    ) -> Self {
        self.ack_delay_ms = ack_delay_ms;
        self.poll_interval_ms = poll_interval_ms;
        self.receive_timeout_ms = receive_timeout_ms;
        self
    }

    /// Returns a copy pointed at another search service.
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into();
        self
    }

    /// Returns a copy with different engine retry settings.
    pub fn with_engine_retries(mut self, retries: u32, delay_ms: u64) -> Self {
        self.engine_retries = retries;
        self.engine_retry_delay_ms = delay_ms;
        self
    }

    /// Per-attempt ack window.
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }

    /// Receive timeout.
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Pause between engine retries.
    pub fn engine_retry_delay(&self) -> Duration {
        Duration::from_millis(self.engine_retry_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
