//! Blocking HTTP client for the game broker
//!
//! The broker holds a single "last move" slot. Each side posts the move it
//! just played and polls for the opponent's move of the next turn.

use std::thread;
use std::time::Duration;

use thiserror::Error;
use wargame_core::{CoordPair, GameState};
use wargame_search::{MovePublisher, MoveSource, RunnerError};

use crate::wire::{BrokerEnvelope, BrokerMove};

/// Delay between two polls of the broker
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("broker answered with status {0}")]
    Status(u16),

    #[error("broker did not accept the move: {0}")]
    Rejected(String),
}

// ============================================================================
// CLIENT
// ============================================================================

#[derive(Clone, Debug)]
pub struct BrokerClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl BrokerClient {
    pub fn new(url: impl Into<String>) -> Result<Self, BrokerError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post a played move; the broker must echo it back unchanged
    pub fn post_move(&self, pair: CoordPair, turn: u32) -> Result<(), BrokerError> {
        let posted = BrokerMove::new(pair, turn);
        let response = self.http.post(&self.url).json(&posted).send()?;
        let envelope = Self::envelope(response)?;

        if envelope.success && envelope.data == Some(posted) {
            Ok(())
        } else {
            Err(BrokerError::Rejected(format!(
                "posted {:?}, broker answered {:?}",
                posted, envelope
            )))
        }
    }

    /// The broker's move if it is the one for `expected_turn`
    pub fn fetch_move(&self, expected_turn: u32) -> Result<Option<CoordPair>, BrokerError> {
        let response = self.http.get(&self.url).send()?;
        let envelope = Self::envelope(response)?;

        Ok(envelope
            .data
            .filter(|mv| envelope.success && mv.turn == expected_turn)
            .map(|mv| mv.pair()))
    }

    fn envelope(response: reqwest::blocking::Response) -> Result<BrokerEnvelope, BrokerError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BrokerError::Status(status.as_u16()));
        }
        Ok(response.json()?)
    }
}

impl MovePublisher for BrokerClient {
    fn publish(&mut self, pair: CoordPair, turn: u32) {
        match self.post_move(pair, turn) {
            Ok(()) => tracing::debug!(%pair, turn, "move sent to broker"),
            Err(err) => tracing::warn!(%pair, turn, error = %err, "could not send move to broker"),
        }
    }
}

// ============================================================================
// POLLING MOVE SOURCE
// ============================================================================

/// Waits on the broker for the opponent's moves
#[derive(Debug)]
pub struct BrokerSource {
    client: BrokerClient,
    poll_interval: Duration,
    rejected: Option<CoordPair>,
}

impl BrokerSource {
    pub fn new(client: BrokerClient) -> Self {
        Self {
            client,
            poll_interval: POLL_INTERVAL,
            rejected: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// One poll; errors are logged and count as "nothing yet"
    pub fn poll(&self, expected_turn: u32) -> Option<CoordPair> {
        match self.client.fetch_move(expected_turn) {
            Ok(Some(pair)) if Some(pair) == self.rejected => None,
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(url = %self.client.url(), error = %err, "broker poll failed");
                None
            }
        }
    }
}

impl MoveSource for BrokerSource {
    fn next_move(&mut self, state: &GameState) -> Result<CoordPair, RunnerError> {
        let expected_turn = state.turns_played() + 1;
        tracing::info!(turn = expected_turn, "waiting for broker move");
        loop {
            if let Some(pair) = self.poll(expected_turn) {
                self.rejected = None;
                return Ok(pair);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn reject(&mut self, pair: CoordPair, reason: &str) {
        tracing::warn!(%pair, reason, "broker move is illegal, waiting for another");
        self.rejected = Some(pair);
    }
}
