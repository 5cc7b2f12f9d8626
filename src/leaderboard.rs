//! Leaderboard cache
//!
//! Holds whatever the scoring service last returned. Ranking belongs to the
//! service: entries are kept and shown in the order received, never re-sorted.
//! A failed fetch keeps the previous (stale) entries.

use serde::{Deserialize, Serialize};

use crate::api::{LeaderboardEntry, LeaderboardResponse};
use crate::error::Result;

/// Last known leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// Error text of the last failed refresh, cleared on success
    pub last_error: Option<String>,
    /// Number of refreshes attempted
    pub fetches: u32,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the result of a refresh
    pub fn apply(&mut self, result: Result<LeaderboardResponse>) {
        self.fetches += 1;
        match result {
            Ok(resp) => {
                log::info!("Leaderboard refreshed ({} entries)", resp.leaderboard.len());
                self.entries = resp.leaderboard;
                self.last_error = None;
            }
            Err(err) => {
                log::warn!(
                    "Failed to fetch leaderboard, keeping {} stale entries: {err}",
                    self.entries.len()
                );
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Entries may be out of date
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}
