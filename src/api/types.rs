//! Wire types for the scoring service (JSON bodies)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::ZoneLabel;

/// Opaque session token issued by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Difficulty band the service assigns from the class level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Junior,
    Senior,
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Junior => "junior",
            Difficulty::Senior => "senior",
            Difficulty::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub name: String,
    pub class: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub session_id: SessionId,
    pub difficulty: Difficulty,
    pub current_level: u32,
    pub current_score: u64,
}

/// Read-only level content. `items` order is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResponse {
    pub level_id: u32,
    pub items: Vec<String>,
    #[serde(default)]
    pub allowed_circles: Vec<String>,
    pub points: u64,
    pub circle_a_label: String,
    pub circle_b_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: SessionId,
    pub level_id: u32,
    /// Item text to zone
    pub user_answers: BTreeMap<String, ZoneLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    #[serde(default)]
    pub points_added: u64,
    pub total_score: u64,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub next_level: Option<u32>,
    #[serde(default)]
    pub levels_completed: Option<u32>,
}

/// One leaderboard row, exactly as the service ranked it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub class_level: u8,
    pub difficulty: String,
    pub score: u64,
    pub levels_completed: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetGameRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Error payload of non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
