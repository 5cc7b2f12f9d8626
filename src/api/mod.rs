//! Remote scoring service
//!
//! The service owns level content and answer correctness. This side only
//! submits placements and receives verdicts.

pub mod client;
pub mod types;

pub use client::HttpAuthority;
pub use types::{
    Difficulty, HealthResponse, LeaderboardEntry, LeaderboardResponse, LevelResponse, SessionId,
    StartGameRequest, StartGameResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

use crate::error::Result;

/// Request/response calls against the scoring service.
///
/// Implementations are used from a single task; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Authority {
    async fn start_game(&self, request: &StartGameRequest) -> Result<StartGameResponse>;

    async fn get_level(&self, level_id: u32, session_id: &SessionId) -> Result<LevelResponse>;

    async fn submit_answer(&self, request: &SubmitAnswerRequest) -> Result<SubmitAnswerResponse>;

    async fn leaderboard(&self, limit: u32) -> Result<LeaderboardResponse>;

    /// Best effort; callers ignore the outcome beyond logging
    async fn reset_game(&self, session_id: &SessionId) -> Result<()>;
}
