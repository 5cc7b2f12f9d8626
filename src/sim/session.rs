//! Session phases and transitions
//!
//! The state machine never performs I/O. Every remote interaction is split
//! into a `begin_*` call that hands out a request stamped with a [`Ticket`],
//! and a `complete_*` call that takes the ticket back together with the
//! outcome of the call. Only one ticket is outstanding at a time, and a
//! ticket that no longer matches the pending one is discarded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::zone::CircleId;
use crate::api::{
    Difficulty, LevelResponse, SessionId, StartGameRequest, StartGameResponse,
    SubmitAnswerRequest, SubmitAnswerResponse,
};
use crate::error::{GameError, Result};
use crate::settings::{ClassRange, Settings};

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session
    Idle,
    /// Waiting for level content
    Loading,
    /// Player is arranging items
    Playing,
    /// Answer submitted (or submission failed and may be retried)
    Checking,
    /// Level passed, waiting for the player to advance
    Correct,
    /// Run ended; score is final
    GameOver,
}

/// Who is playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class_level: u8,
}

/// Cached copy of the service-owned session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub difficulty: Difficulty,
    pub current_level: u32,
    /// Last score confirmed by the service
    pub score: u64,
}

/// Result of the last submission, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub points_added: u64,
    pub total_score: u64,
    pub game_over: bool,
    pub explanation: String,
}

impl From<&SubmitAnswerResponse> for Verdict {
    fn from(resp: &SubmitAnswerResponse) -> Self {
        Self {
            correct: resp.correct,
            points_added: resp.points_added,
            total_score: resp.total_score,
            game_over: resp.game_over,
            explanation: resp.explanation.clone(),
        }
    }
}

/// Things that happened inside the core, for sounds and side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SessionStarted { difficulty: Difficulty },
    LevelLoaded { level_id: u32 },
    CircleToggled { id: CircleId, visible: bool },
    SubmitStarted,
    LevelPassed { points_added: u64, total_score: u64 },
    LevelFailed,
    /// Leaderboard should be fetched again (emitted once per finished run)
    LeaderboardRefresh,
    Abandoned,
}

/// Identity of one outstanding remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    session_id: Option<SessionId>,
    level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Start,
    Level,
    Submit,
}

impl CallKind {
    fn name(self) -> &'static str {
        match self {
            CallKind::Start => "start game",
            CallKind::Level => "level fetch",
            CallKind::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    kind: CallKind,
    ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub ticket: Ticket,
    pub body: StartGameRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRequest {
    pub ticket: Ticket,
    pub level_id: u32,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: Ticket,
    pub body: SubmitAnswerRequest,
}

/// Whether a completed call changed the state
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Applied(T),
    /// The response belonged to a superseded session or level
    Discarded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Discarded => None,
        }
    }
}

/// The explicit store for everything a running game knows
#[derive(Debug, Clone)]
pub struct GameState {
    phase: GamePhase,
    player: Option<Player>,
    session: Option<Session>,
    level: Option<LevelResponse>,
    board: Board,
    class_range: ClassRange,
    pending: Option<Pending>,
    /// Answers of the unresolved submission, re-sent verbatim on retry
    checking: Option<SubmitAnswerRequest>,
    submit_error: Option<String>,
    verdict: Option<Verdict>,
    /// Bumped whenever outstanding tickets must be invalidated
    epoch: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            phase: GamePhase::Idle,
            player: None,
            session: None,
            level: None,
            board: Board::new(settings.circle_size),
            class_range: settings.class_range,
            pending: None,
            checking: None,
            submit_error: None,
            verdict: None,
            epoch: 0,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn level(&self) -> Option<&LevelResponse> {
        self.level.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Set while a failed submission waits for a retry
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn score(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    pub fn current_level(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.current_level)
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Board access for drag/resize; only while the level is being played
    pub fn board_mut(&mut self) -> Result<&mut Board> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::WrongPhase {
                phase: self.phase,
                action: "move pieces",
            });
        }
        Ok(&mut self.board)
    }

    pub fn toggle_circle(&mut self, id: CircleId) -> Result<bool> {
        let visible = self.board_mut()?.toggle_circle(id);
        self.events.push(GameEvent::CircleToggled { id, visible });
        Ok(visible)
    }

    // === Start ===

    pub fn begin_start(&mut self, name: &str, class_input: &str) -> Result<StartRequest> {
        self.ensure_idle_channel(CallKind::Start)?;
        if !matches!(self.phase, GamePhase::Idle | GamePhase::GameOver) {
            return Err(GameError::WrongPhase {
                phase: self.phase,
                action: "start a game",
            });
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidInput("name is required".into()));
        }
        let class = self.class_range.parse(class_input)?;

        // The finished run stays on screen until a valid restart
        if self.phase == GamePhase::GameOver {
            self.clear_session();
        }
        self.player = Some(Player {
            name: name.to_string(),
            class_level: class,
        });
        let ticket = self.issue(CallKind::Start, None, 0);
        Ok(StartRequest {
            ticket,
            body: StartGameRequest {
                name: name.to_string(),
                class,
            },
        })
    }

    pub fn complete_start(
        &mut self,
        ticket: Ticket,
        result: Result<StartGameResponse>,
    ) -> Result<Outcome<LevelRequest>> {
        if !self.accept(CallKind::Start, &ticket) {
            return Ok(Outcome::Discarded);
        }

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                log::error!("Failed to start game: {err}");
                self.player = None;
                return Err(err);
            }
        };

        log::info!(
            "Session {} started ({}, level {}, score {})",
            resp.session_id,
            resp.difficulty.as_str(),
            resp.current_level,
            resp.current_score
        );
        self.events.push(GameEvent::SessionStarted {
            difficulty: resp.difficulty,
        });
        self.session = Some(Session {
            session_id: resp.session_id,
            difficulty: resp.difficulty,
            current_level: resp.current_level.max(1),
            score: resp.current_score,
        });
        self.phase = GamePhase::Loading;
        Ok(Outcome::Applied(self.request_level()?))
    }

    // === Level ===

    pub fn complete_level(
        &mut self,
        ticket: Ticket,
        result: Result<LevelResponse>,
    ) -> Result<Outcome<()>> {
        if !self.accept(CallKind::Level, &ticket) {
            return Ok(Outcome::Discarded);
        }

        let level = match result {
            Ok(level) => level,
            Err(err) => {
                // Fail closed: the session is abandoned, not retried
                log::error!("Failed to load level, returning to start: {err}");
                self.clear_session();
                self.events.push(GameEvent::Abandoned);
                return Err(err);
            }
        };

        if let Some(session) = &self.session {
            if level.level_id != session.current_level {
                log::warn!(
                    "Requested level {} but received level {}",
                    session.current_level,
                    level.level_id
                );
            }
        }

        self.board.reset(&level.items);
        self.events.push(GameEvent::LevelLoaded {
            level_id: level.level_id,
        });
        log::info!(
            "Level {}: {} vs {} ({} items, {} points)",
            level.level_id,
            level.circle_a_label,
            level.circle_b_label,
            level.items.len(),
            level.points
        );
        self.level = Some(level);
        self.verdict = None;
        self.phase = GamePhase::Playing;
        Ok(Outcome::Applied(()))
    }

    // === Submit ===

    /// Classify every item and package the answers.
    ///
    /// From `Checking` with a failed submission this re-sends the same
    /// answers; while a submission is in flight it is rejected.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest> {
        self.ensure_idle_channel(CallKind::Submit)?;

        let body = match self.phase {
            GamePhase::Playing => self.collect_answers()?,
            GamePhase::Checking => match &self.checking {
                Some(body) => body.clone(),
                None => {
                    return Err(GameError::WrongPhase {
                        phase: self.phase,
                        action: "retry a submission",
                    });
                }
            },
            phase => {
                return Err(GameError::WrongPhase {
                    phase,
                    action: "submit",
                });
            }
        };

        let (session_id, level) = self.session_identity()?;
        let ticket = self.issue(CallKind::Submit, Some(session_id), level);
        self.checking = Some(body.clone());
        self.submit_error = None;
        self.phase = GamePhase::Checking;
        self.events.push(GameEvent::SubmitStarted);
        Ok(SubmitRequest { ticket, body })
    }

    pub fn complete_submit(
        &mut self,
        ticket: Ticket,
        result: Result<SubmitAnswerResponse>,
    ) -> Result<Outcome<Verdict>> {
        if !self.accept(CallKind::Submit, &ticket) {
            return Ok(Outcome::Discarded);
        }

        let resp = match result {
            Ok(resp) => resp,
            Err(err) => {
                // Stay in Checking so the same answers can be retried
                log::warn!("Submission failed, awaiting retry: {err}");
                self.submit_error = Some(err.to_string());
                return Err(err);
            }
        };

        let verdict = Verdict::from(&resp);
        self.checking = None;
        self.verdict = Some(verdict.clone());

        if resp.correct {
            let Some(session) = self.session.as_mut() else {
                return Err(self.missing_session("apply a verdict"));
            };
            session.score = resp.total_score;
            if let Some(next) = resp.next_level {
                if next != session.current_level + 1 {
                    log::warn!(
                        "Service suggests level {next}, advancing to {}",
                        session.current_level + 1
                    );
                }
            }
            self.events.push(GameEvent::LevelPassed {
                points_added: resp.points_added,
                total_score: resp.total_score,
            });
            if resp.game_over {
                log::info!("All levels cleared, final score {}", resp.total_score);
                self.finish_run();
            } else {
                self.phase = GamePhase::Correct;
            }
        } else {
            log::info!("Wrong answer, game over at score {}", self.score());
            self.events.push(GameEvent::LevelFailed);
            self.finish_run();
        }

        Ok(Outcome::Applied(verdict))
    }

    // === Advance / abandon ===

    pub fn advance(&mut self) -> Result<LevelRequest> {
        self.ensure_idle_channel(CallKind::Level)?;
        if self.phase != GamePhase::Correct {
            return Err(GameError::WrongPhase {
                phase: self.phase,
                action: "advance",
            });
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.missing_session("advance"));
        };
        session.current_level += 1;
        self.phase = GamePhase::Loading;
        self.request_level()
    }

    /// Drop the session from any phase. Outstanding responses become stale.
    ///
    /// Returns the abandoned session id for a best-effort reset call.
    pub fn abandon(&mut self) -> Option<SessionId> {
        let old = self.session.as_ref().map(|s| s.session_id.clone());
        if self.phase != GamePhase::Idle || self.pending.is_some() {
            log::info!("Abandoning session from {:?}", self.phase);
            self.events.push(GameEvent::Abandoned);
        }
        self.clear_session();
        old
    }

    // === Internals ===

    fn finish_run(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::LeaderboardRefresh);
    }

    fn clear_session(&mut self) {
        self.epoch += 1;
        self.pending = None;
        self.checking = None;
        self.submit_error = None;
        self.verdict = None;
        self.session = None;
        self.level = None;
        self.player = None;
        self.phase = GamePhase::Idle;
    }

    fn ensure_idle_channel(&self, attempted: CallKind) -> Result<()> {
        match &self.pending {
            Some(pending) => {
                log::error!(
                    "{} attempted while {} is in flight",
                    attempted.name(),
                    pending.kind.name()
                );
                Err(GameError::ConcurrencyViolation(attempted.name()))
            }
            None => Ok(()),
        }
    }

    fn issue(&mut self, kind: CallKind, session_id: Option<SessionId>, level: u32) -> Ticket {
        let ticket = Ticket {
            epoch: self.epoch,
            session_id,
            level,
        };
        self.pending = Some(Pending {
            kind,
            ticket: ticket.clone(),
        });
        ticket
    }

    /// Clear the pending slot if `ticket` is the one we are waiting for
    fn accept(&mut self, kind: CallKind, ticket: &Ticket) -> bool {
        match &self.pending {
            Some(pending) if pending.kind == kind && &pending.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => {
                log::warn!("Discarding stale {} response", kind.name());
                false
            }
        }
    }

    fn session_identity(&self) -> Result<(SessionId, u32)> {
        self.session
            .as_ref()
            .map(|s| (s.session_id.clone(), s.current_level))
            .ok_or_else(|| self.missing_session("talk to the service"))
    }

    fn missing_session(&self, action: &'static str) -> GameError {
        log::error!("No session while trying to {action}");
        GameError::WrongPhase {
            phase: self.phase,
            action,
        }
    }

    fn request_level(&mut self) -> Result<LevelRequest> {
        let (session_id, level) = self.session_identity()?;
        let ticket = self.issue(CallKind::Level, Some(session_id.clone()), level);
        Ok(LevelRequest {
            ticket,
            level_id: level,
            session_id,
        })
    }

    fn collect_answers(&self) -> Result<SubmitAnswerRequest> {
        let (Some(session), Some(level)) = (&self.session, &self.level) else {
            return Err(self.missing_session("submit"));
        };
        let user_answers: BTreeMap<_, _> = self.board.snapshot().zones().into_iter().collect();
        Ok(SubmitAnswerRequest {
            session_id: session.session_id.clone(),
            level_id: level.level_id,
            user_answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ITEM_CENTER_OFFSET;
    use crate::grid_position;
    use crate::sim::ZoneLabel;
    use glam::Vec2;

    fn started() -> StartGameResponse {
        StartGameResponse {
            session_id: SessionId::new("s-1"),
            difficulty: Difficulty::Junior,
            current_level: 1,
            current_score: 0,
        }
    }

    fn level(level_id: u32, items: &[&str]) -> LevelResponse {
        LevelResponse {
            level_id,
            items: items.iter().map(|s| s.to_string()).collect(),
            allowed_circles: vec!["A".into(), "B".into()],
            points: 100,
            circle_a_label: "Red".into(),
            circle_b_label: "Green".into(),
        }
    }

    fn verdict(correct: bool, total_score: u64) -> SubmitAnswerResponse {
        SubmitAnswerResponse {
            correct,
            points_added: if correct { 100 } else { 0 },
            total_score,
            game_over: !correct,
            explanation: String::new(),
            next_level: correct.then_some(2),
            levels_completed: None,
        }
    }

    /// Start a session and load level 1 with `items`
    fn playing(items: &[&str]) -> GameState {
        let mut state = GameState::new(&Settings::default());
        let start = state.begin_start("Ava", "8").unwrap();
        let level_req = state
            .complete_start(start.ticket, Ok(started()))
            .unwrap()
            .applied()
            .unwrap();
        state
            .complete_level(level_req.ticket, Ok(level(1, items)))
            .unwrap()
            .applied()
            .unwrap();
        state.drain_events();
        state
    }

    fn place(state: &mut GameState, item: &str, center: Vec2) {
        state
            .board_mut()
            .unwrap()
            .move_item(item, center - ITEM_CENTER_OFFSET)
            .unwrap();
    }

    #[test]
    fn test_start_rejects_bad_class_without_request() {
        let mut state = GameState::new(&Settings::default());
        for bad in ["5", "13", "eight", ""] {
            assert!(matches!(
                state.begin_start("Ava", bad),
                Err(GameError::InvalidInput(_))
            ));
            assert!(!state.in_flight());
        }
        assert!(matches!(
            state.begin_start("   ", "8"),
            Err(GameError::InvalidInput(_))
        ));
        assert_eq!(state.phase(), GamePhase::Idle);

        let req = state.begin_start(" Ava ", "8").unwrap();
        assert_eq!(
            req.body,
            StartGameRequest {
                name: "Ava".into(),
                class: 8
            }
        );
    }

    #[test]
    fn test_start_failure_stays_idle() {
        let mut state = GameState::new(&Settings::default());
        let req = state.begin_start("Ava", "8").unwrap();
        let err = state
            .complete_start(req.ticket, Err(GameError::Remote("HTTP 500".into())))
            .unwrap_err();
        assert_eq!(err, GameError::Remote("HTTP 500".into()));
        assert_eq!(state.phase(), GamePhase::Idle);
        assert!(state.session().is_none());
        assert!(!state.in_flight());
    }

    #[test]
    fn test_double_start_rejected() {
        let mut state = GameState::new(&Settings::default());
        let _first = state.begin_start("Ava", "8").unwrap();
        assert_eq!(
            state.begin_start("Ava", "8"),
            Err(GameError::ConcurrencyViolation("start game"))
        );
    }

    #[test]
    fn test_start_then_level_enters_playing() {
        let mut state = GameState::new(&Settings::default());
        let req = state.begin_start("Ava", "8").unwrap();
        let level_req = state
            .complete_start(req.ticket, Ok(started()))
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(state.phase(), GamePhase::Loading);
        assert_eq!(level_req.level_id, 1);
        assert_eq!(level_req.session_id, SessionId::new("s-1"));

        state
            .complete_level(level_req.ticket, Ok(level(1, &["a", "b"])))
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.board().items().len(), 2);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::SessionStarted {
                    difficulty: Difficulty::Junior
                },
                GameEvent::LevelLoaded { level_id: 1 },
            ]
        );
    }

    #[test]
    fn test_level_failure_fails_closed() {
        let mut state = GameState::new(&Settings::default());
        let req = state.begin_start("Ava", "8").unwrap();
        let level_req = state
            .complete_start(req.ticket, Ok(started()))
            .unwrap()
            .applied()
            .unwrap();
        assert!(
            state
                .complete_level(level_req.ticket, Err(GameError::Remote("boom".into())))
                .is_err()
        );
        assert_eq!(state.phase(), GamePhase::Idle);
        assert!(state.session().is_none());
    }

    #[test]
    fn test_scenario_apple_lettuce_answers() {
        let mut state = playing(&["🍎 Apple", "🥬 Lettuce"]);
        state.toggle_circle(CircleId::A).unwrap();
        state.toggle_circle(CircleId::B).unwrap();
        let board = state.board_mut().unwrap();
        board.move_circle(CircleId::A, Vec2::new(150.0, 250.0));
        board.move_circle(CircleId::B, Vec2::new(500.0, 250.0));
        place(&mut state, "item-0", Vec2::new(150.0, 250.0));
        place(&mut state, "item-1", Vec2::new(500.0, 250.0));

        let req = state.begin_submit().unwrap();
        let expected: BTreeMap<String, ZoneLabel> = [
            ("🍎 Apple".to_string(), ZoneLabel::A),
            ("🥬 Lettuce".to_string(), ZoneLabel::B),
        ]
        .into_iter()
        .collect();
        assert_eq!(req.body.user_answers, expected);
        assert_eq!(req.body.level_id, 1);
        assert_eq!(state.phase(), GamePhase::Checking);
    }

    #[test]
    fn test_overlap_and_hidden_circle_zones() {
        let mut state = playing(&["both", "hidden"]);
        state.toggle_circle(CircleId::A).unwrap();
        state.toggle_circle(CircleId::B).unwrap();
        // Defaults overlap between x=280 and x=300
        place(&mut state, "item-0", Vec2::new(290.0, 220.0));
        place(&mut state, "item-1", Vec2::new(150.0, 220.0));
        state.toggle_circle(CircleId::A).unwrap();
        let req = state.begin_submit().unwrap();
        assert_eq!(req.body.user_answers["both"], ZoneLabel::B);
        assert_eq!(req.body.user_answers["hidden"], ZoneLabel::Outside);

        let mut state = playing(&["both"]);
        state.toggle_circle(CircleId::A).unwrap();
        state.toggle_circle(CircleId::B).unwrap();
        place(&mut state, "item-0", Vec2::new(290.0, 220.0));
        let req = state.begin_submit().unwrap();
        assert_eq!(req.body.user_answers["both"], ZoneLabel::AB);
    }

    #[test]
    fn test_second_submit_rejected_while_in_flight() {
        let mut state = playing(&["a"]);
        let first = state.begin_submit();
        let second = state.begin_submit();
        assert!(first.is_ok());
        assert_eq!(second, Err(GameError::ConcurrencyViolation("submit")));
        assert_eq!(
            state
                .drain_events()
                .iter()
                .filter(|e| **e == GameEvent::SubmitStarted)
                .count(),
            1
        );
    }

    #[test]
    fn test_network_failure_keeps_checking_and_retries_same_answers() {
        let mut state = playing(&["a", "b"]);
        let first = state.begin_submit().unwrap();
        assert!(
            state
                .complete_submit(first.ticket, Err(GameError::Remote("timeout".into())))
                .is_err()
        );
        assert_eq!(state.phase(), GamePhase::Checking);
        assert_eq!(state.submit_error(), Some("remote error: timeout"));
        assert!(state.board_mut().is_err());

        let retry = state.begin_submit().unwrap();
        assert_eq!(retry.body, first.body);
        assert_eq!(state.submit_error(), None);
    }

    #[test]
    fn test_correct_uses_authoritative_total() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        let verdict = state
            .complete_submit(req.ticket, Ok(verdict(true, 120)))
            .unwrap()
            .applied()
            .unwrap();
        assert!(verdict.correct);
        assert_eq!(state.phase(), GamePhase::Correct);
        // points_added says 100, the service total wins
        assert_eq!(state.score(), 120);
    }

    #[test]
    fn test_wrong_answer_is_game_over() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(true, 100))).unwrap();
        let next = state.advance().unwrap();
        let _ = state.complete_level(next.ticket, Ok(level(2, &["x"]))).unwrap();
        state.drain_events();

        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(false, 100))).unwrap();
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(state.score(), 100);
        let events = state.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == GameEvent::LeaderboardRefresh)
                .count(),
            1
        );
        assert!(events.contains(&GameEvent::LevelFailed));
        assert!(state.begin_submit().is_err());
    }

    #[test]
    fn test_correct_with_game_over_ends_run() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        let mut resp = verdict(true, 1000);
        resp.game_over = true;
        let _ = state.complete_submit(req.ticket, Ok(resp)).unwrap();
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(state.score(), 1000);
    }

    #[test]
    fn test_advance_resets_board() {
        let mut state = playing(&["a", "b"]);
        state.toggle_circle(CircleId::A).unwrap();
        place(&mut state, "item-0", Vec2::new(400.0, 400.0));
        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(true, 100))).unwrap();

        let next = state.advance().unwrap();
        assert_eq!(next.level_id, 2);
        assert_eq!(state.phase(), GamePhase::Loading);
        let _ = state
            .complete_level(next.ticket, Ok(level(2, &["x", "y", "z", "w"])))
            .unwrap();

        let board = state.board();
        assert_eq!(board.items().len(), 4);
        for (i, item) in board.items().iter().enumerate() {
            assert_eq!(item.position, grid_position(i));
        }
        assert!(board.circles().iter().all(|c| !c.visible));
        assert_eq!(state.current_level(), Some(2));
    }

    #[test]
    fn test_advance_only_from_correct() {
        let mut state = playing(&["a"]);
        assert!(matches!(
            state.advance(),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_abandon_discards_in_flight_response() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        assert_eq!(state.abandon(), Some(SessionId::new("s-1")));
        assert_eq!(state.phase(), GamePhase::Idle);

        let outcome = state
            .complete_submit(req.ticket, Ok(verdict(true, 100)))
            .unwrap();
        assert_eq!(outcome, Outcome::Discarded);
        assert_eq!(state.phase(), GamePhase::Idle);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_stale_level_from_previous_session_is_dropped() {
        let mut state = GameState::new(&Settings::default());
        let req = state.begin_start("Ava", "8").unwrap();
        let old_level = state
            .complete_start(req.ticket, Ok(started()))
            .unwrap()
            .applied()
            .unwrap();
        state.abandon();

        let req = state.begin_start("Ben", "10").unwrap();
        let mut second = started();
        second.session_id = SessionId::new("s-2");
        let new_level = state
            .complete_start(req.ticket, Ok(second))
            .unwrap()
            .applied()
            .unwrap();

        let outcome = state
            .complete_level(old_level.ticket, Ok(level(1, &["old"])))
            .unwrap();
        assert_eq!(outcome, Outcome::Discarded);
        assert_eq!(state.phase(), GamePhase::Loading);

        let _ = state
            .complete_level(new_level.ticket, Ok(level(1, &["new"])))
            .unwrap();
        assert_eq!(state.board().items()[0].text, "new");
    }

    #[test]
    fn test_board_locked_outside_playing() {
        let mut state = GameState::new(&Settings::default());
        assert!(matches!(
            state.toggle_circle(CircleId::A),
            Err(GameError::WrongPhase {
                phase: GamePhase::Idle,
                ..
            })
        ));
    }

    #[test]
    fn test_new_game_after_game_over() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(false, 0))).unwrap();
        assert_eq!(state.phase(), GamePhase::GameOver);

        let req = state.begin_start("Ava", "9").unwrap();
        assert!(state.session().is_none());
        assert_eq!(req.body.class, 9);
    }

    #[test]
    fn test_invalid_restart_keeps_final_score() {
        let mut state = playing(&["a"]);
        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(true, 100))).unwrap();
        let next = state.advance().unwrap();
        let _ = state.complete_level(next.ticket, Ok(level(2, &["x"]))).unwrap();
        let req = state.begin_submit().unwrap();
        let _ = state.complete_submit(req.ticket, Ok(verdict(false, 100))).unwrap();
        assert_eq!(state.phase(), GamePhase::GameOver);

        for (name, class) in [("Ava", "99"), ("  ", "8")] {
            let err = state.begin_start(name, class).unwrap_err();
            assert!(matches!(err, GameError::InvalidInput(_)));
            assert_eq!(state.phase(), GamePhase::GameOver);
            assert_eq!(state.score(), 100);
            assert!(state.verdict().is_some());
            assert!(state.session().is_some());
            assert!(!state.in_flight());
        }
    }
}
