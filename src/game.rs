//! Async game driver
//!
//! Owns the state store, the scoring service client, the sound service and
//! the leaderboard cache. Each method performs at most one remote call at a
//! time and feeds its outcome back into the state machine.

use crate::api::Authority;
use crate::audio::{AudioBackend, MusicTrack, SoundEffect, SoundManager};
use crate::error::Result;
use crate::input::{
    DragController, DragTarget, DragUpdate, PointerEvent, PointerKind, resize_by,
};
use crate::leaderboard::Leaderboard;
use crate::settings::Settings;
use crate::sim::{Board, CircleId, GameEvent, GameState, LevelRequest, Outcome, Verdict};

pub struct Game<A: Authority, B: AudioBackend> {
    api: A,
    state: GameState,
    drags: DragController,
    sounds: SoundManager<B>,
    leaderboard: Leaderboard,
    settings: Settings,
    refresh_pending: bool,
}

impl<A: Authority, B: AudioBackend> Game<A, B> {
    pub fn new(api: A, sounds: SoundManager<B>, settings: Settings) -> Self {
        Self {
            api,
            state: GameState::new(&settings),
            drags: DragController::new(),
            sounds,
            leaderboard: Leaderboard::new(),
            settings,
            refresh_pending: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn board_mut(&mut self) -> Result<&mut Board> {
        self.state.board_mut()
    }

    /// Start a new session and load its first level
    pub async fn start(&mut self, name: &str, class_input: &str) -> Result<()> {
        self.sounds.init();
        self.sounds.play(SoundEffect::ButtonClick);

        let request = self.state.begin_start(name, class_input)?;
        let result = self.api.start_game(&request.body).await;
        let outcome = self.state.complete_start(request.ticket, result);
        self.dispatch_events().await;

        match outcome? {
            Outcome::Applied(level) => self.load_level(level).await,
            Outcome::Discarded => Ok(()),
        }
    }

    /// Submit the current placement. Returns `None` if the response was
    /// superseded before it arrived.
    pub async fn submit(&mut self) -> Result<Option<Verdict>> {
        for target in self.drags.release_all() {
            log::debug!("Submit completed active drag of {target:?}");
        }

        let request = self.state.begin_submit()?;
        self.dispatch_events().await;
        let result = self.api.submit_answer(&request.body).await;
        let outcome = self.state.complete_submit(request.ticket, result);
        self.dispatch_events().await;
        Ok(outcome?.applied())
    }

    /// Move from a passed level to the next one
    pub async fn advance(&mut self) -> Result<()> {
        let request = self.state.advance()?;
        self.sounds.play(SoundEffect::ButtonClick);
        self.load_level(request).await
    }

    /// Leave the current session; the service is told on a best-effort basis
    pub async fn abandon(&mut self) {
        self.drags.release_all();
        if let Some(session_id) = self.state.abandon() {
            if let Err(err) = self.api.reset_game(&session_id).await {
                log::warn!("Reset of session {session_id} failed: {err}");
            }
        }
        self.dispatch_events().await;
    }

    /// Fetch the leaderboard; failures leave the previous entries in place
    pub async fn refresh_leaderboard(&mut self) {
        self.refresh_pending = false;
        let result = self.api.leaderboard(self.settings.leaderboard_limit).await;
        self.leaderboard.apply(result);
    }

    /// Switch to the score screen
    pub async fn show_leaderboard(&mut self) {
        self.sounds.play(SoundEffect::ButtonClick);
        self.sounds.play_music(MusicTrack::Background);
        self.sounds.play(SoundEffect::Leaderboard);
        if self.leaderboard.fetches == 0 || self.leaderboard.is_stale() {
            self.refresh_leaderboard().await;
        }
        self.sounds.play(SoundEffect::Points);
    }

    pub fn toggle_circle(&mut self, id: CircleId) -> Result<bool> {
        let visible = self.state.toggle_circle(id)?;
        self.route_events();
        Ok(visible)
    }

    pub fn resize_circle(&mut self, id: CircleId, size: f32) -> Result<f32> {
        Ok(self.state.board_mut()?.resize_circle(id, size))
    }

    /// Grow or shrink a circle by slider steps (wheel input)
    pub fn nudge_circle(&mut self, id: CircleId, steps: i32) -> Result<f32> {
        Ok(resize_by(self.state.board_mut()?, id, steps))
    }

    /// Feed a pointer event to the board
    pub fn pointer(&mut self, event: PointerEvent) -> Result<DragUpdate> {
        let board = match self.state.board_mut() {
            Ok(board) => board,
            Err(err) => {
                if matches!(event.kind, PointerKind::Up | PointerKind::Cancel) {
                    self.drags.release_all();
                    return Ok(DragUpdate::Ignored);
                }
                return Err(err);
            }
        };
        let update = self.drags.handle(board, event);
        if let DragUpdate::Released(DragTarget::Circle(_)) = update {
            self.sounds.play(SoundEffect::Drag);
        }
        Ok(update)
    }

    /// Flip mute and persist the preference
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.sounds.toggle_mute();
        self.settings.audio.muted = muted;
        self.settings.save();
        muted
    }

    /// Stop all audio and release the backend
    pub fn shutdown(self) -> B {
        self.sounds.teardown()
    }

    async fn load_level(&mut self, request: LevelRequest) -> Result<()> {
        let result = self
            .api
            .get_level(request.level_id, &request.session_id)
            .await;
        let outcome = self.state.complete_level(request.ticket, result);
        self.dispatch_events().await;
        outcome.map(|_| ())
    }

    async fn dispatch_events(&mut self) {
        self.route_events();
        if self.refresh_pending {
            self.refresh_leaderboard().await;
        }
    }

    /// Play sounds for drained events; remember if a refresh is due
    fn route_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::SessionStarted { difficulty } => {
                    self.sounds.play_music(MusicTrack::for_difficulty(difficulty));
                }
                GameEvent::LevelLoaded { .. } => {}
                GameEvent::CircleToggled { .. } => self.sounds.play(SoundEffect::CirclePop),
                GameEvent::SubmitStarted => self.sounds.play(SoundEffect::ButtonClick),
                GameEvent::LevelPassed { .. } => {
                    self.sounds.play(SoundEffect::Correct);
                    self.sounds.play(SoundEffect::LevelUp);
                }
                GameEvent::LevelFailed => self.sounds.play(SoundEffect::Wrong),
                GameEvent::LeaderboardRefresh => self.refresh_pending = true,
                GameEvent::Abandoned => self.sounds.play_music(MusicTrack::Background),
            }
        }
    }
}
