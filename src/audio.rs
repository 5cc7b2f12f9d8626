//! Sound service
//!
//! An explicitly constructed manager with a defined lifecycle
//! (`init`, `play`, `teardown`) that the game driver owns. The actual
//! playback goes through an [`AudioBackend`] so the core stays testable.

use crate::api::Difficulty;
use crate::settings::AudioSettings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Any button press
    ButtonClick,
    /// Circle shown or hidden
    CirclePop,
    /// Submission accepted
    Correct,
    /// Submission rejected
    Wrong,
    /// Moving on to the next level
    LevelUp,
    /// Circle dragged
    Drag,
    /// Leaderboard shown
    Leaderboard,
    /// Final score tallied
    Points,
}

impl SoundEffect {
    pub fn asset(&self) -> &'static str {
        match self {
            SoundEffect::ButtonClick => "/button-click.mp3",
            SoundEffect::CirclePop => "/circle-pop.mp3",
            SoundEffect::Correct => "/correct-answer.mp3",
            SoundEffect::Wrong => "/wrong-answer.mp3",
            SoundEffect::LevelUp => "/level-up.mp3",
            SoundEffect::Drag => "/drag-circle.mp3",
            SoundEffect::Leaderboard => "/leaderboard-appears.mp3",
            SoundEffect::Points => "/points-added.mp3",
        }
    }
}

/// Looping music
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    /// Menus and leaderboard
    Background,
    Junior,
    Senior,
}

impl MusicTrack {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Junior => MusicTrack::Junior,
            Difficulty::Senior | Difficulty::Unknown => MusicTrack::Senior,
        }
    }

    pub fn asset(&self) -> &'static str {
        match self {
            MusicTrack::Background => "/background-music.mp3",
            MusicTrack::Junior => "/junior-music.mp3",
            MusicTrack::Senior => "/senior-music.mp3",
        }
    }
}

/// Where sounds actually go
pub trait AudioBackend {
    /// Unlock playback (browsers require a user gesture first)
    fn unlock(&mut self) {}
    /// Fire-and-forget one-shot clip
    fn play_clip(&mut self, asset: &'static str, volume: f32);
    /// Replace the current loop
    fn start_loop(&mut self, asset: &'static str, volume: f32);
    /// Pause the current loop, optionally rewinding it
    fn pause_loop(&mut self, rewind: bool);
    /// Resume the paused loop
    fn resume_loop(&mut self);
}

/// Backend for builds without a sound device; only logs
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play_clip(&mut self, asset: &'static str, volume: f32) {
        log::debug!("sound {asset} @ {volume:.2}");
    }

    fn start_loop(&mut self, asset: &'static str, volume: f32) {
        log::debug!("music {asset} @ {volume:.2}");
    }

    fn pause_loop(&mut self, _rewind: bool) {}

    fn resume_loop(&mut self) {}
}

/// Audio manager for the game
pub struct SoundManager<B: AudioBackend> {
    backend: B,
    settings: AudioSettings,
    current_music: Option<MusicTrack>,
    initialized: bool,
}

impl<B: AudioBackend> SoundManager<B> {
    pub fn new(backend: B, settings: AudioSettings) -> Self {
        Self {
            backend,
            settings,
            current_music: None,
            initialized: false,
        }
    }

    /// Unlock the backend; call from the first user interaction
    pub fn init(&mut self) {
        if !self.initialized {
            self.backend.unlock();
            self.initialized = true;
            log::info!("Audio initialized (muted: {})", self.settings.muted);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.settings.muted
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn current_music(&self) -> Option<MusicTrack> {
        self.current_music
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.settings.muted {
            return;
        }
        let volume = self.settings.sfx_volume.clamp(0.0, 1.0);
        self.backend.play_clip(effect.asset(), volume);
    }

    /// Switch the looping music
    pub fn play_music(&mut self, track: MusicTrack) {
        if self.settings.muted {
            return;
        }
        self.stop_all();
        let volume = match track {
            MusicTrack::Background => self.settings.music_volume,
            MusicTrack::Junior | MusicTrack::Senior => self.settings.game_music_volume,
        };
        self.backend.start_loop(track.asset(), volume.clamp(0.0, 1.0));
        self.current_music = Some(track);
    }

    pub fn stop_all(&mut self) {
        self.backend.pause_loop(true);
        self.current_music = None;
    }

    /// Flip mute; returns the new state. Unmuting resumes the current music.
    pub fn toggle_mute(&mut self) -> bool {
        self.settings.muted = !self.settings.muted;
        if self.current_music.is_some() {
            if self.settings.muted {
                self.backend.pause_loop(false);
            } else {
                self.backend.resume_loop();
            }
        }
        self.settings.muted
    }

    /// Stop everything and hand the backend back
    pub fn teardown(mut self) -> B {
        self.stop_all();
        log::debug!("Audio torn down");
        self.backend
    }
}

/// HTML audio element playback (WASM only)
#[cfg(target_arch = "wasm32")]
pub mod web {
    use web_sys::HtmlAudioElement;

    use super::AudioBackend;

    #[derive(Default)]
    pub struct WebAudioBackend {
        music: Option<HtmlAudioElement>,
    }

    impl AudioBackend for WebAudioBackend {
        fn unlock(&mut self) {
            // A silent element created inside the gesture unlocks playback
            if let Ok(el) = HtmlAudioElement::new() {
                el.set_muted(true);
                let _ = el.play();
            }
        }

        fn play_clip(&mut self, asset: &'static str, volume: f32) {
            match HtmlAudioElement::new_with_src(asset) {
                Ok(el) => {
                    el.set_volume(f64::from(volume));
                    if el.play().is_err() {
                        log::warn!("Sound play failed: {asset}");
                    }
                }
                Err(_) => log::warn!("Failed to create audio element for {asset}"),
            }
        }

        fn start_loop(&mut self, asset: &'static str, volume: f32) {
            self.pause_loop(true);
            if let Ok(el) = HtmlAudioElement::new_with_src(asset) {
                el.set_loop(true);
                el.set_volume(f64::from(volume));
                let _ = el.play();
                self.music = Some(el);
            }
        }

        fn pause_loop(&mut self, rewind: bool) {
            if let Some(el) = &self.music {
                let _ = el.pause();
                if rewind {
                    el.set_current_time(0.0);
                }
            }
        }

        fn resume_loop(&mut self) {
            if let Some(el) = &self.music {
                let _ = el.play();
            }
        }
    }
}
