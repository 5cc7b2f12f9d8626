//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web. Native builds start from defaults
//! and honor a few environment overrides.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Default scoring service location
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the service location (native only)
pub const API_URL_ENV: &str = "VENN_API_URL";

/// Admissible class levels for a new game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ClassRange {
    fn default() -> Self {
        Self { min: 6, max: 12 }
    }
}

impl ClassRange {
    /// Parse a class typed by the player
    pub fn parse(&self, input: &str) -> Result<u8> {
        let class: i64 = input.trim().parse().map_err(|_| {
            GameError::InvalidInput(format!("class must be a number, got {input:?}"))
        })?;
        if class < i64::from(self.min) || class > i64::from(self.max) {
            return Err(GameError::InvalidInput(format!(
                "Please enter a class between {} and {}",
                self.min, self.max
            )));
        }
        Ok(class as u8)
    }
}

/// Diameter limits for the Venn circles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleSizeRange {
    pub min: f32,
    pub max: f32,
    /// Slider/wheel increment
    pub step: f32,
}

impl Default for CircleSizeRange {
    fn default() -> Self {
        Self {
            min: 100.0,
            max: 300.0,
            step: 10.0,
        }
    }
}

impl CircleSizeRange {
    #[inline]
    pub fn clamp(&self, size: f32) -> f32 {
        if size.is_nan() {
            return self.min;
        }
        size.clamp(self.min, self.max)
    }
}

/// Sound preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    pub muted: bool,
    /// Menu/leaderboard music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// In-game music volume (0.0 - 1.0)
    pub game_music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            muted: false,
            music_volume: 0.3,
            game_music_volume: 0.4,
            sfx_volume: 0.5,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the scoring service, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout (native only)
    pub request_timeout_secs: u64,
    /// Entries requested from the leaderboard
    pub leaderboard_limit: u32,
    pub class_range: ClassRange,
    pub circle_size: CircleSizeRange,
    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 10,
            leaderboard_limit: 10,
            class_range: ClassRange::default(),
            circle_size: CircleSizeRange::default(),
            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// Reject configurations the core cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(GameError::InvalidInput("api_base_url is empty".into()));
        }
        if self.class_range.min > self.class_range.max {
            return Err(GameError::InvalidInput(format!(
                "class range {}..={} is empty",
                self.class_range.min, self.class_range.max
            )));
        }
        let sizes = &self.circle_size;
        if !(sizes.min > 0.0 && sizes.min <= sizes.max) {
            return Err(GameError::InvalidInput(format!(
                "circle size range {}..={} must be positive and non-empty",
                sizes.min, sizes.max
            )));
        }
        Ok(())
    }

    /// Apply environment overrides on top of the current values
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "venn_sort_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    if settings.validate().is_ok() {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    log::warn!("Stored settings are invalid, using defaults");
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Defaults plus environment overrides
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let settings = Self::default().with_env_overrides(|key| std::env::var(key).ok());
        log::info!("Using scoring service at {}", settings.api_base_url);
        settings
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // Nothing to persist natively
    }
}
