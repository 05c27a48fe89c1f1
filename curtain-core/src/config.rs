use serde::{Deserialize, Serialize};
use crate::audio::SynthesisKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub script_path: String,
    pub assets_path: String,
    pub log_path:    String,
    pub log_level:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub default_speed: f32,
    /// Settle time between a choice line's reveal and the choices surfacing.
    pub choice_settle_ms: u64,
    /// Bubble entrance animation; the typewriter gate opens once it elapses.
    pub bubble_entrance_ms: u64,
    pub interaction_linger_ms: u64,
    pub stale_click_ms: u64,
    pub anger_cooldown_streak: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub backend: SynthesisKind,
    pub master_volume: f32,
}

/// Everything the launcher writes into a fresh `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub system: SystemConfig,
    pub playback: PlaybackConfig,
    pub audio: AudioConfig,
}

impl CoreConfig {
    /// Pulls every section out of the shared store.
    pub fn from_shared() -> Self {
        Self {
            system: curtain_shared::config::get("system"),
            playback: curtain_shared::config::get("playback"),
            audio: curtain_shared::config::get("audio"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            script_path: "scripts/intro.json".into(),
            assets_path: "assets/".into(),
            log_path:    "logs/".into(),
            log_level:   "info".into(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed: 1.0,
            choice_settle_ms: 2000,
            bubble_entrance_ms: 300,
            interaction_linger_ms: 3000,
            stale_click_ms: 5000,
            anger_cooldown_streak: 3,
            seed: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: SynthesisKind::SmoothTone,
            master_volume: 1.0,
        }
    }
}
