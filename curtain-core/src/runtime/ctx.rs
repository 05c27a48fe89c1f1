use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::runtime::assets::{AnimationName, Choice, Gender, Script, VoiceProfile};

/// One loaded script plus everything that changes while it plays.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub script: Arc<Script>,
    pub scene_index: usize,
    pub is_playing: bool,
    pub speed_multiplier: f32,
    pub interaction: InteractionState,
    pub pending_choices: Option<Vec<Choice>>,
}

impl PlaybackSession {
    pub fn new(script: Arc<Script>, speed_multiplier: f32) -> Self {
        Self {
            script,
            scene_index: 0,
            is_playing: false,
            speed_multiplier,
            interaction: InteractionState::default(),
            pending_choices: None,
        }
    }

    pub fn scene_count(&self) -> usize {
        self.script.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Normal,
    Happy,
    Annoyed,
    Angry,
}

impl Emotion {
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Normal => "normal",
            Emotion::Happy => "happy",
            Emotion::Annoyed => "annoyed",
            Emotion::Angry => "angry",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderCounters {
    pub clicks: u32,
    pub angry_streak: u32,
}

/// The ad-hoc line a clicked character is currently saying.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionLine {
    pub character_id: String,
    pub text: String,
    pub emotion: Emotion,
    pub animation: AnimationName,
    pub voice: VoiceProfile,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    male: GenderCounters,
    female: GenderCounters,
    pub last_click_millis: Option<u64>,
    pub current: Option<InteractionLine>,
}

impl InteractionState {
    pub fn counters(&self, gender: Gender) -> GenderCounters {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }

    pub fn counters_mut(&mut self, gender: Gender) -> &mut GenderCounters {
        match gender {
            Gender::Male => &mut self.male,
            Gender::Female => &mut self.female,
        }
    }

    /// Forgets every counter and streak; the clock and current line stay.
    pub fn forget_counters(&mut self) {
        self.male = GenderCounters::default();
        self.female = GenderCounters::default();
    }
}
