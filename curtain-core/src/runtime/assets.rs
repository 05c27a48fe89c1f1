use std::fmt;
use serde::{Deserialize, Serialize};

/// An ordered run of scenes. Never mutated once handed to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub title: String,
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub debug_mode: bool,
}

impl Script {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { title: String::new(), scenes, debug_mode: false }
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub dialogues: Vec<DialogueLine>,
    #[serde(default = "default_scene_duration")]
    pub duration_millis: u64,
    #[serde(default)]
    pub is_ending: bool,
}

fn default_scene_duration() -> u64 { 3000 }

impl Default for Scene {
    fn default() -> Self {
        Self {
            background: String::new(),
            characters: Vec::new(),
            dialogues: Vec::new(),
            duration_millis: default_scene_duration(),
            is_ending: false,
        }
    }
}

impl Scene {
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Matches a dialogue speaker against character ids first, then display names.
    pub fn speaker(&self, speaker: &str) -> Option<&Character> {
        self.character(speaker)
            .or_else(|| self.characters.iter().find(|c| c.name == speaker))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub scale: f32,
    pub rotation: f32,
    pub flip_x: bool,
    pub opacity: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self { scale: 1.0, rotation: 0.0, flip_x: false, opacity: 1.0 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub transform: Transform,
    /// Static image used when the character has no sprite animation.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub sprite: Option<SpriteAnimationState>,
    #[serde(default)]
    pub voice: Option<VoiceProfile>,
}

impl Character {
    pub fn gender(&self) -> Gender {
        self.sprite.as_ref().map(|s| s.gender).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationName {
    #[default]
    Idle,
    Speaking,
    Walking,
    Happy,
    Sad,
    Surprised,
    Annoyed,
    Angry,
}

impl AnimationName {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationName::Idle => "idle",
            AnimationName::Speaking => "speaking",
            AnimationName::Walking => "walking",
            AnimationName::Happy => "happy",
            AnimationName::Sad => "sad",
            AnimationName::Surprised => "surprised",
            AnimationName::Annoyed => "annoyed",
            AnimationName::Angry => "angry",
        }
    }
}

impl fmt::Display for AnimationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence of this state means the sprite alternates between two frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteAnimationState {
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub animation: AnimationName,
    #[serde(default = "default_frame_period")]
    pub frame_period_millis: u64,
}

fn default_frame_period() -> u64 { 400 }

impl SpriteAnimationState {
    pub fn new(gender: Gender, animation: AnimationName) -> Self {
        Self { gender, animation, frame_period_millis: default_frame_period() }
    }

    pub fn frame_at(&self, elapsed_millis: u64) -> usize {
        ((elapsed_millis / self.frame_period_millis.max(1)) % 2) as usize
    }

    pub fn asset_key(&self, animation: AnimationName, frame: usize) -> String {
        format!("{}_{}_{}", self.gender.as_str(), animation.as_str(), frame)
    }
}

/// Voice parameters for the syllable synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceProfile {
    /// Multiplier around the synthesizer's base frequency.
    pub pitch: f32,
    /// Milliseconds between revealed glyphs.
    pub speed: u64,
    /// Length of one syllable tone.
    pub duration_millis: u64,
    pub volume: f32,
    pub enabled: bool,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self { pitch: 1.0, speed: 50, duration_millis: 60, volume: 0.6, enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueLine {
    pub text: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub reveal_delay_millis: u64,
    #[serde(default = "default_glyph_delay")]
    pub per_glyph_delay_millis: u64,
    #[serde(default)]
    pub voice: Option<VoiceProfile>,
    #[serde(default)]
    pub song: Vec<SongNote>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

fn default_glyph_delay() -> u64 { 50 }

impl DialogueLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: Position::default(),
            speaker: None,
            reveal_delay_millis: 0,
            per_glyph_delay_millis: default_glyph_delay(),
            voice: None,
            song: Vec::new(),
            choices: Vec::new(),
        }
    }

    pub fn is_sung(&self) -> bool {
        !self.song.is_empty()
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongNote {
    pub pitch: f32,
    pub duration_millis: u64,
    #[serde(default)]
    pub lyric: String,
}

impl SongNote {
    pub fn new(pitch: f32, duration_millis: u64, lyric: impl Into<String>) -> Self {
        Self { pitch, duration_millis, lyric: lyric.into() }
    }

    /// Blank lyric or non-positive pitch: wait only.
    pub fn is_rest(&self) -> bool {
        self.lyric.trim().is_empty() || !(self.pitch > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub target_scene_index: usize,
}

impl Choice {
    pub fn new(label: impl Into<String>, target_scene_index: usize) -> Self {
        Self { label: label.into(), target_scene_index }
    }
}
