use crate::audio::SynthesisKind;
use crate::runtime::{Choice, Emotion};

/// Why a session stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Finished,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    PlaybackStarted,
    SceneChanged { index: usize, background: String },
    LineShown { scene_index: usize, line_index: usize, speaker: Option<String> },
    LineCompleted { scene_index: usize, line_index: usize, speaker: Option<String>, text: String },
    ShowChoice { options: Vec<Choice> },
    ChoiceResolved { target_scene_index: usize },

    /// One synthesized syllable went out to the sink.
    Tone { pitch: f32, duration_ms: u64, volume: f32 },

    InteractionShown { character_id: String, text: String, emotion: Emotion },
    InteractionCooldown { character_id: String },
    InteractionDismissed,

    SpeedChanged { multiplier: f32 },
    BackendChanged { kind: SynthesisKind },

    ScriptLoaded { scenes: usize },
    End { reason: EndReason },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Play,
    Stop,
    SetSpeed { multiplier: f32 },
    CharacterClicked { id: String },
    DismissInteraction,
    /// Complete every line that is still typing.
    SkipLine,
    SelectChoice { target_scene_index: usize },
    SetBackend { kind: SynthesisKind },
}
