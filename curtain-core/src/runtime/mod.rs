pub mod assets;
pub mod ctx;

pub use assets::{
    AnimationName, Character, Choice, DialogueLine, Gender, Position, Scene, Script, SongNote,
    SpriteAnimationState, Transform, VoiceProfile,
};
pub use ctx::{Emotion, GenderCounters, InteractionLine, InteractionState, PlaybackSession};
