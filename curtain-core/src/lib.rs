pub mod runtime;
pub mod audio;
pub mod playback;
pub mod event;
pub mod config;
pub mod renderer;
pub mod manager;

pub use runtime::{Script, Scene, Character, DialogueLine, Choice, SongNote, VoiceProfile, PlaybackSession};
pub use playback::PlaybackController;
pub use audio::{AudioHub, SynthesisKind};
pub use event::{OutputEvent, InputEvent};
pub use renderer::terminal::TerminalRenderer;
pub use manager::ScriptLibrary;
