use log::trace;
use rustc_hash::FxHashSet;

use crate::playback::timeline::TimelineState;
use crate::playback::timer::TimerKind;
use crate::runtime::{AnimationName, Choice, Emotion, Position, Transform};

/// Drawn wherever a referenced image is unknown.
pub const PLACEHOLDER_ASSET: &str = "placeholder";

pub trait AssetCatalog {
    fn contains(&self, key: &str) -> bool;
}

impl AssetCatalog for FxHashSet<String> {
    fn contains(&self, key: &str) -> bool {
        FxHashSet::contains(self, key)
    }
}

/// Accepts every key. Handy when the host resolves images itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyAsset;

impl AssetCatalog for AnyAsset {
    fn contains(&self, _key: &str) -> bool {
        true
    }
}

pub fn resolve_asset(catalog: &dyn AssetCatalog, key: &str) -> String {
    if !key.is_empty() && catalog.contains(key) {
        key.to_string()
    } else {
        trace!("Asset '{}' missing, using placeholder", key);
        PLACEHOLDER_ASSET.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterView {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub transform: Transform,
    pub asset: String,
    /// `None` for characters drawn from a static image.
    pub animation: Option<AnimationName>,
    pub frame: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub index: usize,
    pub speaker: Option<String>,
    pub position: Position,
    pub text: String,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionView {
    pub character_id: String,
    pub text: String,
    pub emotion: Option<Emotion>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugOverlay {
    pub state: TimelineState,
    pub clock_ms: u64,
    pub speed: f32,
    pub timers: Vec<(TimerKind, u64)>,
    pub open_channels: usize,
}

/// Everything a host needs to draw one frame. Built fresh on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFrame {
    pub state: TimelineState,
    pub scene_index: Option<usize>,
    pub background: Option<String>,
    pub characters: Vec<CharacterView>,
    pub lines: Vec<LineView>,
    pub choices: Option<Vec<Choice>>,
    pub interaction: Option<InteractionView>,
    pub debug: Option<DebugOverlay>,
}

impl StageFrame {
    pub fn empty(state: TimelineState) -> Self {
        Self {
            state,
            scene_index: None,
            background: None,
            characters: Vec::new(),
            lines: Vec::new(),
            choices: None,
            interaction: None,
            debug: None,
        }
    }

    pub fn character(&self, id: &str) -> Option<&CharacterView> {
        self.characters.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_assets_fall_back_to_placeholder() {
        let mut catalog = FxHashSet::default();
        catalog.insert("park".to_string());

        assert_eq!(resolve_asset(&catalog, "park"), "park");
        assert_eq!(resolve_asset(&catalog, "beach"), PLACEHOLDER_ASSET);
        assert_eq!(resolve_asset(&catalog, ""), PLACEHOLDER_ASSET);
        assert_eq!(resolve_asset(&AnyAsset, "beach"), "beach");
    }
}
