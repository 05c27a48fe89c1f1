use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use crate::playback::lines;
use crate::runtime::{Gender, InteractionLine, InteractionState};

pub use crate::runtime::Emotion;

/// Picks an emotion for the `clicks`-th click given a uniform roll in `0..1`.
pub fn select_emotion(clicks: u32, roll: f32) -> Emotion {
    match clicks {
        0..=2 => {
            if roll < 0.7 { Emotion::Normal } else { Emotion::Happy }
        }
        3..=4 => {
            if roll < 0.4 { Emotion::Normal }
            else if roll < 0.8 { Emotion::Happy }
            else { Emotion::Annoyed }
        }
        5..=7 => {
            if roll < 0.2 { Emotion::Happy }
            else if roll < 0.5 { Emotion::Annoyed }
            else { Emotion::Normal }
        }
        8..=10 => {
            if roll < 0.7 { Emotion::Annoyed }
            else if roll < 0.9 { Emotion::Angry }
            else { Emotion::Normal }
        }
        _ => {
            if roll < 0.6 { Emotion::Angry } else { Emotion::Annoyed }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Line(InteractionLine),
    /// The anger streak tripped; counters were reset and nothing is said.
    Cooldown,
}

#[derive(Debug)]
pub struct InteractionEmotionEngine {
    rng: StdRng,
    stale_after_ms: u64,
    cooldown_streak: u32,
}

impl InteractionEmotionEngine {
    pub fn new(seed: Option<u64>, stale_after_ms: u64, cooldown_streak: u32) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, stale_after_ms, cooldown_streak: cooldown_streak.max(1) }
    }

    pub fn roll(&mut self, clicks: u32) -> Emotion {
        select_emotion(clicks, self.rng.r#gen::<f32>())
    }

    pub fn on_click(&mut self, state: &mut InteractionState, character_id: &str, gender: Gender, now_ms: u64) -> ClickOutcome {
        if let Some(last) = state.last_click_millis {
            if now_ms.saturating_sub(last) > self.stale_after_ms {
                debug!("Clicks went stale after {}ms, forgetting counters", now_ms - last);
                state.forget_counters();
            }
        }
        state.last_click_millis = Some(now_ms);

        let counters = state.counters_mut(gender);
        if counters.angry_streak >= self.cooldown_streak {
            info!("{} anger streak hit {}, cooling down", gender.as_str(), counters.angry_streak);
            *counters = Default::default();
            state.current = None;
            return ClickOutcome::Cooldown;
        }

        counters.clicks += 1;
        let clicks = counters.clicks;
        let emotion = self.roll(clicks);
        if emotion == Emotion::Angry {
            state.counters_mut(gender).angry_streak += 1;
        }

        let text = lines::pool(emotion, gender)
            .choose(&mut self.rng)
            .map(|s| s.to_string())
            .unwrap_or_default();
        debug!("Click #{} on '{}' -> {:?}", clicks, character_id, emotion);

        let line = InteractionLine {
            character_id: character_id.to_string(),
            text,
            emotion,
            animation: lines::animation_for(emotion),
            voice: lines::voice_for(emotion, gender),
        };
        state.current = Some(line.clone());
        ClickOutcome::Line(line)
    }
}
