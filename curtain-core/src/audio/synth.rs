use std::f32::consts::TAU;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use super::{BASE_FREQUENCY_HZ, SAMPLE_RATE};

/// Peak amplitude of the smooth tone.
const SMOOTH_CLIP: f32 = 0.8;
/// Share of the amplitude the creature voice loses by the last sample.
const CREATURE_DECAY: f32 = 0.7;
/// Voices below this pitch are treated as male-coded.
const LOW_VOICE_PITCH: f32 = 1.0;
const LOW_VOICE_JITTER: f32 = 0.10;
const HIGH_VOICE_JITTER: f32 = 0.18;

/// Dual-frequency tones, lowest pitch bucket first.
const BEEPER_TONES: [(f32, f32); 6] = [
    (697.0, 1209.0),
    (697.0, 1336.0),
    (770.0, 1336.0),
    (852.0, 1477.0),
    (941.0, 1477.0),
    (941.0, 1633.0),
];
const BEEPER_BUCKETS: [f32; 5] = [0.8, 0.95, 1.05, 1.2, 1.4];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisKind {
    #[default]
    SmoothTone,
    Creature,
    Beeper,
}

impl SynthesisKind {
    pub const ALL: [SynthesisKind; 3] = [SynthesisKind::SmoothTone, SynthesisKind::Creature, SynthesisKind::Beeper];

    pub fn build(self, seed: u64) -> Box<dyn Synthesizer> {
        match self {
            SynthesisKind::SmoothTone => Box::new(SmoothTone),
            SynthesisKind::Creature => Box::new(CreatureVoice::new(seed)),
            SynthesisKind::Beeper => Box::new(Beeper),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SynthesisKind::SmoothTone => "smooth_tone",
            SynthesisKind::Creature => "creature",
            SynthesisKind::Beeper => "beeper",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "smooth" | "smooth_tone" | "sine" => Some(SynthesisKind::SmoothTone),
            "creature" | "square" => Some(SynthesisKind::Creature),
            "beeper" | "beep" | "dtmf" => Some(SynthesisKind::Beeper),
            _ => None,
        }
    }
}

/// Renders one syllable-sized tone.
pub trait Synthesizer {
    fn kind(&self) -> SynthesisKind;

    fn render(&mut self, pitch: f32, duration_ms: u64, volume: f32) -> Vec<f32>;
}

/// Longest single tone rendered; longer requests are cut to this.
pub const MAX_TONE_MILLIS: u64 = 10_000;

pub(crate) fn sample_count(duration_ms: u64) -> usize {
    let duration_ms = duration_ms.min(MAX_TONE_MILLIS);
    (u64::from(SAMPLE_RATE).saturating_mul(duration_ms) / 1000) as usize
}

fn sanitize(pitch: f32, volume: f32) -> (f32, f32) {
    let pitch = if pitch.is_finite() && pitch > 0.0 { pitch } else { 1.0 };
    let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
    (pitch, volume)
}

/// Sine with a trapezoid envelope: linear ramps over the first and last quarter.
#[derive(Debug, Default)]
pub struct SmoothTone;

impl SmoothTone {
    fn envelope(i: usize, n: usize) -> f32 {
        let quarter = (n / 4).max(1) as f32;
        let i = i as f32;
        let n = n as f32;
        if i < quarter {
            i / quarter
        } else if i >= n - quarter {
            (n - i) / quarter
        } else {
            1.0
        }
    }
}

impl Synthesizer for SmoothTone {
    fn kind(&self) -> SynthesisKind {
        SynthesisKind::SmoothTone
    }

    fn render(&mut self, pitch: f32, duration_ms: u64, volume: f32) -> Vec<f32> {
        let (pitch, volume) = sanitize(pitch, volume);
        let n = sample_count(duration_ms);
        let freq = BASE_FREQUENCY_HZ * pitch;

        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let s = (TAU * freq * t).sin() * Self::envelope(i, n) * volume;
                s.clamp(-SMOOTH_CLIP, SMOOTH_CLIP)
            })
            .collect()
    }
}

/// Square wave with per-syllable pitch jitter and a linear decay.
#[derive(Debug)]
pub struct CreatureVoice {
    rng: StdRng,
}

impl CreatureVoice {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn jitter_bound(pitch: f32) -> f32 {
        if pitch < LOW_VOICE_PITCH { LOW_VOICE_JITTER } else { HIGH_VOICE_JITTER }
    }
}

impl Synthesizer for CreatureVoice {
    fn kind(&self) -> SynthesisKind {
        SynthesisKind::Creature
    }

    fn render(&mut self, pitch: f32, duration_ms: u64, volume: f32) -> Vec<f32> {
        let (pitch, volume) = sanitize(pitch, volume);
        let n = sample_count(duration_ms);
        let bound = Self::jitter_bound(pitch);
        let jitter = self.rng.gen_range(-bound..=bound);
        let freq = BASE_FREQUENCY_HZ * pitch * (1.0 + jitter);

        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let square = if (TAU * freq * t).sin() >= 0.0 { 1.0 } else { -1.0 };
                let envelope = 1.0 - CREATURE_DECAY * (i as f32 / n as f32);
                square * envelope * volume
            })
            .collect()
    }
}

/// Coarse beeper: the pitch only selects one of six fixed tones.
#[derive(Debug, Default)]
pub struct Beeper;

impl Beeper {
    pub fn bucket(pitch: f32) -> usize {
        BEEPER_BUCKETS.iter().take_while(|&&edge| pitch >= edge).count()
    }
}

impl Synthesizer for Beeper {
    fn kind(&self) -> SynthesisKind {
        SynthesisKind::Beeper
    }

    fn render(&mut self, pitch: f32, duration_ms: u64, volume: f32) -> Vec<f32> {
        let (pitch, volume) = sanitize(pitch, volume);
        let (low, high) = BEEPER_TONES[Self::bucket(pitch)];
        let n = sample_count(duration_ms);

        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                0.5 * ((TAU * low * t).sin() + (TAU * high * t).sin()) * volume
            })
            .collect()
    }
}
