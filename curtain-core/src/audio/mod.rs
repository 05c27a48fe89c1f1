pub mod synth;
pub mod hub;

pub use synth::{Synthesizer, SynthesisKind, SmoothTone, CreatureVoice, Beeper};
pub use hub::{AudioHub, VoiceChannel};

pub const SAMPLE_RATE: u32 = 22_050;
pub const BASE_FREQUENCY_HZ: f32 = 440.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

/// One rendered syllable, mono samples in `-1.0..=1.0`.
#[derive(Debug, Clone)]
pub struct Tone {
    pub kind: SynthesisKind,
    pub pitch: f32,
    pub duration_ms: u64,
    pub volume: f32,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

/// Where rendered tones go. Implementations must return quickly; playback is
/// fire-and-forget from the engine's point of view.
pub trait ToneSink {
    fn submit(&mut self, channel: ChannelId, tone: &Tone) -> anyhow::Result<()>;

    /// Stops everything still sounding on `channel`.
    fn release(&mut self, channel: ChannelId);

    /// `false` lets the hub skip rendering; submitted tones then carry no samples.
    fn wants_samples(&self) -> bool {
        true
    }
}

/// Discards every tone.
#[derive(Debug, Default)]
pub struct NullSink;

impl ToneSink for NullSink {
    fn submit(&mut self, _channel: ChannelId, _tone: &Tone) -> anyhow::Result<()> {
        Ok(())
    }

    fn release(&mut self, _channel: ChannelId) {}

    fn wants_samples(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToneRecord {
    pub channel: ChannelId,
    pub kind: SynthesisKind,
    pub pitch: f32,
    pub duration_ms: u64,
    pub volume: f32,
    pub sample_count: usize,
}

/// Keeps a record of every tone and release, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tones: Vec<ToneRecord>,
    pub releases: Vec<ChannelId>,
}

impl ToneSink for MemorySink {
    fn submit(&mut self, channel: ChannelId, tone: &Tone) -> anyhow::Result<()> {
        self.tones.push(ToneRecord {
            channel,
            kind: tone.kind,
            pitch: tone.pitch,
            duration_ms: tone.duration_ms,
            volume: tone.volume,
            sample_count: tone.samples.len(),
        });
        Ok(())
    }

    fn release(&mut self, channel: ChannelId) {
        self.releases.push(channel);
    }
}
