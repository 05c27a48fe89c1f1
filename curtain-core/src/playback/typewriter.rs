use log::{debug, trace};
use crate::audio::{AudioHub, VoiceChannel};
use crate::playback::timeline::scale_millis;
use crate::runtime::{DialogueLine, SongNote, VoiceProfile};

/// Share of a sung note's duration the tone actually sounds.
const SUNG_TONE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum LineContent {
    Spoken(Vec<char>),
    Sung(Vec<SongNote>),
}

impl LineContent {
    pub fn from_line(line: &DialogueLine) -> Self {
        if line.is_sung() {
            LineContent::Sung(line.song.clone())
        } else {
            LineContent::Spoken(line.text.chars().collect())
        }
    }

    pub fn spoken(text: &str) -> Self {
        LineContent::Spoken(text.chars().collect())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            LineContent::Spoken(chars) => chars.iter().all(|c| c.is_whitespace()),
            LineContent::Sung(notes) => notes.iter().all(SongNote::is_rest),
        }
    }

    fn len(&self) -> usize {
        match self {
            LineContent::Spoken(chars) => chars.len(),
            LineContent::Sung(notes) => notes.len(),
        }
    }
}

/// One audio pulse fired while revealing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub pitch: f32,
    pub duration_ms: u64,
    pub volume: f32,
}

#[derive(Debug)]
struct Step {
    remaining_ms: u64,
    append: Option<char>,
}

/// Reveals one line over time and voices it through a channel acquired from
/// the hub. Nothing is shown and nothing sounds while the gate is closed.
#[derive(Debug)]
pub struct TypewriterSequencer {
    content: LineContent,
    voice: VoiceProfile,
    glyph_delay_ms: u64,
    speed: f32,
    gate_open: bool,
    audio: AudioHub,
    channel: Option<VoiceChannel>,
    visible: String,
    cursor: usize,
    step: Option<Step>,
    finished: bool,
    pulses: Vec<Pulse>,
}

impl TypewriterSequencer {
    /// `glyph_delay_ms` is the cadence used for spoken lines: the voice's own
    /// speed when the line has a voice, otherwise the line's per-glyph delay.
    pub fn new(content: LineContent, voice: VoiceProfile, glyph_delay_ms: u64, speed: f32, audio: AudioHub) -> Self {
        Self {
            content,
            voice,
            glyph_delay_ms,
            speed,
            gate_open: false,
            audio,
            channel: None,
            visible: String::new(),
            cursor: 0,
            step: None,
            finished: false,
            pulses: Vec::new(),
        }
    }

    pub fn visible_text(&self) -> &str {
        &self.visible
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_blank()
    }

    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn full_text(&self) -> String {
        match &self.content {
            LineContent::Spoken(chars) => chars.iter().collect(),
            LineContent::Sung(notes) => notes.iter()
                .filter(|n| !n.is_rest())
                .map(|n| n.lyric.as_str())
                .collect(),
        }
    }

    /// Pulses fired since the last call.
    pub fn take_pulses(&mut self) -> Vec<Pulse> {
        std::mem::take(&mut self.pulses)
    }

    /// Applies the current gate and speed. Any change restarts the reveal from
    /// an empty buffer with a fresh channel; an unchanged pair is a no-op.
    pub fn sync(&mut self, gate_open: bool, speed: f32) {
        if self.gate_open == gate_open && self.speed == speed {
            return;
        }
        self.gate_open = gate_open;
        self.speed = speed;
        self.restart();
    }

    pub fn set_gate(&mut self, gate_open: bool) {
        let speed = self.speed;
        self.sync(gate_open, speed);
    }

    /// Completes the reveal at once, without further audio.
    pub fn skip(&mut self) {
        if !self.gate_open || self.content.is_blank() {
            return;
        }
        self.visible = self.full_text();
        self.cursor = self.content.len();
        self.step = None;
        self.finish();
    }

    fn restart(&mut self) {
        self.release_channel();
        self.visible.clear();
        self.cursor = 0;
        self.step = None;
        self.pulses.clear();
        self.finished = false;

        if !self.gate_open {
            return;
        }
        if self.content.is_blank() {
            self.finished = true;
            return;
        }
        if self.voice.enabled {
            self.channel = Some(self.audio.acquire());
        }
        self.begin_step();
    }

    pub fn update(&mut self, dt_ms: u64) {
        if !self.gate_open || self.finished {
            return;
        }

        let mut budget = dt_ms;
        loop {
            let Some(step) = self.step.as_mut() else {
                if !self.begin_step() {
                    break;
                }
                continue;
            };

            if step.remaining_ms > budget {
                step.remaining_ms -= budget;
                break;
            }
            budget -= step.remaining_ms;
            if let Some(c) = step.append {
                self.visible.push(c);
            }
            self.step = None;
            self.cursor += 1;
        }
    }

    /// Starts the step at the cursor. Returns `false` once everything is revealed.
    fn begin_step(&mut self) -> bool {
        if self.cursor >= self.content.len() {
            self.finish();
            return false;
        }

        let step = match &self.content {
            LineContent::Spoken(chars) => {
                let c = chars[self.cursor];
                if !c.is_whitespace() {
                    let voice = self.voice;
                    self.pulse(voice.pitch, voice.duration_millis, voice.volume);
                }
                Step {
                    remaining_ms: scale_millis(self.glyph_delay_ms, self.speed),
                    append: Some(c),
                }
            }
            LineContent::Sung(notes) => {
                let note = notes[self.cursor].clone();
                if !note.is_rest() {
                    let tone_ms = (note.duration_millis as f64 * SUNG_TONE_RATIO).round() as u64;
                    self.pulse(note.pitch, tone_ms, self.voice.volume);
                    self.visible.push_str(&note.lyric);
                }
                Step {
                    remaining_ms: scale_millis(note.duration_millis, self.speed),
                    append: None,
                }
            }
        };
        self.step = Some(step);
        true
    }

    fn pulse(&mut self, pitch: f32, duration_ms: u64, volume: f32) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        trace!("Pulse pitch={} {}ms", pitch, duration_ms);
        channel.play_beep(pitch, duration_ms, volume);
        self.pulses.push(Pulse { pitch, duration_ms, volume });
    }

    fn finish(&mut self) {
        if !self.finished {
            debug!("Typewriter finished: {:?}", self.visible);
        }
        self.finished = true;
    }

    fn release_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.release();
        }
    }
}
