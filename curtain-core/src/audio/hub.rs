use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use log::{debug, error, warn};
use super::{ChannelId, NullSink, SAMPLE_RATE, SynthesisKind, Synthesizer, Tone, ToneSink};

struct HubInner {
    sink: Rc<RefCell<dyn ToneSink>>,
    kind: SynthesisKind,
    master_volume: f32,
    seed: u64,
    next_channel: u64,
    open_channels: usize,
}

/// Hands out voice channels bound to one sink. Cloning shares the hub.
///
/// The synthesis backend can be switched at any time; channels already
/// handed out keep the synthesizer they were created with.
#[derive(Clone)]
pub struct AudioHub {
    inner: Rc<RefCell<HubInner>>,
}

impl AudioHub {
    pub fn new(sink: impl ToneSink + 'static) -> Self {
        Self::with_shared_sink(Rc::new(RefCell::new(sink)))
    }

    /// Lets the caller keep a handle to the sink, e.g. to inspect a `MemorySink`.
    pub fn with_shared_sink<S: ToneSink + 'static>(sink: Rc<RefCell<S>>) -> Self {
        let sink: Rc<RefCell<dyn ToneSink>> = sink;
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                sink,
                kind: SynthesisKind::default(),
                master_volume: 1.0,
                seed: 0x5eed,
                next_channel: 0,
                open_channels: 0,
            })),
        }
    }

    pub fn silent() -> Self {
        Self::new(NullSink)
    }

    pub fn kind(&self) -> SynthesisKind {
        self.inner.borrow().kind
    }

    pub fn set_kind(&self, kind: SynthesisKind) {
        let mut inner = self.inner.borrow_mut();
        if inner.kind != kind {
            debug!("Synthesis backend: {:?} -> {:?}", inner.kind, kind);
            inner.kind = kind;
        }
    }

    pub fn set_master_volume(&self, volume: f32) {
        self.inner.borrow_mut().master_volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
    }

    pub fn set_seed(&self, seed: u64) {
        self.inner.borrow_mut().seed = seed;
    }

    /// Channels acquired and not yet released.
    pub fn open_channels(&self) -> usize {
        self.inner.borrow().open_channels
    }

    pub fn acquire(&self) -> VoiceChannel {
        let mut inner = self.inner.borrow_mut();
        let id = ChannelId(inner.next_channel);
        inner.next_channel += 1;
        inner.open_channels += 1;
        let synth = inner.kind.build(inner.seed.wrapping_add(id.0));
        debug!("Voice channel {:?} acquired ({:?})", id, inner.kind);

        VoiceChannel {
            id,
            hub: self.clone(),
            synth,
            released: false,
        }
    }
}

impl fmt::Debug for AudioHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AudioHub")
            .field("kind", &inner.kind)
            .field("master_volume", &inner.master_volume)
            .field("open_channels", &inner.open_channels)
            .finish()
    }
}

/// A synthesizer bound to the hub's sink. Released exactly once, at the
/// latest when dropped.
pub struct VoiceChannel {
    id: ChannelId,
    hub: AudioHub,
    synth: Box<dyn Synthesizer>,
    released: bool,
}

impl VoiceChannel {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn kind(&self) -> SynthesisKind {
        self.synth.kind()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Renders and submits one tone. Sink failures are logged and swallowed.
    pub fn play_beep(&mut self, pitch: f32, duration_ms: u64, volume: f32) {
        if self.released {
            warn!("play_beep on released channel {:?}", self.id);
            return;
        }

        let (sink, master) = {
            let inner = self.hub.inner.borrow();
            (inner.sink.clone(), inner.master_volume)
        };
        let volume = volume * master;
        let wants_samples = sink.borrow().wants_samples();
        let samples = if wants_samples {
            self.synth.render(pitch, duration_ms, volume)
        } else {
            Vec::new()
        };
        let tone = Tone {
            kind: self.synth.kind(),
            pitch,
            duration_ms,
            volume,
            sample_rate: SAMPLE_RATE,
            samples,
        };

        let result = sink.borrow_mut().submit(self.id, &tone);
        if let Err(e) = result {
            error!("Tone on channel {:?} failed: {:#}", self.id, e);
        }
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let sink = {
            let mut inner = self.hub.inner.borrow_mut();
            inner.open_channels = inner.open_channels.saturating_sub(1);
            inner.sink.clone()
        };
        sink.borrow_mut().release(self.id);
        debug!("Voice channel {:?} released", self.id);
    }
}

impl Drop for VoiceChannel {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for VoiceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceChannel")
            .field("id", &self.id)
            .field("kind", &self.synth.kind())
            .field("released", &self.released)
            .finish()
    }
}
