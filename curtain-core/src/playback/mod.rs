pub mod timeline;
pub mod timer;
pub mod typewriter;
pub mod interaction;
pub mod lines;

use std::collections::VecDeque;
use std::sync::Arc;
use anyhow::bail;
use log::{debug, error, info, warn};

use crate::audio::{AudioHub, SynthesisKind};
use crate::config::{AudioConfig, PlaybackConfig};
use crate::event::{EndReason, InputEvent, OutputEvent};
use crate::renderer::frame::{AssetCatalog, CharacterView, DebugOverlay, InteractionView, LineView, StageFrame, resolve_asset};
use crate::runtime::{AnimationName, DialogueLine, InteractionLine, PlaybackSession, Scene, Script};
use interaction::{ClickOutcome, InteractionEmotionEngine};
use timeline::{SceneTimeline, TimelineSignal, TimelineState, effective_speed};
use timer::{TimerKey, TimerKind, TimerSet};
use typewriter::{LineContent, Pulse, TypewriterSequencer};

pub use timeline::{scale_millis, MAX_WAIT_MILLIS};

/// Speeds a host is expected to offer.
pub const SPEED_STEPS: [f32; 3] = [1.0, 1.5, 2.0];

/// Like `scale_millis` but lets a zero delay stay zero.
fn scaled_delay(millis: u64, speed: f32) -> u64 {
    if millis == 0 { 0 } else { scale_millis(millis, speed) }
}

struct LineRuntime {
    visible: bool,
    reported: bool,
    typewriter: TypewriterSequencer,
}

impl LineRuntime {
    fn new(line: &DialogueLine, scene: &Scene, speed: f32, audio: &AudioHub) -> Self {
        let voice = line.voice.or_else(|| {
            line.speaker.as_deref()
                .and_then(|speaker| scene.speaker(speaker))
                .and_then(|c| c.voice)
        });
        let glyph_delay = voice.map_or(line.per_glyph_delay_millis, |v| v.speed);

        Self {
            visible: false,
            reported: false,
            typewriter: TypewriterSequencer::new(
                LineContent::from_line(line),
                voice.unwrap_or_default(),
                glyph_delay,
                speed,
                audio.clone(),
            ),
        }
    }
}

struct InteractionRuntime {
    character_id: String,
    typewriter: TypewriterSequencer,
    linger_left: Option<u64>,
}

/// The state machine a host talks to: load a script, play it, click around
/// while it is idle. Time only moves through `update`.
pub struct PlaybackController {
    session: Option<PlaybackSession>,
    idle_script: Option<Arc<Script>>,
    timeline: SceneTimeline,
    timers: TimerSet,
    lines: Vec<LineRuntime>,
    interaction: Option<InteractionRuntime>,
    emotions: InteractionEmotionEngine,
    audio: AudioHub,
    config: PlaybackConfig,
    speed: f32,
    clock_ms: u64,
    events: VecDeque<OutputEvent>,
    on_complete: Option<Box<dyn FnMut(EndReason)>>,
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig, audio: AudioHub) -> Self {
        if let Some(seed) = config.seed {
            audio.set_seed(seed);
        }
        Self {
            session: None,
            idle_script: None,
            timeline: SceneTimeline::new(config.choice_settle_ms),
            timers: TimerSet::new(),
            lines: Vec::new(),
            interaction: None,
            emotions: InteractionEmotionEngine::new(config.seed, config.stale_click_ms, config.anger_cooldown_streak),
            audio,
            speed: config.default_speed,
            config,
            clock_ms: 0,
            events: VecDeque::new(),
            on_complete: None,
        }
    }

    /// Builds a controller from the `[playback]` and `[audio]` sections of the shared config.
    pub fn from_shared_config(audio: AudioHub) -> Self {
        let playback: PlaybackConfig = curtain_shared::config::get("playback");
        let audio_cfg: AudioConfig = curtain_shared::config::get("audio");
        audio.set_kind(audio_cfg.backend);
        audio.set_master_volume(audio_cfg.master_volume);
        Self::new(playback, audio)
    }

    pub fn set_idle_script(&mut self, script: impl Into<Arc<Script>>) {
        self.idle_script = Some(script.into());
    }

    pub fn on_complete(&mut self, callback: impl FnMut(EndReason) + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> TimelineState {
        self.timeline.state()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing)
    }

    pub fn scene_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.scene_index)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn audio(&self) -> &AudioHub {
        &self.audio
    }

    pub fn interaction(&self) -> Option<&InteractionLine> {
        self.session.as_ref().and_then(|s| s.interaction.current.as_ref())
    }

    pub fn drain_events(&mut self) -> Vec<OutputEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: OutputEvent) {
        self.events.push_back(event);
    }

    /// Replaces whatever was loaded. All timers, channels and counters start over.
    pub fn load_script(&mut self, script: impl Into<Arc<Script>>) {
        let script = script.into();
        self.teardown();
        info!("Script loaded: '{}' ({} scenes)", script.title, script.len());

        let scenes = script.len();
        let background = script.scene(0).map(|s| s.background.clone());
        self.session = Some(PlaybackSession::new(script, self.speed));
        self.timeline.reset();

        self.emit(OutputEvent::ScriptLoaded { scenes });
        if let Some(background) = background {
            self.emit(OutputEvent::SceneChanged { index: 0, background });
        }
    }

    pub fn play(&mut self) -> anyhow::Result<()> {
        let Some(session) = self.session.as_ref() else {
            bail!("play() needs a loaded script");
        };
        if self.timeline.state() == TimelineState::Ended {
            bail!("script has ended, load a new one to play again");
        }
        if session.script.is_empty() {
            bail!("script '{}' has no scenes", session.script.title);
        }

        self.dismiss_interaction();
        if let Some(session) = self.session.as_mut() {
            self.timeline.play(session);
            session.is_playing = true;
        }
        self.emit(OutputEvent::PlaybackStarted);
        self.enter_scene();
        Ok(())
    }

    /// Returns to the idle script. A no-op when nothing is playing.
    pub fn stop(&mut self) {
        let Some(session) = self.session.as_mut() else { return };
        if !session.is_playing {
            debug!("stop() while not playing");
            return;
        }

        session.is_playing = false;
        session.scene_index = 0;
        self.timeline.stop(session);
        self.teardown();
        info!("Playback stopped");
        self.finish_with(EndReason::Stopped);
    }

    pub fn script_ended(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.is_playing = false;
            self.timeline.finish(session);
        }
        self.teardown();
        info!("Script ended");
        self.finish_with(EndReason::Finished);
    }

    fn finish_with(&mut self, reason: EndReason) {
        self.emit(OutputEvent::End { reason });
        if let Some(callback) = self.on_complete.as_mut() {
            callback(reason);
        }
        if let Some(idle) = self.idle_script.clone() {
            debug!("Falling back to idle script '{}'", idle.title);
            self.load_script(idle);
        }
    }

    /// Moves to the next scene, or ends the script. Ignored unless playing.
    pub fn advance(&mut self) -> Option<TimelineSignal> {
        let session = self.session.as_mut().filter(|s| s.is_playing)?;
        let signal = self.timeline.advance(session);
        match signal {
            TimelineSignal::AdvancedScene(_) => self.enter_scene(),
            TimelineSignal::ScriptEnded => self.script_ended(),
        }
        Some(signal)
    }

    pub fn set_speed(&mut self, multiplier: f32) {
        if !SPEED_STEPS.contains(&multiplier) {
            warn!("Unusual speed {} (plays as {})", multiplier, effective_speed(multiplier));
        }
        self.speed = multiplier;
        if let Some(session) = self.session.as_mut() {
            session.speed_multiplier = multiplier;
        }
        self.emit(OutputEvent::SpeedChanged { multiplier });

        if let Some(rt) = self.interaction.as_mut() {
            rt.typewriter.sync(true, multiplier);
            let pulses = rt.typewriter.take_pulses();
            self.emit_pulses(pulses);
        }

        if self.is_playing() {
            let key = TimerKey { scene_index: self.scene_index().unwrap_or(0), speed: multiplier };
            if self.timers.key() != Some(key) {
                self.enter_scene();
            }
        }
    }

    /// 1.0 → 1.5 → 2.0 → 1.0
    pub fn cycle_speed(&mut self) -> f32 {
        let next = SPEED_STEPS.iter()
            .position(|s| *s == self.speed)
            .map_or(SPEED_STEPS[0], |i| SPEED_STEPS[(i + 1) % SPEED_STEPS.len()]);
        self.set_speed(next);
        next
    }

    pub fn set_synthesis_kind(&mut self, kind: SynthesisKind) {
        self.audio.set_kind(kind);
        self.emit(OutputEvent::BackendChanged { kind });
    }

    /// Only the choices currently on screen can be picked, by their target scene.
    pub fn select_choice(&mut self, target_scene_index: usize) -> bool {
        if self.timeline.state() != TimelineState::AwaitingChoice {
            debug!("select_choice({}) with no choice pending", target_scene_index);
            return false;
        }
        let Some(session) = self.session.as_mut() else { return false };
        let choice = session.pending_choices.as_ref()
            .and_then(|choices| choices.iter().find(|c| c.target_scene_index == target_scene_index))
            .cloned();
        let Some(choice) = choice else {
            warn!("No pending choice targets scene {}", target_scene_index);
            return false;
        };

        info!("Choice '{}' -> scene {}", choice.label, target_scene_index);
        let signal = self.timeline.select_choice(session, &choice);
        self.emit(OutputEvent::ChoiceResolved { target_scene_index });
        match signal {
            TimelineSignal::AdvancedScene(_) => self.enter_scene(),
            TimelineSignal::ScriptEnded => self.script_ended(),
        }
        true
    }

    /// Clicking only reacts while nothing is playing. Returns `true` when a
    /// line is now showing.
    pub fn on_character_clicked(&mut self, character_id: &str) -> bool {
        let Some(session) = self.session.as_mut() else { return false };
        if session.is_playing {
            debug!("Click on '{}' ignored while playing", character_id);
            return false;
        }
        let gender = match session.script.scene(session.scene_index).and_then(|s| s.character(character_id)) {
            Some(character) => character.gender(),
            None => {
                warn!("Click on unknown character '{}'", character_id);
                return false;
            }
        };

        match self.emotions.on_click(&mut session.interaction, character_id, gender, self.clock_ms) {
            ClickOutcome::Cooldown => {
                self.interaction = None;
                self.emit(OutputEvent::InteractionCooldown { character_id: character_id.to_string() });
                false
            }
            ClickOutcome::Line(line) => self.show_interaction(line),
        }
    }

    fn show_interaction(&mut self, line: InteractionLine) -> bool {
        let mut typewriter = TypewriterSequencer::new(
            LineContent::spoken(&line.text),
            line.voice,
            line.voice.speed,
            self.speed,
            self.audio.clone(),
        );
        if typewriter.is_blank() {
            self.dismiss_interaction();
            return false;
        }

        typewriter.set_gate(true);
        let pulses = typewriter.take_pulses();
        self.interaction = Some(InteractionRuntime {
            character_id: line.character_id.clone(),
            typewriter,
            linger_left: None,
        });
        self.emit(OutputEvent::InteractionShown {
            character_id: line.character_id,
            text: line.text,
            emotion: line.emotion,
        });
        self.emit_pulses(pulses);
        true
    }

    /// Tap to complete: every line already typing, and the interaction
    /// bubble, jumps to its full text. Returns `true` if anything moved.
    pub fn skip_line(&mut self) -> bool {
        let mut skipped = false;
        for line in self.lines.iter_mut().filter(|l| l.visible) {
            if line.typewriter.is_gate_open() && !line.typewriter.is_finished() {
                line.typewriter.skip();
                skipped = true;
            }
        }
        if let Some(rt) = self.interaction.as_mut().filter(|rt| !rt.typewriter.is_finished()) {
            rt.typewriter.skip();
            skipped = true;
        }
        if skipped {
            debug!("Skipped to the end of the current lines");
            self.collect_line_output();
        }
        skipped
    }

    pub fn dismiss_interaction(&mut self) {
        let had_line = self.interaction.take().is_some();
        let had_state = self.session.as_mut()
            .and_then(|s| s.interaction.current.take())
            .is_some();
        if had_line || had_state {
            self.emit(OutputEvent::InteractionDismissed);
        }
    }

    pub fn feed(&mut self, input: InputEvent) {
        match input {
            InputEvent::Play => {
                if let Err(e) = self.play() {
                    error!("Play rejected: {:#}", e);
                }
            }
            InputEvent::Stop => self.stop(),
            InputEvent::SetSpeed { multiplier } => self.set_speed(multiplier),
            InputEvent::CharacterClicked { id } => {
                self.on_character_clicked(&id);
            }
            InputEvent::DismissInteraction => self.dismiss_interaction(),
            InputEvent::SkipLine => {
                self.skip_line();
            }
            InputEvent::SelectChoice { target_scene_index } => {
                self.select_choice(target_scene_index);
            }
            InputEvent::SetBackend { kind } => self.set_synthesis_kind(kind),
        }
    }

    /// Advances the clock by `dt_ms`, firing timers in order and feeding the
    /// elapsed time to every revealing line in between.
    pub fn update(&mut self, dt_ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(dt_ms);

        let mut budget = dt_ms;
        loop {
            self.fire_due();
            let step = match self.timers.next_due_in() {
                Some(0) => continue,
                Some(due) => due.min(budget),
                None => budget,
            };
            if step == 0 {
                break;
            }
            self.tick_lines(step);
            self.timers.advance_clock(step);
            budget -= step;
        }

        self.tick_interaction(dt_ms);
    }

    fn fire_due(&mut self) {
        let generation = self.timers.generation();
        for kind in self.timers.take_due() {
            if self.timers.generation() != generation {
                break;
            }
            self.on_timer(kind);
        }
    }

    fn on_timer(&mut self, kind: TimerKind) {
        debug!("Timer fired: {:?}", kind);
        match kind {
            TimerKind::SceneDuration => {
                self.advance();
            }
            TimerKind::ChoiceReveal => {
                let Some(session) = self.session.as_mut() else { return };
                let script = session.script.clone();
                let point = script.scene(session.scene_index)
                    .and_then(|scene| self.timeline.detect_choice(scene, self.speed));
                if let Some(point) = point {
                    self.timeline.await_choice(session, point.choices.clone());
                    self.emit(OutputEvent::ShowChoice { options: point.choices });
                }
            }
            TimerKind::LineReveal(index) => {
                let scene_index = self.scene_index().unwrap_or(0);
                let speaker = self.current_scene()
                    .and_then(|s| s.dialogues.get(index))
                    .and_then(|l| l.speaker.clone());
                let Some(line) = self.lines.get_mut(index) else { return };
                line.visible = true;
                self.timers.arm(TimerKind::BubbleEntrance(index), scaled_delay(self.config.bubble_entrance_ms, self.speed));
                self.emit(OutputEvent::LineShown { scene_index, line_index: index, speaker });
            }
            TimerKind::BubbleEntrance(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.typewriter.set_gate(true);
                }
                self.collect_line_output();
            }
        }
    }

    fn current_scene(&self) -> Option<&Scene> {
        let session = self.session.as_ref()?;
        session.script.scene(session.scene_index)
    }

    /// Tears down the old scene's timers and lines and arms the current one's.
    fn enter_scene(&mut self) {
        let Some(session) = self.session.as_ref() else { return };
        let script = session.script.clone();
        let index = session.scene_index;
        let Some(scene) = script.scene(index) else {
            warn!("Scene {} is out of range", index);
            self.script_ended();
            return;
        };

        let speed = self.speed;
        self.timers.cancel_all();
        self.timers.sync(TimerKey { scene_index: index, speed });
        self.lines = scene.dialogues.iter()
            .map(|line| LineRuntime::new(line, scene, speed, &self.audio))
            .collect();

        for (i, line) in scene.dialogues.iter().enumerate() {
            self.timers.arm(TimerKind::LineReveal(i), scaled_delay(line.reveal_delay_millis, speed));
        }

        match self.timeline.state() {
            TimelineState::AwaitingChoice => {}
            _ => match self.timeline.detect_choice(scene, speed) {
                Some(point) => {
                    debug!("Scene {} halts for a choice on line {}", index, point.line_index);
                    self.timers.arm(TimerKind::ChoiceReveal, point.wait_millis);
                }
                None => {
                    self.timers.arm(TimerKind::SceneDuration, self.timeline.scene_wait(scene, speed));
                }
            },
        }

        info!("Scene {} ({})", index, scene.background);
        self.emit(OutputEvent::SceneChanged { index, background: scene.background.clone() });
    }

    fn tick_lines(&mut self, dt_ms: u64) {
        for line in self.lines.iter_mut().filter(|l| l.visible) {
            line.typewriter.update(dt_ms);
        }
        self.collect_line_output();
    }

    fn collect_line_output(&mut self) {
        let Some(session) = self.session.as_ref() else { return };
        let script = session.script.clone();
        let scene_index = session.scene_index;
        let scene = script.scene(scene_index);

        let mut out = Vec::new();
        for (i, line) in self.lines.iter_mut().enumerate() {
            for pulse in line.typewriter.take_pulses() {
                out.push(pulse_event(pulse));
            }
            if line.visible && !line.reported && line.typewriter.is_finished() && !line.typewriter.is_blank() {
                line.reported = true;
                out.push(OutputEvent::LineCompleted {
                    scene_index,
                    line_index: i,
                    speaker: scene.and_then(|s| s.dialogues.get(i)).and_then(|l| l.speaker.clone()),
                    text: line.typewriter.visible_text().to_string(),
                });
            }
        }
        self.events.extend(out);
    }

    fn tick_interaction(&mut self, dt_ms: u64) {
        let linger = self.config.interaction_linger_ms;
        let Some(rt) = self.interaction.as_mut() else { return };

        rt.typewriter.update(dt_ms);
        let pulses = rt.typewriter.take_pulses();
        let expired = match rt.linger_left {
            Some(left) => {
                let left = left.saturating_sub(dt_ms);
                rt.linger_left = Some(left);
                left == 0
            }
            None => {
                if rt.typewriter.is_finished() {
                    rt.linger_left = Some(linger);
                }
                false
            }
        };

        self.emit_pulses(pulses);
        if expired {
            debug!("Interaction line lingered out");
            self.dismiss_interaction();
        }
    }

    fn emit_pulses(&mut self, pulses: Vec<Pulse>) {
        for pulse in pulses {
            self.emit(pulse_event(pulse));
        }
    }

    fn teardown(&mut self) {
        self.timers.cancel_all();
        self.lines.clear();
        self.interaction = None;
    }

    /// Read-only snapshot for the host to draw.
    pub fn frame(&self, catalog: &dyn AssetCatalog) -> StageFrame {
        let Some(session) = self.session.as_ref() else {
            return StageFrame::empty(self.timeline.state());
        };
        let scene = session.script.scene(session.scene_index);
        let current = session.interaction.current.as_ref();

        let characters = scene.map(|scene| {
            scene.characters.iter().map(|c| {
                let talking = scene.dialogues.iter().zip(&self.lines).any(|(line, rt)| {
                    rt.visible
                        && rt.typewriter.is_gate_open()
                        && !rt.typewriter.is_finished()
                        && line.speaker.as_deref().is_some_and(|s| s == c.id || s == c.name)
                });
                let reacting = current.filter(|i| i.character_id == c.id);

                let (asset, animation, frame) = match &c.sprite {
                    Some(sprite) => {
                        let animation = match reacting {
                            Some(line) => line.animation,
                            None if talking && sprite.animation == AnimationName::Idle => AnimationName::Speaking,
                            None => sprite.animation,
                        };
                        let frame = sprite.frame_at(self.clock_ms);
                        (resolve_asset(catalog, &sprite.asset_key(animation, frame)), Some(animation), frame)
                    }
                    None => (resolve_asset(catalog, c.image.as_deref().unwrap_or(&c.id)), None, 0),
                };

                CharacterView {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    position: c.position,
                    transform: c.transform,
                    asset,
                    animation,
                    frame,
                }
            }).collect()
        }).unwrap_or_default();

        let lines = scene.map(|scene| {
            scene.dialogues.iter().zip(&self.lines).enumerate()
                .filter(|(_, (_, rt))| rt.visible && !rt.typewriter.is_blank())
                .map(|(index, (line, rt))| LineView {
                    index,
                    speaker: line.speaker.clone(),
                    position: line.position,
                    text: rt.typewriter.visible_text().to_string(),
                    finished: rt.typewriter.is_finished(),
                })
                .collect()
        }).unwrap_or_default();

        let interaction = self.interaction.as_ref().map(|rt| InteractionView {
            character_id: rt.character_id.clone(),
            text: rt.typewriter.visible_text().to_string(),
            emotion: current.map(|i| i.emotion),
        });

        let debug = session.script.debug_mode.then(|| DebugOverlay {
            state: self.timeline.state(),
            clock_ms: self.clock_ms,
            speed: effective_speed(self.speed),
            timers: self.timers.snapshot(),
            open_channels: self.audio.open_channels(),
        });

        StageFrame {
            state: self.timeline.state(),
            scene_index: Some(session.scene_index),
            background: scene.map(|s| resolve_asset(catalog, &s.background)),
            characters,
            lines,
            choices: session.pending_choices.clone(),
            interaction,
            debug,
        }
    }
}

fn pulse_event(pulse: Pulse) -> OutputEvent {
    OutputEvent::Tone { pitch: pulse.pitch, duration_ms: pulse.duration_ms, volume: pulse.volume }
}
