use log::{debug, info};
use crate::runtime::{Choice, PlaybackSession, Scene};

/// Longest wait the engine will schedule, about 24 days.
pub const MAX_WAIT_MILLIS: u64 = i32::MAX as u64;
const MIN_SPEED: f32 = 0.1;

/// Speeds that are non-finite or not above 0.1 play at normal speed.
pub fn effective_speed(speed: f32) -> f32 {
    if speed.is_finite() && speed > MIN_SPEED { speed } else { 1.0 }
}

/// `millis / speed`, floored, never below 1 ms and never above `MAX_WAIT_MILLIS`.
pub fn scale_millis(millis: u64, speed: f32) -> u64 {
    let scaled = (millis as f64 / effective_speed(speed) as f64).floor();
    (scaled.min(MAX_WAIT_MILLIS as f64) as u64).max(1)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineState {
    #[default]
    Idle,
    Playing,
    AwaitingChoice,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineSignal {
    AdvancedScene(usize),
    ScriptEnded,
}

/// The first choice-carrying line of a scene and when its choices surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoicePoint {
    pub line_index: usize,
    pub choices: Vec<Choice>,
    pub wait_millis: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SceneTimeline {
    state: TimelineState,
    choice_settle_ms: u64,
}

impl SceneTimeline {
    pub fn new(choice_settle_ms: u64) -> Self {
        Self { state: TimelineState::Idle, choice_settle_ms }
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// A freshly loaded script always starts idle.
    pub fn reset(&mut self) {
        self.state = TimelineState::Idle;
    }

    pub fn play(&mut self, session: &mut PlaybackSession) {
        session.scene_index = 0;
        session.pending_choices = None;
        self.state = TimelineState::Playing;
        info!("Timeline playing ({} scenes)", session.scene_count());
    }

    pub fn stop(&mut self, session: &mut PlaybackSession) {
        session.pending_choices = None;
        if self.state != TimelineState::Ended {
            self.state = TimelineState::Idle;
        }
    }

    pub fn finish(&mut self, session: &mut PlaybackSession) {
        session.pending_choices = None;
        self.state = TimelineState::Ended;
    }

    pub fn advance(&mut self, session: &mut PlaybackSession) -> TimelineSignal {
        let index = session.scene_index;
        let last = session.scene_count().checked_sub(1);
        let ending = session.script.scene(index).is_none_or(|s| s.is_ending);

        if ending || last.is_none_or(|last| index >= last) {
            debug!("Timeline end reached at scene {}", index);
            self.finish(session);
            return TimelineSignal::ScriptEnded;
        }

        session.scene_index = index + 1;
        session.pending_choices = None;
        debug!("Timeline advanced to scene {}", session.scene_index);
        TimelineSignal::AdvancedScene(session.scene_index)
    }

    pub fn detect_choice(&self, scene: &Scene, speed: f32) -> Option<ChoicePoint> {
        scene.dialogues.iter().enumerate()
            .find(|(_, line)| line.has_choices())
            .map(|(line_index, line)| ChoicePoint {
                line_index,
                choices: line.choices.clone(),
                wait_millis: scale_millis(line.reveal_delay_millis.saturating_add(self.choice_settle_ms), speed),
            })
    }

    /// Surfaces the choices and halts auto-advance.
    pub fn await_choice(&mut self, session: &mut PlaybackSession, choices: Vec<Choice>) {
        if self.state != TimelineState::Playing {
            return;
        }
        session.pending_choices = Some(choices);
        self.state = TimelineState::AwaitingChoice;
    }

    /// Jumps straight to the choice's target. A target past the last scene ends the script.
    pub fn select_choice(&mut self, session: &mut PlaybackSession, choice: &Choice) -> TimelineSignal {
        session.pending_choices = None;
        if choice.target_scene_index >= session.scene_count() {
            debug!("Choice target {} is out of range", choice.target_scene_index);
            self.finish(session);
            return TimelineSignal::ScriptEnded;
        }

        session.scene_index = choice.target_scene_index;
        self.state = TimelineState::Playing;
        TimelineSignal::AdvancedScene(session.scene_index)
    }

    pub fn scene_wait(&self, scene: &Scene, speed: f32) -> u64 {
        scale_millis(scene.duration_millis, speed)
    }
}
