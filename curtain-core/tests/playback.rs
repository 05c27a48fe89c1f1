use std::cell::RefCell;
use std::rc::Rc;

use curtain_core::audio::{AudioHub, MemorySink};
use curtain_core::config::PlaybackConfig;
use curtain_core::event::{EndReason, OutputEvent};
use curtain_core::playback::timeline::{TimelineSignal, TimelineState};
use curtain_core::playback::{scale_millis, MAX_WAIT_MILLIS};
use curtain_core::{Choice, DialogueLine, PlaybackController, Scene, Script};

fn scene(duration_millis: u64) -> Scene {
    Scene { background: "park".into(), duration_millis, ..Scene::default() }
}

fn script(scenes: usize, duration_millis: u64) -> Script {
    Script::new((0..scenes).map(|_| scene(duration_millis)).collect())
}

fn controller() -> PlaybackController {
    let config = PlaybackConfig { seed: Some(1), ..PlaybackConfig::default() };
    PlaybackController::new(config, AudioHub::silent())
}

fn ends(events: &[OutputEvent]) -> Vec<EndReason> {
    events.iter()
        .filter_map(|e| match e {
            OutputEvent::End { reason } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn play_requires_a_script() {
    let mut ctl = controller();
    assert!(ctl.play().is_err());
    assert!(!ctl.is_playing());
}

#[test]
fn advancing_walks_scenes_then_ends() {
    let mut ctl = controller();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let seen = reasons.clone();
    ctl.on_complete(move |reason| seen.borrow_mut().push(reason));

    ctl.load_script(script(3, 1000));
    ctl.play().unwrap();
    assert_eq!(ctl.scene_index(), Some(0));

    assert_eq!(ctl.advance(), Some(TimelineSignal::AdvancedScene(1)));
    assert_eq!(ctl.advance(), Some(TimelineSignal::AdvancedScene(2)));
    assert_eq!(ctl.advance(), Some(TimelineSignal::ScriptEnded));

    assert!(!ctl.is_playing());
    assert_eq!(ctl.state(), TimelineState::Ended);
    assert_eq!(*reasons.borrow(), vec![EndReason::Finished]);
    assert!(ctl.play().is_err(), "an ended script needs reloading");
    assert_eq!(ctl.advance(), None);
}

#[test]
fn ending_scene_stops_early() {
    let mut ctl = controller();
    let mut s = script(3, 1000);
    s.scenes[1].is_ending = true;
    ctl.load_script(s);
    ctl.play().unwrap();

    assert_eq!(ctl.advance(), Some(TimelineSignal::AdvancedScene(1)));
    assert_eq!(ctl.advance(), Some(TimelineSignal::ScriptEnded));
}

#[test]
fn scenes_auto_advance_after_their_duration() {
    let mut ctl = controller();
    ctl.load_script(script(2, 1000));
    ctl.play().unwrap();

    ctl.update(999);
    assert_eq!(ctl.scene_index(), Some(0));
    ctl.update(1);
    assert_eq!(ctl.scene_index(), Some(1));

    ctl.update(1000);
    assert_eq!(ctl.state(), TimelineState::Ended);
    assert_eq!(ends(&ctl.drain_events()), vec![EndReason::Finished]);
}

#[test]
fn a_long_tick_crosses_several_scenes() {
    let mut ctl = controller();
    ctl.load_script(script(4, 500));
    ctl.play().unwrap();

    ctl.update(1200);
    assert_eq!(ctl.scene_index(), Some(2));
}

#[test]
fn double_speed_halves_scene_waits() {
    let mut ctl = controller();
    ctl.load_script(script(2, 1000));
    ctl.set_speed(2.0);
    ctl.play().unwrap();

    ctl.update(499);
    assert_eq!(ctl.scene_index(), Some(0));
    ctl.update(1);
    assert_eq!(ctl.scene_index(), Some(1));
}

#[test]
fn degenerate_speeds_play_at_normal_speed() {
    for speed in [0.0, -2.0, 0.1, 0.05, f32::NAN, f32::INFINITY] {
        let mut ctl = controller();
        ctl.load_script(script(2, 1000));
        ctl.set_speed(speed);
        ctl.play().unwrap();

        ctl.update(999);
        assert_eq!(ctl.scene_index(), Some(0), "speed {speed}");
        ctl.update(1);
        assert_eq!(ctl.scene_index(), Some(1), "speed {speed}");
    }
}

#[test]
fn scaled_waits_are_clamped() {
    assert_eq!(scale_millis(1000, 1.5), 666);
    assert_eq!(scale_millis(1, 2.0), 1);
    assert_eq!(scale_millis(0, 1.0), 1);
    assert_eq!(scale_millis(u64::MAX, 1.0), MAX_WAIT_MILLIS);
    assert_eq!(scale_millis(3000, f32::NAN), 3000);
}

#[test]
fn speed_cycles_through_the_three_steps() {
    let mut ctl = controller();
    assert_eq!(ctl.cycle_speed(), 1.5);
    assert_eq!(ctl.cycle_speed(), 2.0);
    assert_eq!(ctl.cycle_speed(), 1.0);
}

fn choice_script() -> Script {
    let mut first = scene(1000);
    let mut line = DialogueLine::new("Left or right?");
    line.reveal_delay_millis = 500;
    line.choices = vec![Choice::new("Left", 2), Choice::new("Right", 1), Choice::new("Nowhere", 9)];
    first.dialogues.push(line);
    Script::new(vec![first, scene(1000), scene(1000)])
}

#[test]
fn choices_halt_auto_advance_until_picked() {
    let mut ctl = controller();
    ctl.load_script(choice_script());
    ctl.play().unwrap();

    ctl.update(2499);
    assert_eq!(ctl.state(), TimelineState::Playing);
    ctl.update(1);
    assert_eq!(ctl.state(), TimelineState::AwaitingChoice);
    assert!(ctl.drain_events().iter().any(|e| matches!(e, OutputEvent::ShowChoice { options } if options.len() == 3)));

    ctl.update(60_000);
    assert_eq!(ctl.scene_index(), Some(0));
    assert_eq!(ctl.state(), TimelineState::AwaitingChoice);

    assert!(!ctl.select_choice(5), "not one of the offered targets");
    assert!(ctl.select_choice(2));
    assert_eq!(ctl.scene_index(), Some(2));
    assert_eq!(ctl.state(), TimelineState::Playing);
    assert!(ctl.session().unwrap().pending_choices.is_none());

    assert!(!ctl.select_choice(2), "nothing pending any more");
}

#[test]
fn choice_past_the_last_scene_ends_the_script() {
    let mut ctl = controller();
    ctl.load_script(choice_script());
    ctl.play().unwrap();
    ctl.update(2500);

    assert!(ctl.select_choice(9));
    assert_eq!(ctl.state(), TimelineState::Ended);
    assert!(!ctl.is_playing());
}

#[test]
fn speed_change_while_awaiting_keeps_the_choices() {
    let mut ctl = controller();
    ctl.load_script(choice_script());
    ctl.play().unwrap();
    ctl.update(2500);

    ctl.set_speed(2.0);
    assert_eq!(ctl.state(), TimelineState::AwaitingChoice);
    ctl.update(60_000);
    assert_eq!(ctl.scene_index(), Some(0));
    assert!(ctl.select_choice(1));
}

#[test]
fn stop_resets_and_falls_back_to_the_idle_script() {
    let mut ctl = controller();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let seen = reasons.clone();
    ctl.on_complete(move |reason| seen.borrow_mut().push(reason));

    let mut idle = script(1, 1000);
    idle.title = "idle".into();
    ctl.set_idle_script(idle);
    ctl.load_script(script(3, 1000));
    ctl.play().unwrap();
    ctl.update(1500);
    ctl.drain_events();

    ctl.stop();
    ctl.stop();

    assert!(!ctl.is_playing());
    assert_eq!(ctl.state(), TimelineState::Idle);
    assert_eq!(ctl.scene_index(), Some(0));
    assert_eq!(ctl.session().unwrap().script.title, "idle");
    assert_eq!(*reasons.borrow(), vec![EndReason::Stopped]);
    assert_eq!(ends(&ctl.drain_events()), vec![EndReason::Stopped]);

    ctl.play().unwrap();
    assert!(ctl.is_playing());
}

#[test]
fn stale_timers_never_fire_after_a_reload() {
    let mut ctl = controller();
    ctl.load_script(script(3, 1000));
    ctl.play().unwrap();
    ctl.update(900);

    ctl.load_script(script(3, 1000));
    ctl.update(5000);
    assert_eq!(ctl.scene_index(), Some(0));
    assert_eq!(ctl.state(), TimelineState::Idle);
}

#[test]
fn tones_are_recorded_while_lines_reveal() {
    let sink = Rc::new(RefCell::new(MemorySink::default()));
    let config = PlaybackConfig { seed: Some(3), ..PlaybackConfig::default() };
    let mut ctl = PlaybackController::new(config, AudioHub::with_shared_sink(sink.clone()));

    let mut s = scene(5000);
    s.dialogues.push(DialogueLine::new("Hey"));
    ctl.load_script(Script::new(vec![s]));
    ctl.play().unwrap();
    ctl.update(1000);

    assert_eq!(sink.borrow().tones.len(), 3);
    let events = ctl.drain_events();
    assert_eq!(events.iter().filter(|e| matches!(e, OutputEvent::Tone { .. })).count(), 3);
    assert!(events.iter().any(|e| matches!(e, OutputEvent::LineCompleted { text, .. } if text == "Hey")));
}
