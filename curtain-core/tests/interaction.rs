use curtain_core::audio::AudioHub;
use curtain_core::config::PlaybackConfig;
use curtain_core::event::OutputEvent;
use curtain_core::playback::interaction::{ClickOutcome, InteractionEmotionEngine, select_emotion};
use curtain_core::playback::lines::voice_for;
use curtain_core::renderer::frame::AnyAsset;
use curtain_core::runtime::{
    AnimationName, Character, Emotion, Gender, InteractionState, SpriteAnimationState,
};
use curtain_core::{PlaybackController, Scene, Script};

fn engine(seed: u64) -> InteractionEmotionEngine {
    InteractionEmotionEngine::new(Some(seed), 5000, 3)
}

fn stage() -> Script {
    let anna = Character {
        id: "anna".into(),
        name: "Anna".into(),
        sprite: Some(SpriteAnimationState::new(Gender::Female, AnimationName::Idle)),
        ..Character::default()
    };
    let ben = Character { id: "ben".into(), name: "Ben".into(), ..Character::default() };
    let scene = Scene { background: "room".into(), characters: vec![anna, ben], ..Scene::default() };
    Script::new(vec![scene, Scene::default()])
}

fn controller() -> PlaybackController {
    let config = PlaybackConfig { seed: Some(42), ..PlaybackConfig::default() };
    let mut ctl = PlaybackController::new(config, AudioHub::silent());
    ctl.load_script(stage());
    ctl
}

#[test]
fn first_clicks_are_mostly_calm() {
    let mut engine = engine(2024);
    let trials = 10_000;
    let normal = (0..trials).filter(|_| engine.roll(1) == Emotion::Normal).count();
    let share = normal as f64 / trials as f64;
    assert!((0.67..=0.73).contains(&share), "normal share {share}");
}

#[test]
fn emotion_bands() {
    assert_eq!(select_emotion(1, 0.69), Emotion::Normal);
    assert_eq!(select_emotion(2, 0.71), Emotion::Happy);
    assert_eq!(select_emotion(4, 0.85), Emotion::Annoyed);
    assert_eq!(select_emotion(9, 0.1), Emotion::Annoyed);
    assert_eq!(select_emotion(9, 0.8), Emotion::Angry);
    assert_eq!(select_emotion(30, 0.1), Emotion::Angry);
    assert_eq!(select_emotion(30, 0.9), Emotion::Annoyed);
}

#[test]
fn anger_streak_triggers_a_cooldown() {
    let mut engine = engine(1);
    let mut state = InteractionState::default();
    state.counters_mut(Gender::Male).clicks = 14;
    state.counters_mut(Gender::Male).angry_streak = 3;

    assert_eq!(engine.on_click(&mut state, "ben", Gender::Male, 100), ClickOutcome::Cooldown);
    assert_eq!(state.counters(Gender::Male).clicks, 0);
    assert_eq!(state.counters(Gender::Male).angry_streak, 0);
    assert!(state.current.is_none());

    match engine.on_click(&mut state, "ben", Gender::Male, 200) {
        ClickOutcome::Line(line) => assert_eq!(line.character_id, "ben"),
        ClickOutcome::Cooldown => panic!("counters were reset"),
    }
    assert_eq!(state.counters(Gender::Male).clicks, 1);
}

#[test]
fn genders_count_separately() {
    let mut engine = engine(5);
    let mut state = InteractionState::default();
    for t in 0..4 {
        engine.on_click(&mut state, "ben", Gender::Male, t * 100);
    }
    engine.on_click(&mut state, "anna", Gender::Female, 500);

    assert_eq!(state.counters(Gender::Male).clicks, 4);
    assert_eq!(state.counters(Gender::Female).clicks, 1);
}

#[test]
fn idle_gap_forgets_the_counters() {
    let mut engine = engine(7);
    let mut state = InteractionState::default();
    for t in 0..6 {
        engine.on_click(&mut state, "anna", Gender::Female, t * 1000);
    }
    assert_eq!(state.counters(Gender::Female).clicks, 6);

    engine.on_click(&mut state, "anna", Gender::Female, 5000 + 5001);
    assert_eq!(state.counters(Gender::Female).clicks, 1);
    assert_eq!(state.last_click_millis, Some(10_001));
}

#[test]
fn female_voices_sit_higher() {
    for emotion in [Emotion::Normal, Emotion::Happy, Emotion::Annoyed, Emotion::Angry] {
        assert!(voice_for(emotion, Gender::Female).pitch > voice_for(emotion, Gender::Male).pitch);
    }
}

#[test]
fn clicks_are_ignored_while_playing() {
    let mut ctl = controller();
    ctl.play().unwrap();
    assert!(!ctl.on_character_clicked("anna"));
    assert!(ctl.interaction().is_none());
}

#[test]
fn unknown_characters_do_nothing() {
    let mut ctl = controller();
    assert!(!ctl.on_character_clicked("nobody"));
}

#[test]
fn click_shows_a_line_and_sets_the_animation() {
    let mut ctl = controller();
    assert!(ctl.on_character_clicked("anna"));

    let line = ctl.interaction().cloned().unwrap();
    assert_eq!(line.character_id, "anna");
    assert!(!line.text.trim().is_empty());
    assert!(ctl.drain_events().iter().any(|e| matches!(e, OutputEvent::InteractionShown { character_id, .. } if character_id == "anna")));

    ctl.update(5000);
    let frame = ctl.frame(&AnyAsset);
    let anna = frame.character("anna").unwrap();
    assert_eq!(anna.animation, Some(line.animation));
    assert_eq!(anna.asset, format!("female_{}_{}", line.animation.as_str(), anna.frame));
    assert_eq!(frame.interaction.as_ref().map(|i| i.text.as_str()), Some(line.text.as_str()));

    let ben = frame.character("ben").unwrap();
    assert_eq!(ben.animation, None);
    assert_eq!(ben.asset, "ben");
}

#[test]
fn interaction_lines_dismiss_themselves() {
    let mut ctl = controller();
    ctl.on_character_clicked("ben");
    ctl.drain_events();

    for _ in 0..200 {
        ctl.update(100);
    }
    assert!(ctl.interaction().is_none());
    assert!(ctl.frame(&AnyAsset).interaction.is_none());
    assert!(ctl.drain_events().contains(&OutputEvent::InteractionDismissed));
}

#[test]
fn playing_clears_the_interaction() {
    let mut ctl = controller();
    ctl.on_character_clicked("ben");
    ctl.play().unwrap();
    assert!(ctl.interaction().is_none());
    assert_eq!(ctl.audio().open_channels(), 0);
}

#[test]
fn dismiss_is_a_no_op_without_a_line() {
    let mut ctl = controller();
    ctl.dismiss_interaction();
    assert!(!ctl.drain_events().contains(&OutputEvent::InteractionDismissed));
}

#[test]
fn three_angry_draws_silence_the_next_click() {
    let mut engine = engine(11);
    let mut state = InteractionState::default();
    let mut angry = 0;
    let mut t = 0;

    while angry < 3 {
        assert!(t < 500, "never drew three angry lines");
        match engine.on_click(&mut state, "ben", Gender::Male, t * 100) {
            ClickOutcome::Line(line) if line.emotion == Emotion::Angry => angry += 1,
            ClickOutcome::Line(_) => {}
            ClickOutcome::Cooldown => panic!("cooled down after {angry} angry draws"),
        }
        assert_eq!(state.counters(Gender::Male).angry_streak, angry);
        t += 1;
    }

    assert_eq!(engine.on_click(&mut state, "ben", Gender::Male, t * 100), ClickOutcome::Cooldown);
    assert_eq!(state.counters(Gender::Male).clicks, 0);
    assert_eq!(state.counters(Gender::Male).angry_streak, 0);
}

#[test]
fn cooldown_click_clears_the_stage_bubble() {
    let mut ctl = controller();
    let mut clicks = 0;
    while ctl.on_character_clicked("ben") {
        clicks += 1;
        assert!(clicks < 500, "never cooled down");
        ctl.update(100);
    }

    assert!(clicks >= 3);
    assert!(ctl.interaction().is_none());
    assert!(ctl.frame(&AnyAsset).interaction.is_none());
    assert!(ctl.drain_events().iter().any(|e| matches!(e, OutputEvent::InteractionCooldown { character_id } if character_id == "ben")));
    assert_eq!(ctl.session().unwrap().interaction.counters(Gender::Male).clicks, 0);
}

#[test]
fn idle_time_passed_to_update_makes_clicks_stale() {
    let mut ctl = controller();
    ctl.on_character_clicked("ben");
    ctl.update(3000);
    ctl.on_character_clicked("ben");
    assert_eq!(ctl.session().unwrap().interaction.counters(Gender::Male).clicks, 2);

    ctl.update(6000);
    ctl.on_character_clicked("ben");
    assert_eq!(ctl.session().unwrap().interaction.counters(Gender::Male).clicks, 1);
}
