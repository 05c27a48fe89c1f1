use crate::runtime::{AnimationName, Emotion, Gender, VoiceProfile};

const MALE_NORMAL: &[&str] = &[
    "Hm? Did you need something?",
    "Oh, hey there.",
    "Just enjoying the view.",
    "Yes? I'm listening.",
    "Nice weather today, huh?",
];

const MALE_HAPPY: &[&str] = &[
    "Ha! That tickles!",
    "You're in a good mood today!",
    "Heh, I like you.",
    "Hey, that's fun!",
    "Alright, alright, you got me smiling.",
];

const MALE_ANNOYED: &[&str] = &[
    "Okay, that's enough poking.",
    "Can you not?",
    "Seriously, I'm trying to focus.",
    "You're really testing me here.",
    "Ugh. Again?",
];

const MALE_ANGRY: &[&str] = &[
    "Cut it out already!",
    "That's it, I've had it!",
    "Stop clicking me!",
    "Do you want a fight?!",
    "Leave me alone!",
];

const FEMALE_NORMAL: &[&str] = &[
    "Hi! What's up?",
    "Oh, you startled me.",
    "Is something the matter?",
    "Hello there!",
    "Did you call me?",
];

const FEMALE_HAPPY: &[&str] = &[
    "Hehe, that's cute!",
    "Aww, you're sweet.",
    "That made my day!",
    "Tee-hee, stop it!",
    "I'm so glad you're here!",
];

const FEMALE_ANNOYED: &[&str] = &[
    "Um, could you stop that?",
    "That's getting old.",
    "Really? Again?",
    "I'm not a button, you know.",
    "Hmph. Rude.",
];

const FEMALE_ANGRY: &[&str] = &[
    "Enough! I mean it!",
    "Stop it right now!",
    "I'm seriously mad now!",
    "Keep that up and see what happens!",
    "Go away!",
];

/// Flavor lines for one emotion and gender.
pub fn pool(emotion: Emotion, gender: Gender) -> &'static [&'static str] {
    match (gender, emotion) {
        (Gender::Male, Emotion::Normal) => MALE_NORMAL,
        (Gender::Male, Emotion::Happy) => MALE_HAPPY,
        (Gender::Male, Emotion::Annoyed) => MALE_ANNOYED,
        (Gender::Male, Emotion::Angry) => MALE_ANGRY,
        (Gender::Female, Emotion::Normal) => FEMALE_NORMAL,
        (Gender::Female, Emotion::Happy) => FEMALE_HAPPY,
        (Gender::Female, Emotion::Annoyed) => FEMALE_ANNOYED,
        (Gender::Female, Emotion::Angry) => FEMALE_ANGRY,
    }
}

pub fn animation_for(emotion: Emotion) -> AnimationName {
    match emotion {
        Emotion::Normal => AnimationName::Idle,
        Emotion::Happy => AnimationName::Speaking,
        Emotion::Annoyed | Emotion::Angry => AnimationName::Annoyed,
    }
}

pub fn voice_for(emotion: Emotion, gender: Gender) -> VoiceProfile {
    let (pitch, speed, duration_millis, volume) = match (gender, emotion) {
        (Gender::Male, Emotion::Normal) => (0.9, 55, 60, 0.6),
        (Gender::Male, Emotion::Happy) => (0.95, 45, 50, 0.7),
        (Gender::Male, Emotion::Annoyed) => (0.8, 60, 70, 0.7),
        (Gender::Male, Emotion::Angry) => (0.7, 40, 80, 0.8),
        (Gender::Female, Emotion::Normal) => (1.3, 55, 60, 0.6),
        (Gender::Female, Emotion::Happy) => (1.5, 45, 50, 0.7),
        (Gender::Female, Emotion::Annoyed) => (1.2, 60, 70, 0.7),
        (Gender::Female, Emotion::Angry) => (1.1, 40, 80, 0.8),
    };
    VoiceProfile { pitch, speed, duration_millis, volume, enabled: true }
}
