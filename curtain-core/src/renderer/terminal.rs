use std::io::{stdin, stdout, Write};
use log::trace;

use crate::audio::SynthesisKind;
use crate::event::{EndReason, InputEvent, OutputEvent};
use crate::renderer::Renderer;
use crate::runtime::Choice;

/// Line-oriented renderer: prints what happens, asks on stdin when a choice is due.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    /// Print every synthesized syllable as well.
    pub show_tones: bool,
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent> {
        match out {
            OutputEvent::ScriptLoaded { scenes } => {
                println!("[Script] {} scenes", scenes);
                None
            }
            OutputEvent::PlaybackStarted => {
                println!("[Play]");
                None
            }
            OutputEvent::SceneChanged { index, background } => {
                println!("--- Scene {} ({}) ---", index + 1, background);
                None
            }
            OutputEvent::LineCompleted { speaker, text, .. } => {
                match speaker {
                    Some(name) => println!("[Dialogue] {}: {}", name, text),
                    None => println!("[Narration] {}", text),
                }
                None
            }
            OutputEvent::ShowChoice { options } => {
                for (i, o) in options.iter().enumerate() {
                    println!("  [{}] {}", i + 1, o.label);
                }
                self.wait_choice(options)
            }
            OutputEvent::Tone { pitch, duration_ms, volume } => {
                if self.show_tones {
                    println!("[Tone] pitch:{:.2} {}ms volume:{:.2}", pitch, duration_ms, volume);
                }
                None
            }
            OutputEvent::InteractionShown { character_id, text, emotion } => {
                println!("[{}] {} ({})", character_id, text, emotion.as_str());
                None
            }
            OutputEvent::InteractionCooldown { character_id } => {
                println!("[{}] ...", character_id);
                None
            }
            OutputEvent::SpeedChanged { multiplier } => {
                println!("[Speed] {}x", multiplier);
                None
            }
            OutputEvent::BackendChanged { kind } => {
                println!("[Voice] {}", kind.as_str());
                None
            }
            OutputEvent::End { reason } => {
                match reason {
                    EndReason::Finished => println!("[End]"),
                    EndReason::Stopped => println!("[Stopped]"),
                }
                None
            }
            other => {
                trace!("Terminal skipped {:?}", other);
                None
            }
        }
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn prompt(&self, label: &str) -> Option<String> {
        print!("{}> ", label);
        stdout().flush().ok()?;
        let mut buf = String::new();
        match stdin().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buf.trim().to_string()),
        }
    }

    fn wait_choice(&mut self, options: &[Choice]) -> Option<InputEvent> {
        loop {
            let line = self.prompt("Select")?;
            if let Ok(n) = line.parse::<usize>() {
                if n >= 1 && n <= options.len() {
                    return Some(InputEvent::SelectChoice { target_scene_index: options[n - 1].target_scene_index });
                }
            }
            println!("invalid");
        }
    }

    /// Reads one idle-mode command. `None` means quit (or stdin closed).
    ///
    /// `play`, `stop`, `click <id>`, `speed <x>`, `voice <kind>`, `skip`, `dismiss`, `quit`
    pub fn read_command(&mut self) -> Option<InputEvent> {
        loop {
            let line = self.prompt("")?;
            match parse_command(&line) {
                Command::Input(ev) => return Some(ev),
                Command::Quit => return None,
                Command::Invalid => println!("invalid"),
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Input(InputEvent),
    Quit,
    Invalid,
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else { return Command::Invalid };
    let arg = parts.next();

    match (head.to_ascii_lowercase().as_str(), arg) {
        ("play", None) => Command::Input(InputEvent::Play),
        ("stop", None) => Command::Input(InputEvent::Stop),
        ("dismiss", None) => Command::Input(InputEvent::DismissInteraction),
        ("skip", None) => Command::Input(InputEvent::SkipLine),
        ("quit" | "exit", None) => Command::Quit,
        ("click", Some(id)) => Command::Input(InputEvent::CharacterClicked { id: id.to_string() }),
        ("speed", Some(x)) => match x.parse::<f32>() {
            Ok(multiplier) => Command::Input(InputEvent::SetSpeed { multiplier }),
            Err(_) => Command::Invalid,
        },
        ("voice", Some(name)) => match SynthesisKind::parse(name) {
            Some(kind) => Command::Input(InputEvent::SetBackend { kind }),
            None => Command::Invalid,
        },
        _ => Command::Invalid,
    }
}
