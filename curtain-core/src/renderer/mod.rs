pub mod terminal;
pub mod driver;
pub mod frame;

use crate::event::{InputEvent, OutputEvent};

pub trait Renderer {
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent>;
}
