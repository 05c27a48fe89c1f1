use std::thread;
use std::time::Duration;
use log::{debug, trace, warn};

use crate::event::OutputEvent;
use crate::playback::PlaybackController;
use crate::renderer::Renderer;

/// Ticks a controller at a fixed step and routes its events through a renderer.
pub struct Driver<R: Renderer> {
    controller: PlaybackController,
    renderer: R,
    step_ms: u64,
    realtime: bool,
}

impl<R: Renderer> Driver<R> {
    pub fn new(controller: PlaybackController, renderer: R, step_ms: u64) -> Self {
        Self { controller, renderer, step_ms: step_ms.max(1), realtime: false }
    }

    /// Sleep `step_ms` between ticks instead of running flat out.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_parts(self) -> (PlaybackController, R) {
        (self.controller, self.renderer)
    }

    /// Pushes queued events to the renderer until the queue runs dry.
    /// Returns `true` if the session ended along the way.
    pub fn pump(&mut self) -> bool {
        let mut ended = false;
        loop {
            let events = self.controller.drain_events();
            if events.is_empty() {
                break;
            }
            for ev in events {
                if matches!(ev, OutputEvent::End { .. }) {
                    ended = true;
                }
                match self.renderer.render(&ev) {
                    Some(input) => {
                        trace!("Renderer answered {:?}", input);
                        self.controller.feed(input);
                    }
                    // nobody will ever pick, so don't wait forever
                    None if matches!(ev, OutputEvent::ShowChoice { .. }) => {
                        warn!("Choice left unanswered, stopping playback");
                        self.controller.stop();
                    }
                    None => {}
                }
            }
        }
        ended
    }

    #[inline]
    pub fn step(&mut self) -> bool {
        self.controller.update(self.step_ms);
        let ended = self.pump();
        if self.realtime {
            thread::sleep(Duration::from_millis(self.step_ms));
        }
        ended
    }

    /// Plays the loaded script to its end. Returns the number of ticks taken.
    pub fn run(&mut self) -> anyhow::Result<u64> {
        self.controller.play()?;
        if self.pump() {
            return Ok(0);
        }

        let mut ticks = 0u64;
        while !self.step() {
            ticks += 1;
        }
        debug!("Driver finished after {} ticks", ticks + 1);
        Ok(ticks + 1)
    }
}
