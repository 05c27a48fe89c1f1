use log::trace;

/// Identity the live timers belong to. Any change invalidates all of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerKey {
    pub scene_index: usize,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    SceneDuration,
    ChoiceReveal,
    LineReveal(usize),
    BubbleEntrance(usize),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: TimerKind,
    due_at: u64,
    generation: u64,
}

/// The one live set of scene timers. Re-keying cancels every pending entry.
#[derive(Debug, Default)]
pub struct TimerSet {
    key: Option<TimerKey>,
    generation: u64,
    now: u64,
    pending: Vec<Pending>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<TimerKey> {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` when the key changed and the caller has to re-arm.
    /// Syncing to the current key leaves everything untouched.
    pub fn sync(&mut self, key: TimerKey) -> bool {
        if self.key == Some(key) {
            return false;
        }
        self.cancel_all();
        self.key = Some(key);
        true
    }

    pub fn cancel_all(&mut self) {
        if self.key.is_none() && self.pending.is_empty() {
            return;
        }
        trace!("Timer generation {} cancelled ({} pending)", self.generation, self.pending.len());
        self.generation += 1;
        self.pending.clear();
        self.key = None;
    }

    /// Replaces any pending timer of the same kind.
    pub fn arm(&mut self, kind: TimerKind, delay_ms: u64) {
        self.pending.retain(|p| p.kind != kind);
        self.pending.push(Pending {
            kind,
            due_at: self.now.saturating_add(delay_ms),
            generation: self.generation,
        });
    }

    pub fn next_due_in(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_at.saturating_sub(self.now)).min()
    }

    pub fn advance_clock(&mut self, dt_ms: u64) {
        self.now = self.now.saturating_add(dt_ms);
    }

    /// Removes and returns every timer that is due, earliest first.
    pub fn take_due(&mut self) -> Vec<TimerKind> {
        let now = self.now;
        let generation = self.generation;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due_at <= now && p.generation == generation {
                due.push(*p);
                false
            } else {
                p.generation == generation
            }
        });
        due.sort_by_key(|p| p.due_at);
        due.into_iter().map(|p| p.kind).collect()
    }

    pub fn snapshot(&self) -> Vec<(TimerKind, u64)> {
        let mut all: Vec<_> = self.pending.iter()
            .map(|p| (p.kind, p.due_at.saturating_sub(self.now)))
            .collect();
        all.sort_by_key(|(_, remaining)| *remaining);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: TimerKey = TimerKey { scene_index: 0, speed: 1.0 };

    #[test]
    fn fires_in_due_order() {
        let mut timers = TimerSet::new();
        timers.sync(KEY);
        timers.arm(TimerKind::SceneDuration, 300);
        timers.arm(TimerKind::LineReveal(0), 100);
        timers.arm(TimerKind::LineReveal(1), 200);

        assert_eq!(timers.next_due_in(), Some(100));
        timers.advance_clock(250);
        assert_eq!(timers.take_due(), vec![TimerKind::LineReveal(0), TimerKind::LineReveal(1)]);
        assert_eq!(timers.snapshot(), vec![(TimerKind::SceneDuration, 50)]);
        timers.advance_clock(50);
        assert_eq!(timers.take_due(), vec![TimerKind::SceneDuration]);
        assert!(timers.take_due().is_empty());
    }

    #[test]
    fn rekey_cancels_and_same_key_is_noop() {
        let mut timers = TimerSet::new();
        assert!(timers.sync(KEY));
        timers.arm(TimerKind::SceneDuration, 100);
        assert!(!timers.sync(KEY));
        assert_eq!(timers.snapshot(), vec![(TimerKind::SceneDuration, 100)]);

        let generation = timers.generation();
        assert!(timers.sync(TimerKey { speed: 2.0, ..KEY }));
        assert!(timers.generation() > generation);
        assert!(timers.snapshot().is_empty());
    }

    #[test]
    fn cancel_all_is_idempotent() {
        let mut timers = TimerSet::new();
        timers.sync(KEY);
        timers.arm(TimerKind::ChoiceReveal, 10);

        timers.cancel_all();
        assert!(timers.snapshot().is_empty());
        let generation = timers.generation();
        timers.cancel_all();
        assert_eq!(timers.generation(), generation);
    }

    #[test]
    fn rearming_replaces_pending_timer() {
        let mut timers = TimerSet::new();
        timers.sync(KEY);
        timers.arm(TimerKind::SceneDuration, 100);
        timers.advance_clock(80);
        timers.arm(TimerKind::SceneDuration, 100);
        timers.advance_clock(30);
        assert!(timers.take_due().is_empty());
        assert_eq!(timers.snapshot(), vec![(TimerKind::SceneDuration, 70)]);
    }
}
