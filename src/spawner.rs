//! Autonomous drops: one after a short delay, then one per interval, each in a random column.

use crate::schedule::Timer;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;

/// Chooses the column for an autonomous drop. Called only with `columns > 0`;
/// results outside `[0, columns)` are clamped by the caller.
pub trait ColumnPicker {
    fn pick(&mut self, columns: usize) -> usize;
}

/// Uniform column choice backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomColumns<R> {
    rng: R,
}

impl<R: Rng> RandomColumns<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomColumns<ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::rng())
    }
}

impl RandomColumns<StdRng> {
    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ColumnPicker for RandomColumns<R> {
    fn pick(&mut self, columns: usize) -> usize {
        self.rng.random_range(0..columns)
    }
}

/// Which of the two spawn timers fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTimer {
    Initial,
    Periodic,
}

/// Owns the initial-delay and periodic timers plus the column source.
pub struct Spawner {
    picker: Box<dyn ColumnPicker>,
    delay: Duration,
    interval: Duration,
    initial: Timer,
    periodic: Timer,
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("delay", &self.delay)
            .field("interval", &self.interval)
            .field("initial", &self.initial)
            .field("periodic", &self.periodic)
            .finish_non_exhaustive()
    }
}

impl Spawner {
    pub fn new(picker: Box<dyn ColumnPicker>, delay: Duration, interval: Duration) -> Self {
        Self {
            picker,
            delay,
            interval,
            initial: Timer::idle(),
            periodic: Timer::idle(),
        }
    }

    /// (Re)starts both timers from `now`. The periodic timer does not wait for the initial one.
    pub fn arm(&mut self, now: Duration) {
        self.initial = Timer::once(now, self.delay);
        self.periodic = Timer::every(now, self.interval);
    }

    pub fn cancel(&mut self) {
        self.initial.cancel();
        self.periodic.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.initial.is_armed() || self.periodic.is_armed()
    }

    /// Earliest pending deadline and the timer it belongs to. Initial wins ties.
    pub fn next_deadline(&self) -> Option<(Duration, SpawnTimer)> {
        let initial = self.initial.deadline().map(|d| (d, SpawnTimer::Initial));
        let periodic = self.periodic.deadline().map(|d| (d, SpawnTimer::Periodic));
        match (initial, periodic) {
            (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    /// Consumes the given timer's deadline if due. Returns whether a drop is owed.
    pub fn fire(&mut self, timer: SpawnTimer, now: Duration) -> bool {
        match timer {
            SpawnTimer::Initial => self.initial.fire(now),
            SpawnTimer::Periodic => self.periodic.fire(now),
        }
    }

    /// Column for an autonomous drop; `None` when there is nowhere to drop.
    pub fn pick_column(&mut self, columns: usize) -> Option<usize> {
        (columns > 0).then(|| self.picker.pick(columns).min(columns - 1))
    }
}
