//! Virtual-clock timers. Deadlines are offsets from simulation start.

use std::time::Duration;

/// One-shot or periodic deadline. An idle timer never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Duration>,
    period: Option<Duration>,
}

impl Timer {
    pub const fn idle() -> Self {
        Self {
            deadline: None,
            period: None,
        }
    }

    /// Fires once at `now + delay`.
    pub fn once(now: Duration, delay: Duration) -> Self {
        Self {
            deadline: Some(now.saturating_add(delay)),
            period: None,
        }
    }

    /// Fires at `now + period`, then every `period` after that. A zero period stays idle.
    pub fn every(now: Duration, period: Duration) -> Self {
        if period.is_zero() {
            return Self::idle();
        }
        Self {
            deadline: Some(now.saturating_add(period)),
            period: Some(period),
        }
    }

    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        *self = Self::idle();
    }

    /// Consumes the current deadline if it is due at `now`. Periodic timers re-arm
    /// relative to the deadline they just passed, not to `now`.
    pub fn fire(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = self.period.map(|period| deadline.saturating_add(period));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once() {
        let mut timer = Timer::once(ms(10), ms(40));
        assert!(!timer.fire(ms(49)));
        assert!(timer.fire(ms(50)));
        assert!(!timer.is_armed());
        assert!(!timer.fire(ms(500)));
    }

    #[test]
    fn periodic_keeps_its_phase() {
        let mut timer = Timer::every(ms(0), ms(33));
        assert!(timer.fire(ms(40)));
        assert_eq!(timer.deadline(), Some(ms(66)));
        assert!(timer.fire(ms(66)));
        assert_eq!(timer.deadline(), Some(ms(99)));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = Timer::every(ms(0), ms(5));
        timer.cancel();
        assert!(!timer.fire(ms(1_000)));
        assert_eq!(Timer::every(ms(0), Duration::ZERO), Timer::idle());
    }
}
