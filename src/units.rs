//! Blocks that are not (or no longer) settled: falling and disappearing units.

use std::time::Duration;

/// Height at which new units enter, two blocks above the header top.
pub const SPAWN_Y: f64 = -2.0;

/// Identifies a unit for the lifetime of one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Hands out increasing ids.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// A block on its way down. `y` is in unit-size multiples from the header top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingUnit {
    pub id: UnitId,
    pub column: usize,
    pub y: f64,
}

/// A clicked block playing its shrink animation. Still counted in the grid until it expires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisappearingUnit {
    pub id: UnitId,
    pub column: usize,
    pub row: usize,
    pub y: f64,
    pub started_at: Duration,
    pub expires_at: Duration,
}

impl DisappearingUnit {
    /// Animation progress in `[0, 1]` at virtual time `now`.
    pub fn progress(&self, now: Duration) -> f32 {
        let total = self.expires_at.saturating_sub(self.started_at);
        if total.is_zero() {
            return 1.0;
        }
        let done = now.saturating_sub(self.started_at).min(total);
        done.as_secs_f32() / total.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut ids = IdAllocator::default();
        let a = ids.next();
        let b = ids.next();
        assert!(a < b);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn progress_is_clamped() {
        let unit = DisappearingUnit {
            id: IdAllocator::default().next(),
            column: 0,
            row: 0,
            y: 3.0,
            started_at: Duration::from_millis(100),
            expires_at: Duration::from_millis(500),
        };
        assert_eq!(unit.progress(Duration::ZERO), 0.0);
        assert!((unit.progress(Duration::from_millis(300)) - 0.5).abs() < 1e-6);
        assert_eq!(unit.progress(Duration::from_secs(9)), 1.0);
    }
}
