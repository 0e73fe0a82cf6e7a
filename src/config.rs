//! Simulation settings: block size, board height, overflow threshold and timer cadences.

use std::time::Duration;
use thiserror::Error;

/// Edge length of one block in host pixels.
pub const UNIT_SIZE: f64 = 16.0;
/// Board height in rows.
pub const ROWS: usize = 4;
/// A column holding more blocks than this resets the board.
pub const MAX_STACK: usize = 3;
/// Header height used until the host reports one.
pub const DEFAULT_HEADER_HEIGHT: f64 = 64.0;

/// Everything that shapes the animation. Defaults match the website header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderConfig {
    /// Block edge in host pixels; columns = floor(width / unit_size).
    pub unit_size: f64,
    pub rows: usize,
    /// Overflow guard threshold (per-column occupied count).
    pub max_stack: usize,
    /// Delay before the first autonomous drop after the grid (re)appears.
    pub spawn_delay: Duration,
    /// Period of autonomous drops.
    pub spawn_interval: Duration,
    /// Gravity step period (one pixel per step).
    pub tick_interval: Duration,
    /// How long a clicked block shrinks before the column above settles.
    pub vanish_duration: Duration,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            unit_size: UNIT_SIZE,
            rows: ROWS,
            max_stack: MAX_STACK,
            spawn_delay: Duration::from_millis(4000),
            spawn_interval: Duration::from_millis(42_000),
            tick_interval: Duration::from_millis(33),
            vanish_duration: Duration::from_millis(400),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unit size must be a positive finite number of pixels, got {0}")]
    UnitSize(f64),
    #[error("the board needs at least one row")]
    NoRows,
    #[error("overflow threshold {max_stack} must be below the row count {rows}")]
    StackThreshold { max_stack: usize, rows: usize },
    #[error("gravity tick interval must be non-zero")]
    ZeroTick,
    #[error("spawn interval must be non-zero")]
    ZeroSpawnInterval,
}

impl HeaderConfig {
    /// Rejects settings the scheduler or the overflow guard cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.unit_size.is_finite() || self.unit_size <= 0.0 {
            return Err(ConfigError::UnitSize(self.unit_size));
        }
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.max_stack >= self.rows {
            return Err(ConfigError::StackThreshold {
                max_stack: self.max_stack,
                rows: self.rows,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(HeaderConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_threshold_without_headroom() {
        let config = HeaderConfig {
            max_stack: 4,
            ..HeaderConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StackThreshold { max_stack: 4, rows: 4 })
        );
    }

    #[test]
    fn rejects_degenerate_unit_size() {
        for unit_size in [0.0, -16.0, f64::NAN, f64::INFINITY] {
            let config = HeaderConfig {
                unit_size,
                ..HeaderConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::UnitSize(_))));
        }
    }

    #[test]
    fn rejects_zero_periods() {
        let no_tick = HeaderConfig {
            tick_interval: Duration::ZERO,
            ..HeaderConfig::default()
        };
        assert_eq!(no_tick.validate(), Err(ConfigError::ZeroTick));

        let no_interval = HeaderConfig {
            spawn_interval: Duration::ZERO,
            ..HeaderConfig::default()
        };
        assert_eq!(no_interval.validate(), Err(ConfigError::ZeroSpawnInterval));
    }
}
