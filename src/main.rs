//! Blockfall: the falling-blocks header animation, hosted in a terminal.

mod app;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use blockfall::HeaderConfig;
use clap::{Parser, ValueEnum};
use log::{LevelFilter, warn};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        logging::init(path, args.log_level)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        warn!("theme file ignored: {err}");
        theme::Theme::for_palette(args.palette)
    });
    let config = args.header_config();
    let mut app = App::new(args, config, theme).context("invalid header settings")?;
    app.run()?;
    Ok(())
}

/// Falling-blocks header animation in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-blocks header animation in the terminal. Click to drop blocks; full rows clear.",
    long_about = "Blockfall draws a website-style header strip across the top of the terminal.\n\n\
        Blocks drop in on their own every so often, or wherever you click. They stack up; a full \
        row clears and the blocks above it fall. Click a settled block to make it vanish. A column \
        that grows too tall resets the whole strip.\n\n\
        CONTROLS:\n  Click       Drop a block / remove a settled block\n  Left/Right  Move cursor (h/l)\n  \
        Space/Enter Drop at cursor    x/Delete   Remove top block at cursor\n  t           Toggle light/dark \
        p          Pause    q / Esc    Quit"
)]
pub struct Args {
    /// Block edge in pixels. A block is drawn 2 terminal columns wide and 1 line tall.
    #[arg(long, default_value = "16", value_name = "PX")]
    pub unit_size: f64,

    /// Header height in blocks.
    #[arg(long, default_value = "4", value_name = "ROWS")]
    pub rows: usize,

    /// A column holding more blocks than this resets the header. Must be below --rows.
    #[arg(long, default_value = "3", value_name = "N")]
    pub max_stack: usize,

    /// Delay before the first automatic drop, in ms.
    #[arg(long, default_value = "4000", value_name = "MS")]
    pub spawn_delay_ms: u64,

    /// Time between automatic drops, in ms.
    #[arg(long, default_value = "42000", value_name = "MS")]
    pub spawn_interval_ms: u64,

    /// Gravity step period in ms (one pixel per step).
    #[arg(long, default_value = "33", value_name = "MS")]
    pub tick_ms: u64,

    /// Duration of the vanish animation for a clicked block, in ms.
    #[arg(long, default_value = "400", value_name = "MS")]
    pub vanish_ms: u64,

    /// Seed for the automatic drop columns (random if not set).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"), applied over the palette.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Starting colour palette; `t` toggles at runtime.
    #[arg(short, long, default_value = "dark")]
    pub palette: Palette,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE", value_parser = parse_frame_rate)]
    pub frame_rate: f64,

    /// Disable the vanish fade (clicked blocks just dim until removed).
    #[arg(long)]
    pub no_animation: bool,

    /// Start with the clock paused.
    #[arg(long)]
    pub paused: bool,

    /// Append log records to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Minimum level written to --log-file (error, warn, info, debug, trace).
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn header_config(&self) -> HeaderConfig {
        HeaderConfig {
            unit_size: self.unit_size,
            rows: self.rows,
            max_stack: self.max_stack,
            spawn_delay: Duration::from_millis(self.spawn_delay_ms),
            spawn_interval: Duration::from_millis(self.spawn_interval_ms),
            tick_interval: Duration::from_millis(self.tick_ms),
            vanish_duration: Duration::from_millis(self.vanish_ms),
        }
    }
}

fn parse_frame_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|err| format!("{err}"))?;
    if rate.is_finite() && (1.0..=240.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{s} is not between 1 and 240"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Dark,
    Light,
}

impl Palette {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_library() {
        let args = Args::parse_from(["blockfall"]);
        assert_eq!(args.header_config(), HeaderConfig::default());
        assert_eq!(args.palette, Palette::Dark);
        assert_eq!(args.log_level, LevelFilter::Info);
    }

    #[test]
    fn flags_reach_the_config() {
        let args = Args::parse_from([
            "blockfall",
            "--rows",
            "6",
            "--max-stack",
            "5",
            "--tick-ms",
            "16",
            "--palette",
            "light",
        ]);
        let config = args.header_config();
        assert_eq!((config.rows, config.max_stack), (6, 5));
        assert_eq!(config.tick_interval, Duration::from_millis(16));
        assert_eq!(args.palette.toggled(), Palette::Dark);
    }

    #[test]
    fn frame_rate_must_be_a_sane_number() {
        for bad in ["nan", "inf", "0", "-5", "1000", "fast"] {
            assert!(
                Args::try_parse_from(["blockfall", "--frame-rate", bad]).is_err(),
                "{bad} accepted"
            );
        }
        let args = Args::try_parse_from(["blockfall", "--frame-rate", "60"]).unwrap();
        assert_eq!(args.frame_rate, 60.0);
    }
}
