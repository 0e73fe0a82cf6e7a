//! App: terminal init, main loop, clock, mouse and key handling.

use crate::input::{Action, band_click, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, VanishFx};
use crate::{Args, Palette};
use anyhow::Result;
use blockfall::{BlockHeader, ConfigError, Event, HeaderConfig, RandomColumns};
use crossterm::event::{self, Event as TermEvent, KeyEventKind, MouseEvent};
use log::{debug, info, warn};
use ratatui::DefaultTerminal;
use ratatui::layout::{Position, Rect};
use std::time::{Duration, Instant};

/// Counters shown in the status panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub spawned: usize,
    pub landed: usize,
    pub rows_cleared: usize,
    pub removed: usize,
    pub resets: usize,
}

impl Stats {
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::Spawned { .. } => self.spawned += 1,
            Event::Landed { .. } => self.landed += 1,
            Event::LinesCleared { rows, .. } => self.rows_cleared += rows.len(),
            Event::Removed { .. } => self.removed += 1,
            Event::Overflowed { .. } => self.resets += 1,
            _ => {}
        }
    }
}

pub struct App {
    args: Args,
    theme: Theme,
    palette: Palette,
    header: BlockHeader,
    /// Column targeted by keyboard drops and removals.
    cursor: usize,
    paused: bool,
    stats: Stats,
    /// TachyonFX fades for blocks that are vanishing.
    vanish_fx: Vec<VanishFx>,
    last_tick: Instant,
    /// Header band from the last layout, used for mouse hits.
    band: Rect,
}

impl App {
    pub fn new(args: Args, config: HeaderConfig, theme: Theme) -> Result<Self, ConfigError> {
        let header = match args.seed {
            Some(seed) => BlockHeader::new(config, RandomColumns::seeded(seed))?,
            None => BlockHeader::new(config, RandomColumns::thread())?,
        };
        Ok(Self {
            palette: args.palette,
            paused: args.paused,
            args,
            theme,
            header,
            cursor: 0,
            stats: Stats::default(),
            vanish_fx: Vec::new(),
            last_tick: Instant::now(),
            band: Rect::default(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let (cols, rows) = size()?;
        self.layout(Rect::new(0, 0, cols, rows));
        let host = self.host_rect();
        self.header.mount(&host);
        info!(
            "mounted {} columns on a {cols}x{rows} terminal",
            self.header.columns()
        );
        self.last_tick = Instant::now();

        let result = self.run_loop(&mut terminal);

        // Restore
        self.header.teardown();
        self.absorb_events();
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate);
        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_tick);
            self.last_tick = now;
            if !self.paused {
                self.header.advance(elapsed);
            }
            self.absorb_events();

            let fx_delta = if self.paused { Duration::ZERO } else { elapsed };
            let animate = !self.args.no_animation;
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.header,
                    &self.theme,
                    &self.stats,
                    self.cursor,
                    self.paused,
                    animate,
                    &mut self.vanish_fx,
                    fx_delta,
                );
            })?;
            self.vanish_fx.retain(|fx| !fx.effect.done());

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        TermEvent::Key(key) => {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            if self.apply_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        TermEvent::Mouse(mouse) => self.on_mouse(mouse),
                        TermEvent::Resize(cols, rows) => {
                            self.layout(Rect::new(0, 0, cols, rows));
                            let host = self.host_rect();
                            self.header.sync_geometry(&host);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn layout(&mut self, area: Rect) {
        let (_, band) = ui::header_layout(area, self.header.rows());
        self.band = band;
    }

    fn host_rect(&self) -> blockfall::HostRect {
        let config = self.header.config();
        ui::band_host_rect(self.band, config.unit_size, config.rows)
    }

    /// Feeds header events to the status counters and the vanish effects.
    fn absorb_events(&mut self) {
        let events: Vec<Event> = self.header.drain_events().collect();
        for event in &events {
            self.stats.record(event);
            match *event {
                Event::VanishStarted { id, column, row } if !self.args.no_animation => {
                    let line = self.header.rows().saturating_sub(row + 1);
                    let line = u16::try_from(line).unwrap_or(u16::MAX);
                    let duration = self.header.config().vanish_duration;
                    self.vanish_fx
                        .push(ui::vanish_fx(id, self.band, column, line, &self.theme, duration));
                }
                Event::Removed { id, .. } => self.vanish_fx.retain(|fx| fx.id != id),
                Event::Resized { columns } => {
                    self.vanish_fx.clear();
                    self.cursor = self.cursor.min(columns.saturating_sub(1));
                }
                Event::TornDown => self.vanish_fx.clear(),
                _ => {}
            }
        }
    }

    /// Returns true when the app should quit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::Pause => {
                self.paused = !self.paused;
                debug!("paused: {}", self.paused);
            }
            Action::ToggleTheme => {
                self.palette = self.palette.toggled();
                self.theme = Theme::load(self.args.theme.as_deref(), self.palette).unwrap_or_else(|err| {
                    warn!("theme file ignored: {err}");
                    Theme::for_palette(self.palette)
                });
            }
            Action::CursorLeft => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorRight => {
                self.cursor = (self.cursor + 1).min(self.header.columns().saturating_sub(1));
            }
            Action::Drop => {
                if !self.paused {
                    self.header.spawn_at(self.cursor);
                }
            }
            Action::Remove => {
                let grid = self.header.grid();
                let top = (0..grid.rows()).rev().find(|&row| grid.is_occupied(self.cursor, row));
                if let (false, Some(row)) = (self.paused, top) {
                    self.header.remove_at(self.cursor, row);
                }
            }
            Action::None => {}
        }
        false
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.paused {
            return;
        }
        let Some((col, line)) = band_click(mouse, self.band) else {
            return;
        };
        match band_hit(&self.header, self.band, col, line) {
            BandHit::Remove { column, row } => {
                self.cursor = column;
                self.header.remove_at(column, row);
            }
            BandHit::Drop { column, pixel_x } => {
                self.cursor = column;
                self.header.click(pixel_x);
            }
            BandHit::Title => {}
        }
    }
}

/// What a left press on band cell (`col`, `line`) does.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BandHit {
    Remove { column: usize, row: usize },
    Drop { column: usize, pixel_x: f64 },
    /// Bare title text; blocks drawn over it still take the click.
    Title,
}

fn band_hit(header: &BlockHeader, band: Rect, col: u16, line: u16) -> BandHit {
    let pixel_x = ui::column_center_px(col, header.config().unit_size);
    let column = header.column_from_pixel_x(pixel_x);
    let settled = ui::line_to_row(line, header.rows())
        .filter(|&row| header.grid().is_occupied(column, row));
    if let Some(row) = settled {
        return BandHit::Remove { column, row };
    }
    let cell = Position::new(band.x.saturating_add(col), band.y.saturating_add(line));
    if ui::title_rect(band).contains(cell) {
        return BandHit::Title;
    }
    BandHit::Drop { column, pixel_x }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall::SpawnSource;
    use blockfall::units::IdAllocator;

    #[test]
    fn blocks_over_the_title_can_still_be_removed() {
        let config = HeaderConfig {
            spawn_delay: Duration::from_secs(3600),
            ..HeaderConfig::default()
        };
        let mut header = BlockHeader::new(config, RandomColumns::seeded(1)).expect("valid config");
        let band = Rect::new(0, 0, 40, 4);
        header.mount(&ui::band_host_rect(band, 16.0, 4));
        assert_eq!(header.columns(), 20);
        // Title spans band columns 14..25 on line 2, which shows row 1.
        for _ in 0..2 {
            header.spawn_at(7).expect("header has columns");
            header.advance(Duration::from_secs(3));
        }
        assert!(header.grid().is_occupied(7, 1));

        assert_eq!(band_hit(&header, band, 14, 2), BandHit::Remove { column: 7, row: 1 });
        assert_eq!(band_hit(&header, band, 18, 2), BandHit::Title);
        assert_eq!(
            band_hit(&header, band, 18, 0),
            BandHit::Drop { column: 9, pixel_x: 148.0 }
        );
    }

    #[test]
    fn stats_count_header_events() {
        let mut stats = Stats::default();
        let id = IdAllocator::default().next();
        for event in [
            Event::Spawned { id, column: 0, source: SpawnSource::Pointer },
            Event::Landed { id, column: 0, row: 0 },
            Event::LinesCleared { rows: vec![0, 2], cascaded: 1 },
            Event::Overflowed { column: 3 },
            Event::Removed { id, column: 0, row: 0, cascaded: 0 },
            Event::TornDown,
        ] {
            stats.record(&event);
        }
        assert_eq!(
            stats,
            Stats {
                spawned: 1,
                landed: 1,
                rows_cleared: 2,
                removed: 1,
                resets: 1,
            }
        );
    }
}
