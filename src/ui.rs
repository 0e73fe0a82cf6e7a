//! Layout and drawing: header band (blocks, title, cursor) and the status panel below it.

use crate::app::Stats;
use crate::theme::Theme;
use blockfall::{BlockHeader, HostRect, UnitId};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Duration;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per block. A block is one line tall; half-blocks (▀) give 2 sub-rows per line.
pub const BLOCK_COLS: u16 = 2;

const TITLE: &str = " blockfall ";

/// Header rect (band + bottom border line) and the band inside it.
pub fn header_layout(area: Rect, rows: usize) -> (Rect, Rect) {
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    let outer = Rect {
        height: rows.saturating_add(1).min(area.height),
        ..area
    };
    let band = Rect {
        height: outer.height.saturating_sub(1),
        ..outer
    };
    (outer, band)
}

/// Pixel size the band stands for: a terminal column is half a block, a line is one block.
pub fn band_host_rect(band: Rect, unit_size: f64, rows: usize) -> HostRect {
    HostRect::new(
        f64::from(band.width) * unit_size / f64::from(BLOCK_COLS),
        rows as f64 * unit_size,
    )
}

/// Pixel offset of the middle of band column `col`.
pub fn column_center_px(col: u16, unit_size: f64) -> f64 {
    (f64::from(col) + 0.5) * unit_size / f64::from(BLOCK_COLS)
}

/// Settled-block row shown on band line `line` (0 = top line).
pub fn line_to_row(line: u16, rows: usize) -> Option<usize> {
    let line = usize::from(line);
    (line < rows).then(|| rows - 1 - line)
}

/// Centred title inside the band. Clicks on it never drop blocks.
pub fn title_rect(band: Rect) -> Rect {
    let width = (TITLE.len() as u16).min(band.width);
    Rect {
        x: band.x + (band.width - width) / 2,
        y: band.y + band.height / 2,
        width,
        height: band.height.min(1),
    }
}

/// Fade of one clicked block (TachyonFX), keyed by the vanishing unit.
pub struct VanishFx {
    pub id: UnitId,
    pub effect: Effect,
}

/// Fades the cells of the block at (`column`, band line `line`) to the header background.
pub fn vanish_fx(
    id: UnitId,
    band: Rect,
    column: usize,
    line: u16,
    theme: &Theme,
    duration: Duration,
) -> VanishFx {
    let column = u16::try_from(column).unwrap_or(u16::MAX);
    let x0 = band.x.saturating_add(column.saturating_mul(BLOCK_COLS));
    let y = band.y.saturating_add(line);
    let cells: HashSet<(u16, u16)> = (x0..x0.saturating_add(BLOCK_COLS)).map(|x| (x, y)).collect();
    let filter = CellFilter::PositionFn(ref_count(move |pos: Position| cells.contains(&(pos.x, pos.y))));
    let ms = duration.as_millis().min(u32::MAX as u128) as u32;
    let bg = theme.header_bg;
    let effect = fx::fade_to(bg, bg, (ms, Interpolation::Linear))
        .with_filter(filter)
        .with_area(band);
    VanishFx { id, effect }
}

/// Two sub-rows per terminal line, one colour (or nothing) per sub-cell.
struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl Canvas {
    fn new(band: Rect) -> Self {
        let width = usize::from(band.width);
        let height = usize::from(band.height) * 2;
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Paints a block whose top edge is `pixel_y` below the band top.
    fn paint(&mut self, column: usize, pixel_y: f64, unit_size: f64, color: Color) {
        let sub = (pixel_y / (unit_size / 2.0)).round();
        if !sub.is_finite() {
            return;
        }
        let sub = sub as i64;
        for y in sub..sub + 2 {
            if y < 0 || y >= self.height as i64 {
                continue;
            }
            let y = y as usize;
            for dx in 0..usize::from(BLOCK_COLS) {
                let x = column * usize::from(BLOCK_COLS) + dx;
                if x < self.width {
                    self.cells[y * self.width + x] = Some(color);
                }
            }
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }
}

/// Draw the whole screen. Vanish effects run on top of the band with `fx_delta` elapsed.
pub fn draw(
    frame: &mut Frame,
    header: &BlockHeader,
    theme: &Theme,
    stats: &Stats,
    cursor: usize,
    paused: bool,
    animate: bool,
    vanish: &mut [VanishFx],
    fx_delta: Duration,
) {
    let area = frame.area();
    let (outer, band) = header_layout(area, header.rows());

    frame.buffer_mut().set_style(area, Style::default().bg(theme.bg));
    Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.div_line).bg(theme.header_bg))
        .style(Style::default().bg(theme.header_bg))
        .render(outer, frame.buffer_mut());

    let title = title_rect(band);
    frame.buffer_mut().set_stringn(
        title.x,
        title.y,
        TITLE,
        usize::from(title.width),
        Style::default()
            .fg(theme.title)
            .bg(theme.header_bg)
            .add_modifier(Modifier::BOLD),
    );

    draw_blocks(frame.buffer_mut(), header, theme, band, animate);
    if outer.height > band.height {
        draw_cursor(frame.buffer_mut(), theme, band, cursor);
    }

    let delta_ms = fx_delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    for fx in vanish.iter_mut() {
        frame.render_effect(&mut fx.effect, band, tfx_delta);
    }

    let status = Rect {
        y: outer.y + outer.height,
        height: area.height.saturating_sub(outer.height),
        ..area
    };
    draw_status(frame.buffer_mut(), header, theme, stats, paused, status);
}

fn draw_blocks(buf: &mut Buffer, header: &BlockHeader, theme: &Theme, band: Rect, animate: bool) {
    let metrics = header.metrics();
    let unit = metrics.unit_size;
    let mut canvas = Canvas::new(band);

    for (x, y) in header.grid().occupied_cells() {
        let vanishing = header
            .disappearing()
            .iter()
            .any(|gone| gone.column == x && gone.row == y);
        let color = if vanishing && !animate {
            theme.inactive_fg
        } else {
            theme.accent
        };
        canvas.paint(x, metrics.row_to_pixel_y(y), unit, color);
    }
    for block in header.falling() {
        canvas.paint(block.column, block.y * unit, unit, theme.accent);
    }

    for line in 0..band.height {
        for col in 0..band.width {
            let top = canvas.get(usize::from(col), usize::from(line) * 2);
            let bot = canvas.get(usize::from(col), usize::from(line) * 2 + 1);
            if top.is_none() && bot.is_none() {
                continue;
            }
            buf[(band.x + col, band.y + line)].set_symbol("▀").set_style(
                Style::default()
                    .fg(top.unwrap_or(theme.header_bg))
                    .bg(bot.unwrap_or(theme.header_bg)),
            );
        }
    }
}

/// Cursor marker on the border line under the band.
fn draw_cursor(buf: &mut Buffer, theme: &Theme, band: Rect, cursor: usize) {
    let Ok(column) = u16::try_from(cursor) else {
        return;
    };
    let x = column.saturating_mul(BLOCK_COLS);
    if x.saturating_add(BLOCK_COLS) > band.width {
        return;
    }
    let style = Style::default().fg(theme.accent).bg(theme.header_bg);
    buf.set_string(band.x + x, band.y + band.height, "▔▔", style);
}

fn draw_status(
    buf: &mut Buffer,
    header: &BlockHeader,
    theme: &Theme,
    stats: &Stats,
    paused: bool,
    area: Rect,
) {
    if area.height == 0 {
        return;
    }
    let label = Style::default().fg(theme.inactive_fg);
    let value = Style::default().fg(theme.main_fg).add_modifier(Modifier::BOLD);
    let pair = |name: &'static str, n: usize| {
        [Span::styled(format!(" {name} "), label), Span::styled(n.to_string(), value)]
    };

    let next_drop = match header.next_spawn_at() {
        Some(at) if !paused => {
            let secs = at.saturating_sub(header.now()).as_secs_f64();
            format!(" next drop in {secs:.1}s")
        }
        Some(_) => " paused".to_string(),
        None => " no drop scheduled".to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(
            [
                pair("columns", header.columns()),
                pair("rows", header.rows()),
                pair("falling", header.falling().len()),
                pair("vanishing", header.disappearing().len()),
            ]
            .concat(),
        ),
        Line::from(
            [
                pair("dropped", stats.spawned),
                pair("landed", stats.landed),
                pair("rows cleared", stats.rows_cleared),
                pair("removed", stats.removed),
                pair("resets", stats.resets),
            ]
            .concat(),
        ),
        Line::from(Span::styled(next_drop, Style::default().fg(theme.title))),
        Line::from(""),
        Line::from(Span::styled(
            " click drop/remove · ←/→ cursor · space drop · x remove · t theme · p pause · q quit",
            label,
        )),
    ];
    Paragraph::new(lines)
        .style(Style::default().fg(theme.main_fg).bg(theme.bg))
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall::{ColumnPicker, HeaderConfig};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    struct First;

    impl ColumnPicker for First {
        fn pick(&mut self, _columns: usize) -> usize {
            0
        }
    }

    #[test]
    fn layout_reserves_a_border_line() {
        let (outer, band) = header_layout(Rect::new(0, 0, 80, 24), 4);
        assert_eq!((outer.height, band.height), (5, 4));
        let (outer, band) = header_layout(Rect::new(0, 0, 80, 3), 4);
        assert_eq!((outer.height, band.height), (3, 2));
    }

    #[test]
    fn band_maps_to_pixels() {
        let band = Rect::new(0, 0, 80, 4);
        assert_eq!(band_host_rect(band, 16.0, 4), HostRect::new(640.0, 64.0));
        assert_eq!(column_center_px(3, 16.0), 28.0);
        assert_eq!(line_to_row(0, 4), Some(3));
        assert_eq!(line_to_row(3, 4), Some(0));
        assert_eq!(line_to_row(4, 4), None);
    }

    #[test]
    fn half_pixel_offsets_use_half_blocks() {
        let mut canvas = Canvas::new(Rect::new(0, 0, 4, 2));
        canvas.paint(1, 8.0, 16.0, Color::Red);
        assert_eq!(canvas.get(1, 1), None);
        assert_eq!(canvas.get(2, 1), Some(Color::Red));
        assert_eq!(canvas.get(3, 2), Some(Color::Red));
        assert_eq!(canvas.get(2, 3), None);
        canvas.paint(0, -40.0, 16.0, Color::Red);
        assert_eq!(canvas.get(0, 0), None);
    }

    #[test]
    fn settled_block_is_drawn_on_the_bottom_line() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 20, 10);
        let (_, band) = header_layout(area, 4);
        let config = HeaderConfig {
            spawn_delay: Duration::from_secs(3600),
            ..HeaderConfig::default()
        };
        let mut header = BlockHeader::new(config, First).expect("valid config");
        header.mount(&band_host_rect(band, 16.0, 4));
        header.spawn_at(2).expect("header has columns");
        header.advance(Duration::from_secs(3));

        let mut terminal = Terminal::new(TestBackend::new(20, 10)).unwrap();
        terminal
            .draw(|f| {
                draw(
                    f,
                    &header,
                    &theme,
                    &Stats::default(),
                    2,
                    false,
                    true,
                    &mut [],
                    Duration::ZERO,
                )
            })
            .unwrap();

        let buf = terminal.backend().buffer();
        for x in [4, 5] {
            let cell = &buf[(x, 3)];
            assert_eq!(cell.symbol(), "▀");
            assert_eq!((cell.fg, cell.bg), (theme.accent, theme.accent));
        }
        assert_eq!(buf[(4, 4)].symbol(), "▔");
        assert_ne!(buf[(6, 3)].bg, theme.accent);
    }
}
