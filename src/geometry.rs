//! Host geometry: the measurement port and the pixel/row conversions.
//!
//! Two coordinate systems meet here. Settled cells use row indices counted
//! upward from the floor (row 0 is the bottom). Falling units use `y` measured
//! downward from the header top in unit-size multiples. [`Metrics`] is the
//! only place that converts between them.

use crate::config::DEFAULT_HEADER_HEIGHT;

/// Size of the element hosting the animation, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostRect {
    pub width: f64,
    pub height: f64,
}

impl HostRect {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Supplies the host element's size. `None` means it cannot be measured right now.
pub trait GeometryProvider {
    fn measure(&self) -> Option<HostRect>;
}

impl GeometryProvider for HostRect {
    fn measure(&self) -> Option<HostRect> {
        Some(*self)
    }
}

impl<T: GeometryProvider + ?Sized> GeometryProvider for &T {
    fn measure(&self) -> Option<HostRect> {
        (**self).measure()
    }
}

/// Block size and header height; converts between rows and pixel heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub unit_size: f64,
    pub header_height: f64,
}

impl Metrics {
    pub const fn new(unit_size: f64) -> Self {
        Self {
            unit_size,
            header_height: DEFAULT_HEADER_HEIGHT,
        }
    }

    /// Top edge, in pixels from the header top, of a settled cell in `row`.
    #[inline]
    pub fn row_to_pixel_y(&self, row: usize) -> f64 {
        self.header_height - self.unit_size * (row as f64 + 1.0)
    }

    /// Same as [`Self::row_to_pixel_y`] in unit-size multiples (falling-unit `y`).
    #[inline]
    pub fn row_to_unit_y(&self, row: usize) -> f64 {
        self.row_to_pixel_y(row) / self.unit_size
    }

    /// Number of whole columns that fit into `width` pixels.
    pub fn columns_for_width(&self, width: f64) -> usize {
        columns_for_width(width, self.unit_size)
    }
}

/// `floor(width / unit_size)`; widths that are negative or not finite give 0.
pub fn columns_for_width(width: f64, unit_size: f64) -> usize {
    if !width.is_finite() || width <= 0.0 {
        return 0;
    }
    (width / unit_size).floor() as usize
}

/// Column under a horizontal pixel offset, clamped to `[0, columns - 1]`.
pub fn column_from_pixel_x(pixel_x: f64, unit_size: f64, columns: usize) -> usize {
    if columns == 0 || pixel_x.is_nan() || pixel_x <= 0.0 {
        return 0;
    }
    let column = (pixel_x / unit_size).floor();
    if column >= columns as f64 {
        columns - 1
    } else {
        column as usize
    }
}
