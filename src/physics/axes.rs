use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{LarmorError, LarmorResult};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Declared domain of one axis, with the tick step used when drawing it.
pub struct AxisRange {
    /// Lower domain bound.
    pub min: f64,
    /// Upper domain bound.
    pub max: f64,
    /// Tick spacing in domain units.
    pub step: f64,
}

impl AxisRange {
    /// Build a range, rejecting non-finite bounds, `min >= max` and non-positive steps.
    pub fn new(min: f64, max: f64, step: f64) -> LarmorResult<Self> {
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(LarmorError::validation("axis range must be finite"));
        }
        if min >= max {
            return Err(LarmorError::validation(format!(
                "axis range is degenerate: min {min} >= max {max}"
            )));
        }
        if step <= 0.0 {
            return Err(LarmorError::validation("axis step must be > 0"));
        }
        Ok(Self { min, max, step })
    }

    /// `max - min`.
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the domain.
    pub fn mid(self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Tick positions from `min` to `max` inclusive.
    pub fn ticks(self) -> Vec<f64> {
        let count = (self.span() / self.step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| self.min + self.step * (i as f64))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Affine map from a pair of domain ranges onto a rectangle in scene units.
///
/// The domain midpoint lands on `center`. Values outside the declared
/// ranges are not clamped and map linearly off the axes.
pub struct AxisMapping {
    /// Horizontal domain.
    pub x_range: AxisRange,
    /// Vertical domain.
    pub y_range: AxisRange,
    /// Horizontal extent in scene units.
    pub x_length: f64,
    /// Vertical extent in scene units.
    pub y_length: f64,
    /// Scene point of the domain midpoint.
    pub center: Point,
}

impl AxisMapping {
    /// Mapping centered on the scene origin.
    pub fn new(
        x_range: AxisRange,
        y_range: AxisRange,
        x_length: f64,
        y_length: f64,
    ) -> LarmorResult<Self> {
        // Ranges may be built as literals, so re-check them here.
        let x_range = AxisRange::new(x_range.min, x_range.max, x_range.step)?;
        let y_range = AxisRange::new(y_range.min, y_range.max, y_range.step)?;
        if !(x_length.is_finite() && x_length > 0.0 && y_length.is_finite() && y_length > 0.0) {
            return Err(LarmorError::validation(
                "axis lengths must be finite and > 0",
            ));
        }
        Ok(Self {
            x_range,
            y_range,
            x_length,
            y_length,
            center: Point::ORIGIN,
        })
    }

    /// Same mapping with its domain midpoint moved to `center`.
    pub fn centered_at(self, center: Point) -> Self {
        Self { center, ..self }
    }

    /// Same mapping translated by `offset`.
    pub fn shifted(self, offset: Vec2) -> Self {
        Self {
            center: self.center + offset,
            ..self
        }
    }

    /// Same mapping with both lengths scaled about its center.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x_length: self.x_length * factor,
            y_length: self.y_length * factor,
            ..self
        }
    }

    /// Scene units per domain unit along x.
    pub fn x_scale(&self) -> f64 {
        self.x_length / self.x_range.span()
    }

    /// Scene units per domain unit along y.
    pub fn y_scale(&self) -> f64 {
        self.y_length / self.y_range.span()
    }

    /// Domain coordinates to scene point.
    pub fn c2p(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.center.x + (x - self.x_range.mid()) * self.x_scale(),
            self.center.y + (y - self.y_range.mid()) * self.y_scale(),
        )
    }

    /// Scene point to domain coordinates.
    pub fn p2c(&self, p: Point) -> (f64, f64) {
        (
            self.x_range.mid() + (p.x - self.center.x) / self.x_scale(),
            self.y_range.mid() + (p.y - self.center.y) / self.y_scale(),
        )
    }

    /// `c2p(0, 0)`.
    pub fn origin(&self) -> Point {
        self.c2p(0.0, 0.0)
    }

    /// Point where the two axis lines cross: domain zero, clamped into each range.
    pub fn axis_cross(&self) -> Point {
        self.c2p(
            0.0_f64.clamp(self.x_range.min, self.x_range.max),
            0.0_f64.clamp(self.y_range.min, self.y_range.max),
        )
    }

    /// Scene rectangle covered by the declared ranges.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.x_length, self.y_length))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/axes.rs"]
mod tests;
