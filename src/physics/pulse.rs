use crate::foundation::core::{BezPath, Color, Point, Rect};
use crate::foundation::error::{LarmorError, LarmorResult};
use crate::foundation::math::{linspace, sinc};
use crate::physics::axes::AxisMapping;

/// Reference sample count for RF pulse curves.
pub const DEFAULT_RF_SAMPLES: usize = 100;

/// Half-height (in amplitude units) of the readout window box.
pub const READOUT_WINDOW_HALF_HEIGHT: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A rectangular gradient lobe on a sequence timeline.
///
/// Only timing and amplitude are stored; the rectangle is derived from an
/// [`AxisMapping`] on demand.
pub struct GradientPulse {
    /// Start time in domain units.
    pub start: f64,
    /// Duration in domain units.
    pub duration: f64,
    /// Signed amplitude; negative values are reversed polarity.
    pub amplitude: f64,
    /// Fill color.
    pub color: Color,
    /// Fill opacity in `0..=1`.
    pub fill_opacity: f64,
}

impl GradientPulse {
    /// Opaque white lobe; rejects non-finite inputs and negative durations.
    pub fn new(start: f64, duration: f64, amplitude: f64) -> LarmorResult<Self> {
        if !(start.is_finite() && duration.is_finite() && amplitude.is_finite()) {
            return Err(LarmorError::validation(
                "gradient pulse timing and amplitude must be finite",
            ));
        }
        if duration < 0.0 {
            return Err(LarmorError::validation(
                "gradient pulse duration must be >= 0",
            ));
        }
        Ok(Self {
            start,
            duration,
            amplitude,
            color: Color::WHITE,
            fill_opacity: 1.0,
        })
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the fill opacity.
    pub fn with_fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// `start + duration`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Scene rectangle spanning `[start, end]` horizontally and `0..amplitude` vertically.
    pub fn rect(&self, mapping: &AxisMapping) -> Rect {
        let p1 = mapping.c2p(self.start, 0.0);
        let p2 = mapping.c2p(self.end(), self.amplitude);
        let width = p2.x - p1.x;
        let height = (p2.y - p1.y).abs();
        Rect::from_center_size(p1.midpoint(p2), (width, height))
    }
}

/// Readout window box on `mapping`, spanning `[start, start + duration]` and
/// amplitudes `-0.8..0.8`.
pub fn readout_window(mapping: &AxisMapping, start: f64, duration: f64) -> Rect {
    let p1 = mapping.c2p(start, -READOUT_WINDOW_HALF_HEIGHT);
    let p2 = mapping.c2p(start + duration, READOUT_WINDOW_HALF_HEIGHT);
    Rect::from_center_size(p1.midpoint(p2), (p2.x - p1.x, p2.y - p1.y))
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Sinc-shaped RF excitation over a time window.
pub struct RfPulse {
    /// Window start in domain units.
    pub start: f64,
    /// Window length in domain units.
    pub duration: f64,
    /// Peak amplitude.
    pub amplitude: f64,
}

impl RfPulse {
    /// Build a pulse; the window must be finite and non-empty.
    pub fn new(start: f64, duration: f64, amplitude: f64) -> LarmorResult<Self> {
        if !(start.is_finite() && duration.is_finite() && amplitude.is_finite()) {
            return Err(LarmorError::validation("RF pulse inputs must be finite"));
        }
        if duration <= 0.0 {
            return Err(LarmorError::validation("RF pulse duration must be > 0"));
        }
        Ok(Self {
            start,
            duration,
            amplitude,
        })
    }

    /// Window center.
    pub fn center(&self) -> f64 {
        self.start + self.duration / 2.0
    }

    /// Main-lobe scale: 80% of the window.
    pub fn width(&self) -> f64 {
        self.duration * 0.8
    }

    /// `amplitude * sinc((t - center) / (width / 5))`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.amplitude * sinc((t - self.center()) / (self.width() / 5.0))
    }

    /// `n` uniform `(t, value)` samples over the window, both ends included.
    pub fn samples(&self, n: usize) -> Vec<(f64, f64)> {
        linspace(self.start, self.start + self.duration, n)
            .into_iter()
            .map(|t| (t, self.value_at(t)))
            .collect()
    }

    /// Samples mapped into scene units.
    pub fn points(&self, mapping: &AxisMapping, n: usize) -> Vec<Point> {
        self.samples(n)
            .into_iter()
            .map(|(t, v)| mapping.c2p(t, v))
            .collect()
    }

    /// Smooth curve through [`DEFAULT_RF_SAMPLES`] mapped samples.
    pub fn curve(&self, mapping: &AxisMapping) -> BezPath {
        crate::shapes::smooth_curve(&self.points(mapping, DEFAULT_RF_SAMPLES))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/pulse.rs"]
mod tests;
