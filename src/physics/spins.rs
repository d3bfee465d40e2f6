use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Color, Point, Vec2};
use crate::foundation::error::{LarmorError, LarmorResult};

/// Distance between neighbouring spins in scene units.
pub const GRID_SPACING: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Elliptical region standing in for an anatomical boundary.
///
/// Offsets are normalized by the image half-extents before the ellipse test,
/// so `rx`/`ry` are fractions of the image size.
pub struct EllipticalMask {
    /// Image center.
    pub center: Point,
    /// Image half-width.
    pub half_width: f64,
    /// Image half-height.
    pub half_height: f64,
    /// Normalized horizontal radius.
    pub rx: f64,
    /// Normalized vertical radius.
    pub ry: f64,
}

impl EllipticalMask {
    /// Mask over an image of `width` x `height` centered at `center`.
    pub fn new(center: Point, width: f64, height: f64, rx: f64, ry: f64) -> LarmorResult<Self> {
        if !(width > 0.0 && height > 0.0 && rx > 0.0 && ry > 0.0) {
            return Err(LarmorError::validation(
                "elliptical mask extents and radii must be > 0",
            ));
        }
        Ok(Self {
            center,
            half_width: width / 2.0,
            half_height: height / 2.0,
            rx,
            ry,
        })
    }

    /// Strict interior test: points on the boundary are outside.
    pub fn contains(&self, p: Point) -> bool {
        let nx = (p.x - self.center.x) / self.half_width;
        let ny = (p.y - self.center.y) / self.half_height;
        (nx / self.rx).powi(2) + (ny / self.ry).powi(2) < 1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Regular lattice of candidate spin positions.
pub struct GridSpec {
    /// Number of rows (y).
    pub rows: usize,
    /// Number of columns (x).
    pub cols: usize,
    /// Lattice spacing in scene units.
    pub spacing: f64,
    /// Lattice center.
    pub center: Point,
}

impl GridSpec {
    /// Grid with [`GRID_SPACING`] centered at `center`.
    pub fn new(rows: usize, cols: usize, center: Point) -> Self {
        Self {
            rows,
            cols,
            spacing: GRID_SPACING,
            center,
        }
    }

    /// Scene position of a (possibly fractional) row and column.
    pub fn position(&self, row: f64, col: f64) -> Point {
        Point::new(
            (col - (self.cols as f64 - 1.0) / 2.0) * self.spacing + self.center.x,
            (row - (self.rows as f64 - 1.0) / 2.0) * self.spacing + self.center.y,
        )
    }
}

/// Linear gradient weight in `-1..=1` for index `i` of `n`; `0` when `n == 1`.
pub fn gradient_factor(index: usize, count: usize) -> f64 {
    if count <= 1 {
        return 0.0;
    }
    let half = (count as f64 - 1.0) / 2.0;
    (index as f64 - half) / half
}

/// Rotation in turns scaled to radians: `(base + strength * factor) * TAU`.
pub fn precession_angle(base_frequency: f64, factor: f64, strength: f64) -> f64 {
    (base_frequency + strength * factor) * TAU
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Axis a spin arrow is rotated about.
pub enum RotationAxis {
    /// The viewing axis: an in-plane rotation.
    Out,
    /// The vertical screen axis: seen as horizontal foreshortening.
    Up,
}

impl RotationAxis {
    /// Rotate a 3D vector by `angle` radians about this axis.
    pub fn rotate(self, v: [f64; 3], angle: f64) -> [f64; 3] {
        let (s, c) = angle.sin_cos();
        let [x, y, z] = v;
        match self {
            Self::Out => [x * c - y * s, x * s + y * c, z],
            Self::Up => [x * c + z * s, y, -x * s + z * c],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Index that drives a grid's gradient factor.
pub enum GridAxis {
    /// Gradient along rows (y).
    Rows,
    /// Gradient along columns (x).
    Cols,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Rotation state of one spin arrow.
///
/// `orientation` is the arrow direction and `side` the in-plane normal used
/// to draw the tip; both rotate together. `phase_angle` sums every rotation
/// applied, so the state depends on call order.
pub struct SpinGlyph {
    /// Grid row.
    pub row: usize,
    /// Grid column.
    pub col: usize,
    /// Scene position.
    pub position: Point,
    /// Precession frequency without gradients, in turns.
    pub base_frequency: f64,
    /// Gradient weight in `-1..=1`.
    pub gradient_factor: f64,
    /// Accumulated rotation in radians.
    pub phase_angle: f64,
    /// Arrow direction, initially straight up.
    pub orientation: [f64; 3],
    /// Tip normal, initially along +x.
    pub side: [f64; 3],
}

impl SpinGlyph {
    /// Upright spin at `position`.
    pub fn new(
        row: usize,
        col: usize,
        position: Point,
        base_frequency: f64,
        gradient_factor: f64,
    ) -> Self {
        Self {
            row,
            col,
            position,
            base_frequency,
            gradient_factor,
            phase_angle: 0.0,
            orientation: [0.0, 1.0, 0.0],
            side: [1.0, 0.0, 0.0],
        }
    }

    /// Apply one rotation in place.
    pub fn rotate(&mut self, angle: f64, axis: RotationAxis) {
        self.orientation = axis.rotate(self.orientation, angle);
        self.side = axis.rotate(self.side, angle);
        self.phase_angle += angle;
    }

    /// `precession_angle` using this glyph's base frequency and gradient factor.
    pub fn precession_angle(&self, strength: f64) -> f64 {
        precession_angle(self.base_frequency, self.gradient_factor, strength)
    }

    /// Arrow direction projected onto the screen.
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.orientation[0], self.orientation[1])
    }

    /// Whether the projected arrow has a positive x component.
    pub fn points_right(&self) -> bool {
        self.orientation[0] > 0.0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Spins on a masked grid, in row-major order.
pub struct SpinGrid {
    /// Lattice the spins were placed on.
    pub spec: GridSpec,
    /// Spins that fell inside the mask.
    pub glyphs: Vec<SpinGlyph>,
}

impl SpinGrid {
    /// Place a spin at every lattice point inside `mask`.
    pub fn build(
        spec: GridSpec,
        mask: &EllipticalMask,
        base_frequency: f64,
        gradient_axis: GridAxis,
    ) -> Self {
        let mut glyphs = Vec::new();
        for row in 0..spec.rows {
            for col in 0..spec.cols {
                let position = spec.position(row as f64, col as f64);
                if !mask.contains(position) {
                    continue;
                }
                let factor = match gradient_axis {
                    GridAxis::Rows => gradient_factor(row, spec.rows),
                    GridAxis::Cols => gradient_factor(col, spec.cols),
                };
                glyphs.push(SpinGlyph::new(row, col, position, base_frequency, factor));
            }
        }
        Self { spec, glyphs }
    }

    /// Rotate every spin by the angle `f` returns for it.
    pub fn rotate_each(&mut self, axis: RotationAxis, mut f: impl FnMut(&SpinGlyph) -> f64) {
        for glyph in &mut self.glyphs {
            let angle = f(glyph);
            glyph.rotate(angle, axis);
        }
    }

    /// Number of placed spins.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether no spin fell inside the mask.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Fractional row positions of the sub-rows inserted between `rows` original
/// rows, `subrows` per gap. Original rows are skipped.
pub fn interleaved_rows(rows: usize, subrows: usize) -> Vec<f64> {
    if rows == 0 {
        return Vec::new();
    }
    let stride = subrows + 1;
    let total = rows * stride - subrows;
    (0..total)
        .filter(|row| row % stride != 0)
        .map(|row| row as f64 / stride as f64)
        .collect()
}

/// Phase of a spatial-frequency pattern with `cycles` turns over `rows` rows.
pub fn spatial_phase(row: f64, rows: usize, cycles: f64) -> f64 {
    let norm = if rows > 1 {
        row / (rows as f64 - 1.0)
    } else {
        0.0
    };
    -(cycles * TAU * norm - PI / 2.0)
}

/// Blend `from` to `to` by the direction's angle from +y, mapped onto `0..=1`.
pub fn angle_color(direction: Vec2, from: Color, to: Color) -> Color {
    let angle = direction.x.atan2(direction.y);
    Color::interpolate(from, to, (angle + PI) / TAU)
}

#[cfg(test)]
#[path = "../../tests/unit/physics/spins.rs"]
mod tests;
