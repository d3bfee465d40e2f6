//! Spin-grid scenes over anatomical images: slice selection and the two
//! in-plane encodings.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::{
    foundation::core::{BezPath, Color, Point, Rect, Vec2},
    foundation::error::LarmorResult,
    physics::spins::{
        GridAxis, GridSpec, RotationAxis, SpinGlyph, SpinGrid, angle_color, interleaved_rows,
        precession_angle, spatial_phase,
    },
    scene::builder::{Animation, ElementId, SceneBuilder},
    scene::model::{Anchor, Scene, Style},
    scenes::catalog::SceneContext,
    scenes::layout::{
        ARROW_STROKE, FONT_SIZE, NEXT_TO_BUFF, PlacedImage, SpinLook, insert_arrow, insert_spins,
        tex,
    },
    shapes::{self, ARROW_TIP_LENGTH, AXIS_TIP_LENGTH, TICK_SIZE},
};

const BRAIN_HEIGHT: f64 = 7.0;
pub(crate) const SAGITTAL: &str = "brain-sagittal.png";
pub(crate) const AXIAL: &str = "brain-axial.png";

/// Arrows in these scenes sit this far inside their endpoints.
const ARROW_BUFF: f64 = 0.1;

/// Spins drawn over a sagittal slice, dephased by a z gradient.
struct SagittalSlice {
    image: PlacedImage,
    spins: Vec<(ElementId, SpinGlyph)>,
}

const SLICE_ROWS: usize = 15;
const SLICE_COLS: usize = 7;

impl SagittalSlice {
    /// Image, overlay and spins, shown at the cursor.
    ///
    /// The two middle rows start in-plane at 90°, the rest at 30°, and every
    /// spin is then turned about the vertical axis by its precession angle.
    fn build(ctx: &SceneContext, b: &mut SceneBuilder) -> LarmorResult<Self> {
        let image = PlacedImage::fit_height(ctx, SAGITTAL, BRAIN_HEIGHT, 0, Point::ORIGIN)?;
        let brain = image.insert(b, "brain");
        let overlay = image.insert_overlay(b);

        let mask = image.mask(0.7, 0.9)?;
        let spec = GridSpec::new(SLICE_ROWS, SLICE_COLS, image.center);
        let mut grid = SpinGrid::build(spec, &mask, 1.0, GridAxis::Rows);
        grid.rotate_each(RotationAxis::Out, |g| {
            if (6..=7).contains(&g.row) {
                FRAC_PI_2
            } else {
                30f64.to_radians()
            }
        });
        grid.rotate_each(RotationAxis::Up, |g| g.precession_angle(1.0));

        let spins = insert_spins(b, &grid, |_| SpinLook::standard(Color::LIGHT_GREEN));
        b.add([brain, overlay])?;
        b.add(spins.iter().map(|(id, _)| *id))?;
        Ok(Self { image, spins })
    }

    /// Rotate every spin about the vertical axis by `angle(glyph)` over `secs`.
    fn precess(
        &self,
        b: &mut SceneBuilder,
        secs: f64,
        angle: impl Fn(&SpinGlyph) -> f64,
    ) -> LarmorResult<()> {
        b.play(
            secs,
            self.spins.iter().map(|(id, g)| Animation::Rotate {
                target: *id,
                axis: RotationAxis::Up,
                angle: angle(g),
            }),
        )
    }
}

/// Vertical gradient arrow at x = 4 with its label on the right.
fn z_gradient_arrow(
    b: &mut SceneBuilder,
    from_y: f64,
    to_y: f64,
    label: &str,
    color: Color,
) -> (ElementId, ElementId) {
    let shape = shapes::arrow(Point::new(4.0, from_y), Point::new(4.0, to_y), ARROW_BUFF);
    let arrow = insert_arrow(b, "gradient-arrow", &shape, color, ARROW_STROKE);
    let label = b.insert_label(
        "gradient-label",
        tex(label, color, FONT_SIZE),
        Point::new(4.0 + ARROW_TIP_LENGTH / 2.0 + 0.1, 0.0),
        Anchor::LEFT,
    );
    (arrow, label)
}

/// Vertical number line with a tick per integer and a tip at the top.
fn vertical_number_line(x: f64, bottom: f64, length: f64, steps: usize) -> BezPath {
    let top = bottom + length;
    let mut path = shapes::line(Point::new(x, bottom), Point::new(x, top));
    for i in 0..=steps {
        let y = bottom + length * i as f64 / steps as f64;
        shapes::append(
            &mut path,
            &shapes::line(Point::new(x - TICK_SIZE, y), Point::new(x + TICK_SIZE, y)),
        );
    }
    shapes::append(
        &mut path,
        &shapes::arrow_tip(
            Point::new(x, top + AXIS_TIP_LENGTH),
            Vec2::new(0.0, 1.0),
            AXIS_TIP_LENGTH,
            AXIS_TIP_LENGTH,
        ),
    );
    path
}

pub(crate) fn slice_selection(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("slice-selection");
    let slice = SagittalSlice::build(ctx, &mut b)?;
    let brain = slice.image.rect();

    // z axis along the left edge of the image, one tick per row.
    let axis_len = BRAIN_HEIGHT;
    let axis_x = brain.x0 - NEXT_TO_BUFF - TICK_SIZE;
    let axis_bottom = brain.center().y - axis_len / 2.0;
    let steps = SLICE_ROWS - 1;
    let z_axis = b.insert_path(
        "z-axis",
        vertical_number_line(axis_x, axis_bottom, axis_len, steps),
        Style::stroke(Color::WHITE, shapes::stroke_units(2.0)).with_fill(Color::WHITE),
    );
    let z_label = b.insert_label(
        "z-label",
        tex("z", Color::WHITE, 36.0),
        Point::new(axis_x - TICK_SIZE - NEXT_TO_BUFF, brain.center().y + 3.0),
        Anchor::RIGHT,
    );

    let z0_index = (SLICE_ROWS / 2) as f64 - 0.5;
    let z0_marker = Point::new(axis_x, axis_bottom + axis_len * z0_index / steps as f64);
    let z0_dot = b.insert_path("z0", shapes::dot(z0_marker), Style::fill(Color::YELLOW));
    let z0_label = b.insert_label(
        "z0-label",
        tex("z_0", Color::YELLOW, 36.0),
        Point::new(z0_marker.x - shapes::DOT_RADIUS - NEXT_TO_BUFF, z0_marker.y),
        Anchor::RIGHT,
    );

    // Band two rows tall over the excited slice.
    let spec = GridSpec::new(SLICE_ROWS, SLICE_COLS, slice.image.center);
    let z0_y = spec.position(z0_index, 0.0).y;
    let band = b.insert_path(
        "slice-band",
        shapes::rectangle(Rect::from_center_size(
            Point::new(brain.center().x, z0_y),
            (brain.width(), 2.0 * spec.spacing),
        )),
        Style::stroke(Color::YELLOW, shapes::stroke_units(2.0))
            .with_fill(Color::YELLOW.with_opacity(0.3)),
    );
    b.add([z_axis, z_label, z0_dot, z0_label, band])?;

    slice.precess(&mut b, 5.0, |g| g.base_frequency * TAU * 2.0)?;

    let (arrow, label) = z_gradient_arrow(&mut b, -3.0, 3.0, "G_z", Color::LIGHT_BLUE);
    b.play(0.5, [Animation::Create(arrow), Animation::Create(label)])?;

    let omega_up = b.insert_label(
        "omega-high",
        tex(r"\uparrow \omega", Color::LIGHT_GREEN, 60.0),
        Point::new(brain.center().x + 2.7, brain.y1 + NEXT_TO_BUFF - 1.0),
        Anchor::BOTTOM,
    );
    let omega_down = b.insert_label(
        "omega-low",
        tex(r"\downarrow \omega", Color::LIGHT_GREEN, 36.0),
        Point::new(brain.center().x + 2.7, brain.y0 - NEXT_TO_BUFF + 1.0),
        Anchor::TOP,
    );
    b.add([omega_up, omega_down])?;

    // Spins above the slice precess faster, spins below slower.
    slice.precess(&mut b, 5.0, |g| g.precession_angle(0.5) * 2.0)?;
    b.build()
}

pub(crate) fn slice_rephasing(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("slice-rephasing");
    let slice = SagittalSlice::build(ctx, &mut b)?;

    let (arrow, label) = z_gradient_arrow(&mut b, -3.0, 3.0, "G_z", Color::LIGHT_BLUE);
    b.add([arrow, label])?;
    b.wait(3.0);

    let (reverse, reverse_label) = z_gradient_arrow(&mut b, 3.0, -3.0, "-G_z", Color::RED);
    b.play(
        0.5,
        [
            Animation::FadeOut(arrow),
            Animation::FadeOut(label),
            Animation::FadeIn(reverse),
            Animation::FadeIn(reverse_label),
        ],
    )?;

    // The reversed gradient slows the fast spins so the slice comes back into phase.
    slice.precess(&mut b, 5.0, |g| g.precession_angle(-0.5) * 2.0)?;

    b.play(
        0.5,
        [
            Animation::FadeOut(reverse_label),
            Animation::FadeOut(reverse),
        ],
    )?;
    b.wait(4.0);
    b.build()
}

const AXIAL_ROWS: usize = 5;
const AXIAL_COLS: usize = 15;

/// Axial image turned a quarter, with its overlay, shown at the cursor.
fn axial_image(ctx: &SceneContext, b: &mut SceneBuilder) -> LarmorResult<PlacedImage> {
    let image = PlacedImage::fit_height(ctx, AXIAL, BRAIN_HEIGHT, 1, Point::ORIGIN)?;
    let brain = image.insert(b, "brain");
    let overlay = image.insert_overlay(b);
    b.add([brain, overlay])?;
    Ok(image)
}

/// Upright spins on the axial grid, shown at the cursor.
fn axial_spins(
    b: &mut SceneBuilder,
    image: &PlacedImage,
    axis: GridAxis,
) -> LarmorResult<(SpinGrid, Vec<(ElementId, SpinGlyph)>)> {
    let mask = image.mask(0.9, 0.7)?;
    let grid = SpinGrid::build(
        GridSpec::new(AXIAL_ROWS, AXIAL_COLS, image.center),
        &mask,
        1.0,
        axis,
    );
    let spins = insert_spins(b, &grid, |_| SpinLook::standard(Color::LIGHT_GREEN));
    b.add(spins.iter().map(|(id, _)| *id))?;
    Ok((grid, spins))
}

/// In-plane rotation of every spin by `angle(glyph)` over `secs`.
fn rotate_in_plane(
    b: &mut SceneBuilder,
    spins: &[(ElementId, SpinGlyph)],
    secs: f64,
    angle: impl Fn(&SpinGlyph) -> f64,
) -> LarmorResult<()> {
    b.play(
        secs,
        spins.iter().map(|(id, g)| Animation::Rotate {
            target: *id,
            axis: RotationAxis::Out,
            angle: angle(g),
        }),
    )
}

pub(crate) fn frequency_encoding(ctx: &SceneContext) -> LarmorResult<Scene> {
    const STRENGTH: f64 = 0.7;

    let mut b = ctx.builder("frequency-encoding");
    let image = axial_image(ctx, &mut b)?;
    let brain = image.rect();
    let (_, spins) = axial_spins(&mut b, &image, GridAxis::Cols)?;

    rotate_in_plane(&mut b, &spins, 3.0, |g| g.base_frequency * TAU * 1.5)?;

    let arrow_y = brain.y0 - ARROW_BUFF - ARROW_TIP_LENGTH / 2.0;
    let shape = shapes::arrow(
        Point::new(brain.center().x - 4.0, arrow_y),
        Point::new(brain.center().x + 4.0, arrow_y),
        ARROW_BUFF,
    );
    let arrow = insert_arrow(&mut b, "gradient-arrow", &shape, Color::LIGHT_BLUE, ARROW_STROKE);
    let label = b.insert_label(
        "gradient-label",
        tex("G_x", Color::LIGHT_BLUE, FONT_SIZE),
        Point::new(brain.center().x, arrow_y - ARROW_TIP_LENGTH / 2.0 - 0.1),
        Anchor::TOP,
    );
    b.play(0.5, [Animation::Create(arrow), Animation::Create(label)])?;

    let omega_low = b.insert_label(
        "omega-low",
        tex(r"\downarrow \omega", Color::PINK, 36.0),
        Point::new(brain.x0 - 0.5, brain.center().y),
        Anchor::RIGHT,
    );
    let omega_high = b.insert_label(
        "omega-high",
        tex(r"\uparrow \omega", Color::PINK, 60.0),
        Point::new(brain.x1 + 0.5, brain.center().y),
        Anchor::LEFT,
    );
    b.play(1.0, [Animation::Create(omega_low), Animation::Create(omega_high)])?;

    // Frequency grows with the column index under G_x.
    rotate_in_plane(&mut b, &spins, 3.0, |g| {
        (g.base_frequency + STRENGTH * g.col as f64) * TAU / 2.0
    })?;
    b.wait(4.0);
    b.build()
}

pub(crate) fn phase_encoding(ctx: &SceneContext) -> LarmorResult<Scene> {
    const SUBROWS: usize = 2;
    const SMALL_SCALE: f64 = 0.75;
    const CYCLES: f64 = 2.0;
    const LEFT_COLOR: Color = Color::YELLOW;
    const RIGHT_COLOR: Color = Color::BLUE;

    let mut b = ctx.builder("phase-encoding");
    let image = axial_image(ctx, &mut b)?;
    let brain = image.rect();
    let (mut grid, spins) = axial_spins(&mut b, &image, GridAxis::Rows)?;

    let base = |g: &SpinGlyph| g.base_frequency * TAU * 2.0;
    let encode = |g: &SpinGlyph| precession_angle(g.base_frequency, g.gradient_factor + 0.5, 1.0);
    let settle = |g: &SpinGlyph| g.base_frequency * 0.875 * TAU * 2.0;

    rotate_in_plane(&mut b, &spins, 3.0, base)?;

    let arrow_x = brain.x0 - ARROW_BUFF - ARROW_TIP_LENGTH / 2.0;
    let shape = shapes::arrow(
        Point::new(arrow_x, brain.center().y - 3.0),
        Point::new(arrow_x, brain.center().y + 3.0),
        ARROW_BUFF,
    );
    let arrow = insert_arrow(&mut b, "gradient-arrow", &shape, Color::LIGHT_BLUE, ARROW_STROKE);
    let label = b.insert_label(
        "gradient-label",
        tex("G_y", Color::LIGHT_BLUE, FONT_SIZE),
        Point::new(arrow_x - ARROW_TIP_LENGTH / 2.0 - 0.1, brain.center().y),
        Anchor::RIGHT,
    );
    b.play(0.5, [Animation::Create(arrow), Animation::Create(label)])?;

    rotate_in_plane(&mut b, &spins, 3.0, encode)?;
    b.play(1.0, [Animation::FadeOut(arrow), Animation::FadeOut(label)])?;
    rotate_in_plane(&mut b, &spins, 3.0, settle)?;
    b.wait(0.5);

    // Replay the rotations on the model to find where each arrow ends up.
    grid.rotate_each(RotationAxis::Out, base);
    grid.rotate_each(RotationAxis::Out, encode);
    grid.rotate_each(RotationAxis::Out, settle);
    b.play(
        0.75,
        spins.iter().zip(&grid.glyphs).map(|((id, _), g)| Animation::SetColor {
            target: *id,
            color: if g.points_right() {
                RIGHT_COLOR
            } else {
                LEFT_COLOR
            },
        }),
    )?;

    // Interleaved rows show the spatial frequency the phase pattern encodes.
    let mask = image.mask(0.9, 0.7)?;
    let mut extra = Vec::new();
    for row in interleaved_rows(AXIAL_ROWS, SUBROWS) {
        for col in 0..AXIAL_COLS {
            let position = grid.spec.position(row, col as f64);
            if !mask.contains(position) {
                continue;
            }
            let mut glyph = SpinGlyph::new(row.floor() as usize, col, position, 1.0, 0.0);
            glyph.rotate(spatial_phase(row, AXIAL_ROWS, CYCLES), RotationAxis::Out);
            let color = angle_color(glyph.direction(), LEFT_COLOR, RIGHT_COLOR);
            let look = SpinLook::small(color, SMALL_SCALE);
            extra.push(b.insert("sub-spin", look.visual(&glyph)));
        }
    }
    b.play(1.5, extra.iter().map(|id| Animation::FadeIn(*id)))?;

    let caption = b.insert_label(
        "spatial-frequency",
        tex(
            r"\text{Spatial Frequency: } 2 \text{ cycles}",
            Color::LIGHT_BLUE,
            36.0,
        ),
        Point::new(0.0, 4.0),
        Anchor::TOP,
    );
    b.play(1.0, [Animation::FadeIn(caption)])?;
    b.wait(1.0);
    b.build()
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/encoding.rs"]
mod tests;
