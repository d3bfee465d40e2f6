//! Image space beside k-space, linked by FOV and resolution.

use crate::{
    foundation::core::{Color, Point, Rect},
    foundation::error::LarmorResult,
    scene::builder::{Animation, ElementId, SceneBuilder},
    scene::model::{Anchor, Camera, LabelAsset, Scene, Style, em_for_font_size},
    scenes::catalog::SceneContext,
    scenes::encoding::AXIAL,
    scenes::layout::{FONT_SIZE, PlacedImage, insert_arrow, plain, tex},
    shapes::{self, CURVED_ARROW_ANGLE},
};

/// Image of the k-space magnitude.
pub(crate) const SPECTRUM: &str = "spectrum.png";

const PANEL_X: f64 = 5.2;
const TITLE_Y: f64 = 4.0;
const IMAGE_HEIGHT: f64 = 5.0;
const IMAGE_GAP: f64 = 0.8;
const RESOLUTION_ARROW: f64 = 0.5;

/// Label box in scene units, from the estimated width and the em size.
fn label_box(label: &LabelAsset, at: Point, anchor: Anchor) -> Rect {
    let w = label.estimated_width();
    let h = label.size;
    let x0 = at.x - anchor.x * w;
    let y0 = at.y - anchor.y * h;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

struct Annotated {
    label: ElementId,
    bounds: Rect,
}

fn annotate(
    b: &mut SceneBuilder,
    name: &str,
    label: LabelAsset,
    at: Point,
    anchor: Anchor,
) -> Annotated {
    let bounds = label_box(&label, at, anchor);
    Annotated {
        label: b.insert_label(name, label, at, anchor),
        bounds,
    }
}

/// Short arrow on the bottom edge of `image`, a quarter width from the center.
fn resolution_arrow(image: &PlacedImage, side: f64) -> shapes::ArrowShape {
    let rect = image.rect();
    let start = Point::new(rect.center().x + side * rect.width() / 4.0, rect.y0);
    let end = Point::new(start.x - side * RESOLUTION_ARROW, start.y);
    shapes::arrow(start, end, 0.0)
}

pub(crate) fn image_to_kspace(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("image-to-kspace").camera(Camera {
        frame_width: 20.0,
        frame_height: 12.0,
    });

    let title_size = FONT_SIZE * 0.8;
    let image_title = b.insert_label(
        "image-title",
        plain("Image Space", Color::PINK, title_size),
        Point::new(-PANEL_X, TITLE_Y),
        Anchor::CENTER,
    );
    let kspace_title = b.insert_label(
        "kspace-title",
        plain("K-Space", Color::PINK, title_size),
        Point::new(PANEL_X, TITLE_Y),
        Anchor::CENTER,
    );
    let top = TITLE_Y - em_for_font_size(title_size) / 2.0 - IMAGE_GAP;

    let brain = PlacedImage::fit_height(ctx, AXIAL, IMAGE_HEIGHT, 1, Point::new(-PANEL_X, 0.0))?
        .with_top(top);
    let spectrum =
        PlacedImage::fit_height(ctx, SPECTRUM, IMAGE_HEIGHT, 0, Point::new(PANEL_X, 0.0))?
            .with_top(top);
    let brain_id = brain.insert(&mut b, "brain");
    let spectrum_id = spectrum.insert(&mut b, "spectrum");

    let frame_stroke = shapes::stroke_units(8.0);
    let fov_rect = b.insert_path(
        "fov",
        shapes::rectangle(brain.rect()),
        Style::stroke(Color::LIGHT_BLUE, frame_stroke),
    );
    let nyquist_rect = b.insert_path(
        "nyquist",
        shapes::rectangle(spectrum.rect()),
        Style::stroke(Color::LIGHT_GREEN, frame_stroke),
    );

    let side_size = FONT_SIZE * 0.6;
    let fov = annotate(
        &mut b,
        "fov-label",
        plain("FOV", Color::LIGHT_BLUE, side_size),
        Point::new(brain.rect().x0 - 0.3, brain.center.y),
        Anchor::RIGHT,
    );
    let nyquist = annotate(
        &mut b,
        "nyquist-label",
        plain("Nyquist", Color::LIGHT_GREEN, side_size),
        Point::new(spectrum.rect().x1 + 0.3, spectrum.center.y),
        Anchor::LEFT,
    );

    let dx_shape = resolution_arrow(&brain, -1.0);
    let dk_shape = resolution_arrow(&spectrum, 1.0);
    let dx_arrow = insert_arrow(&mut b, "delta-x", &dx_shape, Color::LIGHT_GREEN, 12.0);
    let dk_arrow = insert_arrow(&mut b, "delta-kx", &dk_shape, Color::LIGHT_BLUE, 12.0);
    let below = |shape: &shapes::ArrowShape| {
        Point::new(shape.start.midpoint(shape.end).x, shape.start.y - 0.2)
    };
    let small = FONT_SIZE * 0.5;
    let dx = annotate(
        &mut b,
        "delta-x-label",
        plain("Δx", Color::LIGHT_GREEN, small),
        below(&dx_shape),
        Anchor::TOP,
    );
    let dk = annotate(
        &mut b,
        "delta-kx-label",
        plain("Δkx", Color::LIGHT_BLUE, small),
        below(&dk_shape),
        Anchor::TOP,
    );

    let mid_left = |r: Rect| Point::new(r.x0, r.center().y);
    let mid_right = |r: Rect| Point::new(r.x1, r.center().y);
    let link_fov = shapes::curved_arrow(
        mid_right(fov.bounds),
        mid_left(dk.bounds),
        CURVED_ARROW_ANGLE,
    );
    let link_nyquist = shapes::curved_arrow(
        mid_right(dx.bounds),
        mid_left(nyquist.bounds),
        CURVED_ARROW_ANGLE,
    );
    let link_fov = insert_arrow(&mut b, "fov-link", &link_fov, Color::LIGHT_BLUE, 4.0);
    let link_nyquist = insert_arrow(
        &mut b,
        "nyquist-link",
        &link_nyquist,
        Color::LIGHT_GREEN,
        4.0,
    );

    let formula_size = FONT_SIZE * 0.8;
    let pitch = em_for_font_size(formula_size) * 1.2 + 0.3;
    let formulas = [
        (r"\Delta k_x = \frac{1}{FOV_x}", Color::LIGHT_BLUE),
        (r"FOV_x = \frac{1}{\Delta k_x}", Color::LIGHT_BLUE),
        (r"\Delta x = \frac{1}{2k_{x,Nyquist}}", Color::LIGHT_GREEN),
        (r"k_{x,Nyquist} = \frac{1}{2\Delta x}", Color::LIGHT_GREEN),
    ];
    let formulas: Vec<_> = formulas
        .iter()
        .enumerate()
        .map(|(i, &(src, color))| {
            let y = (1.5 - i as f64) * pitch;
            b.insert_label(
                "relation",
                tex(src, color, formula_size),
                Point::new(0.0, y),
                Anchor::CENTER,
            )
        })
        .collect();

    b.play(1.5, [Animation::FadeIn(image_title), Animation::FadeIn(brain_id)])?;
    b.wait(0.5);
    b.play(1.0, [Animation::Create(fov_rect)])?;
    b.play(1.0, [Animation::Create(fov.label)])?;
    b.wait(1.0);
    b.play(1.0, [Animation::Create(dx_arrow)])?;
    b.play(1.0, [Animation::Create(dx.label)])?;
    b.wait(1.5);

    b.play(0.5, [Animation::FadeIn(kspace_title)])?;
    b.wait(0.5);
    b.play(
        1.5,
        [Animation::Flash {
            center: brain.center,
            radius: brain.width / 2.0,
            color: Color::WHITE,
            lines: 30,
            line_length: 0.3,
        }],
    )?;
    b.wait(0.5);
    b.play(1.0, [Animation::FadeIn(spectrum_id)])?;
    b.wait(0.5);
    b.play(1.0, [Animation::Create(nyquist_rect), Animation::Create(nyquist.label)])?;
    b.wait(0.5);
    b.play(1.0, [Animation::Create(dk_arrow)])?;
    b.play(1.0, [Animation::Create(dk.label)])?;
    b.wait(1.5);

    b.play(1.5, [Animation::Create(link_fov)])?;
    b.play(1.5, [Animation::Create(link_nyquist)])?;
    b.play(2.0, formulas.into_iter().map(Animation::Create))?;
    b.wait(3.0);
    b.build()
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/kspace.rs"]
mod tests;
