//! Equation slides: one or two formulas, optionally written and transformed.

use crate::{
    foundation::core::{Color, Point},
    foundation::error::LarmorResult,
    scene::builder::Animation,
    scene::model::{Anchor, Scene},
    scenes::catalog::SceneContext,
    scenes::layout::{FONT_SIZE, tex, tex_parts},
};

const W: Color = Color::WHITE;

/// `B(x, y, z)` as the main field plus three gradient terms.
pub(crate) fn field_equation(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("field-equation");
    let eq = b.insert_label(
        "equation",
        tex_parts(
            &[
                ("B(x, y, z) = (", W),
                ("B_0", Color::RED),
                ("+", W),
                ("G_z z", Color::LIGHT_GREEN),
                ("+", W),
                ("G_y y", Color::PINK),
                ("+", W),
                ("G_x x", Color::LIGHT_BLUE),
                (")", W),
                (r"\hat{z}", Color::PURPLE),
            ],
            FONT_SIZE,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    b.add([eq])?;
    b.build()
}

pub(crate) fn larmor_frequency(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("larmor-frequency");
    let eq = b.insert_label(
        "equation",
        tex_parts(
            &[
                (r"\omega _{Larmor}", Color::LIGHT_BLUE),
                ("=", W),
                (r"\gamma", Color::PINK),
                ("B(x, y, z)", W),
            ],
            FONT_SIZE,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    b.add([eq])?;
    b.build()
}

/// Signal of a single spin, then the integral over every spin of the slice.
pub(crate) fn spin_signal_equations(ctx: &SceneContext) -> LarmorResult<Scene> {
    let size = FONT_SIZE * 1.5;
    let mut b = ctx.builder("spin-signal-equations");
    let single = b.insert_label(
        "single-spin",
        tex_parts(
            &[
                ("s(t) = ", W),
                ("M(x, y)", Color::LIGHT_GREEN),
                (r"e^{i \phi (t)}", W),
            ],
            size,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    let total = b.insert_label(
        "total",
        tex_parts(
            &[
                ("s(t) = ", W),
                (r"\int \int", W),
                ("M(x, y)", Color::LIGHT_GREEN),
                (r"e^{i \phi (", W),
                ("x,", Color::PINK),
                ("y,", Color::LIGHT_BLUE),
                (r"t)} \,dx \,dy", W),
            ],
            size,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );

    b.play(1.0, [Animation::Create(single)])?;
    b.wait(3.0);
    b.play(
        1.0,
        [Animation::Transform {
            from: single,
            to: total,
        }],
    )?;
    b.wait(3.0);
    b.build()
}

/// `dφ/dt = ω` above the origin and its integral below.
pub(crate) fn phi_definition(ctx: &SceneContext) -> LarmorResult<Scene> {
    let size = FONT_SIZE * 2.0;
    let mut b = ctx.builder("phi-definition");
    let derivative = b.insert_label(
        "derivative",
        tex_parts(
            &[
                (r"\frac{d ", W),
                (r"\phi", Color::PINK),
                (r"}{d t} = \omega", W),
            ],
            size,
        ),
        Point::new(0.0, 1.0),
        Anchor::BOTTOM,
    );
    let integral = b.insert_label(
        "integral",
        tex_parts(&[(r"\phi", Color::PINK), (r" = \int \omega \,dt", W)], size),
        Point::new(0.0, -1.0),
        Anchor::TOP,
    );
    b.add([derivative, integral])?;
    b.build()
}

pub(crate) fn omega_relations(ctx: &SceneContext) -> LarmorResult<Scene> {
    let size = FONT_SIZE * 2.0;
    let mut b = ctx.builder("omega-relations");
    let field = b.insert_label(
        "omega-field",
        tex_parts(
            &[
                (r"\omega", W),
                (r" = \gamma", W),
                ("B(x, y)", Color::LIGHT_BLUE),
            ],
            size,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    let gradients = b.insert_label(
        "omega-gradients",
        tex_parts(
            &[
                (r"\omega", W),
                (r" = \gamma (", W),
                ("G_x x", Color::LIGHT_BLUE),
                ("+", W),
                ("G_y y", Color::LIGHT_GREEN),
                (")", W),
            ],
            size,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );

    b.play(1.0, [Animation::Create(field)])?;
    b.wait(4.0);
    b.play(
        1.0,
        [Animation::Transform {
            from: field,
            to: gradients,
        }],
    )?;
    b.wait(4.0);
    b.build()
}

pub(crate) fn final_phi(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("final-phi");
    let phi = b.insert_label(
        "phi",
        tex_parts(
            &[
                (r"\phi", Color::PINK),
                (r" = \gamma (", W),
                (r"x\int G_x \,dt", Color::LIGHT_BLUE),
                ("+", W),
                (r"y\int G_y \,dt", Color::LIGHT_GREEN),
                (")", W),
            ],
            FONT_SIZE * 2.0,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    b.play(4.0, [Animation::Create(phi)])?;
    b.wait(4.0);
    b.build()
}

/// Signal equation with both gradient phase terms; braces span parts.
pub(crate) fn total_signal(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("total-signal");
    let eq = b.insert_label(
        "equation",
        tex_parts(
            &[
                ("s(t) = ", W),
                (r"\int \int", W),
                ("M(x, y)", Color::LIGHT_GREEN),
                (r"e^{i \gamma", W),
                ("x", Color::LIGHT_BLUE),
                (r"\int G_x \,dt}", W),
                (r"e^{i \gamma", W),
                ("y", Color::PINK),
                (r"\int G_y \,dt}", W),
                (r" \,dx \,dy", W),
            ],
            FONT_SIZE * 1.5,
        ),
        Point::ORIGIN,
        Anchor::CENTER,
    );
    b.add([eq])?;
    b.build()
}

pub(crate) fn kspace_relations(ctx: &SceneContext) -> LarmorResult<Scene> {
    let size = FONT_SIZE * 1.5;
    let mut b = ctx.builder("kspace-relations");
    let rows = [
        (r"\Delta x = \frac{1}{2k_{x,Nyquist}}", Color::LIGHT_GREEN, 2.0),
        (r"FOV_y = \frac{1}{\Delta k_y}", Color::LIGHT_BLUE, 0.0),
        (
            r"N_{\text{points, Image Space}} = N_{\text{points, KSpace}}",
            Color::PINK,
            -2.0,
        ),
    ];
    let ids: Vec<_> = rows
        .iter()
        .map(|&(src, color, y)| {
            b.insert_label("relation", tex(src, color, size), Point::new(0.0, y), Anchor::CENTER)
        })
        .collect();
    b.add(ids)?;
    b.build()
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/equations.rs"]
mod tests;
