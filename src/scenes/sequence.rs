//! Pulse-sequence diagrams and the k-space traces they produce.

use crate::{
    foundation::core::{BezPath, Color, Point, Vec2},
    foundation::error::LarmorResult,
    physics::axes::{AxisMapping, AxisRange},
    physics::kspace::{EpiPlan, Trajectory},
    physics::pulse::{GradientPulse, RfPulse, readout_window},
    scene::builder::{Animation, ElementId, SceneBuilder},
    scene::model::{Anchor, Scene, Style},
    scenes::catalog::SceneContext,
    scenes::layout::{
        FONT_SIZE, NEXT_TO_BUFF, TrackLabel, insert_gradient, insert_markers, insert_trace,
        insert_track, plain, tex, track_stack,
    },
    shapes::{self, AxesStyle, BRACE_BUFF},
};

const LINE_STROKE: f64 = 4.0;

/// Stack of labelled tracks, top first.
fn insert_tracks(
    b: &mut SceneBuilder,
    labels: &[TrackLabel<'_>],
    axis_color: Color,
) -> LarmorResult<(Vec<AxisMapping>, Vec<ElementId>)> {
    let stack = track_stack(labels.len())?;
    let ids = stack
        .iter()
        .zip(labels)
        .flat_map(|(mapping, label)| insert_track(b, mapping, *label, axis_color))
        .collect();
    Ok((stack, ids))
}

fn create_all(ids: impl IntoIterator<Item = ElementId>) -> Vec<Animation> {
    ids.into_iter().map(Animation::Create).collect()
}

/// Axes with tips as one stroked and filled path.
fn insert_axes(
    b: &mut SceneBuilder,
    mapping: &AxisMapping,
    color: Color,
) -> (ElementId, shapes::AxesShape) {
    let shape = shapes::axes(
        mapping,
        AxesStyle {
            tips: true,
            x_ticks: false,
            show_y: true,
        },
    );
    let mut path = shape.lines.clone();
    shapes::append(&mut path, &shape.tips);
    let id = b.insert_path(
        "axes",
        path,
        Style::stroke(color, shapes::stroke_units(2.0)).with_fill(color),
    );
    (id, shape)
}

fn tick(center: Point, along: Vec2) -> BezPath {
    let d = along * shapes::TICK_SIZE;
    shapes::line(center - d, center + d)
}

/// Gradient line from `z` to frequency above the RF band it selects.
pub(crate) fn slice_selection_graph(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("slice-selection-graph").background(Color::WHITE);
    let ink = Color::BLACK;
    let line = |c| Style::stroke(c, shapes::stroke_units(LINE_STROKE));
    let label = |src, color| tex(src, color, FONT_SIZE);

    // Five domain units drawn three scene units long, the top graph 1 unit
    // below the frame edge and the RF graph 1 unit above the bottom.
    let unit = AxisRange::new(0.0, 5.0, 1.0)?;
    let graph = AxisMapping::new(unit, unit, 3.0, 3.0)?.centered_at(Point::new(0.0, 1.8));
    let rf = AxisMapping::new(unit, AxisRange::new(-1.2, 1.2, 0.5)?, 3.0, 1.8)?
        .centered_at(Point::new(0.0, -2.6));

    let z0 = 2.5;
    let dz = 1.0;
    let (z_min, z_max) = (z0 - dz / 2.0, z0 + dz / 2.0);
    // The gradient is the identity map, so the band edges coincide.
    let (w0, w_min, w_max) = (z0, z_min, z_max);
    let horizontal = Vec2::new(1.0, 0.0);
    let vertical = Vec2::new(0.0, 1.0);

    let (axes_id, axes) = insert_axes(&mut b, &graph, ink);
    let mut ids = vec![
        axes_id,
        b.insert_label(
            "omega-label",
            label(r"\omega", ink),
            axes.x_end - vertical * NEXT_TO_BUFF,
            Anchor::TOP,
        ),
        b.insert_label(
            "z-label",
            label("z", ink),
            axes.y_end - horizontal * NEXT_TO_BUFF,
            Anchor::RIGHT,
        ),
        b.insert_path(
            "gradient-line",
            shapes::plot(&graph, |w| w, 0.0, 5.0, 0.5),
            line(Color::LIGHT_GREEN),
        ),
        b.insert_label(
            "gradient-label",
            label("G_z", Color::LIGHT_GREEN),
            Point::new(graph.c2p(5.0, 5.0).x - 0.2, graph.c2p(2.5, 2.5).y),
            Anchor::LEFT,
        ),
    ];

    for (z, w, color) in [
        (z0, w0, Color::RED),
        (z_min, w_min, Color::BLUE),
        (z_max, w_max, Color::BLUE),
    ] {
        let on_z = graph.c2p(0.0, z);
        let on_line = graph.c2p(w, z);
        let on_w = graph.c2p(w, 0.0);
        let on_rf = rf.c2p(w, 0.0);
        ids.extend([
            b.insert_path("z-tick", tick(on_z, horizontal), line(color)),
            b.insert_path("band-dot", shapes::dot(on_line), Style::fill(color)),
            b.insert_path("z-guide", shapes::dashed_line(on_z, on_line, 0.1), line(color)),
            b.insert_path("w-guide", shapes::dashed_line(on_line, on_w, 0.1), line(color)),
            b.insert_path("w-tick", tick(on_w, vertical), line(color)),
            b.insert_path("connector", shapes::dashed_line(on_w, on_rf, 0.1), line(color)),
            b.insert_path("rf-tick", tick(on_rf, vertical), line(color)),
        ]);
    }

    let dz_brace = shapes::brace_between(
        graph.c2p(0.0, z_min),
        graph.c2p(0.0, z_max),
        -horizontal,
        0.7,
    );
    ids.extend([
        b.insert_label(
            "z0-label",
            label("z_0", ink),
            graph.c2p(0.0, z0) - horizontal * (shapes::TICK_SIZE + NEXT_TO_BUFF),
            Anchor::RIGHT,
        ),
        b.insert_path("dz-brace", dz_brace.path.clone(), line(ink)),
        b.insert_label(
            "dz-label",
            label(r"\Delta z", ink),
            dz_brace.tip + dz_brace.direction * NEXT_TO_BUFF,
            Anchor::RIGHT,
        ),
    ]);

    let (rf_axes_id, rf_axes) = insert_axes(&mut b, &rf, ink);
    let band = move |w: f64| if (w_min..=w_max).contains(&w) { 1.0 } else { 0.0 };
    let dw_brace = shapes::brace_between(
        rf.c2p(w_min, 0.0),
        rf.c2p(w_max, 0.0),
        -vertical,
        BRACE_BUFF,
    );
    ids.extend([
        rf_axes_id,
        b.insert_label(
            "rf-omega-label",
            label(r"\omega", ink),
            rf_axes.x_end - vertical * NEXT_TO_BUFF,
            Anchor::TOP,
        ),
        b.insert_label(
            "amplitude-label",
            label("Amplitude", ink),
            rf_axes.y_end - horizontal * NEXT_TO_BUFF,
            Anchor::RIGHT,
        ),
        b.insert_path(
            "rf-band",
            shapes::plot(&rf, band, 0.0, 5.0, 0.01),
            line(Color::PINK),
        ),
        b.insert_path(
            "rf-band-fill",
            shapes::area_under(&rf, band, w_min, w_max, 0.01),
            Style::fill(Color::PINK.with_opacity(0.3)),
        ),
        b.insert_path("dw-brace", dw_brace.path.clone(), line(ink)),
        b.insert_label(
            "dw-label",
            label(r"\Delta \omega", ink),
            dw_brace.tip + dw_brace.direction * NEXT_TO_BUFF,
            Anchor::TOP,
        ),
        b.insert_label(
            "w0-label",
            label(r"\omega_0", ink),
            rf.c2p(w0, 0.0) + vertical * (shapes::TICK_SIZE + NEXT_TO_BUFF),
            Anchor::BOTTOM,
        ),
    ]);

    b.add(ids)?;
    b.build()
}

/// Gradient echo: slice select with RF, phase and frequency encoding, readout.
pub(crate) fn gre_sequence(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("gre-sequence").background(Color::WHITE);
    let ink = Color::BLACK;
    let (stack, tracks) = insert_tracks(
        &mut b,
        &[
            TrackLabel {
                name: "G_z",
                caption: Some("Slice Selection"),
                color: Color::LIGHT_GREEN,
            },
            TrackLabel {
                name: "RF",
                caption: None,
                color: ink,
            },
            TrackLabel {
                name: "G_y",
                caption: Some("Phase Encoding"),
                color: Color::PINK,
            },
            TrackLabel {
                name: "G_x",
                caption: Some("Frequency Encoding"),
                color: Color::LIGHT_BLUE,
            },
        ],
        ink,
    )?;
    let (gz, rf_track, gy, gx) = (&stack[0], &stack[1], &stack[2], &stack[3]);

    let slice = GradientPulse::new(1.0, 2.0, 1.0)?.with_color(Color::LIGHT_GREEN);
    let rephase = GradientPulse::new(slice.end(), 1.0, -1.0)?.with_color(Color::LIGHT_GREEN);
    let rf = RfPulse::new(slice.start, slice.duration, 1.0)?;
    let phase = GradientPulse::new(rephase.end() + 0.25, 1.75, 1.0)?.with_color(Color::PINK);
    let prephase =
        GradientPulse::new(phase.start, phase.duration, -0.5)?.with_color(Color::LIGHT_BLUE);
    let readout = GradientPulse::new(prephase.end(), 3.0, 1.0)?.with_color(Color::LIGHT_BLUE);
    let readout_center = readout.start + readout.duration / 2.0;

    let markers = insert_markers(
        &mut b,
        &[
            slice.start,
            slice.end(),
            phase.start,
            phase.end(),
            rephase.end(),
            readout.start,
            readout.end(),
        ],
        &[*gz, *gx],
        ink,
    )?;

    let slice_id = insert_gradient(&mut b, &slice, gz, ink);
    let rf_id = b.insert_path(
        "rf-pulse",
        rf.curve(rf_track),
        Style::stroke(Color::YELLOW, shapes::stroke_units(2.0)),
    );
    let rephase_id = insert_gradient(&mut b, &rephase, gz, ink);
    let phase_id = insert_gradient(&mut b, &phase, gy, ink);
    let prephase_id = insert_gradient(&mut b, &prephase, gx, ink);
    let readout_id = insert_gradient(&mut b, &readout, gx, ink);

    let window = readout_window(rf_track, readout.start, readout.duration);
    let window_id = b.insert_path(
        "readout-window",
        shapes::rectangle(window),
        Style::stroke(Color::YELLOW, shapes::stroke_units(1.5)).with_fill(Color::YELLOW),
    );
    let window_label = b.insert_label(
        "readout-label",
        plain("Readout Window", ink, FONT_SIZE * 0.5),
        window.center(),
        Anchor::CENTER,
    );

    let te = shapes::brace_between(
        rf_track.c2p(rf.center(), 0.0),
        rf_track.c2p(readout_center, 0.0),
        Vec2::new(0.0, -1.0),
        0.25,
    );
    let te_brace = b.insert_path(
        "te-brace",
        te.path.clone(),
        Style::stroke(ink, shapes::stroke_units(3.0)),
    );
    let te_label = b.insert_label(
        "te-label",
        tex("T_E", ink, FONT_SIZE),
        te.tip + te.direction * 0.1,
        Anchor::TOP,
    );

    // Further phase-encode steps, alternating sign with shrinking magnitude.
    let steps = 5;
    let extra_steps = (1..=steps)
        .map(|i| {
            let frac = f64::from(i) / f64::from(steps);
            let amplitude = if i % 2 == 0 { 1.0 - frac } else { -frac };
            let step = GradientPulse::new(phase.start, phase.duration, amplitude)?
                .with_color(Color::PINK)
                .with_fill_opacity(0.3);
            Ok(insert_gradient(&mut b, &step, gy, ink))
        })
        .collect::<LarmorResult<Vec<_>>>()?;

    b.add(tracks)?;
    b.play(1.0, create_all(markers))?;
    b.play(2.0, create_all([slice_id, rf_id]))?;
    b.play(1.5, create_all([phase_id, prephase_id, rephase_id]))?;
    b.play(
        2.0,
        [
            Animation::Create(readout_id),
            Animation::Create(window_id),
            Animation::FadeIn(window_label),
        ],
    )?;
    b.play(1.5, create_all([te_brace, te_label]))?;
    b.play(2.0, create_all(extra_steps))?;
    b.wait(1.0);
    b.build()
}

/// Gradient tracks above the `k_x`/`k_y` tracks they drive.
fn kspace_tracks() -> [TrackLabel<'static>; 4] {
    [
        TrackLabel {
            name: "G_x",
            caption: Some("Frequency Encoding"),
            color: Color::LIGHT_BLUE,
        },
        TrackLabel {
            name: "G_y",
            caption: Some("Phase Encoding"),
            color: Color::PINK,
        },
        TrackLabel {
            name: "k_x",
            caption: None,
            color: Color::LIGHT_BLUE,
        },
        TrackLabel {
            name: "k_y",
            caption: None,
            color: Color::PINK,
        },
    ]
}

/// One GRE readout traced through `k_x` and `k_y`, then the other phase steps.
pub(crate) fn kspace_traversal(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("kspace-traversal");
    let ink = Color::WHITE;
    let (stack, tracks) = insert_tracks(&mut b, &kspace_tracks(), ink)?;
    let (gx, gy, kx, ky) = (&stack[0], &stack[1], &stack[2], &stack[3]);

    let phase = GradientPulse::new(1.0, 1.75, 1.0)?.with_color(Color::PINK);
    let prephase =
        GradientPulse::new(phase.start, phase.duration, -0.5)?.with_color(Color::LIGHT_BLUE);
    let readout = GradientPulse::new(prephase.end(), 3.0, 1.0)?.with_color(Color::LIGHT_BLUE);

    let markers = insert_markers(
        &mut b,
        &[phase.start, phase.end(), readout.start, readout.end()],
        &[*gx, *ky],
        ink,
    )?;

    let phase_id = insert_gradient(&mut b, &phase, gy, ink);
    let prephase_id = insert_gradient(&mut b, &prephase, gx, ink);
    let ky_step = insert_trace(
        &mut b,
        &Trajectory::ramp(phase.start, 0.0, phase.end(), 1.0)?,
        ky,
        Color::PINK,
        1.0,
    );
    let kx_prephase = insert_trace(
        &mut b,
        &Trajectory::ramp(prephase.start, 0.0, prephase.end(), -1.0)?,
        kx,
        Color::LIGHT_BLUE,
        1.0,
    );
    let readout_id = insert_gradient(&mut b, &readout, gx, ink);
    let kx_readout = insert_trace(
        &mut b,
        &Trajectory::ramp(readout.start, -1.0, readout.end(), 1.0)?,
        kx,
        Color::LIGHT_BLUE,
        1.0,
    );
    let ky_hold = insert_trace(
        &mut b,
        &Trajectory::ramp(phase.end(), 1.0, readout.end(), 1.0)?,
        ky,
        Color::PINK,
        1.0,
    );

    let mut others = Vec::new();
    for amplitude in [0.5, 0.0, -0.5, -1.0] {
        let step = GradientPulse::new(phase.start, phase.duration, amplitude)?
            .with_color(Color::PINK)
            .with_fill_opacity(0.3);
        others.push(insert_gradient(&mut b, &step, gy, ink));
    }
    for amplitude in [0.5, 0.0, -0.5, -1.0] {
        let trace = Trajectory::phase_encode(phase.start, phase.end(), readout.end(), amplitude)?;
        others.push(insert_trace(&mut b, &trace, ky, Color::PINK, 0.8));
    }

    b.add(tracks)?;
    b.play(1.0, create_all(markers))?;
    b.play(1.5, create_all([phase_id, prephase_id]))?;
    b.play(1.5, create_all([ky_step, kx_prephase]))?;
    b.play(1.5, create_all([readout_id]))?;
    b.play(1.5, create_all([kx_readout, ky_hold]))?;
    b.wait(1.0);
    b.play(2.0, create_all(others))?;
    b.wait(2.0);
    b.build()
}

/// Echo-planar readout: one lobe per k-space line, stepped by phase blips.
pub(crate) fn epi_traversal(ctx: &SceneContext) -> LarmorResult<Scene> {
    let mut b = ctx.builder("epi-traversal");
    let ink = Color::WHITE;
    let (stack, tracks) = insert_tracks(&mut b, &kspace_tracks(), ink)?;
    let (gx, gy, kx, ky) = (&stack[0], &stack[1], &stack[2], &stack[3]);
    let plan = EpiPlan::standard();

    let markers = insert_markers(&mut b, &plan.lobe_starts, &[*gx, *ky], ink)?;

    let prephaser = plan.prephaser()?;
    let prephasers = [
        insert_gradient(&mut b, &prephaser.with_color(Color::PINK), gy, ink),
        insert_gradient(&mut b, &prephaser.with_color(Color::LIGHT_BLUE), gx, ink),
    ];
    let prephase = plan.prephase_trace()?;
    let prephase_traces = [
        insert_trace(&mut b, &prephase, ky, Color::PINK, 1.0),
        insert_trace(&mut b, &prephase, kx, Color::LIGHT_BLUE, 1.0),
    ];

    let lobes = plan.readout_lobes()?;
    let blips = plan.blips()?;
    let kx_traces = plan.kx_traces()?;
    let ky_traces = plan.ky_traces()?;

    // Lobe i is preceded by blip i - 1; the first line needs no blip.
    let mut lines = Vec::with_capacity(lobes.len());
    let traces = kx_traces.iter().zip(&ky_traces);
    for (i, (lobe, (kx_trace, ky_trace))) in lobes.iter().zip(traces).enumerate() {
        let lobe = lobe.with_color(Color::LIGHT_BLUE);
        let mut line = vec![insert_gradient(&mut b, &lobe, gx, ink)];
        if let Some(blip) = i.checked_sub(1).and_then(|j| blips.get(j)) {
            line.push(insert_gradient(&mut b, &blip.with_color(Color::PINK), gy, ink));
        }
        line.push(insert_trace(&mut b, kx_trace, kx, Color::LIGHT_BLUE, 1.0));
        line.push(insert_trace(&mut b, ky_trace, ky, Color::PINK, 1.0));
        lines.push(line);
    }

    b.add(tracks)?;
    b.play(1.0, create_all(markers))?;
    b.play(1.5, create_all(prephasers))?;
    b.play(1.5, create_all(prephase_traces))?;
    for line in lines {
        b.play(0.5, create_all(line))?;
    }
    b.wait(1.0);
    b.build()
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/sequence.rs"]
mod tests;
