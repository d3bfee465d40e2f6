use super::*;
use crate::{
    config::OutputFormat,
    foundation::core::{Canvas, Fps, FrameIndex},
    scene::model::{Asset, Visual},
};

fn context() -> SceneContext {
    SceneContext::new(
        OutputFormat {
            canvas: Canvas {
                width: 160,
                height: 90,
            },
            fps: Fps::new(10, 1).unwrap(),
        },
        std::env::temp_dir(),
    )
}

fn label_sources(scene: &Scene) -> Vec<String> {
    scene
        .assets
        .values()
        .filter_map(|a| match a {
            Asset::Label(l) => Some(
                l.parts
                    .iter()
                    .map(|p| p.source.as_str())
                    .collect::<String>(),
            ),
            Asset::Image(_) => None,
        })
        .collect()
}

#[test]
fn static_slides_last_one_frame() {
    let ctx = context();
    for build in [
        field_equation,
        larmor_frequency,
        phi_definition,
        total_signal,
        kspace_relations,
    ] {
        let scene = build(&ctx).unwrap();
        assert_eq!(scene.duration, FrameIndex(1), "{}", scene.name);
        assert!(
            scene
                .elements
                .iter()
                .all(|e| matches!(e.visual, Visual::Label { .. }))
        );
    }
}

#[test]
fn field_equation_colors_each_term() {
    let scene = field_equation(&context()).unwrap();
    let Some(Asset::Label(label)) = scene.assets.values().next() else {
        panic!("expected a label asset");
    };
    let color_of = |src: &str| {
        label
            .parts
            .iter()
            .find(|p| p.source == src)
            .map(|p| p.color)
    };
    assert_eq!(color_of("B_0"), Some(Color::RED));
    assert_eq!(color_of("G_z z"), Some(Color::LIGHT_GREEN));
    assert_eq!(color_of(r"\hat{z}"), Some(Color::PURPLE));
}

#[test]
fn spin_signal_writes_then_transforms() {
    let scene = spin_signal_equations(&context()).unwrap();
    // 1s write, 3s hold, 1s transform, 3s hold.
    assert_eq!(scene.duration, FrameIndex(80));
    assert_eq!(scene.elements.len(), 2);
    let single = &scene.elements[0];
    let total = &scene.elements[1];
    assert_eq!(single.range.start, FrameIndex(0));
    assert_eq!(single.range.end, FrameIndex(50));
    assert_eq!(total.range.start, FrameIndex(40));
    assert_eq!(total.range.end, FrameIndex(80));
}

#[test]
fn animated_slides_have_expected_lengths() {
    let ctx = context();
    assert_eq!(omega_relations(&ctx).unwrap().duration, FrameIndex(100));
    assert_eq!(final_phi(&ctx).unwrap().duration, FrameIndex(80));
}

#[test]
fn phi_definition_stacks_derivative_over_integral() {
    let scene = phi_definition(&context()).unwrap();
    let positions: Vec<_> = scene
        .elements
        .iter()
        .filter_map(|e| match &e.visual {
            Visual::Label {
                position, anchor, ..
            } => Some((*position, *anchor)),
            _ => None,
        })
        .collect();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].0.y, 1.0);
    assert_eq!(positions[0].1, Anchor::BOTTOM);
    assert_eq!(positions[1].0.y, -1.0);
    assert_eq!(positions[1].1, Anchor::TOP);
}

#[test]
fn kspace_relations_lists_three_rows() {
    let sources = label_sources(&kspace_relations(&context()).unwrap());
    assert_eq!(sources.len(), 3);
    assert!(sources.iter().any(|s| s.contains("Nyquist")));
}
