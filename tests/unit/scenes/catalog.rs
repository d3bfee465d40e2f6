use std::collections::BTreeSet;

use super::*;
use crate::foundation::core::{Canvas, Fps};

fn context() -> SceneContext {
    SceneContext::new(
        OutputFormat {
            canvas: Canvas {
                width: 160,
                height: 90,
            },
            fps: Fps::new(10, 1).unwrap(),
        },
        std::env::temp_dir().join("larmor_catalog_no_assets"),
    )
}

#[test]
fn catalog_lists_seventeen_unique_names() {
    let names: BTreeSet<_> = scene_names().collect();
    assert_eq!(CATALOG.len(), 17);
    assert_eq!(names.len(), CATALOG.len());
    assert_eq!(scene_names().next(), Some("field-equation"));
    assert_eq!(scene_names().last(), Some("epi-traversal"));
}

#[test]
fn names_are_kebab_case() {
    for name in scene_names() {
        assert!(
            name.chars().all(|c| c.is_ascii_lowercase() || c == '-'),
            "{name}"
        );
    }
}

#[test]
fn unknown_scene_is_a_validation_error() {
    let err = find_scene("no-such-scene").unwrap_err();
    assert!(matches!(err, LarmorError::Validation(_)));
    assert!(err.to_string().contains("larmor list"));
}

#[test]
fn scenes_without_images_build_without_assets() {
    let ctx = context();
    for entry in CATALOG.iter().filter(|e| !e.uses_images) {
        let scene = entry.build(&ctx).unwrap();
        assert_eq!(scene.name, entry.name);
        assert!(!scene.elements.is_empty(), "{}", entry.name);
        scene.validate().unwrap();
    }
}

#[test]
fn image_scenes_report_missing_assets() {
    let ctx = context();
    for entry in CATALOG.iter().filter(|e| e.uses_images) {
        assert!(entry.build(&ctx).is_err(), "{}", entry.name);
    }
}

#[test]
fn build_scene_uses_the_context_format() {
    let ctx = context();
    let scene = build_scene("larmor-frequency", &ctx).unwrap();
    assert_eq!(scene.canvas, ctx.format.canvas);
    assert_eq!(scene.fps, ctx.format.fps);
}
