use std::collections::HashMap;

use super::*;

#[test]
fn presets_match_the_documented_formats() {
    assert_eq!(Quality::Low.canvas(), Canvas { width: 854, height: 480 });
    assert_eq!(Quality::Low.fps().num, 15);
    assert_eq!(Quality::Medium.canvas(), Canvas { width: 1280, height: 720 });
    assert_eq!(Quality::High.fps().num, 60);
    assert_eq!(Quality::FourK.canvas(), Canvas { width: 3840, height: 2160 });
    assert_eq!(Quality::Low.folder_name(), "480p15");
}

#[test]
fn defaults_are_valid() {
    let cfg = RenderConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.format().canvas, Quality::Medium.canvas());
    assert_eq!(cfg.output_dir, PathBuf::from("media"));
    assert!(cfg.render_settings().unwrap().clear_rgba.is_none());
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let cfg: RenderConfig =
        serde_json::from_str(r##"{"quality": "4k", "background": "#102030"}"##).unwrap();
    assert_eq!(cfg.quality, Quality::FourK);
    assert_eq!(cfg.chunk_size, 64);
    assert_eq!(
        cfg.render_settings().unwrap().clear_rgba,
        Some([0x10, 0x20, 0x30, 255])
    );
}

#[test]
fn config_file_is_read_from_disk() {
    let dir = std::env::temp_dir().join(format!("larmor_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("larmor.json");
    std::fs::write(&path, r#"{"quality": "low", "parallel": true, "threads": 2}"#).unwrap();

    let cfg = RenderConfig::from_file(&path).unwrap();
    assert_eq!(cfg.quality, Quality::Low);
    assert!(cfg.threading().parallel);
    assert_eq!(cfg.threading().threads, Some(2));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        RenderConfig::from_file(&path),
        Err(LarmorError::Serde(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn environment_overrides_file_values() {
    let env: HashMap<&str, &str> = [
        (ENV_OUTPUT_DIR, "/tmp/out"),
        (ENV_FONT, "fonts/cmu.ttf"),
        (ENV_ASSETS_DIR, "  "),
    ]
    .into_iter()
    .collect();
    let mut cfg = RenderConfig {
        assets_dir: PathBuf::from("pics"),
        ..RenderConfig::default()
    };
    cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.font, Some(PathBuf::from("fonts/cmu.ttf")));
    assert_eq!(cfg.assets_dir, PathBuf::from("pics"));
}

#[test]
fn explicit_format_overrides_the_preset() {
    let cfg = RenderConfig {
        quality: Quality::High,
        canvas: Some(Canvas { width: 320, height: 180 }),
        fps: Some(Fps { num: 24, den: 1 }),
        ..RenderConfig::default()
    };
    let format = cfg.format();
    assert_eq!(format.canvas.width, 320);
    assert_eq!(format.fps.num, 24);
    assert_eq!(
        cfg.video_path("gre-sequence"),
        PathBuf::from("media/videos/180p24/gre-sequence.mp4")
    );
}

#[test]
fn output_paths_follow_the_media_layout() {
    let cfg = RenderConfig {
        quality: Quality::Low,
        ..RenderConfig::default()
    };
    assert_eq!(
        cfg.video_path("slice-selection"),
        PathBuf::from("media/videos/480p15/slice-selection.mp4")
    );
    assert_eq!(
        cfg.image_path("slice-selection"),
        PathBuf::from("media/images/slice-selection.png")
    );
}

#[test]
fn invalid_values_are_rejected() {
    let zero_threads = RenderConfig {
        threads: Some(0),
        ..RenderConfig::default()
    };
    assert!(zero_threads.validate().is_err());

    let bad_color = RenderConfig {
        background: Some("#12".to_string()),
        ..RenderConfig::default()
    };
    assert!(bad_color.validate().is_err());
}
