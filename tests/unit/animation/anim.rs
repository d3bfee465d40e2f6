use super::*;
use crate::foundation::core::Fps;

fn ctx(frame: u64) -> SampleCtx {
    SampleCtx {
        frame: FrameIndex(frame),
        fps: Fps::new(30, 1).unwrap(),
        clip_local: FrameIndex(frame),
    }
}

fn ramp(end: u64, to: f64) -> Anim<f64> {
    Anim::keyframes([(0, 0.0, Ease::Linear), (end, to, Ease::Linear)])
}

#[test]
fn keyframes_hold_is_constant_between_keys() {
    let anim = Anim::Keyframes(Keyframes {
        keys: vec![
            Keyframe {
                frame: FrameIndex(0),
                value: 1.0,
                ease: Ease::Linear,
            },
            Keyframe {
                frame: FrameIndex(10),
                value: 3.0,
                ease: Ease::Linear,
            },
        ],
        mode: InterpMode::Hold,
        default: None,
    });
    assert_eq!(anim.sample(ctx(5)).unwrap(), 1.0);
    assert_eq!(anim.sample(ctx(10)).unwrap(), 3.0);
}

#[test]
fn keyframes_linear_interpolates_and_holds_ends() {
    let anim = ramp(10, 10.0);
    assert_eq!(anim.sample(ctx(5)).unwrap(), 5.0);
    assert_eq!(anim.sample(ctx(40)).unwrap(), 10.0);
}

#[test]
fn coincident_keys_act_as_a_step() {
    let anim = Anim::keyframes([
        (0, 0.0, Ease::Linear),
        (5, 0.0, Ease::Linear),
        (5, 1.0, Ease::Linear),
    ]);
    assert_eq!(anim.sample(ctx(4)).unwrap(), 0.0);
    assert_eq!(anim.sample(ctx(5)).unwrap(), 1.0);
}

#[test]
fn constant_ignores_frame() {
    let anim = Anim::constant(Color::RED);
    assert_eq!(anim.sample(ctx(0)).unwrap(), Color::RED);
    assert_eq!(anim.sample(ctx(1000)).unwrap(), Color::RED);
}

#[test]
fn color_keyframes_interpolate_channels() {
    let anim = Anim::keyframes([
        (0, Color::BLACK, Ease::Linear),
        (10, Color::WHITE, Ease::Linear),
    ]);
    assert_eq!(anim.sample(ctx(5)).unwrap(), Color::rgb(128, 128, 128));
}

#[test]
fn validate_rejects_unsorted_and_empty() {
    let unsorted = Anim::keyframes([(10, 0.0, Ease::Linear), (0, 1.0, Ease::Linear)]);
    assert!(unsorted.validate().is_err());

    let empty: Anim<f64> = Anim::Keyframes(Keyframes {
        keys: vec![],
        mode: InterpMode::Linear,
        default: None,
    });
    assert!(empty.validate().is_err());
    assert!(empty.sample(ctx(0)).is_err());
}

#[test]
fn eased_keys_bend_the_ramp() {
    let anim = Anim::keyframes([(0, 0.0, Ease::Smooth), (10, 1.0, Ease::Linear)]);
    let quarter = anim.sample(ctx(2)).unwrap();
    assert!(quarter < 0.2, "{quarter}");
    assert_eq!(anim.sample(ctx(5)).unwrap(), Ease::Smooth.apply(0.5));
}

#[test]
fn constants_round_trip_through_json() {
    let anim = Anim::constant(0.25);
    let json = serde_json::to_string(&anim).unwrap();
    assert_eq!(json, r#"{"constant":0.25}"#);
    let back: Anim<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.sample(ctx(99)).unwrap(), 0.25);
}
