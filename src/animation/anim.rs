use crate::{
    animation::ease::Ease,
    foundation::core::{Color, Fps, FrameIndex, Transform2D, Vec2},
    foundation::error::{LarmorError, LarmorResult},
};

#[derive(Clone, Copy, Debug)]
/// Sampling context for one element at one frame.
pub struct SampleCtx {
    /// Global scene frame.
    pub frame: FrameIndex,
    /// Scene frame rate.
    pub fps: Fps,
    /// Frame relative to the element's first visible frame.
    pub clip_local: FrameIndex,
}

/// Values that can be interpolated by keyframe animation.
pub trait Lerp: Sized {
    /// Interpolate from `a` (t = 0) to `b` (t = 1).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Transform2D {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            translate: <Vec2 as Lerp>::lerp(&a.translate, &b.translate, t),
            rotation_rad: a.rotation_rad + (b.rotation_rad - a.rotation_rad) * t,
            scale: <Vec2 as Lerp>::lerp(&a.scale, &b.scale, t),
            anchor: <Vec2 as Lerp>::lerp(&a.anchor, &b.anchor, t),
        }
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color::interpolate(*a, *b, t)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// An animated element property.
pub enum Anim<T> {
    /// A value that never changes.
    Constant(T),
    /// Explicit keyframes.
    Keyframes(Keyframes<T>),
}

impl<T> Anim<T>
where
    T: Lerp + Clone,
{
    /// A value that never changes.
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    /// Linear keyframes from `(frame, value, ease)` triples.
    pub fn keyframes(keys: impl IntoIterator<Item = (u64, T, Ease)>) -> Self {
        Self::Keyframes(Keyframes {
            keys: keys
                .into_iter()
                .map(|(frame, value, ease)| Keyframe {
                    frame: FrameIndex(frame),
                    value,
                    ease,
                })
                .collect(),
            mode: InterpMode::Linear,
            default: None,
        })
    }

    /// Sample the value at `ctx.clip_local`.
    pub fn sample(&self, ctx: SampleCtx) -> LarmorResult<T> {
        match self {
            Self::Constant(v) => Ok(v.clone()),
            Self::Keyframes(kf) => kf.sample(ctx),
        }
    }

    /// Check structural invariants without sampling.
    pub fn validate(&self) -> LarmorResult<()> {
        match self {
            Self::Constant(_) => Ok(()),
            Self::Keyframes(kf) => kf.validate(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Sorted keyframes with an interpolation mode.
pub struct Keyframes<T> {
    /// Keys sorted by frame; equal frames are allowed and act as a step.
    pub keys: Vec<Keyframe<T>>,
    /// Interpolation between consecutive keys.
    pub mode: InterpMode,
    /// Value when no keys exist.
    pub default: Option<T>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Reject empty or unsorted key lists.
    pub fn validate(&self) -> LarmorResult<()> {
        if self.keys.is_empty() && self.default.is_none() {
            return Err(LarmorError::animation(
                "Keyframes must have at least one key or a default value",
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].frame.0 <= w[1].frame.0) {
            return Err(LarmorError::animation(
                "Keyframes keys must be sorted by frame",
            ));
        }
        Ok(())
    }

    /// Sample at `ctx.clip_local`, holding the first/last value outside the key span.
    pub fn sample(&self, ctx: SampleCtx) -> LarmorResult<T> {
        if self.keys.is_empty() {
            return self
                .default
                .clone()
                .ok_or_else(|| LarmorError::animation("Keyframes has no keys and no default"));
        }

        let f = ctx.clip_local.0;
        let idx = self.keys.partition_point(|k| k.frame.0 <= f);

        if idx == 0 {
            return Ok(self.keys[0].value.clone());
        }
        if idx >= self.keys.len() {
            return Ok(self.keys[self.keys.len() - 1].value.clone());
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.0.saturating_sub(a.frame.0);
        if denom == 0 {
            return Ok(a.value.clone());
        }

        let t = ((f - a.frame.0) as f64) / (denom as f64);
        let te = a.ease.apply(t);
        match self.mode {
            InterpMode::Hold => Ok(a.value.clone()),
            InterpMode::Linear => Ok(T::lerp(&a.value, &b.value, te)),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A single keyframe.
pub struct Keyframe<T> {
    /// Frame relative to the element start.
    pub frame: FrameIndex,
    /// Value at `frame`.
    pub value: T,
    /// Ease applied toward the next key.
    pub ease: Ease,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Keyframe interpolation mode.
pub enum InterpMode {
    /// Step to the next value at its frame.
    Hold,
    /// Eased linear interpolation.
    Linear,
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
