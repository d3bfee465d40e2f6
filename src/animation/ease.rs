#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Rate function mapping normalized time `0..=1` to progress `0..=1`.
pub enum Ease {
    /// Constant rate.
    Linear,
    /// Sigmoid ease-in-out, the default for fades and reveals.
    Smooth,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in-out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in-out.
    InOutCubic,
}

impl Ease {
    const SMOOTH_INFLECTION: f64 = 10.0;

    /// Apply the rate function; input is clamped to `0..=1`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Smooth => {
                fn sigmoid(x: f64) -> f64 {
                    1.0 / (1.0 + (-x).exp())
                }
                let k = Self::SMOOTH_INFLECTION;
                let error = sigmoid(-k / 2.0);
                ((sigmoid(k * (t - 0.5)) - error) / (1.0 - 2.0 * error)).clamp(0.0, 1.0)
            }
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
