use crate::foundation::core::{BezPath, Point};
use crate::foundation::error::{LarmorError, LarmorResult};
use crate::physics::axes::AxisMapping;
use crate::physics::pulse::GradientPulse;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Piecewise-linear k-space trace over time, as `(t, k)` corners.
pub struct Trajectory {
    /// Corners in domain units.
    pub corners: Vec<(f64, f64)>,
}

impl Trajectory {
    /// Trace through `corners`; at least two are required.
    pub fn new(corners: Vec<(f64, f64)>) -> LarmorResult<Self> {
        if corners.len() < 2 {
            return Err(LarmorError::validation(
                "k-space trajectory needs at least two corners",
            ));
        }
        if corners.iter().any(|(t, k)| !(t.is_finite() && k.is_finite())) {
            return Err(LarmorError::validation(
                "k-space trajectory corners must be finite",
            ));
        }
        Ok(Self { corners })
    }

    /// Straight ramp from `(t0, k0)` to `(t1, k1)`.
    pub fn ramp(t0: f64, k0: f64, t1: f64, k1: f64) -> LarmorResult<Self> {
        Self::new(vec![(t0, k0), (t1, k1)])
    }

    /// Phase-encode ramp to `amplitude`, then hold it through the readout.
    pub fn phase_encode(
        pe_start: f64,
        pe_end: f64,
        readout_end: f64,
        amplitude: f64,
    ) -> LarmorResult<Self> {
        Self::new(vec![
            (pe_start, 0.0),
            (pe_end, amplitude),
            (readout_end, amplitude),
        ])
    }

    /// Final `k` value.
    pub fn end_value(&self) -> f64 {
        self.corners.last().map_or(0.0, |(_, k)| *k)
    }

    /// Corners mapped into scene units.
    pub fn points(&self, mapping: &AxisMapping) -> Vec<Point> {
        self.corners
            .iter()
            .map(|&(t, k)| mapping.c2p(t, k))
            .collect()
    }

    /// Open polyline through the mapped corners.
    pub fn path(&self, mapping: &AxisMapping) -> BezPath {
        let mut path = BezPath::new();
        for (i, p) in self.points(mapping).into_iter().enumerate() {
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        path
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Echo-planar readout: alternating frequency-encode lobes with phase blips
/// between them.
pub struct EpiPlan {
    /// Start times of the readout lobes.
    pub lobe_starts: Vec<f64>,
    /// Readout lobe length.
    pub lobe_duration: f64,
    /// Readout lobe amplitude magnitude.
    pub lobe_amplitude: f64,
    /// Phase blip length, centered on each lobe start.
    pub blip_duration: f64,
    /// `k_y` gained per blip.
    pub ky_step: f64,
    /// Prephasing lobe length, starting at `t = 0`.
    pub prephase_duration: f64,
    /// `k_x` and `k_y` after the prephasers.
    pub k_start: f64,
}

impl EpiPlan {
    /// Ten lobes starting at `0.5` with unit spacing.
    pub fn standard() -> Self {
        Self {
            lobe_starts: (0..10).map(|i| 0.5 + f64::from(i)).collect(),
            lobe_duration: 1.0,
            lobe_amplitude: 0.5,
            blip_duration: 0.125,
            ky_step: 0.2,
            prephase_duration: 0.5,
            k_start: -1.0,
        }
    }

    /// Negative lobe that moves `k_x` and `k_y` to the first line's corner.
    pub fn prephaser(&self) -> LarmorResult<GradientPulse> {
        GradientPulse::new(0.0, self.prephase_duration, -1.0)
    }

    /// `k` trace during the prephasers (identical for both axes).
    pub fn prephase_trace(&self) -> LarmorResult<Trajectory> {
        Trajectory::ramp(0.0, 0.0, self.prephase_duration, self.k_start)
    }

    /// Readout lobes, alternating polarity starting positive.
    pub fn readout_lobes(&self) -> LarmorResult<Vec<GradientPulse>> {
        let mut sign = 1.0;
        self.lobe_starts
            .iter()
            .map(|&start| {
                let lobe = GradientPulse::new(start, self.lobe_duration, self.lobe_amplitude * sign);
                sign = -sign;
                lobe
            })
            .collect()
    }

    /// Phase blips before every lobe except the first.
    pub fn blips(&self) -> LarmorResult<Vec<GradientPulse>> {
        self.lobe_starts
            .iter()
            .skip(1)
            .map(|&start| {
                GradientPulse::new(start - self.blip_duration / 2.0, self.blip_duration, 1.0)
            })
            .collect()
    }

    /// `k_x` sweeps, one per lobe, alternating direction.
    pub fn kx_traces(&self) -> LarmorResult<Vec<Trajectory>> {
        let mut from = self.k_start;
        self.lobe_starts
            .iter()
            .map(|&start| {
                let trace = Trajectory::ramp(start, from, start + self.lobe_duration, -from);
                from = -from;
                trace
            })
            .collect()
    }

    /// `k_y` staircase: hold during each lobe, then step by `ky_step` across the blip.
    pub fn ky_traces(&self) -> LarmorResult<Vec<Trajectory>> {
        let mut ky = self.k_start;
        self.lobe_starts
            .iter()
            .map(|&start| {
                let end = start + self.lobe_duration;
                let trace = Trajectory::new(vec![
                    (start, ky),
                    (end - self.blip_duration / 2.0, ky),
                    (end, ky + self.ky_step),
                ]);
                ky += self.ky_step;
                trace
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/kspace.rs"]
mod tests;
