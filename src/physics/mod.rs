//! MRI physics helpers with no rendering dependencies.
//!
//! Everything here is pure geometry and arithmetic in scene units: mapping
//! timeline coordinates onto axes, sizing gradient lobes, sampling RF pulses,
//! and tracking the rotation state of precessing spins.

pub(crate) mod axes;
pub(crate) mod kspace;
pub(crate) mod markers;
pub(crate) mod pulse;
pub(crate) mod spins;
