//! Finite-difference speed of sound along an isentrope.

use crate::error::SoundSpeedError;
use dw_core::units::{Pressure, SpecEntropy, Temperature, Velocity, mps, pa};
use dw_fluids::PropertyBackend;

/// `C = sqrt((P2 − P1) / (ρ2 − ρ1))` with `P2 = P1 + delta`, both densities on
/// the isentrope `s`.
pub fn speed_of_sound(
    backend: &dyn PropertyBackend,
    s: SpecEntropy,
    p1: Pressure,
    t_guess: Temperature,
    delta: Pressure,
) -> Result<Velocity, SoundSpeedError> {
    let p2 = pa(p1.value + delta.value);
    let rho1 = backend.density(p1, s, t_guess)?;
    let rho2 = backend.density(p2, s, t_guess)?;

    let d_rho = rho2.value - rho1.value;
    if d_rho == 0.0 {
        return Err(SoundSpeedError::ZeroSlope { p: p1.value });
    }
    let slope = (p2.value - p1.value) / d_rho;
    if !slope.is_finite() || slope <= 0.0 {
        return Err(SoundSpeedError::NonPhysical {
            p: p1.value,
            slope,
        });
    }
    Ok(mps(slope.sqrt()))
}
