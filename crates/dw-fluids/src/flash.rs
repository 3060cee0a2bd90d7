//! Two-phase flash abstraction used by the phase-mixing backend.

use crate::error::{FluidError, FluidResult};

/// Which root / phase a property evaluation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Liquid,
    Vapor,
    /// Single phase (supercritical or indeterminate); the model picks the stable root.
    Single,
}

/// Molar properties of one phase at (P, T, composition).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    /// Molar enthalpy [J/mol]
    pub h: f64,
    /// Molar entropy [J/(mol·K)]
    pub s: f64,
    /// Molar volume [m³/mol]
    pub v: f64,
}

/// Outcome of a pressure–temperature flash.
#[derive(Debug, Clone, PartialEq)]
pub enum FlashResult {
    /// One phase with the feed composition.
    SinglePhase { phase: PhaseKind },
    /// Vapor mole fraction `beta` with liquid composition `x` and vapor composition `y`.
    TwoPhase {
        beta: f64,
        x: Vec<f64>,
        y: Vec<f64>,
    },
}

/// A thermodynamic model able to split a feed into phases and evaluate each phase.
pub trait FlashModel: Send + Sync {
    /// Model name (for debugging/logging).
    fn name(&self) -> &str;

    /// Feed mole fractions, in component order.
    fn feed(&self) -> &[f64];

    /// Mixture molar mass for composition `x` [kg/mol].
    fn molar_mass(&self, x: &[f64]) -> f64;

    /// Pressure–temperature flash of the feed.
    fn flash_pt(&self, p: f64, t: f64) -> FluidResult<FlashResult>;

    /// Molar properties of a phase with composition `x` at (P, T).
    fn phase_state(&self, p: f64, t: f64, x: &[f64], phase: PhaseKind) -> FluidResult<PhaseState>;
}

/// Solve the Rachford–Rice equation for the vapor fraction.
///
/// `g(β) = Σ zᵢ(Kᵢ−1)/(1+β(Kᵢ−1))` is monotonically decreasing on [0, 1].
/// When the root lies outside (0, 1) the feed is single phase for these
/// K-values: liquid if `g(0) ≤ 0`, vapor if `g(1) ≥ 0`.
pub fn rachford_rice(z: &[f64], k: &[f64]) -> RachfordRice {
    const MAX_ITER: usize = 200;
    const TOL: f64 = 1e-14;

    let g = |beta: f64| -> f64 {
        z.iter()
            .zip(k)
            .map(|(zi, ki)| zi * (ki - 1.0) / (1.0 + beta * (ki - 1.0)))
            .sum()
    };

    if g(0.0) <= 0.0 {
        return RachfordRice::AllLiquid;
    }
    if g(1.0) >= 0.0 {
        return RachfordRice::AllVapor;
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..MAX_ITER {
        let mid = 0.5 * (lo + hi);
        if g(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < TOL {
            break;
        }
    }
    RachfordRice::Split(0.5 * (lo + hi))
}

/// Result of [`rachford_rice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RachfordRice {
    AllLiquid,
    AllVapor,
    Split(f64),
}

/// Phase compositions for a vapor fraction and K-values.
pub fn phase_compositions(z: &[f64], k: &[f64], beta: f64) -> (Vec<f64>, Vec<f64>) {
    let mut x: Vec<f64> = z
        .iter()
        .zip(k)
        .map(|(zi, ki)| zi / (1.0 + beta * (ki - 1.0)))
        .collect();
    let mut y: Vec<f64> = x.iter().zip(k).map(|(xi, ki)| xi * ki).collect();
    normalize(&mut x);
    normalize(&mut y);
    (x, y)
}

fn normalize(v: &mut [f64]) {
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        v.iter_mut().for_each(|vi| *vi /= sum);
    }
}

/// Fail unless `v` is a finite, non-negative composition.
pub(crate) fn check_composition(v: &[f64]) -> FluidResult<()> {
    if v.iter().any(|vi| !vi.is_finite() || *vi < 0.0) {
        return Err(FluidError::NonPhysical {
            what: "phase composition must be finite and non-negative",
        });
    }
    Ok(())
}
