//! Phase-flash-weighted property backend.
//!
//! Every property is obtained from a PT flash of the feed: per-phase molar
//! properties are evaluated on the phase compositions and weighted by the
//! vapor fraction, then converted to a mass basis with the feed molar mass.
//! Pressure–entropy states are found by bracketing and bisection in T,
//! seeded by the caller's temperature guess.

use crate::backend::{IsentropicState, PropertyBackend, validation};
use crate::eos::EosFamily;
use crate::error::{FluidError, FluidResult};
use crate::flash::{FlashModel, FlashResult, PhaseKind};
use dw_core::units::{Density, Pressure, SpecEnthalpy, SpecEntropy, Temperature, k, kg_m3};

const BRACKET_HALF_WIDTH: f64 = 5.0;
const MAX_BRACKET_EXPANSIONS: usize = 60;
const MAX_BISECTIONS: usize = 200;
const T_TOL: f64 = 1e-9;
const T_MIN: f64 = 1.0;
/// Entropy jump [J/(kg·K)] across a collapsed bracket that marks a phase change.
const ENTROPY_JUMP_TOL: f64 = 1e-6;

/// Mass-basis properties of the (possibly split) feed at one (P, T).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mixed {
    s: f64,
    h: f64,
    rho: f64,
    q: f64,
}

/// Backend that weights per-phase properties from a [`FlashModel`].
pub struct PhaseMixingBackend<M: FlashModel> {
    model: M,
    family: EosFamily,
    name: String,
}

impl<M: FlashModel> PhaseMixingBackend<M> {
    pub fn new(model: M, family: EosFamily) -> Self {
        let name = format!("{} phase mixing", model.name());
        Self {
            model,
            family,
            name,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn mixed(&self, p: f64, t: f64) -> FluidResult<Mixed> {
        let z = self.model.feed();
        let m_z = self.model.molar_mass(z);

        match self.model.flash_pt(p, t)? {
            FlashResult::SinglePhase { phase } => {
                let state = self.model.phase_state(p, t, z, PhaseKind::Single)?;
                Ok(Mixed {
                    s: state.s / m_z,
                    h: state.h / m_z,
                    rho: m_z / state.v,
                    q: if phase == PhaseKind::Vapor { 1.0 } else { 0.0 },
                })
            }
            FlashResult::TwoPhase { beta, x, y } => {
                let liquid = self.model.phase_state(p, t, &x, PhaseKind::Liquid)?;
                let vapor = self.model.phase_state(p, t, &y, PhaseKind::Vapor)?;
                let m_y = self.model.molar_mass(&y);
                Ok(Mixed {
                    s: (beta * vapor.s + (1.0 - beta) * liquid.s) / m_z,
                    h: (beta * vapor.h + (1.0 - beta) * liquid.h) / m_z,
                    rho: m_z / (beta * vapor.v + (1.0 - beta) * liquid.v),
                    q: (beta * m_y / m_z).clamp(0.0, 1.0),
                })
            }
        }
    }

    /// Solve s(P, T) = s_target for T, returning the state found.
    fn solve_ps(&self, p: f64, s_target: f64, t_guess: f64) -> FluidResult<(f64, Mixed)> {
        let seed = if t_guess.is_finite() && t_guess > T_MIN {
            t_guess
        } else {
            300.0
        };
        let residual = |t: f64| -> FluidResult<(f64, Mixed)> {
            let state = self.mixed(p, t)?;
            Ok((state.s - s_target, state))
        };

        let mut lo = (seed - BRACKET_HALF_WIDTH).max(T_MIN);
        let mut hi = seed + BRACKET_HALF_WIDTH;
        let (mut f_lo, mut s_lo) = residual(lo)?;
        let (mut f_hi, mut s_hi) = residual(hi)?;

        let mut width = BRACKET_HALF_WIDTH;
        let mut expansions = 0;
        while f_lo > 0.0 || f_hi < 0.0 {
            if expansions == MAX_BRACKET_EXPANSIONS || (f_lo > 0.0 && lo <= T_MIN) {
                return Err(FluidError::ConvergenceFailed {
                    what: "pressure-entropy temperature bracket",
                });
            }
            width *= 2.0;
            if f_lo > 0.0 {
                lo = (lo - width).max(T_MIN);
                (f_lo, s_lo) = residual(lo)?;
            } else {
                hi += width;
                (f_hi, s_hi) = residual(hi)?;
            }
            expansions += 1;
        }

        for _ in 0..MAX_BISECTIONS {
            if hi - lo < T_TOL {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let (f_mid, s_mid) = residual(mid)?;
            if f_mid == 0.0 {
                return Ok((mid, s_mid));
            }
            if f_mid < 0.0 {
                (lo, s_lo) = (mid, s_mid);
            } else {
                (hi, s_hi) = (mid, s_mid);
            }
        }

        let t = 0.5 * (lo + hi);
        let jump = s_hi.s - s_lo.s;
        if jump > ENTROPY_JUMP_TOL {
            // Entropy is discontinuous here: split between the saturated states.
            let w = ((s_target - s_lo.s) / jump).clamp(0.0, 1.0);
            tracing::trace!(t, w, "lever rule across phase boundary");
            let v = (1.0 - w) / s_lo.rho + w / s_hi.rho;
            return Ok((
                t,
                Mixed {
                    s: s_target,
                    h: s_lo.h + w * (s_hi.h - s_lo.h),
                    rho: 1.0 / v,
                    q: (s_lo.q + w * (s_hi.q - s_lo.q)).clamp(0.0, 1.0),
                },
            ));
        }
        Ok((t, self.mixed(p, t)?))
    }

    fn solve(&self, p: Pressure, s: SpecEntropy, t_guess: Temperature) -> FluidResult<(f64, Mixed)> {
        validation::validate_pressure(p)?;
        validation::validate_entropy(s)?;
        self.solve_ps(p.value, s, t_guess.value)
    }
}

impl<M: FlashModel> PropertyBackend for PhaseMixingBackend<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> EosFamily {
        self.family
    }

    fn entropy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEntropy> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let s = self.mixed(p.value, t.value)?.s;
        validation::validate_entropy(s)?;
        Ok(s)
    }

    fn enthalpy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEnthalpy> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let h = self.mixed(p.value, t.value)?.h;
        validation::validate_enthalpy(h)?;
        Ok(h)
    }

    fn density(&self, p: Pressure, s: SpecEntropy, t_guess: Temperature) -> FluidResult<Density> {
        let rho = kg_m3(self.solve(p, s, t_guess)?.1.rho);
        validation::validate_density(rho)?;
        Ok(rho)
    }

    fn temperature_from_ps(
        &self,
        p: Pressure,
        s: SpecEntropy,
        t_guess: Temperature,
    ) -> FluidResult<Temperature> {
        let t = k(self.solve(p, s, t_guess)?.0);
        validation::validate_temperature(t)?;
        Ok(t)
    }

    fn quality(&self, p: Pressure, s: SpecEntropy, t_guess: Temperature) -> FluidResult<f64> {
        Ok(self.solve(p, s, t_guess)?.1.q)
    }

    fn isentropic_state(
        &self,
        p: Pressure,
        s: SpecEntropy,
        t_guess: Temperature,
    ) -> FluidResult<IsentropicState> {
        let (t, state) = self.solve(p, s, t_guess)?;
        let t = k(t);
        let rho = kg_m3(state.rho);
        validation::validate_temperature(t)?;
        validation::validate_enthalpy(state.h)?;
        validation::validate_density(rho)?;
        Ok(IsentropicState {
            t,
            h: state.h,
            rho,
            q: state.q,
        })
    }
}
