//! Peng–Robinson cubic equation of state with a PT flash.
//!
//! Van der Waals one-fluid mixing rules, optional binary interaction
//! parameters, Wilson K-value initialization and successive substitution on
//! the fugacity ratios. Properties are molar and relative to the ideal gas at
//! `T_REF_K` / `P_REF_PA`.

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::flash::{
    FlashModel, FlashResult, PhaseKind, PhaseState, RachfordRice, check_composition,
    phase_compositions, rachford_rice,
};
use crate::species::SpeciesData;
use dw_core::units::constants::{P_REF_PA, R_MOLAR};
use std::f64::consts::SQRT_2;

const MAX_FLASH_ITER: usize = 2000;
const FLASH_TOL: f64 = 1e-18;
/// Below this Σ(ln K)² the K-values have collapsed to the trivial solution.
const TRIVIAL_TOL: f64 = 1e-8;

#[derive(Debug, Clone)]
struct Component {
    data: SpeciesData,
    kappa: f64,
    /// a at the critical point [Pa·m⁶/mol²]
    ac: f64,
    /// Co-volume [m³/mol]
    b: f64,
}

impl Component {
    fn new(data: SpeciesData) -> Self {
        let w = data.omega;
        let kappa = 0.37464 + 1.54226 * w - 0.26992 * w * w;
        let ac = 0.45724 * (R_MOLAR * data.tc).powi(2) / data.pc;
        let b = 0.07780 * R_MOLAR * data.tc / data.pc;
        Self { data, kappa, ac, b }
    }

    /// Attraction parameter and its temperature derivative.
    fn a(&self, t: f64) -> (f64, f64) {
        let sqrt_tr = (t / self.data.tc).sqrt();
        let sqrt_alpha = 1.0 + self.kappa * (1.0 - sqrt_tr);
        let a = self.ac * sqrt_alpha * sqrt_alpha;
        let da = -self.ac * self.kappa * sqrt_alpha / (t * self.data.tc).sqrt();
        (a, da)
    }
}

/// Mixture parameters at a temperature and composition.
struct Mix {
    a: f64,
    da: f64,
    b: f64,
    /// Σⱼ xⱼ aᵢⱼ for each component
    a_partial: Vec<f64>,
}

/// Peng–Robinson model for a fixed feed.
#[derive(Debug, Clone)]
pub struct PengRobinson {
    components: Vec<Component>,
    z: Vec<f64>,
    kij: Vec<Vec<f64>>,
}

impl PengRobinson {
    /// Build from a composition of built-in species with all kᵢⱼ = 0.
    pub fn new(comp: &Composition) -> FluidResult<Self> {
        let species = comp.species()?;
        let n = species.len();
        Ok(Self {
            components: species.iter().map(|(s, _)| Component::new(s.data())).collect(),
            z: species.iter().map(|(_, x)| *x).collect(),
            kij: vec![vec![0.0; n]; n],
        })
    }

    /// Set the symmetric binary interaction parameter between components `i` and `j`.
    pub fn with_interaction(mut self, i: usize, j: usize, kij: f64) -> FluidResult<Self> {
        let n = self.components.len();
        if i >= n || j >= n || i == j {
            return Err(FluidError::InvalidArg {
                what: "interaction parameter indices must name two distinct components",
            });
        }
        if !kij.is_finite() {
            return Err(FluidError::InvalidArg {
                what: "interaction parameter must be finite",
            });
        }
        self.kij[i][j] = kij;
        self.kij[j][i] = kij;
        Ok(self)
    }

    fn mix(&self, t: f64, x: &[f64]) -> Mix {
        let ai: Vec<(f64, f64)> = self.components.iter().map(|c| c.a(t)).collect();
        let n = ai.len();
        let mut a = 0.0;
        let mut da = 0.0;
        let mut a_partial = vec![0.0; n];
        for i in 0..n {
            for j in 0..n {
                let (a_i, da_i) = ai[i];
                let (a_j, da_j) = ai[j];
                let root = (a_i * a_j).sqrt();
                let one_minus_k = 1.0 - self.kij[i][j];
                let a_ij = one_minus_k * root;
                let da_ij = one_minus_k * (da_i * a_j + a_i * da_j) / (2.0 * root);
                a_partial[i] += x[j] * a_ij;
                a += x[i] * x[j] * a_ij;
                da += x[i] * x[j] * da_ij;
            }
        }
        let b = self.components.iter().zip(x).map(|(c, xi)| xi * c.b).sum();
        Mix {
            a,
            da,
            b,
            a_partial,
        }
    }

    /// Compressibility factor for the requested phase.
    fn z_factor(&self, big_a: f64, big_b: f64, phase: PhaseKind) -> FluidResult<f64> {
        let roots = roots_above(big_a, big_b);
        let pick = match phase {
            PhaseKind::Liquid => roots.iter().copied().reduce(f64::min),
            PhaseKind::Vapor => roots.iter().copied().reduce(f64::max),
            PhaseKind::Single => roots.iter().copied().reduce(|z1, z2| {
                if reduced_gibbs(z1, big_a, big_b) <= reduced_gibbs(z2, big_a, big_b) {
                    z1
                } else {
                    z2
                }
            }),
        };
        pick.ok_or(FluidError::NonPhysical {
            what: "Peng-Robinson cubic has no root above the co-volume",
        })
    }

    /// ln φᵢ for composition `x` in the given phase.
    fn ln_fugacity(&self, p: f64, t: f64, x: &[f64], phase: PhaseKind) -> FluidResult<Vec<f64>> {
        let mix = self.mix(t, x);
        let rt = R_MOLAR * t;
        let big_a = mix.a * p / (rt * rt);
        let big_b = mix.b * p / rt;
        let z = self.z_factor(big_a, big_b, phase)?;
        let l = log_term(z, big_b);
        Ok(self
            .components
            .iter()
            .zip(&mix.a_partial)
            .map(|(c, a_part)| {
                let bi_b = c.b / mix.b;
                bi_b * (z - 1.0) - (z - big_b).ln()
                    - big_a / (2.0 * SQRT_2 * big_b) * (2.0 * a_part / mix.a - bi_b) * l
            })
            .collect())
    }

    fn pure_flash(&self, p: f64, t: f64) -> FluidResult<FlashResult> {
        let c = &self.components[0];
        if t >= c.data.tc {
            return Ok(FlashResult::SinglePhase {
                phase: PhaseKind::Single,
            });
        }
        let mix = self.mix(t, &self.z);
        let rt = R_MOLAR * t;
        let big_a = mix.a * p / (rt * rt);
        let big_b = mix.b * p / rt;
        let roots = roots_above(big_a, big_b);

        let phase = match (roots.first(), roots.last()) {
            (Some(lo), Some(hi)) if roots.len() > 1 => {
                // For a pure fluid ln φ equals the reduced residual Gibbs energy.
                if reduced_gibbs(*lo, big_a, big_b) < reduced_gibbs(*hi, big_a, big_b) {
                    PhaseKind::Liquid
                } else {
                    PhaseKind::Vapor
                }
            }
            _ => {
                // One root: classify against the Wilson vapor-pressure estimate.
                let psat = c.data.pc
                    * (5.373 * (1.0 + c.data.omega) * (1.0 - c.data.tc / t)).exp();
                if p > psat {
                    PhaseKind::Liquid
                } else {
                    PhaseKind::Vapor
                }
            }
        };
        Ok(FlashResult::SinglePhase { phase })
    }
}

impl FlashModel for PengRobinson {
    fn name(&self) -> &str {
        "PR"
    }

    fn feed(&self) -> &[f64] {
        &self.z
    }

    fn molar_mass(&self, x: &[f64]) -> f64 {
        self.components
            .iter()
            .zip(x)
            .map(|(c, xi)| xi * c.data.molar_mass * 1e-3)
            .sum()
    }

    fn flash_pt(&self, p: f64, t: f64) -> FluidResult<FlashResult> {
        if !(p.is_finite() && p > 0.0 && t.is_finite() && t > 0.0) {
            return Err(FluidError::NonPhysical {
                what: "flash requires positive finite pressure and temperature",
            });
        }
        if self.components.len() == 1 {
            return self.pure_flash(p, t);
        }

        let z = &self.z;
        let mut ln_k: Vec<f64> = self
            .components
            .iter()
            .map(|c| {
                (c.data.pc / p).ln() + 5.373 * (1.0 + c.data.omega) * (1.0 - c.data.tc / t)
            })
            .collect();

        for iter in 0..MAX_FLASH_ITER {
            if ln_k.iter().map(|lk| lk * lk).sum::<f64>() < TRIVIAL_TOL {
                return Ok(FlashResult::SinglePhase {
                    phase: PhaseKind::Single,
                });
            }

            let k: Vec<f64> = ln_k.iter().map(|lk| lk.exp()).collect();
            let beta = match rachford_rice(z, &k) {
                RachfordRice::AllLiquid => {
                    return Ok(FlashResult::SinglePhase {
                        phase: PhaseKind::Liquid,
                    });
                }
                RachfordRice::AllVapor => {
                    return Ok(FlashResult::SinglePhase {
                        phase: PhaseKind::Vapor,
                    });
                }
                RachfordRice::Split(beta) => beta,
            };

            let (x, y) = phase_compositions(z, &k, beta);
            let phi_l = self.ln_fugacity(p, t, &x, PhaseKind::Liquid)?;
            let phi_v = self.ln_fugacity(p, t, &y, PhaseKind::Vapor)?;
            let next: Vec<f64> = phi_l.iter().zip(&phi_v).map(|(l, v)| l - v).collect();
            let change: f64 = next.iter().zip(&ln_k).map(|(a, b)| (a - b).powi(2)).sum();
            ln_k = next;

            if change < FLASH_TOL {
                tracing::trace!(iter, beta, "Peng-Robinson flash converged");
                let k: Vec<f64> = ln_k.iter().map(|lk| lk.exp()).collect();
                return Ok(match rachford_rice(z, &k) {
                    RachfordRice::AllLiquid => FlashResult::SinglePhase {
                        phase: PhaseKind::Liquid,
                    },
                    RachfordRice::AllVapor => FlashResult::SinglePhase {
                        phase: PhaseKind::Vapor,
                    },
                    RachfordRice::Split(beta) => {
                        let (x, y) = phase_compositions(z, &k, beta);
                        FlashResult::TwoPhase { beta, x, y }
                    }
                });
            }
        }

        Err(FluidError::ConvergenceFailed {
            what: "Peng-Robinson successive substitution",
        })
    }

    fn phase_state(&self, p: f64, t: f64, x: &[f64], phase: PhaseKind) -> FluidResult<PhaseState> {
        check_composition(x)?;
        let mix = self.mix(t, x);
        let rt = R_MOLAR * t;
        let big_a = mix.a * p / (rt * rt);
        let big_b = mix.b * p / rt;
        let z = self.z_factor(big_a, big_b, phase)?;
        let l = log_term(z, big_b);

        let h_dep = rt * (z - 1.0) + (t * mix.da - mix.a) / (2.0 * SQRT_2 * mix.b) * l;
        let s_dep = R_MOLAR * (z - big_b).ln() + mix.da / (2.0 * SQRT_2 * mix.b) * l;

        let mut h_ig = 0.0;
        let mut s_ig = -R_MOLAR * (p / P_REF_PA).ln();
        for (c, xi) in self.components.iter().zip(x) {
            h_ig += xi * c.data.h_ideal(t);
            s_ig += xi * c.data.s_ideal_t(t);
            if *xi > 0.0 {
                s_ig -= R_MOLAR * xi * xi.ln();
            }
        }

        let state = PhaseState {
            h: h_ig + h_dep,
            s: s_ig + s_dep,
            v: z * rt / p,
        };
        if !(state.h.is_finite() && state.s.is_finite() && state.v.is_finite()) {
            return Err(FluidError::NonPhysical {
                what: "Peng-Robinson phase properties are not finite",
            });
        }
        Ok(state)
    }
}

/// Physical compressibility roots (Z > B), ascending.
fn roots_above(big_a: f64, big_b: f64) -> Vec<f64> {
    let mut roots: Vec<f64> = cubic_roots(
        -(1.0 - big_b),
        big_a - 3.0 * big_b * big_b - 2.0 * big_b,
        -(big_a * big_b - big_b * big_b - big_b.powi(3)),
    )
    .into_iter()
    .filter(|z| *z > big_b)
    .collect();
    roots.sort_by(f64::total_cmp);
    roots
}

/// ln((Z + (1+√2)B) / (Z + (1−√2)B))
fn log_term(z: f64, big_b: f64) -> f64 {
    ((z + (1.0 + SQRT_2) * big_b) / (z + (1.0 - SQRT_2) * big_b)).ln()
}

/// Residual Gibbs energy over RT; used to pick the stable root.
fn reduced_gibbs(z: f64, big_a: f64, big_b: f64) -> f64 {
    z - 1.0 - (z - big_b).ln() - big_a / (2.0 * SQRT_2 * big_b) * log_term(z, big_b)
}

/// Real roots of `Z³ + c2·Z² + c1·Z + c0 = 0`.
pub(crate) fn cubic_roots(c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let shift = c2 / 3.0;
    let p = c1 - c2 * c2 / 3.0;
    let q = 2.0 * c2.powi(3) / 27.0 - c2 * c1 / 3.0 + c0;
    let disc = q * q / 4.0 + p.powi(3) / 27.0;

    if disc > 0.0 {
        let sq = disc.sqrt();
        let t = (-q / 2.0 + sq).cbrt() + (-q / 2.0 - sq).cbrt();
        return vec![t - shift];
    }
    if p.abs() < f64::EPSILON {
        return vec![-shift];
    }

    let r = 2.0 * (-p / 3.0).sqrt();
    let arg = (3.0 * q / (p * r)).clamp(-1.0, 1.0);
    let phi = arg.acos() / 3.0;
    (0..3)
        .map(|k| r * (phi - 2.0 * std::f64::consts::PI * k as f64 / 3.0).cos() - shift)
        .collect()
}
