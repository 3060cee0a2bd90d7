//! Calorically perfect gas backend.
//!
//! Ideal gas equation of state `p = ρ·R·T` with constant heat capacities.
//! Every primitive has a closed form, so this backend performs no iteration
//! and ignores the temperature seed. Enthalpy and entropy are relative to
//! `T_REF_K` / `P_REF_PA`; the constant ideal mixing entropy is omitted since
//! only entropy differences along the isentrope matter.

use crate::backend::{IsentropicState, PropertyBackend, validation};
use crate::composition::Composition;
use crate::eos::EosFamily;
use crate::error::{FluidError, FluidResult};
use dw_core::units::constants::{P_REF_PA, R_MOLAR, T_REF_K};
use dw_core::units::{Density, Pressure, SpecEnthalpy, SpecEntropy, Temperature, Velocity};
use dw_core::units::{k, kg_m3, mps};

/// Perfect gas with specific gas constant `r` and constant `cp`.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfectGasBackend {
    /// Specific gas constant [J/(kg·K)]
    r: f64,
    /// Specific heat at constant pressure [J/(kg·K)]
    cp: f64,
}

impl PerfectGasBackend {
    /// Build from a composition of built-in species.
    ///
    /// Heat capacity is the mole-fraction weighted ideal-gas value at `T_REF_K`.
    pub fn new(comp: &Composition) -> FluidResult<Self> {
        let species = comp.species()?;
        let molar_mass: f64 = species
            .iter()
            .map(|(s, x)| x * s.data().molar_mass * 1e-3)
            .sum();
        let cp_molar: f64 = species
            .iter()
            .map(|(s, x)| x * s.data().cp_molar(T_REF_K))
            .sum();
        Self::from_constants(R_MOLAR / molar_mass, cp_molar / molar_mass)
    }

    /// Build from explicit gas constant and heat capacity (both J/(kg·K)).
    pub fn from_constants(r: f64, cp: f64) -> FluidResult<Self> {
        if !r.is_finite() || r <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "gas constant must be positive and finite",
            });
        }
        if !cp.is_finite() || cp <= r {
            return Err(FluidError::NonPhysical {
                what: "cp must exceed the gas constant so that cv > 0",
            });
        }
        Ok(Self { r, cp })
    }

    /// Heat capacity ratio γ = cp/cv.
    pub fn gamma(&self) -> f64 {
        self.cp / (self.cp - self.r)
    }

    pub fn gas_constant(&self) -> f64 {
        self.r
    }

    fn t_from_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<Temperature> {
        validation::validate_pressure(p)?;
        validation::validate_entropy(s)?;
        let t = T_REF_K * ((s + self.r * (p.value / P_REF_PA).ln()) / self.cp).exp();
        let t = k(t);
        validation::validate_temperature(t)?;
        Ok(t)
    }
}

impl PropertyBackend for PerfectGasBackend {
    fn name(&self) -> &str {
        "perfect gas"
    }

    fn family(&self) -> EosFamily {
        EosFamily::Ideal
    }

    fn entropy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEntropy> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        Ok(self.cp * (t.value / T_REF_K).ln() - self.r * (p.value / P_REF_PA).ln())
    }

    fn enthalpy(&self, _p: Pressure, t: Temperature) -> FluidResult<SpecEnthalpy> {
        validation::validate_temperature(t)?;
        Ok(self.cp * (t.value - T_REF_K))
    }

    fn density(&self, p: Pressure, s: SpecEntropy, _t_guess: Temperature) -> FluidResult<Density> {
        let t = self.t_from_ps(p, s)?;
        Ok(kg_m3(p.value / (self.r * t.value)))
    }

    fn temperature_from_ps(
        &self,
        p: Pressure,
        s: SpecEntropy,
        _t_guess: Temperature,
    ) -> FluidResult<Temperature> {
        self.t_from_ps(p, s)
    }

    fn sound_speed_hint(&self, p: Pressure, s: SpecEntropy, _t_guess: Temperature) -> Option<Velocity> {
        let t = self.t_from_ps(p, s).ok()?;
        Some(mps((self.gamma() * self.r * t.value).sqrt()))
    }

    fn isentropic_state(
        &self,
        p: Pressure,
        s: SpecEntropy,
        _t_guess: Temperature,
    ) -> FluidResult<IsentropicState> {
        let t = self.t_from_ps(p, s)?;
        Ok(IsentropicState {
            t,
            h: self.cp * (t.value - T_REF_K),
            rho: kg_m3(p.value / (self.r * t.value)),
            q: 0.0,
        })
    }
}
