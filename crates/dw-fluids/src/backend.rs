//! Property backend trait and validation helpers.

use crate::eos::EosFamily;
use crate::error::{FluidError, FluidResult};
use dw_core::numeric::clamp_unit_interval;
use dw_core::units::{Density, Pressure, SpecEnthalpy, SpecEntropy, Temperature, Velocity};

/// Everything the path integrator needs at one point of the isentrope.
///
/// Backends that can answer all four quantities from a single flash override
/// [`PropertyBackend::isentropic_state`] and return this pack directly instead
/// of running one solve per property.
#[derive(Clone, Debug, PartialEq)]
pub struct IsentropicState {
    /// Temperature [K]
    pub t: Temperature,

    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,

    /// Density [kg/m³]
    pub rho: Density,

    /// Vapor quality, clamped to [0, 1]
    pub q: f64,
}

impl IsentropicState {
    /// Return a summary string of all contained properties (for debugging).
    pub fn summary(&self) -> String {
        format!(
            "State(T={:.3}K,h={:.1}J/kg,ρ={:.3}kg/m³,Q={:.4})",
            self.t.value, self.h, self.rho.value, self.q
        )
    }
}

/// Equation-of-state backend used along an isentrope.
///
/// One implementation per equation-of-state family, selected once when a
/// problem is set up. Implementations must be thread-safe (Send + Sync) so that
/// independent runs can be evaluated in parallel, each with its own instance.
///
/// `t_guess` is a temperature seed. Direct-lookup backends ignore it; backends
/// that solve the pressure–entropy flash iteratively start from it.
pub trait PropertyBackend: Send + Sync {
    /// Get the backend name (for debugging/logging).
    fn name(&self) -> &str;

    /// Equation-of-state family this backend implements.
    fn family(&self) -> EosFamily;

    /// Specific entropy [J/(kg·K)] at pressure and temperature.
    fn entropy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEntropy>;

    /// Specific enthalpy [J/kg] at pressure and temperature.
    fn enthalpy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEnthalpy>;

    /// Density [kg/m³] at pressure on the isentrope `s`.
    fn density(&self, p: Pressure, s: SpecEntropy, t_guess: Temperature) -> FluidResult<Density>;

    /// Temperature at pressure on the isentrope `s`.
    fn temperature_from_ps(
        &self,
        p: Pressure,
        s: SpecEntropy,
        t_guess: Temperature,
    ) -> FluidResult<Temperature>;

    /// Vapor quality at pressure on the isentrope `s`, clamped to [0, 1].
    ///
    /// Backends without phase information report 0.
    fn quality(&self, _p: Pressure, _s: SpecEntropy, _t_guess: Temperature) -> FluidResult<f64> {
        Ok(0.0)
    }

    /// Analytic speed of sound, when the backend has a closed form.
    ///
    /// Only used for diagnostics; the path integrator always uses the
    /// finite-difference probe.
    fn sound_speed_hint(
        &self,
        _p: Pressure,
        _s: SpecEntropy,
        _t_guess: Temperature,
    ) -> Option<Velocity> {
        None
    }

    /// Temperature, enthalpy, density and quality at pressure on the isentrope.
    ///
    /// Default implementation calls the individual primitives; enthalpy is
    /// evaluated at the solved (P, T).
    fn isentropic_state(
        &self,
        p: Pressure,
        s: SpecEntropy,
        t_guess: Temperature,
    ) -> FluidResult<IsentropicState> {
        let t = self.temperature_from_ps(p, s, t_guess)?;
        let h = self.enthalpy(p, t)?;
        let rho = self.density(p, s, t)?;
        let q = clamp_unit_interval(self.quality(p, s, t)?);
        validation::validate_density(rho)?;
        Ok(IsentropicState { t, h, rho, q })
    }
}

/// Validation helpers for fluid properties.
pub(crate) mod validation {
    use super::*;

    /// Ensure pressure is positive and finite.
    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure temperature is positive and finite.
    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure density is positive and finite.
    pub fn validate_density(rho: Density) -> FluidResult<()> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    /// Ensure entropy is finite (can be negative).
    pub fn validate_entropy(s: f64) -> FluidResult<()> {
        if !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "entropy must be finite",
            });
        }
        Ok(())
    }

    /// Ensure enthalpy is finite (can be negative).
    pub fn validate_enthalpy(h: f64) -> FluidResult<()> {
        if !h.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy must be finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;
    use dw_core::units::{k, kg_m3, pa};

    #[test]
    fn validate_positive_pressure() {
        assert!(validate_pressure(pa(101325.0)).is_ok());
        assert!(validate_pressure(pa(-100.0)).is_err());
        assert!(validate_pressure(pa(0.0)).is_err());
        assert!(validate_pressure(pa(f64::NAN)).is_err());
    }

    #[test]
    fn validate_positive_temperature() {
        assert!(validate_temperature(k(300.0)).is_ok());
        assert!(validate_temperature(k(-10.0)).is_err());
        assert!(validate_temperature(k(0.0)).is_err());
    }

    #[test]
    fn validate_density_positive() {
        assert!(validate_density(kg_m3(1000.0)).is_ok());
        assert!(validate_density(kg_m3(-1.0)).is_err());
        assert!(validate_density(kg_m3(0.0)).is_err());
    }

    #[test]
    fn entropy_and_enthalpy_may_be_negative() {
        assert!(validate_entropy(-120.0).is_ok());
        assert!(validate_enthalpy(-5.0e4).is_ok());
        assert!(validate_entropy(f64::INFINITY).is_err());
        assert!(validate_enthalpy(f64::NAN).is_err());
    }

    /// Backend with a fixed isentrope used to exercise the default pack.
    struct Fixed;

    impl PropertyBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn family(&self) -> EosFamily {
            EosFamily::Ideal
        }
        fn entropy(&self, _p: Pressure, _t: Temperature) -> FluidResult<SpecEntropy> {
            Ok(0.0)
        }
        fn enthalpy(&self, p: Pressure, _t: Temperature) -> FluidResult<SpecEnthalpy> {
            Ok(p.value * 1e-3)
        }
        fn density(&self, p: Pressure, _s: SpecEntropy, _t: Temperature) -> FluidResult<Density> {
            Ok(kg_m3(p.value * 1e-5))
        }
        fn temperature_from_ps(
            &self,
            _p: Pressure,
            _s: SpecEntropy,
            t_guess: Temperature,
        ) -> FluidResult<Temperature> {
            Ok(k(t_guess.value - 1.0))
        }
        fn quality(&self, _p: Pressure, _s: SpecEntropy, _t: Temperature) -> FluidResult<f64> {
            Ok(-1.0)
        }
    }

    #[test]
    fn default_pack_composes_primitives_and_clamps_quality() {
        let state = Fixed.isentropic_state(pa(2e5), 0.0, k(300.0)).unwrap();
        assert_eq!(state.t.value, 299.0);
        assert_eq!(state.h, 200.0);
        assert_eq!(state.rho.value, 2.0);
        assert_eq!(state.q, 0.0);
        assert!(state.summary().contains("T=299.000K"));
    }
}
