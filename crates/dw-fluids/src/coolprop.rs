//! CoolProp-based direct-lookup backend.
//!
//! Every primitive is a single `AbstractState` update keyed by the two
//! independent variables it is given, followed by keyed outputs. CoolProp's
//! own flash is opaque here and assumed convergent.

use crate::backend::{IsentropicState, PropertyBackend, validation};
use crate::composition::Composition;
use crate::eos::EosFamily;
use crate::error::{FluidError, FluidResult};
use dw_core::numeric::clamp_unit_interval;
use dw_core::units::{Density, Pressure, SpecEnthalpy, SpecEntropy, Temperature, k, kg_m3};
use rfluids::io::{FluidInputPair, FluidParam};
use rfluids::native::{AbstractState, CoolPropError};
use std::sync::{Mutex, MutexGuard};

/// CoolProp backend for pure fluids and mixtures.
///
/// The `AbstractState` is owned by this instance and guarded by a mutex so that
/// update/query pairs stay atomic; rfluids serializes the FFI calls themselves.
pub struct CoolPropBackend {
    family: EosFamily,
    name: String,
    state: Mutex<AbstractState>,
}

impl CoolPropBackend {
    /// Create a backend for `comp` using the CoolProp backend named by `family`.
    ///
    /// Failure to create the state (unknown fluid, REFPROP not installed, …)
    /// is reported as [`FluidError::BackendUnavailable`].
    pub fn new(family: EosFamily, comp: &Composition) -> FluidResult<Self> {
        let names = comp.coolprop_names();
        let mut state = AbstractState::new(family.key(), &names).map_err(|e| {
            FluidError::BackendUnavailable {
                backend: family.key().to_string(),
                reason: format!("cannot create state for '{names}': {e}"),
            }
        })?;

        if comp.is_pure().is_none() {
            state
                .set_fractions(&comp.fractions())
                .map_err(|e| backend_error("setting mole fractions", e))?;
        }

        Ok(Self {
            family,
            name: format!("CoolProp {}", family.key()),
            state: Mutex::new(state),
        })
    }

    /// Replace the reported backend name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn lock(&self) -> FluidResult<MutexGuard<'_, AbstractState>> {
        self.state.lock().map_err(|_| FluidError::Backend {
            message: "CoolProp abstract state mutex poisoned".into(),
        })
    }

    /// Locks the state and updates it from (P, T).
    fn lock_pt(&self, p: Pressure, t: Temperature) -> FluidResult<MutexGuard<'_, AbstractState>> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let mut state = self.lock()?;
        state
            .update(FluidInputPair::PT, p.value, t.value)
            .map_err(|e| backend_error_at("PT update", p.value, t.value, e))?;
        Ok(state)
    }

    /// Locks the state and updates it from (P, s).
    fn lock_ps(&self, p: Pressure, s: SpecEntropy) -> FluidResult<MutexGuard<'_, AbstractState>> {
        validation::validate_pressure(p)?;
        validation::validate_entropy(s)?;
        let mut state = self.lock()?;
        state
            .update(FluidInputPair::PSMass, p.value, s)
            .map_err(|e| backend_error_at("PS update", p.value, s, e))?;
        Ok(state)
    }
}

fn backend_error(what: &str, e: CoolPropError) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error {what}: {e}"),
    }
}

fn backend_error_at(what: &str, a: f64, b: f64, e: CoolPropError) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error in {what} at ({a}, {b}): {e}"),
    }
}

fn output(state: &AbstractState, param: FluidParam, what: &str) -> FluidResult<f64> {
    state
        .keyed_output(param)
        .map_err(|e| backend_error(what, e))
}

impl PropertyBackend for CoolPropBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> EosFamily {
        self.family
    }

    fn entropy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEntropy> {
        let state = self.lock_pt(p, t)?;
        let s = output(&state, FluidParam::SMass, "getting entropy")?;
        validation::validate_entropy(s)?;
        Ok(s)
    }

    fn enthalpy(&self, p: Pressure, t: Temperature) -> FluidResult<SpecEnthalpy> {
        let state = self.lock_pt(p, t)?;
        let h = output(&state, FluidParam::HMass, "getting enthalpy")?;
        validation::validate_enthalpy(h)?;
        Ok(h)
    }

    fn density(&self, p: Pressure, s: SpecEntropy, _t_guess: Temperature) -> FluidResult<Density> {
        let state = self.lock_ps(p, s)?;
        let rho = kg_m3(output(&state, FluidParam::DMass, "getting density")?);
        validation::validate_density(rho)?;
        Ok(rho)
    }

    fn temperature_from_ps(
        &self,
        p: Pressure,
        s: SpecEntropy,
        _t_guess: Temperature,
    ) -> FluidResult<Temperature> {
        let state = self.lock_ps(p, s)?;
        let t = k(output(&state, FluidParam::T, "getting temperature")?);
        validation::validate_temperature(t)?;
        Ok(t)
    }

    fn quality(&self, p: Pressure, s: SpecEntropy, _t_guess: Temperature) -> FluidResult<f64> {
        let state = self.lock_ps(p, s)?;
        // CoolProp reports -1 for single-phase states.
        Ok(clamp_unit_interval(output(&state, FluidParam::Q, "getting quality")?))
    }

    fn isentropic_state(
        &self,
        p: Pressure,
        s: SpecEntropy,
        _t_guess: Temperature,
    ) -> FluidResult<IsentropicState> {
        let state = self.lock_ps(p, s)?;
        let t = k(output(&state, FluidParam::T, "getting temperature")?);
        let h = output(&state, FluidParam::HMass, "getting enthalpy")?;
        let rho = kg_m3(output(&state, FluidParam::DMass, "getting density")?);
        let q = clamp_unit_interval(output(&state, FluidParam::Q, "getting quality")?);

        validation::validate_temperature(t)?;
        validation::validate_enthalpy(h)?;
        validation::validate_density(rho)?;
        Ok(IsentropicState { t, h, rho, q })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_core::units::pa;

    fn co2() -> CoolPropBackend {
        CoolPropBackend::new(EosFamily::Heos, &Composition::parse("CO2").unwrap()).unwrap()
    }

    #[test]
    fn backend_name() {
        assert_eq!(co2().name(), "CoolProp HEOS");
    }

    #[test]
    fn ps_recovers_initial_temperature() {
        let backend = co2();
        let p = pa(145.61e5);
        let s = backend.entropy(p, k(308.24)).unwrap();
        let t = backend.temperature_from_ps(p, s, k(308.24)).unwrap();
        assert!((t.value - 308.24).abs() < 1e-6, "T = {}", t.value);
    }

    #[test]
    fn dense_phase_quality_is_clamped_to_zero() {
        let backend = co2();
        let p = pa(145.61e5);
        let s = backend.entropy(p, k(308.24)).unwrap();
        let state = backend.isentropic_state(p, s, k(308.24)).unwrap();
        assert_eq!(state.q, 0.0);
        assert!(state.rho.value > 600.0 && state.rho.value < 900.0);
    }

    #[test]
    fn unknown_fluid_is_unavailable() {
        let comp = Composition::parse("NotAFluid").unwrap();
        assert!(matches!(
            CoolPropBackend::new(EosFamily::Heos, &comp),
            Err(FluidError::BackendUnavailable { .. })
        ));
    }
}
