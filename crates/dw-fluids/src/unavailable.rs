//! Placeholder backend for equation-of-state families that cannot be used.

use crate::backend::PropertyBackend;
use crate::eos::EosFamily;
use crate::error::{FluidError, FluidResult};
use dw_core::units::{Density, Pressure, SpecEnthalpy, SpecEntropy, Temperature};

/// Backend whose every primitive fails with [`FluidError::BackendUnavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    family: EosFamily,
    reason: String,
}

impl UnavailableBackend {
    pub fn new(family: EosFamily, reason: impl Into<String>) -> Self {
        Self {
            family,
            reason: reason.into(),
        }
    }

    fn unavailable<T>(&self) -> FluidResult<T> {
        Err(FluidError::BackendUnavailable {
            backend: self.family.key().to_string(),
            reason: self.reason.clone(),
        })
    }
}

impl PropertyBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn family(&self) -> EosFamily {
        self.family
    }

    fn entropy(&self, _p: Pressure, _t: Temperature) -> FluidResult<SpecEntropy> {
        self.unavailable()
    }

    fn enthalpy(&self, _p: Pressure, _t: Temperature) -> FluidResult<SpecEnthalpy> {
        self.unavailable()
    }

    fn density(&self, _p: Pressure, _s: SpecEntropy, _t: Temperature) -> FluidResult<Density> {
        self.unavailable()
    }

    fn temperature_from_ps(
        &self,
        _p: Pressure,
        _s: SpecEntropy,
        _t_guess: Temperature,
    ) -> FluidResult<Temperature> {
        self.unavailable()
    }

    fn quality(&self, _p: Pressure, _s: SpecEntropy, _t: Temperature) -> FluidResult<f64> {
        self.unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_core::units::{k, pa};

    #[test]
    fn every_primitive_fails() {
        let backend = UnavailableBackend::new(EosFamily::Refprop, "library not found");
        let p = pa(1e6);
        let t = k(300.0);
        assert!(matches!(
            backend.entropy(p, t),
            Err(FluidError::BackendUnavailable { .. })
        ));
        assert!(backend.enthalpy(p, t).is_err());
        assert!(backend.density(p, 0.0, t).is_err());
        assert!(backend.temperature_from_ps(p, 0.0, t).is_err());
        assert!(backend.quality(p, 0.0, t).is_err());
        assert!(backend.isentropic_state(p, 0.0, t).is_err());
    }

    #[test]
    fn reports_requested_family() {
        let backend = UnavailableBackend::new(EosFamily::Heos, "disabled");
        assert_eq!(backend.family(), EosFamily::Heos);
        let err = backend.entropy(pa(1e5), k(300.0)).unwrap_err();
        assert!(err.to_string().contains("HEOS"));
    }
}
