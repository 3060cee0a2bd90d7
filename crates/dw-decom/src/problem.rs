//! Immutable definition of one decompression run.

use crate::error::{DecomError, DecomResult};
use crate::input::{InputConfig, parse_config};
use dw_core::units::{Pressure, Temperature, k, pa};
use dw_fluids::{BackendOption, Composition, EosFamily};
use serde_yaml::Value;

/// Initial state, fluid and stepping parameters for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDefinition {
    pub t0: Temperature,
    pub p0: Pressure,
    pub eos: EosFamily,
    pub composition: Composition,
    pub pressure_step: Pressure,
    pub pressure_break: Pressure,
    pub extrapolate: bool,
    pub backend_option: Option<BackendOption>,
    /// Pressure increment of the sound speed probe
    pub probe_delta: Pressure,
}

impl ProblemDefinition {
    /// Validate a configuration mapping and build the definition from it.
    pub fn from_config(config: &Value) -> DecomResult<Self> {
        let input = parse_config(config)?;
        Self::from_input(&input)
    }

    /// Build from an already deserialized configuration.
    ///
    /// Numeric ranges are rechecked since `InputConfig` can be built in code.
    pub fn from_input(input: &InputConfig) -> DecomResult<Self> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(input.temperature)
            || !positive(input.pressure)
            || !positive(input.pressure_step)
            || !positive(input.probe_delta)
            || !(input.pressure_break.is_finite() && input.pressure_break >= 0.0)
        {
            tracing::warn!(?input, "numeric configuration out of range");
            return Err(DecomError::Input);
        }

        let composition = Composition::parse(&input.fluid)?;
        Ok(Self {
            t0: k(input.temperature),
            p0: pa(input.pressure),
            eos: input.eos,
            composition,
            pressure_step: pa(input.pressure_step),
            pressure_break: pa(input.pressure_break),
            extrapolate: input.extrapolate,
            backend_option: input.backend_option,
            probe_delta: pa(input.probe_delta),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_yaml() {
        let config: Value = serde_yaml::from_str(
            "temperature: 308.24\npressure: 14561000\neos: REFPROP\nfluid: 'CO2[0.9667]&O2[0.0333]'\nrefprop_option: PR\npressure_step: 2.0e5\nextrapolate: true\n",
        )
        .unwrap();
        let problem = ProblemDefinition::from_config(&config).unwrap();
        assert_eq!(problem.eos, EosFamily::Refprop);
        assert_eq!(problem.backend_option, Some(BackendOption::PengRobinson));
        assert_eq!(problem.pressure_step.value, 2.0e5);
        assert!(problem.extrapolate);
        assert_eq!(problem.composition.len(), 2);
        let sum: f64 = problem.composition.fractions().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_config_is_input_error() {
        let config: Value =
            serde_yaml::from_str("temperature: 300\npressure: 1.0e7\neos: SRK\nfluid: CO2\n").unwrap();
        assert!(matches!(
            ProblemDefinition::from_config(&config),
            Err(DecomError::Input)
        ));
    }

    #[test]
    fn malformed_fluid_is_composition_error() {
        let input = InputConfig::new(300.0, 1.0e7, EosFamily::Ideal, "CO2[0.5]&O2");
        assert!(matches!(
            ProblemDefinition::from_input(&input),
            Err(DecomError::Composition(_))
        ));
    }

    #[test]
    fn code_built_input_is_range_checked() {
        let mut input = InputConfig::new(300.0, 1.0e7, EosFamily::Ideal, "N2");
        input.pressure_step = 0.0;
        assert!(matches!(
            ProblemDefinition::from_input(&input),
            Err(DecomError::Input)
        ));
    }
}
