//! Error types for decompression runs.

use dw_fluids::FluidError;
use thiserror::Error;

pub type DecomResult<T> = Result<T, DecomError>;

/// Errors raised while setting up or exporting a run.
///
/// Numerical breakdowns during stepping are not errors: they end the run
/// with [`crate::TerminationReason::BackendFailure`].
#[derive(Error, Debug)]
pub enum DecomError {
    /// Configuration failed validation. Diagnostics come from [`crate::validate_config`].
    #[error("Input file error")]
    Input,

    #[error("Composition error: {0}")]
    Composition(FluidError),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(FluidError),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Run already completed; create a new instance to run again")]
    AlreadyRun,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FluidError> for DecomError {
    fn from(e: FluidError) -> Self {
        match e {
            FluidError::CompositionParse { .. } | FluidError::NotSupported { .. } => {
                DecomError::Composition(e)
            }
            FluidError::BackendUnavailable { .. } => DecomError::BackendUnavailable(e),
            other => DecomError::Backend {
                message: other.to_string(),
            },
        }
    }
}

/// Failure of the finite-difference sound speed probe.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoundSpeedError {
    #[error("density does not change over the probe interval at P = {p} Pa")]
    ZeroSlope { p: f64 },

    #[error("non-physical dP/dρ = {slope} at P = {p} Pa")]
    NonPhysical { p: f64, slope: f64 },

    #[error("density evaluation failed: {0}")]
    Backend(#[from] FluidError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluid_errors_map_onto_taxonomy() {
        let parse = FluidError::CompositionParse {
            token: "CO2".into(),
            reason: "expected name[fraction]",
        };
        assert!(matches!(DecomError::from(parse), DecomError::Composition(_)));

        let unavailable = FluidError::BackendUnavailable {
            backend: "REFPROP".into(),
            reason: "not installed".into(),
        };
        assert!(matches!(
            DecomError::from(unavailable),
            DecomError::BackendUnavailable(_)
        ));

        let nonphys = FluidError::NonPhysical { what: "density" };
        assert!(matches!(DecomError::from(nonphys), DecomError::Backend { .. }));
    }

    #[test]
    fn input_error_message() {
        assert_eq!(DecomError::Input.to_string(), "Input file error");
    }
}
