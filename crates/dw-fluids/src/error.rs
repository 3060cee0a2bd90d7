//! Fluid property errors.

use dw_core::CoreError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while parsing compositions or evaluating properties.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Malformed mixture specifier.
    #[error("Cannot parse composition token '{token}': {reason}")]
    CompositionParse { token: String, reason: &'static str },

    /// The requested equation-of-state family cannot be used in this environment.
    #[error("Backend {backend} is unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// Operation not supported (e.g., unknown species for a built-in model).
    #[error("Not supported: {what}")]
    NotSupported { what: String },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Iterative solve did not converge within its iteration budget.
    #[error("Convergence failed for {what}")]
    ConvergenceFailed { what: &'static str },

    /// Error reported by an external property library.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, .. } => FluidError::NonPhysical { what },
            CoreError::NotPositive { what, .. } => FluidError::NonPhysical { what },
            CoreError::InvalidArg { what } => FluidError::InvalidArg { what },
        }
    }
}
