//! dw-core: shared foundation for the decompression wave speed workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (tolerances + float helpers used by the solvers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
