//! dw-fluids: equation-of-state backends for isentropic decompression.
//!
//! Provides:
//! - Composition handling (pure fluids and `A[x]&B[y]` mixtures)
//! - Species data for the built-in models
//! - `PropertyBackend` trait: entropy, enthalpy, density, temperature and
//!   quality along an isentrope
//! - Backends: CoolProp direct lookup, Peng–Robinson phase mixing, perfect gas,
//!   and an unavailable placeholder
//!
//! # Architecture
//!
//! Callers pick a backend once with [`build_backend`] and then talk to it only
//! through the `PropertyBackend` trait. CoolProp (via `rfluids`) is behind the
//! default `coolprop` feature; without it the CoolProp families resolve to
//! [`UnavailableBackend`].
//!
//! # Example
//!
//! ```no_run
//! use dw_fluids::{Composition, EosFamily, build_backend};
//! use dw_core::units::{k, pa};
//!
//! let comp = Composition::parse("CO2[0.9667]&O2[0.0333]").unwrap();
//! let backend = build_backend(EosFamily::PengRobinson, None, &comp).unwrap();
//! let s0 = backend.entropy(pa(145.61e5), k(308.24)).unwrap();
//! let state = backend.isentropic_state(pa(100e5), s0, k(300.0)).unwrap();
//! println!("{}", state.summary());
//! ```

pub mod backend;
pub mod composition;
#[cfg(feature = "coolprop")]
pub mod coolprop;
pub mod cubic;
pub mod eos;
pub mod error;
pub mod flash;
pub mod ideal_gas;
pub mod phase_mixing;
pub mod species;
pub mod unavailable;

// Re-exports for ergonomics
pub use backend::{IsentropicState, PropertyBackend};
pub use composition::Composition;
#[cfg(feature = "coolprop")]
pub use coolprop::CoolPropBackend;
pub use cubic::PengRobinson;
pub use eos::{BackendOption, EosFamily, build_backend};
pub use error::{FluidError, FluidResult};
pub use flash::{FlashModel, FlashResult, PhaseKind, PhaseState};
pub use ideal_gas::PerfectGasBackend;
pub use phase_mixing::PhaseMixingBackend;
pub use species::Species;
pub use unavailable::UnavailableBackend;
