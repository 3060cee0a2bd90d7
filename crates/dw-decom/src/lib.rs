//! dw-decom: decompression wave speed along an isentrope.
//!
//! A run starts from a [`ProblemDefinition`] (initial state, fluid, equation
//! of state and stepping parameters), fixes the isentrope through the initial
//! state and steps pressure down until the wave speed vanishes or the break
//! pressure is reached. The completed path is available as a [`Path`], a
//! [`ResultTable`] and a [`RunSummary`].
//!
//! # Example
//!
//! ```no_run
//! use dw_decom::{InputConfig, ProblemDefinition, WaveSpeed};
//! use dw_fluids::EosFamily;
//!
//! let input = InputConfig::new(308.24, 145.61e5, EosFamily::Heos, "CO2");
//! let mut ws = WaveSpeed::new(ProblemDefinition::from_input(&input).unwrap()).unwrap();
//! let reason = ws.run().unwrap();
//! println!("{reason}: {}", ws.summary().unwrap());
//! ```

pub mod batch;
pub mod error;
pub mod input;
pub mod integrator;
pub mod path;
pub mod problem;
pub mod results;
pub mod sound;

pub use batch::{RunOutcome, run_batch, run_one};
pub use error::{DecomError, DecomResult, SoundSpeedError};
pub use input::{
    FieldDiagnostic, InputConfig, Validation, load_config_file, parse_config, validate_config,
};
pub use integrator::{Carry, RunState, StepContext, StepOutcome, WaveSpeed, step};
pub use path::{Path, PathPoint, TerminationReason};
pub use problem::ProblemDefinition;
pub use results::{DEFAULT_RESULT_FILE, ResultTable, RunSummary};
pub use sound::speed_of_sound;
