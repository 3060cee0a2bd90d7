//! Isentropic path integrator.
//!
//! Marches pressure down from the initial state in fixed steps, evaluating the
//! fluid on the initial isentrope, and integrates the outflow velocity with an
//! explicit Euler rule `dU = dP / (C·ρ)` using the current step's C and ρ.
//! Stepping stops at the first point whose wave speed `W = C − U` is not
//! positive or whose pressure is at or below the break pressure.

use crate::error::{DecomError, DecomResult};
use crate::path::{Path, PathPoint, TerminationReason};
use crate::problem::ProblemDefinition;
use crate::sound::speed_of_sound;
use dw_core::numeric::step_count;
use dw_core::units::{Pressure, SpecEntropy, Temperature, k, pa};
use dw_fluids::{PropertyBackend, build_backend};

/// Offset subtracted from the previous temperature to seed the next solve,
/// biasing iterative backends toward the cooling direction.
pub const WARM_START_OFFSET_K: f64 = 0.1;

/// Lifecycle of a [`WaveSpeed`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

/// Fixed inputs shared by every step of a run.
pub struct StepContext<'a> {
    pub backend: &'a dyn PropertyBackend,
    pub s0: SpecEntropy,
    pub pressure_break: Pressure,
    pub probe_delta: Pressure,
}

/// Values carried from one accepted step into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carry {
    /// Temperature seed for the next solve
    pub t_guess: Temperature,
    /// Pressure of the previous accepted step (P0 before the first step)
    pub p_prev: Pressure,
    /// Cumulative outflow velocity so far [m/s]
    pub u_prev: f64,
}

impl Carry {
    pub fn initial(problem: &ProblemDefinition) -> Self {
        Self {
            t_guess: problem.t0,
            p_prev: problem.p0,
            u_prev: 0.0,
        }
    }
}

/// Result of evaluating one candidate pressure.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Accepted { point: PathPoint, carry: Carry },
    Stop(TerminationReason),
}

/// Evaluate the path at `p_new`. Pure apart from backend calls and logging.
pub fn step(ctx: &StepContext<'_>, p_new: Pressure, carry: Carry) -> StepOutcome {
    let state = match ctx.backend.isentropic_state(p_new, ctx.s0, carry.t_guess) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(p = p_new.value, error = %e, "isentropic state failed; stopping");
            return StepOutcome::Stop(TerminationReason::BackendFailure);
        }
    };

    let c = match speed_of_sound(ctx.backend, ctx.s0, p_new, state.t, ctx.probe_delta) {
        Ok(c) => c.value,
        Err(e) => {
            tracing::warn!(p = p_new.value, error = %e, "speed of sound failed; stopping");
            return StepOutcome::Stop(TerminationReason::BackendFailure);
        }
    };
    if let Some(hint) = ctx.backend.sound_speed_hint(p_new, ctx.s0, state.t) {
        tracing::trace!(c, analytic = hint.value, "sound speed check");
    }

    let rho = state.rho.value;
    let u = carry.u_prev + (carry.p_prev.value - p_new.value) / (c * rho);
    let w = c - u;

    if !(w > 0.0) {
        return StepOutcome::Stop(TerminationReason::NonPositiveWaveSpeed);
    }
    if p_new.value <= ctx.pressure_break.value {
        return StepOutcome::Stop(TerminationReason::BelowBreakPressure);
    }

    let point = PathPoint {
        p: p_new.value,
        t: state.t.value,
        s: ctx.s0,
        h: state.h,
        rho,
        q: state.q,
        c,
        u,
        w,
    };
    let carry = Carry {
        t_guess: k(state.t.value - WARM_START_OFFSET_K),
        p_prev: p_new,
        u_prev: u,
    };
    StepOutcome::Accepted { point, carry }
}

/// Decompression wave speed calculation for one problem.
///
/// Construction selects the backend and fixes the isentrope; [`WaveSpeed::run`]
/// may be called once.
pub struct WaveSpeed {
    pub(crate) problem: ProblemDefinition,
    pub(crate) backend: Box<dyn PropertyBackend>,
    pub(crate) s0: SpecEntropy,
    pub(crate) max_steps: usize,
    pub(crate) path: Path,
    pub(crate) state: RunState,
    pub(crate) termination: Option<TerminationReason>,
}

impl WaveSpeed {
    /// Build the backend for `problem` and compute the initial entropy.
    pub fn new(problem: ProblemDefinition) -> DecomResult<Self> {
        let backend = build_backend(problem.eos, problem.backend_option, &problem.composition)?;
        Self::with_backend(problem, backend)
    }

    /// Use a caller-supplied backend instead of the one `problem.eos` selects.
    pub fn with_backend(
        problem: ProblemDefinition,
        backend: Box<dyn PropertyBackend>,
    ) -> DecomResult<Self> {
        let max_steps = step_count(problem.p0.value, problem.pressure_step.value)
            .map_err(|_| DecomError::Input)?;
        let s0 = backend.entropy(problem.p0, problem.t0)?;
        tracing::debug!(
            backend = backend.name(),
            fluid = %problem.composition,
            s0,
            max_steps,
            "isentrope fixed"
        );
        Ok(Self {
            problem,
            backend,
            s0,
            max_steps,
            path: Path::new(),
            state: RunState::NotStarted,
            termination: None,
        })
    }

    /// Step down the isentrope until a stopping condition is met.
    pub fn run(&mut self) -> DecomResult<TerminationReason> {
        if self.state != RunState::NotStarted {
            return Err(DecomError::AlreadyRun);
        }
        self.state = RunState::Running;

        let ctx = StepContext {
            backend: self.backend.as_ref(),
            s0: self.s0,
            pressure_break: self.problem.pressure_break,
            probe_delta: self.problem.probe_delta,
        };
        let p0 = self.problem.p0.value;
        let dp = self.problem.pressure_step.value;

        let mut carry = Carry::initial(&self.problem);
        let mut reason = TerminationReason::ExhaustedSteps;
        for i in 0..self.max_steps {
            let p_new = pa(p0 - i as f64 * dp);
            match step(&ctx, p_new, carry) {
                StepOutcome::Accepted { point, carry: next } => {
                    tracing::debug!(
                        i,
                        p = point.p,
                        t = point.t,
                        c = point.c,
                        w = point.w,
                        "step accepted"
                    );
                    self.path.push(point);
                    carry = next;
                }
                StepOutcome::Stop(stop) => {
                    reason = stop;
                    let boundary_stop = matches!(
                        stop,
                        TerminationReason::NonPositiveWaveSpeed
                            | TerminationReason::BelowBreakPressure
                    );
                    if boundary_stop && self.problem.extrapolate {
                        if self.path.close_at_boundary() {
                            tracing::debug!(points = self.path.len(), "last point closed at W = 0");
                        } else {
                            tracing::debug!("first step rejected; nothing to extrapolate");
                        }
                    }
                    break;
                }
            }
        }

        self.state = RunState::Completed;
        self.termination = Some(reason);
        tracing::info!(
            %reason,
            points = self.path.len(),
            max_steps = self.max_steps,
            "decompression run completed"
        );
        Ok(reason)
    }

    /// True once [`run`](Self::run) has completed.
    pub fn is_run(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The finalized path, available after completion.
    pub fn path(&self) -> Option<&Path> {
        self.is_run().then_some(&self.path)
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Entropy of the initial state [J/(kg·K)].
    pub fn s0(&self) -> SpecEntropy {
        self.s0
    }

    /// ⌊P0/ΔP⌋, the upper bound on the path length.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn problem(&self) -> &ProblemDefinition {
        &self.problem
    }

    pub fn backend(&self) -> &dyn PropertyBackend {
        self.backend.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputConfig;
    use dw_fluids::{EosFamily, PerfectGasBackend};

    fn air_problem(p0: f64) -> ProblemDefinition {
        ProblemDefinition::from_input(&InputConfig::new(300.0, p0, EosFamily::Ideal, "N2")).unwrap()
    }

    fn air() -> Box<dyn PropertyBackend> {
        Box::new(PerfectGasBackend::from_constants(287.0, 1004.5).unwrap())
    }

    #[test]
    fn first_step_has_zero_outflow() {
        let gas = PerfectGasBackend::from_constants(287.0, 1004.5).unwrap();
        let problem = air_problem(1.0e7);
        let s0 = gas.entropy(problem.p0, problem.t0).unwrap();
        let ctx = StepContext {
            backend: &gas,
            s0,
            pressure_break: problem.pressure_break,
            probe_delta: problem.probe_delta,
        };

        let StepOutcome::Accepted { point, carry } = step(&ctx, problem.p0, Carry::initial(&problem))
        else {
            panic!("first step should be accepted");
        };
        assert_eq!(point.u, 0.0);
        assert_eq!(point.w, point.c);
        assert!((point.t - 300.0).abs() < 1e-9);
        assert!((carry.t_guess.value - (300.0 - WARM_START_OFFSET_K)).abs() < 1e-9);
        assert_eq!(carry.p_prev, problem.p0);
    }

    #[test]
    fn outflow_accumulates_with_previous_pressure() {
        let gas = PerfectGasBackend::from_constants(287.0, 1004.5).unwrap();
        let problem = air_problem(1.0e7);
        let s0 = gas.entropy(problem.p0, problem.t0).unwrap();
        let ctx = StepContext {
            backend: &gas,
            s0,
            pressure_break: problem.pressure_break,
            probe_delta: problem.probe_delta,
        };
        let carry = Carry {
            t_guess: k(299.0),
            p_prev: pa(1.0e7),
            u_prev: 5.0,
        };
        let StepOutcome::Accepted { point, .. } = step(&ctx, pa(9.9e6), carry) else {
            panic!("step should be accepted");
        };
        let expected = 5.0 + 1.0e5 / (point.c * point.rho);
        assert!((point.u - expected).abs() < 1e-9);
        assert!((point.w - (point.c - point.u)).abs() < 1e-12);
    }

    #[test]
    fn break_pressure_stops_stepping() {
        let gas = PerfectGasBackend::from_constants(287.0, 1004.5).unwrap();
        let problem = air_problem(1.0e7);
        let s0 = gas.entropy(problem.p0, problem.t0).unwrap();
        let ctx = StepContext {
            backend: &gas,
            s0,
            pressure_break: pa(1.0e7),
            probe_delta: problem.probe_delta,
        };
        assert_eq!(
            step(&ctx, problem.p0, Carry::initial(&problem)),
            StepOutcome::Stop(TerminationReason::BelowBreakPressure)
        );
    }

    #[test]
    fn run_is_single_shot() {
        let mut ws = WaveSpeed::with_backend(air_problem(5.0e5), air()).unwrap();
        assert_eq!(ws.state(), RunState::NotStarted);
        assert!(!ws.is_run());
        assert!(ws.path().is_none());

        ws.run().unwrap();
        assert!(ws.is_run());
        assert!(matches!(ws.run(), Err(DecomError::AlreadyRun)));
    }

    #[test]
    fn extrapolation_closes_last_point_on_break_stop() {
        let mut input = InputConfig::new(300.0, 1.0e6, EosFamily::Ideal, "N2");
        input.pressure_break = 8.0e5;
        input.extrapolate = true;
        let problem = ProblemDefinition::from_input(&input).unwrap();
        let mut ws = WaveSpeed::with_backend(problem, air()).unwrap();

        assert_eq!(ws.run().unwrap(), TerminationReason::BelowBreakPressure);
        let path = ws.path().unwrap();
        assert_eq!(path.len(), 2);
        assert!(path.points()[0].w > 0.0);
        let last = path.last().unwrap();
        assert_eq!(last.p, 9.0e5);
        assert_eq!(last.w, 0.0);
        assert_eq!(last.u, last.c);
    }

    #[test]
    fn pressure_below_step_gives_empty_path() {
        let mut ws = WaveSpeed::with_backend(air_problem(0.5e5), air()).unwrap();
        assert_eq!(ws.max_steps(), 0);
        assert_eq!(ws.run().unwrap(), TerminationReason::ExhaustedSteps);
        assert!(ws.path().unwrap().is_empty());
    }
}
