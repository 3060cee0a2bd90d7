//! CO2/O2 mixture through the Peng–Robinson phase-mixing backend.

use dw_core::units::{k, pa};
use dw_decom::{InputConfig, ProblemDefinition, TerminationReason, WaveSpeed};
use dw_fluids::{BackendOption, EosFamily};

const FLUID: &str = "CO2[0.9667]&O2[0.0333]";

fn input(eos: EosFamily) -> InputConfig {
    let mut input = InputConfig::new(273.15 + 35.09, 145.61e5, eos, FLUID);
    input.pressure_step = 2.0e5;
    input.extrapolate = true;
    input
}

#[test]
fn mixture_path_is_strictly_decreasing() {
    let problem = ProblemDefinition::from_input(&input(EosFamily::PengRobinson)).unwrap();
    let sum: f64 = problem.composition.fractions().iter().sum();
    assert!((sum - 1.0).abs() < 1e-12);

    let mut ws = WaveSpeed::new(problem).unwrap();
    let reason = ws.run().unwrap();
    let path = ws.path().unwrap();
    assert!(!path.is_empty());
    for pair in path.points().windows(2) {
        assert!(((pair[0].p - pair[1].p) - 2.0e5).abs() < 1e-6);
        assert!(pair[1].t < pair[0].t);
    }
    for point in path {
        assert!((0.0..=1.0).contains(&point.q));
        assert!(point.rho > 0.0);
    }

    assert_eq!(reason, TerminationReason::NonPositiveWaveSpeed);
    let last = path.last().unwrap();
    assert_eq!(last.w, 0.0);
    assert_eq!(last.u, last.c);
}

#[test]
fn mixture_run_ends_inside_the_dome() {
    let mut ws =
        WaveSpeed::new(ProblemDefinition::from_input(&input(EosFamily::PengRobinson)).unwrap())
            .unwrap();
    assert_eq!(ws.run().unwrap(), TerminationReason::NonPositiveWaveSpeed);
    assert_eq!(ws.max_steps(), 72);

    let path = ws.path().unwrap();
    assert_eq!(path.len(), 52);
    let last = path.last().unwrap();
    assert!((last.p - 4.361e6).abs() < 1e-6, "P = {}", last.p);
    assert!((last.t - 277.05).abs() < 0.1, "T = {}", last.t);
    assert!(last.q > 0.0 && last.q < 1.0, "Q = {}", last.q);
}

#[test]
fn mixture_points_stay_on_isentrope() {
    let mut ws =
        WaveSpeed::new(ProblemDefinition::from_input(&input(EosFamily::PengRobinson)).unwrap())
            .unwrap();
    ws.run().unwrap();
    let s0 = ws.s0();
    let backend = ws.backend();
    for point in ws.path().unwrap() {
        let s = backend.entropy(pa(point.p), k(point.t)).unwrap();
        assert!(
            (s - s0).abs() <= 1e-6 * s0.abs().max(1.0),
            "s = {s}, s0 = {s0} at P = {}",
            point.p
        );
    }
}

#[test]
fn dense_phase_start_is_liquid_like() {
    let mut ws =
        WaveSpeed::new(ProblemDefinition::from_input(&input(EosFamily::PengRobinson)).unwrap())
            .unwrap();
    ws.run().unwrap();
    let first = ws.path().unwrap().points()[0];
    assert_eq!(first.u, 0.0);
    assert_eq!(first.q, 0.0);
    assert!((first.t - (273.15 + 35.09)).abs() < 1e-5);
    assert!(first.c > 200.0 && first.c < 1000.0, "C = {}", first.c);
}

#[test]
fn refprop_cubic_option_matches_built_in_cubic() {
    let mut refprop = input(EosFamily::Refprop);
    refprop.backend_option = Some(BackendOption::PengRobinson);

    let mut a = WaveSpeed::new(ProblemDefinition::from_input(&refprop).unwrap()).unwrap();
    let mut b =
        WaveSpeed::new(ProblemDefinition::from_input(&input(EosFamily::PengRobinson)).unwrap())
            .unwrap();
    assert_eq!(a.run().unwrap(), b.run().unwrap());
    assert_eq!(a.path().unwrap(), b.path().unwrap());
    assert_eq!(a.summary().unwrap().eos, EosFamily::Refprop);
}
