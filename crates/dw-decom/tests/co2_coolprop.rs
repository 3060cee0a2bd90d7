//! Pure CO2 with the CoolProp Helmholtz backend, pinned to reference values.
//!
//! Relative tolerance allows for small differences between CoolProp releases.

#![cfg(feature = "coolprop")]

use dw_core::units::{k, pa};
use dw_decom::{InputConfig, ProblemDefinition, TerminationReason, WaveSpeed};
use dw_fluids::{BackendOption, EosFamily};

const T0: f64 = 273.15 + 35.09;
const P0: f64 = 145.61e5;

fn close(actual: f64, expected: f64) -> bool {
    ((actual - expected) / expected).abs() < 1e-4
}

fn run(input: &InputConfig) -> WaveSpeed {
    let mut ws = WaveSpeed::new(ProblemDefinition::from_input(input).unwrap()).unwrap();
    ws.run().unwrap();
    ws
}

#[test]
fn pure_run() {
    let ws = run(&InputConfig::new(T0, P0, EosFamily::Heos, "CO2"));
    let path = ws.path().unwrap();
    let last = path.last().unwrap();

    assert!(close(last.t, 278.0666028440005), "T = {}", last.t);
    assert!(close(last.p, 3961000.0), "P = {}", last.p);
    assert!(close(last.rho, 362.33658068836274), "rho = {}", last.rho);
    assert!(last.w > 0.0);
    assert!(last.p > 1.0e5);
    assert_ne!(ws.termination(), Some(TerminationReason::ExhaustedSteps));
    assert!(ws.summary().unwrap().is_truncated());
}

#[test]
fn pure_run_extrapolated_to_break_pressure() {
    let mut input = InputConfig::new(T0, P0, EosFamily::Heos, "CO2");
    input.extrapolate = true;
    input.pressure_break = 45e5;
    let ws = run(&input);
    let last = ws.path().unwrap().last().unwrap();

    assert!(close(last.t, 283.67432227384006), "T = {}", last.t);
    assert!(close(last.p, 4561000.0), "P = {}", last.p);
    assert!(close(last.rho, 454.99417292135354), "rho = {}", last.rho);
    assert_eq!(last.w, 0.0);
    assert_eq!(last.u, last.c);
    assert_eq!(ws.termination(), Some(TerminationReason::BelowBreakPressure));
}

#[test]
fn dense_phase_points_stay_on_isentrope() {
    let ws = run(&InputConfig::new(T0, P0, EosFamily::Heos, "CO2"));
    let backend = ws.backend();
    // PT lookups are ambiguous on the saturation line, so check the dense phase only.
    for point in ws.path().unwrap().iter().filter(|p| p.p > 80.0e5) {
        let s = backend.entropy(pa(point.p), k(point.t)).unwrap();
        assert!(
            ((s - ws.s0()) / ws.s0()).abs() < 1e-6,
            "s = {s} at P = {}",
            point.p
        );
    }
}

#[test]
fn gerg_option_is_visible_in_summary() {
    let mut input = InputConfig::new(T0, P0, EosFamily::Refprop, "CO2");
    input.backend_option = Some(BackendOption::Gerg);
    input.pressure_break = 100.0e5;
    let summary = run(&input).summary().unwrap();
    assert_eq!(summary.eos, EosFamily::Refprop);
    assert!(summary.backend.contains("GERG"), "backend = {}", summary.backend);
}

#[test]
fn csv_export_matches_path() {
    let ws = run(&InputConfig::new(T0, P0, EosFamily::Heos, "CO2"));
    let table = ws.result_table().unwrap();
    assert_eq!(table.len(), ws.path().unwrap().len());
    let csv = table.to_csv();
    assert_eq!(csv.lines().count(), table.len() + 1);
    assert!(csv.starts_with("Pressure (Pa),Temperature (K)"));
}
