//! Peng–Robinson phase-mixing backend against known CO2 behavior.

use dw_core::units::{k, pa};
use dw_fluids::{Composition, EosFamily, FlashModel, FlashResult, PengRobinson, build_backend};

fn co2_o2() -> Composition {
    Composition::parse("CO2[0.9667]&O2[0.0333]").unwrap()
}

#[test]
fn initial_state_is_recovered_from_entropy() {
    let backend = build_backend(EosFamily::PengRobinson, None, &co2_o2()).unwrap();
    let p0 = pa(145.61e5);
    let s0 = backend.entropy(p0, k(308.24)).unwrap();
    let state = backend.isentropic_state(p0, s0, k(308.24)).unwrap();

    assert!((state.t.value - 308.24).abs() < 1e-5, "T = {}", state.t.value);
    assert_eq!(state.q, 0.0);
    assert!(state.rho.value > 500.0 && state.rho.value < 1000.0);
}

#[test]
fn isentrope_cools_and_thins_with_falling_pressure() {
    let backend = build_backend(EosFamily::PengRobinson, None, &co2_o2()).unwrap();
    let s0 = backend.entropy(pa(145.61e5), k(308.24)).unwrap();

    let mut t_guess = k(308.24);
    let mut previous = backend.isentropic_state(pa(145.61e5), s0, t_guess).unwrap();
    for p in [135.0e5, 125.0e5, 115.0e5] {
        let state = backend.isentropic_state(pa(p), s0, t_guess).unwrap();
        assert!(state.t.value < previous.t.value);
        assert!(state.rho.value < previous.rho.value);
        t_guess = state.t;
        previous = state;
    }
}

#[test]
fn oxygen_rich_mixture_splits_into_two_phases() {
    let comp = Composition::parse("CO2[0.7]&O2[0.3]").unwrap();
    let pr = PengRobinson::new(&comp).unwrap();
    match pr.flash_pt(40.0e5, 250.0).unwrap() {
        FlashResult::TwoPhase { beta, x, y } => {
            assert!(beta > 0.0 && beta < 1.0);
            // Oxygen is the light component
            assert!(y[1] > x[1]);
        }
        other => panic!("expected two phases, got {other:?}"),
    }
}

#[test]
fn cubic_option_on_refprop_keeps_family() {
    let backend = build_backend(
        EosFamily::Refprop,
        Some(dw_fluids::BackendOption::PengRobinson),
        &co2_o2(),
    )
    .unwrap();
    assert_eq!(backend.family(), EosFamily::Refprop);
    let s = backend.entropy(pa(50.0e5), k(300.0)).unwrap();
    assert!(s.is_finite());
}
