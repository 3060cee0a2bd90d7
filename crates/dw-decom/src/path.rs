//! Accepted points along the isentrope and why stepping stopped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One accepted point of the isentropic path (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Pressure [Pa]
    pub p: f64,
    /// Temperature [K]
    pub t: f64,
    /// Entropy [J/(kg·K)], equal to the initial entropy
    pub s: f64,
    /// Enthalpy [J/kg]
    pub h: f64,
    /// Density [kg/m³]
    pub rho: f64,
    /// Vapor quality [-]
    pub q: f64,
    /// Speed of sound [m/s]
    pub c: f64,
    /// Cumulative outflow velocity [m/s]
    pub u: f64,
    /// Decompression wave speed `c − u` [m/s]
    pub w: f64,
}

/// Why a run stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Every step up to ⌊P0/ΔP⌋ was accepted.
    ExhaustedSteps,
    /// The next pressure was at or below the break pressure.
    BelowBreakPressure,
    /// The wave speed dropped to zero or below.
    NonPositiveWaveSpeed,
    /// A property evaluation or the sound speed probe failed.
    BackendFailure,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TerminationReason::ExhaustedSteps => "step budget exhausted",
            TerminationReason::BelowBreakPressure => "break pressure reached",
            TerminationReason::NonPositiveWaveSpeed => "wave speed reached zero",
            TerminationReason::BackendFailure => "property backend failed",
        };
        f.write_str(text)
    }
}

/// Ordered path, strictly decreasing in pressure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, point: PathPoint) {
        debug_assert!(
            self.points.last().is_none_or(|last| point.p < last.p),
            "path pressures must decrease"
        );
        self.points.push(point);
    }

    /// Force the last point onto the stopping boundary (`W = 0`, `U = C`).
    ///
    /// Returns `false` when there is no point to correct.
    pub(crate) fn close_at_boundary(&mut self) -> bool {
        match self.points.last_mut() {
            Some(last) => {
                last.w = 0.0;
                last.u = last.c;
                true
            }
            None => false,
        }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathPoint;
    type IntoIter = std::slice::Iter<'a, PathPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(p: f64, c: f64, u: f64) -> PathPoint {
        PathPoint {
            p,
            t: 300.0,
            s: 0.0,
            h: 0.0,
            rho: 1.0,
            q: 0.0,
            c,
            u,
            w: c - u,
        }
    }

    #[test]
    fn boundary_correction_touches_only_last_point() {
        let mut path = Path::new();
        path.push(point(2.0e5, 300.0, 10.0));
        path.push(point(1.0e5, 250.0, 40.0));
        assert!(path.close_at_boundary());

        let last = path.last().unwrap();
        assert_eq!(last.w, 0.0);
        assert_eq!(last.u, last.c);
        assert_eq!(path.points()[0].w, 290.0);
    }

    #[test]
    fn boundary_correction_on_empty_path_is_noop() {
        let mut path = Path::new();
        assert!(!path.close_at_boundary());
        assert!(path.is_empty());
    }
}
