use crate::CoreError;

/// Floating point type used throughout the workspace.
pub type Real = f64;

/// Absolute + relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::NotPositive { what, value: v })
    }
}

/// Clamp a phase fraction into `[0, 1]`.
///
/// Backends report small excursions outside the unit interval near phase
/// boundaries, and CoolProp uses -1 for single-phase states.
pub fn clamp_unit_interval(v: Real) -> Real {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// Number of whole steps of size `step` that fit in `span` (⌊span/step⌋).
///
/// Returns 0 when `span < step`.
pub fn step_count(span: Real, step: Real) -> Result<usize, CoreError> {
    ensure_positive(step, "step")?;
    let span = ensure_finite(span, "span")?;
    if span < step {
        return Ok(0);
    }
    Ok((span / step).floor() as usize)
}
