//! Fluid composition (pure or mixtures).

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use dw_core::numeric::{Tolerances, nearly_equal};
use std::fmt;

/// Fluid composition defined by normalized mole fractions.
///
/// The composition is always normalized (mole fractions sum to 1.0).
/// Species are kept as the identifiers given by the user so that CoolProp
/// backends receive them verbatim; built-in models resolve them through
/// [`Composition::species`].
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    items: Vec<(String, f64)>,
}

impl Composition {
    /// Create a pure-component composition.
    pub fn pure(name: impl Into<String>) -> Self {
        Self {
            items: vec![(name.into(), 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite and strictly positive,
    /// then normalizes to sum=1.
    pub fn new_mole_fractions(fractions: Vec<(String, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut sum = 0.0;
        for (name, frac) in &fractions {
            if name.trim().is_empty() {
                return Err(FluidError::CompositionParse {
                    token: name.clone(),
                    reason: "empty species name",
                });
            }
            if !frac.is_finite() || *frac <= 0.0 {
                return Err(FluidError::CompositionParse {
                    token: format!("{name}[{frac}]"),
                    reason: "mole fraction must be positive and finite",
                });
            }
            sum += frac;
        }

        let items = fractions
            .into_iter()
            .map(|(name, f)| (name.trim().to_string(), f / sum))
            .collect();

        Ok(Self { items })
    }

    /// Parse a fluid specifier.
    ///
    /// Either a bare species name (`"CO2"`) or `&`-joined `name[fraction]`
    /// tokens (`"CO2[0.9667]&O2[0.0333]"`). Fractions need not sum to one.
    pub fn parse(spec: &str) -> FluidResult<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(FluidError::CompositionParse {
                token: String::new(),
                reason: "empty fluid specifier",
            });
        }

        if !spec.contains('&') && !spec.contains('[') {
            return Ok(Self::pure(spec));
        }

        let mut fractions = Vec::new();
        for token in spec.split('&') {
            let cleaned = token.replace('[', " ").replace(']', "");
            let parts: Vec<&str> = cleaned.split_whitespace().collect();
            let [name, frac] = parts.as_slice() else {
                return Err(FluidError::CompositionParse {
                    token: token.to_string(),
                    reason: "expected exactly a name and a fraction",
                });
            };
            let frac: f64 = frac.parse().map_err(|_| FluidError::CompositionParse {
                token: token.to_string(),
                reason: "mole fraction is not a number",
            })?;
            fractions.push((name.to_string(), frac));
        }

        Self::new_mole_fractions(fractions)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if this is a pure-component composition.
    ///
    /// Returns the species identifier if exactly one component has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<&str> {
        if self.items.len() == 1 {
            let (name, frac) = &self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(*frac, 1.0, tol) {
                return Some(name);
            }
        }
        None
    }

    /// Iterate over components and their mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.items.iter().map(|(name, f)| (name.as_str(), *f))
    }

    /// Mole fractions in component order.
    pub fn fractions(&self) -> Vec<f64> {
        self.items.iter().map(|(_, f)| *f).collect()
    }

    /// Get mole fraction of a component (0.0 if not present).
    pub fn mole_fraction(&self, name: &str) -> f64 {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Component names joined the way CoolProp expects (`"CO2&O2"`).
    pub fn coolprop_names(&self) -> String {
        self.items
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Resolve every component to a built-in [`Species`].
    pub fn species(&self) -> FluidResult<Vec<(Species, f64)>> {
        self.items
            .iter()
            .map(|(name, frac)| {
                name.parse::<Species>()
                    .map(|species| (species, *frac))
                    .map_err(|_| FluidError::NotSupported {
                        what: format!("species '{name}' has no built-in property data"),
                    })
            })
            .collect()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.is_pure() {
            return write!(f, "{name}");
        }
        let tokens: Vec<String> = self
            .items
            .iter()
            .map(|(name, frac)| format!("{name}[{frac}]"))
            .collect();
        write!(f, "{}", tokens.join("&"))
    }
}
