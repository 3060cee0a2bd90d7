//! Equation-of-state families and backend selection.

use crate::backend::PropertyBackend;
use crate::composition::Composition;
use crate::cubic::PengRobinson;
use crate::error::{FluidError, FluidResult};
use crate::ideal_gas::PerfectGasBackend;
use crate::phase_mixing::PhaseMixingBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported equation-of-state families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EosFamily {
    /// CoolProp Helmholtz-energy multiparameter models.
    #[serde(rename = "HEOS")]
    Heos,
    /// REFPROP through CoolProp.
    #[serde(rename = "REFPROP")]
    Refprop,
    /// Built-in Peng–Robinson cubic with phase-split weighted properties.
    #[serde(rename = "PR")]
    PengRobinson,
    /// Calorically perfect ideal gas.
    #[serde(rename = "IDEAL")]
    Ideal,
}

impl EosFamily {
    pub const ALL: [EosFamily; 4] = [
        EosFamily::Heos,
        EosFamily::Refprop,
        EosFamily::PengRobinson,
        EosFamily::Ideal,
    ];

    /// Identifier used in configuration files and as the CoolProp backend name.
    pub fn key(&self) -> &'static str {
        match self {
            EosFamily::Heos => "HEOS",
            EosFamily::Refprop => "REFPROP",
            EosFamily::PengRobinson => "PR",
            EosFamily::Ideal => "IDEAL",
        }
    }
}

impl fmt::Display for EosFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EosFamily {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EosFamily::ALL
            .into_iter()
            .find(|family| family.key() == s)
            .ok_or_else(|| FluidError::NotSupported {
                what: format!("equation of state '{s}'"),
            })
    }
}

/// Backend-specific model variant (only meaningful for REFPROP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendOption {
    /// GERG-2008 multiparameter mixture model.
    #[serde(rename = "GERG")]
    Gerg,
    /// Peng–Robinson cubic.
    #[serde(rename = "PR")]
    PengRobinson,
}

impl BackendOption {
    pub const ALL: [BackendOption; 2] = [BackendOption::Gerg, BackendOption::PengRobinson];

    pub fn key(&self) -> &'static str {
        match self {
            BackendOption::Gerg => "GERG",
            BackendOption::PengRobinson => "PR",
        }
    }
}

impl FromStr for BackendOption {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendOption::ALL
            .into_iter()
            .find(|option| option.key() == s)
            .ok_or_else(|| FluidError::NotSupported {
                what: format!("backend option '{s}'"),
            })
    }
}

/// Build the property backend for a family/option pair.
///
/// The option is applied to this instance only, so runs with different options
/// can proceed concurrently.
///
/// - `HEOS`, `REFPROP`: CoolProp direct lookup.
/// - `REFPROP` + `GERG`: CoolProp's Helmholtz mixture model, whose mixture
///   departure functions are the GERG-2008 set.
/// - `PR`, `REFPROP` + `PR`: built-in Peng–Robinson with phase-split mixing.
/// - `IDEAL`: perfect gas.
pub fn build_backend(
    family: EosFamily,
    option: Option<BackendOption>,
    comp: &Composition,
) -> FluidResult<Box<dyn PropertyBackend>> {
    if option.is_some() && family != EosFamily::Refprop {
        tracing::warn!(%family, "backend option is only used with REFPROP; ignoring it");
    }

    let backend: Box<dyn PropertyBackend> = match (family, option) {
        (EosFamily::Refprop, Some(BackendOption::PengRobinson)) | (EosFamily::PengRobinson, _) => {
            Box::new(PhaseMixingBackend::new(PengRobinson::new(comp)?, family))
        }
        (EosFamily::Refprop, Some(BackendOption::Gerg)) => {
            tracing::info!(fluid = %comp, "REFPROP with GERG runs on CoolProp HEOS (GERG-2008 departure functions)");
            coolprop_backend(EosFamily::Heos, comp, Some(GERG_SUBSTITUTE_NAME))?
        }
        (EosFamily::Heos, _) | (EosFamily::Refprop, None) => coolprop_backend(family, comp, None)?,
        (EosFamily::Ideal, _) => Box::new(PerfectGasBackend::new(comp)?),
    };

    tracing::debug!(backend = backend.name(), %family, fluid = %comp, "selected property backend");
    Ok(backend)
}

/// Backend name reported when `REFPROP` + `GERG` is served by CoolProp HEOS.
pub const GERG_SUBSTITUTE_NAME: &str = "CoolProp HEOS (GERG-2008, requested REFPROP)";

#[cfg(feature = "coolprop")]
fn coolprop_backend(
    family: EosFamily,
    comp: &Composition,
    name: Option<&str>,
) -> FluidResult<Box<dyn PropertyBackend>> {
    let backend = crate::coolprop::CoolPropBackend::new(family, comp)?;
    Ok(Box::new(match name {
        Some(name) => backend.with_name(name),
        None => backend,
    }))
}

#[cfg(not(feature = "coolprop"))]
fn coolprop_backend(
    family: EosFamily,
    _comp: &Composition,
    _name: Option<&str>,
) -> FluidResult<Box<dyn PropertyBackend>> {
    Ok(Box::new(crate::unavailable::UnavailableBackend::new(
        family,
        "built without the `coolprop` feature",
    )))
}
