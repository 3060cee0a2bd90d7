//! Run configuration: typed form, file loading and validation.
//!
//! A configuration is a mapping with the keys below. Validation reports every
//! problem it finds as a [`FieldDiagnostic`]; callers that only need a yes/no
//! answer use [`Validation::ok`].
//!
//! | key | type | required | default |
//! |---|---|---|---|
//! | `temperature` | number (K) | yes | |
//! | `pressure` | number (Pa) | yes | |
//! | `eos` | `HEOS` / `REFPROP` / `PR` / `IDEAL` | yes | |
//! | `fluid` | composition string | yes | |
//! | `extrapolate` | bool | no | `false` |
//! | `pressure_step` | number (Pa) | no | `1e5` |
//! | `pressure_break` | number (Pa) | no | `1e5` |
//! | `backend_option` (alias `refprop_option`) | `GERG` / `PR` | no | |
//! | `probe_delta` | number (Pa) | no | `10` |

use crate::error::{DecomError, DecomResult};
use dw_fluids::{BackendOption, EosFamily};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::path::Path;

pub const DEFAULT_PRESSURE_STEP: f64 = 1.0e5;
pub const DEFAULT_PRESSURE_BREAK: f64 = 1.0e5;
pub const DEFAULT_PROBE_DELTA: f64 = 10.0;

const KNOWN_KEYS: [&str; 10] = [
    "temperature",
    "pressure",
    "eos",
    "fluid",
    "extrapolate",
    "pressure_step",
    "pressure_break",
    "backend_option",
    "refprop_option",
    "probe_delta",
];

fn default_pressure_step() -> f64 {
    DEFAULT_PRESSURE_STEP
}

fn default_pressure_break() -> f64 {
    DEFAULT_PRESSURE_BREAK
}

fn default_probe_delta() -> f64 {
    DEFAULT_PROBE_DELTA
}

/// Deserialized run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Initial temperature [K]
    pub temperature: f64,
    /// Initial pressure [Pa]
    pub pressure: f64,
    pub eos: EosFamily,
    /// Composition string, e.g. `CO2` or `CO2[0.9667]&O2[0.0333]`
    pub fluid: String,
    #[serde(default)]
    pub extrapolate: bool,
    #[serde(default = "default_pressure_step")]
    pub pressure_step: f64,
    #[serde(default = "default_pressure_break")]
    pub pressure_break: f64,
    #[serde(default, alias = "refprop_option", skip_serializing_if = "Option::is_none")]
    pub backend_option: Option<BackendOption>,
    #[serde(default = "default_probe_delta")]
    pub probe_delta: f64,
}

impl InputConfig {
    /// Configuration with the required keys and defaults for the rest.
    pub fn new(temperature: f64, pressure: f64, eos: EosFamily, fluid: impl Into<String>) -> Self {
        Self {
            temperature,
            pressure,
            eos,
            fluid: fluid.into(),
            extrapolate: false,
            pressure_step: DEFAULT_PRESSURE_STEP,
            pressure_break: DEFAULT_PRESSURE_BREAK,
            backend_option: None,
            probe_delta: DEFAULT_PROBE_DELTA,
        }
    }

    /// Mapping form, as accepted by [`validate_config`].
    pub fn to_value(&self) -> DecomResult<Value> {
        Ok(serde_yaml::to_value(self)?)
    }
}

/// One validation problem, attached to the offending key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    pub field: String,
    pub message: String,
}

impl FieldDiagnostic {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of [`validate_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub ok: bool,
    pub diagnostics: Vec<FieldDiagnostic>,
}

#[derive(Clone, Copy)]
enum Bound {
    Positive,
    NonNegative,
}

/// Check a configuration mapping against the schema.
pub fn validate_config(config: &Value) -> Validation {
    let mut diagnostics = Vec::new();

    let Some(map) = config.as_mapping() else {
        diagnostics.push(FieldDiagnostic::new("<root>", "configuration must be a mapping"));
        return Validation {
            ok: false,
            diagnostics,
        };
    };

    for key in map.keys() {
        match key.as_str() {
            Some(name) if KNOWN_KEYS.contains(&name) => {}
            Some(name) => diagnostics.push(FieldDiagnostic::new(name, "unknown field")),
            None => diagnostics.push(FieldDiagnostic::new(
                format!("{key:?}"),
                "field names must be strings",
            )),
        }
    }

    check_number(map, "temperature", true, Bound::Positive, &mut diagnostics);
    check_number(map, "pressure", true, Bound::Positive, &mut diagnostics);
    check_number(map, "pressure_step", false, Bound::Positive, &mut diagnostics);
    check_number(map, "pressure_break", false, Bound::NonNegative, &mut diagnostics);
    check_number(map, "probe_delta", false, Bound::Positive, &mut diagnostics);

    if let Some(value) = map.get("extrapolate") {
        if !value.is_bool() {
            diagnostics.push(FieldDiagnostic::new("extrapolate", "must be of boolean type"));
        }
    }

    if let Some(eos) = check_string(map, "eos", true, &mut diagnostics) {
        if eos.parse::<EosFamily>().is_err() {
            diagnostics.push(FieldDiagnostic::new(
                "eos",
                format!("unallowed value {eos}; expected one of {}", allowed(EosFamily::ALL.map(|e| e.key()))),
            ));
        }
    }

    if let Some(fluid) = check_string(map, "fluid", true, &mut diagnostics) {
        if fluid.trim().is_empty() {
            diagnostics.push(FieldDiagnostic::new("fluid", "must not be empty"));
        }
    }

    if map.contains_key("backend_option") && map.contains_key("refprop_option") {
        diagnostics.push(FieldDiagnostic::new(
            "refprop_option",
            "give either backend_option or refprop_option, not both",
        ));
    }
    for key in ["backend_option", "refprop_option"] {
        if let Some(option) = check_string(map, key, false, &mut diagnostics) {
            if option.parse::<BackendOption>().is_err() {
                diagnostics.push(FieldDiagnostic::new(
                    key,
                    format!(
                        "unallowed value {option}; expected one of {}",
                        allowed(BackendOption::ALL.map(|o| o.key()))
                    ),
                ));
            }
        }
    }

    Validation {
        ok: diagnostics.is_empty(),
        diagnostics,
    }
}

fn allowed<const N: usize>(keys: [&str; N]) -> String {
    keys.join(", ")
}

fn check_number(
    map: &serde_yaml::Mapping,
    key: &str,
    required: bool,
    bound: Bound,
    diagnostics: &mut Vec<FieldDiagnostic>,
) {
    let Some(value) = map.get(key) else {
        if required {
            diagnostics.push(FieldDiagnostic::new(key, "required field"));
        }
        return;
    };
    let Some(number) = value.as_f64() else {
        diagnostics.push(FieldDiagnostic::new(key, "must be of number type"));
        return;
    };
    let in_range = match bound {
        Bound::Positive => number > 0.0,
        Bound::NonNegative => number >= 0.0,
    };
    if !number.is_finite() || !in_range {
        let expectation = match bound {
            Bound::Positive => "must be positive and finite",
            Bound::NonNegative => "must be non-negative and finite",
        };
        diagnostics.push(FieldDiagnostic::new(key, format!("{expectation}, got {number}")));
    }
}

fn check_string<'a>(
    map: &'a serde_yaml::Mapping,
    key: &str,
    required: bool,
    diagnostics: &mut Vec<FieldDiagnostic>,
) -> Option<&'a str> {
    match map.get(key) {
        None => {
            if required {
                diagnostics.push(FieldDiagnostic::new(key, "required field"));
            }
            None
        }
        Some(value) => {
            let s = value.as_str();
            if s.is_none() {
                diagnostics.push(FieldDiagnostic::new(key, "must be of string type"));
            }
            s
        }
    }
}

/// Validate and deserialize a configuration mapping.
///
/// Diagnostics are logged; the caller only sees [`DecomError::Input`].
pub fn parse_config(config: &Value) -> DecomResult<InputConfig> {
    let validation = validate_config(config);
    if !validation.ok {
        for diagnostic in &validation.diagnostics {
            tracing::warn!(field = %diagnostic.field, "{}", diagnostic.message);
        }
        return Err(DecomError::Input);
    }
    serde_yaml::from_value(config.clone()).map_err(|e| {
        tracing::warn!(error = %e, "configuration passed validation but did not deserialize");
        DecomError::Input
    })
}

/// Load a configuration mapping from a YAML or JSON file.
///
/// Files ending in `.json` are read with `serde_json`; everything else as YAML.
pub fn load_config_file(path: &Path) -> DecomResult<Value> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Ok(serde_yaml::to_value(json)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn fields(validation: &Validation) -> Vec<&str> {
        validation
            .diagnostics
            .iter()
            .map(|d| d.field.as_str())
            .collect()
    }

    #[test]
    fn minimal_config_is_valid() {
        let config = yaml("temperature: 308.24\npressure: 14561000\neos: HEOS\nfluid: CO2\n");
        let validation = validate_config(&config);
        assert!(validation.ok, "{:?}", validation.diagnostics);

        let parsed = parse_config(&config).unwrap();
        assert_eq!(parsed.eos, EosFamily::Heos);
        assert_eq!(parsed.pressure_step, DEFAULT_PRESSURE_STEP);
        assert_eq!(parsed.pressure_break, DEFAULT_PRESSURE_BREAK);
        assert_eq!(parsed.probe_delta, DEFAULT_PROBE_DELTA);
        assert!(!parsed.extrapolate);
        assert_eq!(parsed.backend_option, None);
    }

    #[test]
    fn wrong_type_is_reported() {
        let config = yaml("temperature: a\npressure: 14561000\neos: REFPROP\nfluid: CO2\n");
        let validation = validate_config(&config);
        assert!(!validation.ok);
        assert_eq!(fields(&validation), vec!["temperature"]);
        assert!(matches!(parse_config(&config), Err(DecomError::Input)));
    }

    #[test]
    fn disallowed_eos_is_reported() {
        let config = yaml("temperature: 300\npressure: 1.0e7\neos: SRK\nfluid: CO2\n");
        let validation = validate_config(&config);
        assert_eq!(fields(&validation), vec!["eos"]);
        assert!(validation.diagnostics[0].message.contains("SRK"));
    }

    #[test]
    fn non_string_fluid_is_reported() {
        let config = yaml("temperature: 300\npressure: 1.0e7\neos: REFPROP\nfluid: 120\n");
        assert_eq!(fields(&validate_config(&config)), vec!["fluid"]);
    }

    #[test]
    fn missing_and_unknown_keys_are_reported() {
        let config = yaml("temperature: 300\nfluid: CO2\ncolor: red\n");
        let validation = validate_config(&config);
        let mut found = fields(&validation);
        found.sort();
        assert_eq!(found, vec!["color", "eos", "pressure"]);
    }

    #[test]
    fn legacy_option_key_is_accepted() {
        let config = yaml(
            "temperature: 308.24\npressure: 14561000\neos: REFPROP\nfluid: CO2\nrefprop_option: PR\n",
        );
        let parsed = parse_config(&config).unwrap();
        assert_eq!(parsed.backend_option, Some(BackendOption::PengRobinson));

        let config = yaml(
            "temperature: 308.24\npressure: 14561000\neos: REFPROP\nfluid: CO2\nbackend_option: NONE\n",
        );
        assert_eq!(fields(&validate_config(&config)), vec!["backend_option"]);
    }

    #[test]
    fn bounds_are_checked() {
        let config = yaml(
            "temperature: -5\npressure: 1.0e7\neos: IDEAL\nfluid: N2\npressure_step: 0\npressure_break: -1\nextrapolate: yes please\n",
        );
        let validation = validate_config(&config);
        let mut found = fields(&validation);
        found.sort();
        assert_eq!(
            found,
            vec!["extrapolate", "pressure_break", "pressure_step", "temperature"]
        );
    }

    #[test]
    fn non_mapping_is_rejected() {
        let validation = validate_config(&yaml("- 1\n- 2\n"));
        assert!(!validation.ok);
        assert_eq!(validation.diagnostics[0].field, "<root>");
    }

    #[test]
    fn typed_config_roundtrips_through_validation() {
        let mut config = InputConfig::new(308.24, 145.61e5, EosFamily::PengRobinson, "CO2");
        config.backend_option = None;
        config.extrapolate = true;
        let value = config.to_value().unwrap();
        assert!(validate_config(&value).ok);
        assert_eq!(parse_config(&value).unwrap(), config);
    }
}
