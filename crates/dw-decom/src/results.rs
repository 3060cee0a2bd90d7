//! Result table and run summary.

use crate::error::DecomResult;
use crate::integrator::WaveSpeed;
use crate::path::{Path, TerminationReason};
use dw_fluids::EosFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Default file name used by [`ResultTable::write_csv`].
pub const DEFAULT_RESULT_FILE: &str = "decom_result.csv";

pub const PRESSURE: &str = "Pressure (Pa)";
pub const TEMPERATURE: &str = "Temperature (K)";
pub const SPEED_OF_SOUND: &str = "Speed of sound (m/s)";
pub const OUTFLOW_VELOCITY: &str = "Outflow velocity (m/s)";
pub const WAVE_SPEED: &str = "Decompression wave speed (m/s)";
pub const DENSITY: &str = "Fluid density (kg/m3)";
pub const ENTHALPY: &str = "Fluid enthalpy (J/kg)";

/// Column headers in table order.
pub const COLUMNS: [&str; 7] = [
    PRESSURE,
    TEMPERATURE,
    SPEED_OF_SOUND,
    OUTFLOW_VELOCITY,
    WAVE_SPEED,
    DENSITY,
    ENTHALPY,
];

/// Column-oriented view of a completed path, one row per point in
/// decreasing pressure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
    pub speed_of_sound: Vec<f64>,
    pub outflow_velocity: Vec<f64>,
    pub wave_speed: Vec<f64>,
    pub density: Vec<f64>,
    pub enthalpy: Vec<f64>,
}

impl ResultTable {
    pub fn from_path(path: &Path) -> Self {
        let mut table = Self::default();
        for point in path {
            table.pressure.push(point.p);
            table.temperature.push(point.t);
            table.speed_of_sound.push(point.c);
            table.outflow_velocity.push(point.u);
            table.wave_speed.push(point.w);
            table.density.push(point.rho);
            table.enthalpy.push(point.h);
        }
        table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Look up a column by its header.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let column = match name {
            PRESSURE => &self.pressure,
            TEMPERATURE => &self.temperature,
            SPEED_OF_SOUND => &self.speed_of_sound,
            OUTFLOW_VELOCITY => &self.outflow_velocity,
            WAVE_SPEED => &self.wave_speed,
            DENSITY => &self.density,
            ENTHALPY => &self.enthalpy,
            _ => return None,
        };
        Some(column.as_slice())
    }

    fn columns(&self) -> [&[f64]; 7] {
        [
            &self.pressure,
            &self.temperature,
            &self.speed_of_sound,
            &self.outflow_velocity,
            &self.wave_speed,
            &self.density,
            &self.enthalpy,
        ]
    }

    /// CSV with a header row.
    pub fn to_csv(&self) -> String {
        let mut csv = COLUMNS.join(",");
        csv.push('\n');
        let columns = self.columns();
        for row in 0..self.len() {
            let line: Vec<String> = columns.iter().map(|col| col[row].to_string()).collect();
            let _ = writeln!(csv, "{}", line.join(","));
        }
        csv
    }

    /// Write the CSV to `path`, or to [`DEFAULT_RESULT_FILE`] when `None`.
    pub fn write_csv(&self, path: Option<&std::path::Path>) -> DecomResult<std::path::PathBuf> {
        let path = path
            .map(std::path::Path::to_path_buf)
            .unwrap_or_else(|| DEFAULT_RESULT_FILE.into());
        std::fs::write(&path, self.to_csv())?;
        Ok(path)
    }

    pub fn to_json(&self) -> DecomResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Short description of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub fluid: String,
    pub eos: EosFamily,
    pub backend: String,
    /// Initial temperature [K]
    pub t0: f64,
    /// Initial pressure [Pa]
    pub p0: f64,
    /// Entropy of the isentrope [J/(kg·K)]
    pub s0: f64,
    pub points: usize,
    pub max_steps: usize,
    pub termination: TerminationReason,
    pub final_pressure: Option<f64>,
    pub final_wave_speed: Option<f64>,
}

impl RunSummary {
    /// Whether the path stopped before ⌊P0/ΔP⌋ points.
    pub fn is_truncated(&self) -> bool {
        self.points < self.max_steps
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fluid:        {} ({}, {})", self.fluid, self.eos, self.backend)?;
        writeln!(f, "Initial:      T = {:.2} K, P = {:.0} Pa", self.t0, self.p0)?;
        writeln!(f, "Entropy:      {:.4} J/(kg·K)", self.s0)?;
        writeln!(f, "Points:       {} of {}", self.points, self.max_steps)?;
        write!(f, "Termination:  {}", self.termination)?;
        if let (Some(p), Some(w)) = (self.final_pressure, self.final_wave_speed) {
            write!(f, "\nFinal point:  P = {p:.0} Pa, W = {w:.3} m/s")?;
        }
        Ok(())
    }
}

impl WaveSpeed {
    /// Result table, or `None` before the run has completed.
    pub fn result_table(&self) -> Option<ResultTable> {
        self.path().map(ResultTable::from_path)
    }

    /// Summary of a completed run, or `None` before completion.
    pub fn summary(&self) -> Option<RunSummary> {
        let path = self.path()?;
        let termination = self.termination()?;
        let last = path.last();
        Some(RunSummary {
            fluid: self.problem.composition.to_string(),
            eos: self.problem.eos,
            backend: self.backend.name().to_string(),
            t0: self.problem.t0.value,
            p0: self.problem.p0.value,
            s0: self.s0,
            points: path.len(),
            max_steps: self.max_steps,
            termination,
            final_pressure: last.map(|p| p.p),
            final_wave_speed: last.map(|p| p.w),
        })
    }
}
