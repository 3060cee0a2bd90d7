//! Chemical species known to the built-in property models.
//!
//! CoolProp backends accept any fluid name CoolProp understands and never
//! consult this table. The Peng–Robinson and perfect-gas models need critical
//! constants and ideal-gas heat capacities, which are listed here.

use dw_core::units::constants::{R_MOLAR, T_REF_K};

/// Chemical species relevant for CO2 transport and natural gas service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Carbon dioxide (CO₂)
    CO2,
    /// Oxygen (O₂)
    O2,
    /// Nitrogen (N₂)
    N2,
    /// Argon (Ar)
    Ar,
    /// Hydrogen (H₂)
    H2,
    /// Methane (CH₄)
    CH4,
    /// Carbon monoxide (CO)
    CO,
    /// Water (H₂O)
    H2O,
    /// Hydrogen sulfide (H₂S)
    H2S,
    /// Ethane
    Ethane,
    /// Propane
    Propane,
}

/// Constant data for one species.
///
/// Heat capacity coefficients give the ideal-gas molar heat capacity
/// `cp = A + B·T + C·T² + D·T³` in J/(mol·K) with T in K.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesData {
    /// Molar mass [kg/kmol]
    pub molar_mass: f64,
    /// Critical temperature [K]
    pub tc: f64,
    /// Critical pressure [Pa]
    pub pc: f64,
    /// Acentric factor [-]
    pub omega: f64,
    /// Ideal-gas heat capacity polynomial `[A, B, C, D]`
    pub cp: [f64; 4],
}

impl Species {
    pub const ALL: [Species; 11] = [
        Species::CO2,
        Species::O2,
        Species::N2,
        Species::Ar,
        Species::H2,
        Species::CH4,
        Species::CO,
        Species::H2O,
        Species::H2S,
        Species::Ethane,
        Species::Propane,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::CO2 => "CO2",
            Species::O2 => "O2",
            Species::N2 => "N2",
            Species::Ar => "Ar",
            Species::H2 => "H2",
            Species::CH4 => "CH4",
            Species::CO => "CO",
            Species::H2O => "H2O",
            Species::H2S => "H2S",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
        }
    }

    /// Critical constants, molar mass and ideal-gas heat capacity.
    ///
    /// Critical data from NIST; heat capacity fits from Poling, Prausnitz & O'Connell.
    pub fn data(&self) -> SpeciesData {
        let (molar_mass, tc, pc, omega, cp) = match self {
            Species::CO2 => (44.010, 304.13, 7.3773e6, 0.2239, [19.80, 7.344e-2, -5.602e-5, 1.715e-8]),
            Species::O2 => (31.999, 154.58, 5.043e6, 0.0222, [28.11, -3.680e-6, 1.746e-5, -1.065e-8]),
            Species::N2 => (28.014, 126.19, 3.3958e6, 0.0372, [31.15, -1.357e-2, 2.680e-5, -1.168e-8]),
            Species::Ar => (39.948, 150.69, 4.863e6, -0.0022, [20.786, 0.0, 0.0, 0.0]),
            Species::H2 => (2.016, 33.145, 1.2964e6, -0.219, [27.14, 9.274e-3, -1.381e-5, 7.645e-9]),
            Species::CH4 => (16.043, 190.56, 4.5992e6, 0.0114, [19.25, 5.213e-2, 1.197e-5, -1.132e-8]),
            Species::CO => (28.010, 132.86, 3.494e6, 0.045, [30.87, -1.285e-2, 2.789e-5, -1.272e-8]),
            Species::H2O => (18.015, 647.10, 22.064e6, 0.3443, [32.24, 1.924e-3, 1.055e-5, -3.596e-9]),
            Species::H2S => (34.081, 373.10, 9.000e6, 0.100, [31.94, 1.436e-3, 2.432e-5, -1.176e-8]),
            Species::Ethane => (30.070, 305.32, 4.872e6, 0.0995, [5.409, 1.781e-1, -6.938e-5, 8.713e-9]),
            Species::Propane => (44.097, 369.89, 4.2512e6, 0.1521, [-4.224, 3.063e-1, -1.586e-4, 3.215e-8]),
        };
        SpeciesData {
            molar_mass,
            tc,
            pc,
            omega,
            cp,
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::CO2 => "Carbon Dioxide",
            Species::O2 => "Oxygen",
            Species::N2 => "Nitrogen",
            Species::Ar => "Argon",
            Species::H2 => "Hydrogen",
            Species::CH4 => "Methane",
            Species::CO => "Carbon Monoxide",
            Species::H2O => "Water",
            Species::H2S => "Hydrogen Sulfide",
            Species::Ethane => "Ethane",
            Species::Propane => "Propane",
        }
    }
}

impl SpeciesData {
    /// Ideal-gas molar heat capacity [J/(mol·K)].
    pub fn cp_molar(&self, t: f64) -> f64 {
        let [a, b, c, d] = self.cp;
        a + t * (b + t * (c + t * d))
    }

    /// Ideal-gas molar enthalpy relative to `T_REF_K` [J/mol].
    pub fn h_ideal(&self, t: f64) -> f64 {
        let [a, b, c, d] = self.cp;
        let tr = T_REF_K;
        a * (t - tr) + b / 2.0 * (t.powi(2) - tr.powi(2)) + c / 3.0 * (t.powi(3) - tr.powi(3))
            + d / 4.0 * (t.powi(4) - tr.powi(4))
    }

    /// Temperature part of the ideal-gas molar entropy relative to `T_REF_K` [J/(mol·K)].
    ///
    /// The pressure and mixing contributions are added by the caller.
    pub fn s_ideal_t(&self, t: f64) -> f64 {
        let [a, b, c, d] = self.cp;
        let tr = T_REF_K;
        a * (t / tr).ln() + b * (t - tr) + c / 2.0 * (t.powi(2) - tr.powi(2))
            + d / 3.0 * (t.powi(3) - tr.powi(3))
    }

    /// Specific gas constant [J/(kg·K)].
    pub fn r_specific(&self) -> f64 {
        R_MOLAR / (self.molar_mass * 1e-3)
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "").as_str() {
            "CO2" | "CARBONDIOXIDE" => Ok(Species::CO2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "CO" | "CARBONMONOXIDE" => Ok(Species::CO),
            "H2O" | "WATER" => Ok(Species::H2O),
            "H2S" | "HYDROGENSULFIDE" => Ok(Species::H2S),
            "ETHANE" | "C2H6" => Ok(Species::Ethane),
            "PROPANE" | "NPROPANE" | "C3H8" => Ok(Species::Propane),
            _ => Err("unknown species"),
        }
    }
}
