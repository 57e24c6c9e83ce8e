//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! run. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator choice, step size, COM shift
//! - [`ParametersConfig`] – physical constants
//! - [`BodyConfig`]       – initial state of each body, either explicit or from orbital elements
//! - `forces`             – extra force terms by name (gravity is always attached)
//! - [`RunConfig`]        – number of orbits and samples
//! - [`OutputConfig`]     – output file names and the tracked body
//!
//! Every section has defaults; `ScenarioConfig::default()` is the standard
//! gravML run and `scenarios/gravml.yaml` spells the same values out.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"    # "verlet", "leapfrog" or "rk4"
//!   h0: 1.0e-3              # fixed step size
//!   move_to_com: true
//!
//! parameters:
//!   G: 1.0                  # gravitational constant
//!   eps2: 0.0               # softening epsilon^2
//!
//! bodies:
//!   - name: central_object
//!     m: 1.0
//!     oblateness: { J2: 0.1, J4: 0.0, R_eq: 0.1 }
//!   - name: orbiting_object
//!     m: 1.0e-5
//!     orbit: { a: 1.0, e: 0.2 }
//!
//! forces: ["gravitational_harmonics"]
//!
//! run:
//!   n_orbits: 10000
//!   samples_per_orbit: 1
//!
//! output:
//!   plot: "orbit.pdf"
//!   trajectory: "gravML_orbits.txt"
//!   checkpoint: "save.bin"
//!   tracked_body: "orbiting_object"
//! ```

use std::f64::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::elements::OrbitalElements;
use crate::simulation::forces::GRAVITATIONAL_HARMONICS;

pub const CENTRAL_BODY: &str = "central_object";
pub const ORBITING_BODY: &str = "orbiting_object";

/// Which integrator method used by the engine
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[default]
    #[serde(rename = "verlet")] // Velocity Verlet (kick-drift-kick). Symplectic, two force evaluations per step
    Verlet,

    #[serde(rename = "leapfrog")] // Drift-kick-drift leapfrog. Symplectic, one force evaluation per step
    Leapfrog,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta, higher local accuracy per step but not symplectic
    Rk4,
}

/// Engine configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the system state
    pub h0: f64, // fixed step size, the last step before each sample is shortened
    pub move_to_com: bool, // shift to the centre-of-mass frame after all bodies are placed
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::Verlet,
            h0: 1.0e-3,
            move_to_com: true,
        }
    }
}

/// Physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub G: f64,    // gravitational constant
    pub eps2: f64, // softening - zero for the point-mass two-body problem
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self { G: 1.0, eps2: 0.0 }
    }
}

/// Oblateness coefficients attached to a body
#[allow(non_snake_case)]
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct OblatenessConfig {
    #[serde(default)]
    pub J2: f64,
    #[serde(default)]
    pub J4: f64,
    pub R_eq: f64,
}

/// Configuration for a single body's initial state
///
/// With `orbit` set, the body is placed relative to the centre of mass of
/// the bodies listed before it; otherwise `x` / `v` are used as given.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub m: f64, // Mass of the body
    #[serde(default)]
    pub radius: f64, // Softening radius
    #[serde(default)]
    pub x: Option<Vec<f64>>, // Initial position (3 components)
    #[serde(default)]
    pub v: Option<Vec<f64>>, // Initial velocity (3 components)
    #[serde(default)]
    pub orbit: Option<OrbitalElements>,
    #[serde(default)]
    pub oblateness: Option<OblatenessConfig>,
}

/// Sampling grid
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub n_orbits: usize,
    pub samples_per_orbit: usize,
    pub orbit_period: f64, // 2π for a = 1, G = 1, unit total mass
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_orbits: 10_000,
            samples_per_orbit: 1,
            orbit_period: 2.0 * PI,
        }
    }
}

impl RunConfig {
    pub fn n_samples(&self) -> usize {
        self.n_orbits * self.samples_per_orbit
    }

    pub fn t_span(&self) -> f64 {
        self.n_orbits as f64 * self.orbit_period
    }
}

/// Output files, relative to the output directory
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub plot: String,
    pub trajectory: String,
    pub checkpoint: String,
    pub tracked_body: String, // body whose positions go into the trajectory table
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            plot: "orbit.pdf".into(),
            trajectory: "gravML_orbits.txt".into(),
            checkpoint: "save.bin".into(),
            tracked_body: ORBITING_BODY.into(),
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default = "default_bodies")]
    pub bodies: Vec<BodyConfig>,
    #[serde(default = "default_forces")]
    pub forces: Vec<String>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            parameters: ParametersConfig::default(),
            bodies: default_bodies(),
            forces: default_forces(),
            run: RunConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that do not depend on building the system
    pub fn validate(&self) -> Result<()> {
        if !(self.engine.h0.is_finite() && self.engine.h0 > 0.0) {
            return Err(SimError::InvalidSetup(format!("step size h0 must be positive, got {}", self.engine.h0)));
        }
        if self.run.n_orbits == 0 || self.run.samples_per_orbit == 0 {
            return Err(SimError::InvalidSetup("n_orbits and samples_per_orbit must both be at least 1".into()));
        }
        if !(self.run.orbit_period.is_finite() && self.run.orbit_period > 0.0) {
            return Err(SimError::InvalidSetup(format!("orbit_period must be positive, got {}", self.run.orbit_period)));
        }
        Ok(())
    }
}

fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig {
            name: CENTRAL_BODY.into(),
            m: 1.0,
            radius: 0.0,
            x: None,
            v: None,
            orbit: None,
            // J4 stays at zero for the standard run
            oblateness: Some(OblatenessConfig { J2: 0.1, J4: 0.0, R_eq: 0.1 }),
        },
        BodyConfig {
            name: ORBITING_BODY.into(),
            m: 1.0e-5,
            radius: 0.0,
            x: None,
            v: None,
            orbit: Some(OrbitalElements::planar(1.0, 0.2)),
            oblateness: None,
        },
    ]
}

fn default_forces() -> Vec<String> {
    vec![GRAVITATIONAL_HARMONICS.to_string()]
}
