//! Core state types for the two-body simulation.
//!
//! - `Body`   one named point mass with an optional oblateness description
//! - `System` the ordered list of bodies plus the current simulation time `t`
//!
//! Everything is 3D (`NVec3`) because the harmonic terms depend on the
//! out-of-plane offset; the recorded trajectories only keep `x` and `y`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

pub type NVec3 = Vector3<f64>;

/// Zonal harmonic description of an oblate body.
/// `r_eq` scales both terms; a zero coefficient switches that term off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oblateness {
    pub j2: f64,   // second zonal harmonic
    pub j4: f64,   // fourth zonal harmonic
    pub r_eq: f64, // equatorial radius
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: String, // lookup key, unique within a system
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f64, // mass
    pub radius: f64, // radius (softening)
    pub oblateness: Option<Oblateness>,
}

impl Body {
    /// Point mass at rest at the origin.
    pub fn new(name: impl Into<String>, m: f64) -> Self {
        Self {
            name: name.into(),
            x: NVec3::zeros(),
            v: NVec3::zeros(),
            m,
            radius: 0.0,
            oblateness: None,
        }
    }

    pub fn planar_position(&self) -> [f64; 2] {
        [self.x.x, self.x.y]
    }

    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies, insertion order is preserved
    pub t: f64, // time
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Mass-weighted mean position and velocity of the first `n` bodies.
    /// Returns `None` when those bodies carry no mass.
    pub fn com_of_first(&self, n: usize) -> Option<(f64, NVec3, NVec3)> {
        let bodies = &self.bodies[..n.min(self.bodies.len())];
        let m: f64 = bodies.iter().map(|b| b.m).sum();
        if m <= 0.0 {
            return None;
        }
        let mut x = NVec3::zeros();
        let mut v = NVec3::zeros();
        for b in bodies {
            x += b.m * b.x;
            v += b.m * b.v;
        }
        Some((m, x / m, v / m))
    }

    /// Mass-weighted mean position and velocity of the whole system.
    pub fn com(&self) -> Option<(NVec3, NVec3)> {
        self.com_of_first(self.bodies.len()).map(|(_, x, v)| (x, v))
    }

    /// Shift every body so the centre of mass sits at rest at the origin.
    pub fn move_to_com(&mut self) -> Result<()> {
        let (x_com, v_com) = self
            .com()
            .ok_or_else(|| SimError::InvalidSetup("cannot move to COM frame of a massless system".into()))?;
        for b in self.bodies.iter_mut() {
            b.x -= x_com;
            b.v -= v_com;
        }
        Ok(())
    }

    pub fn body(&self, name: &str) -> Result<&Body> {
        self.bodies
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| SimError::UnknownBody(name.to_string()))
    }

    /// First body whose position or velocity went non-finite, if any.
    pub fn first_non_finite(&self) -> Option<&Body> {
        self.bodies.iter().find(|b| !b.is_finite())
    }
}
