//! Classical orbital elements and their conversion to and from Cartesian
//! relative state vectors.
//!
//! Angles follow the usual 3-1-3 orientation (Ω, i, ω) with the reference
//! plane z = 0. With every angle zero the body sits at periapsis on the +x
//! axis moving in +y.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub a: f64,     // semi-major axis
    pub e: f64,     // eccentricity
    #[serde(default)]
    pub inc: f64,   // inclination
    #[serde(default)]
    pub node: f64,  // longitude of the ascending node (Ω)
    #[serde(default)]
    pub omega: f64, // argument of periapsis (ω)
    #[serde(default)]
    pub f: f64,     // true anomaly
}

impl OrbitalElements {
    /// In-plane orbit starting at periapsis.
    pub fn planar(a: f64, e: f64) -> Self {
        Self { a, e, inc: 0.0, node: 0.0, omega: 0.0, f: 0.0 }
    }

    /// Only bound, non-degenerate ellipses are accepted.
    pub fn validate(&self, body: &str) -> Result<()> {
        let fail = |reason: String| SimError::InvalidOrbit { body: body.to_string(), reason };
        let all = [self.a, self.e, self.inc, self.node, self.omega, self.f];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(fail("elements must be finite".into()));
        }
        if self.a <= 0.0 {
            return Err(fail(format!("semi-major axis must be positive, got {}", self.a)));
        }
        if !(0.0..1.0).contains(&self.e) {
            return Err(fail(format!("eccentricity must lie in [0, 1), got {}", self.e)));
        }
        Ok(())
    }

    pub fn periapsis(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    pub fn apoapsis(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Orbital period for gravitational parameter `mu = G (M + m)`.
    pub fn period(&self, mu: f64) -> f64 {
        2.0 * PI * (self.a * self.a * self.a / mu).sqrt()
    }

    /// Position and velocity relative to the primary.
    pub fn to_relative_state(&self, mu: f64) -> (NVec3, NVec3) {
        let (e, a) = (self.e, self.a);
        let (sf, cf) = self.f.sin_cos();
        let (so, co) = self.omega.sin_cos();
        let (s_node, c_node) = self.node.sin_cos();
        let (si, ci) = self.inc.sin_cos();

        let p = a * (1.0 - e * e); // semi-latus rectum
        let r = p / (1.0 + e * cf);
        let v0 = (mu / p).sqrt();

        // cos / sin of the argument of latitude u = ω + f
        let cu = co * cf - so * sf;
        let su = so * cf + co * sf;

        let x = NVec3::new(
            r * (c_node * cu - s_node * su * ci),
            r * (s_node * cu + c_node * su * ci),
            r * su * si,
        );
        let v = NVec3::new(
            v0 * ((e + cf) * (-ci * co * s_node - c_node * so) - sf * (co * c_node - ci * so * s_node)),
            v0 * ((e + cf) * (ci * co * c_node - s_node * so) - sf * (co * s_node + ci * so * c_node)),
            v0 * ((e + cf) * co * si - sf * si * so),
        );
        (x, v)
    }

    /// Recover elements from a relative state. Undefined angles (node of a
    /// planar orbit, periapsis of a circular one) are reported as 0.
    pub fn from_relative_state(r: NVec3, v: NVec3, mu: f64) -> Self {
        const EPS: f64 = 1e-12;
        let r_mag = r.norm();
        let h = r.cross(&v);
        let h_mag = h.norm();

        let a = 1.0 / (2.0 / r_mag - v.dot(&v) / mu);
        let e_vec = v.cross(&h) / mu - r / r_mag;
        let e = e_vec.norm();
        let inc = if h_mag > 0.0 { (h.z / h_mag).clamp(-1.0, 1.0).acos() } else { 0.0 };

        let n = NVec3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();
        let node = if n_mag > EPS { wrap(n.y.atan2(n.x)) } else { 0.0 };

        // Reference direction for ω: the node line, or +x for planar orbits
        let (ref_dir, normal) = if n_mag > EPS {
            (n / n_mag, h / h_mag)
        } else {
            (NVec3::x(), NVec3::z() * h.z.signum())
        };
        let angle_from_ref = |d: NVec3| wrap(normal.dot(&ref_dir.cross(&d)).atan2(ref_dir.dot(&d)));

        let (omega, f) = if e > EPS {
            let omega = angle_from_ref(e_vec);
            (omega, wrap(angle_from_ref(r) - omega))
        } else {
            (0.0, angle_from_ref(r))
        };

        Self { a, e, inc, node, omega, f }
    }
}

fn wrap(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * PI)
}
