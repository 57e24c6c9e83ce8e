//! Force / acceleration contributors for the two-body engine
//!
//! Defines the acceleration trait, the set that sums contributions,
//! direct Newtonian gravity and the zonal-harmonic (J2/J4) correction
//! for oblate bodies. Terms are registered by name so a restarted run
//! can re-attach exactly the terms the checkpointed run used.

use crate::error::{Result, SimError};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, System};

pub const GRAVITY: &str = "gravity";
pub const GRAVITATIONAL_HARMONICS: &str = "gravitational_harmonics";

/// Collection of acceleration terms (gravity, harmonics)
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Add a term that was looked up by name
    pub fn push(&mut self, term: Box<dyn Acceleration + Send + Sync>) {
        self.terms.push(term);
    }

    /// Names of the attached terms, in evaluation order
    pub fn names(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.terms.iter().any(|t| t.name() == name)
    }

    /// Compute total accelerations at time `t` for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, sys: &System, out: &mut [NVec3]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }
        // Iterate over all acceleration contributors
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

/// Trait for acceleration sources operating on [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    /// Registry name, stored in checkpoints
    fn name(&self) -> &'static str;

    fn acceleration(&self, t: f64, sys: &System, out: &mut [NVec3]);
}

/// Build a force term from its registry name
pub fn load_force(name: &str, params: &Parameters) -> Result<Box<dyn Acceleration + Send + Sync>> {
    match name {
        GRAVITY => Ok(Box::new(NewtonianGravity {
            G: params.G,
            eps2: params.eps2,
        })),
        GRAVITATIONAL_HARMONICS => Ok(Box::new(GravitationalHarmonics { G: params.G })),
        other => Err(SimError::UnknownForce(other.to_string())),
    }
}

/// Newtonian gravity with softening (direct n^2 sum)
/// Uses body radius and eps2 to smooth close encounters; both are zero
/// for the default two-body run, which gives the plain point-mass law
#[allow(non_snake_case)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening
}

impl Acceleration for NewtonianGravity {
    fn name(&self) -> &'static str {
        GRAVITY
    }

    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec3]) {
        let n = sys.bodies.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &sys.bodies[i];
            for j in (i + 1)..n {
                let bj = &sys.bodies[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;

                // Per-pair softening from the mean squared radius plus the global floor
                let soft2 = 0.5 * (bi.radius * bi.radius + bj.radius * bj.radius) + self.eps2;
                let d2 = r.dot(&r) + soft2;

                let inv_r = d2.sqrt().recip();
                let coef = self.G * inv_r * inv_r * inv_r;

                // a_i +=  G m_j r / |r|^3
                // a_j += -G m_i r / |r|^3
                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }
    }
}

/// Zonal harmonic corrections (J2, J4) sourced by every body that carries
/// an [`Oblateness`](crate::simulation::states::Oblateness). The spin axis is +z.
///
/// For a field point at offset `d` from the source, `r = |d|`, `c2 = d_z^2 / r^2`:
///
/// - J2: `pre = 3 J2 R^2 / (2 r^5)`, `fac = 5 c2 - 1`,
///   `a_xy = G m pre fac d_xy`, `a_z = G m pre (fac - 2) d_z`
/// - J4: `pre = 5 J4 R^4 / (8 r^7)`, `fac = 63 c2^2 - 42 c2 + 3`,
///   `a_xy = G m pre fac d_xy`, `a_z = G m pre (fac + 12 - 28 c2) d_z`
///
/// The source receives the reaction scaled by the field body's mass.
#[allow(non_snake_case)]
pub struct GravitationalHarmonics {
    pub G: f64,
}

impl GravitationalHarmonics {
    /// Acceleration per unit source mass (times G) at offset `d`
    pub fn field(&self, j2: f64, j4: f64, r_eq: f64, d: NVec3) -> NVec3 {
        let r2 = d.dot(&d);
        if r2 == 0.0 {
            return NVec3::zeros();
        }
        let r = r2.sqrt();
        let c2 = d.z * d.z / r2;
        let mut a = NVec3::zeros();

        if j2 != 0.0 {
            let pre = 3.0 * j2 * r_eq * r_eq / (2.0 * r2 * r2 * r);
            let fac = 5.0 * c2 - 1.0;
            a.x += pre * fac * d.x;
            a.y += pre * fac * d.y;
            a.z += pre * (fac - 2.0) * d.z;
        }

        if j4 != 0.0 {
            let r_eq2 = r_eq * r_eq;
            let pre = 5.0 * j4 * r_eq2 * r_eq2 / (8.0 * r2 * r2 * r2 * r);
            let fac = 63.0 * c2 * c2 - 42.0 * c2 + 3.0;
            a.x += pre * fac * d.x;
            a.y += pre * fac * d.y;
            a.z += pre * (fac + 12.0 - 28.0 * c2) * d.z;
        }

        self.G * a
    }
}

impl Acceleration for GravitationalHarmonics {
    fn name(&self) -> &'static str {
        GRAVITATIONAL_HARMONICS
    }

    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec3]) {
        for (s, source) in sys.bodies.iter().enumerate() {
            let Some(ob) = source.oblateness else {
                continue;
            };
            if ob.r_eq == 0.0 {
                continue;
            }
            for (i, p) in sys.bodies.iter().enumerate() {
                if i == s {
                    continue;
                }
                let f = self.field(ob.j2, ob.j4, ob.r_eq, p.x - source.x);
                out[i] += source.m * f;
                out[s] -= p.m * f;
            }
        }
    }
}
