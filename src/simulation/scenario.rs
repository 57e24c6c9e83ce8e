//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0, in the COM frame)
//! - active force set (`AccelSet`: gravity plus any named extras)
//!
//! A `Scenario` can also be rebuilt from a checkpoint, and it owns the
//! "advance to time t" operation used by the sampling loop.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use crate::output::checkpoint::{Checkpoint, CHECKPOINT_VERSION};
use crate::simulation::elements::OrbitalElements;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{load_force, AccelSet, GRAVITY};
use crate::simulation::integrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3, Oblateness, System};

/// Fully-initialized simulation: engine settings, parameters, current
/// system state and the set of active force laws
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: AccelSet,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self> {
        cfg.validate()?;

        // Parameters (runtime) from ParametersConfig + EngineConfig
        let parameters = Parameters {
            h0: cfg.engine.h0,
            eps2: cfg.parameters.eps2,
            G: cfg.parameters.G,
        };
        if !(parameters.G.is_finite() && parameters.G > 0.0) {
            return Err(SimError::InvalidSetup(format!("gravitational constant must be positive, got {}", parameters.G)));
        }

        let engine = Engine {
            integrator: cfg.engine.integrator,
        };

        let forces = build_forces(&cfg.forces, &parameters)?;

        let mut scenario = Self {
            engine,
            parameters,
            system: System::new(),
            forces,
        };

        let mut seen = HashSet::new();
        for bc in &cfg.bodies {
            if !seen.insert(bc.name.as_str()) {
                return Err(SimError::InvalidSetup(format!("duplicate body name `{}`", bc.name)));
            }
            scenario.add_body(bc)?;
        }

        if cfg.engine.move_to_com {
            scenario.system.move_to_com()?;
        }

        info!(
            bodies = scenario.system.bodies.len(),
            forces = ?scenario.forces.names(),
            integrator = ?scenario.engine.integrator,
            h0 = scenario.parameters.h0,
            "scenario ready"
        );
        Ok(scenario)
    }

    /// Rebuild a scenario from a saved checkpoint, re-attaching the same force terms
    pub fn from_checkpoint(ck: Checkpoint) -> Result<Self> {
        if ck.version != CHECKPOINT_VERSION {
            return Err(SimError::CheckpointVersion { found: ck.version, expected: CHECKPOINT_VERSION });
        }
        let mut forces = AccelSet::new();
        for name in &ck.forces {
            forces.push(load_force(name, &ck.parameters)?);
        }
        info!(t = ck.system.t, bodies = ck.system.bodies.len(), "scenario restored from checkpoint");
        Ok(Self {
            engine: ck.engine,
            parameters: ck.parameters,
            system: ck.system,
            forces,
        })
    }

    /// Snapshot of everything needed to resume this run
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            engine: self.engine.clone(),
            parameters: self.parameters.clone(),
            system: self.system.clone(),
            forces: self.forces.names(),
        }
    }

    /// Append a body. Orbital elements are taken relative to the centre of
    /// mass of the bodies already present.
    pub fn add_body(&mut self, bc: &BodyConfig) -> Result<()> {
        if !bc.m.is_finite() || bc.m < 0.0 {
            return Err(SimError::InvalidSetup(format!("body `{}` has invalid mass {}", bc.name, bc.m)));
        }

        let mut body = Body::new(bc.name.clone(), bc.m);
        body.radius = bc.radius;
        body.oblateness = bc.oblateness.map(|o| Oblateness { j2: o.J2, j4: o.J4, r_eq: o.R_eq });

        match &bc.orbit {
            Some(el) => {
                let (x, v) = self.orbit_state(&bc.name, bc.m, el)?;
                body.x = x;
                body.v = v;
            }
            None => {
                body.x = vector_from(&bc.name, "x", bc.x.as_deref())?;
                body.v = vector_from(&bc.name, "v", bc.v.as_deref())?;
            }
        }

        debug!(name = %body.name, m = body.m, x = ?body.x, v = ?body.v, "added body");
        self.system.bodies.push(body);
        Ok(())
    }

    fn orbit_state(&self, name: &str, m: f64, el: &OrbitalElements) -> Result<(NVec3, NVec3)> {
        el.validate(name)?;
        let (m_primary, x_primary, v_primary) = self
            .system
            .com_of_first(self.system.bodies.len())
            .ok_or_else(|| SimError::InvalidOrbit {
                body: name.to_string(),
                reason: "no massive primary precedes it".into(),
            })?;
        let mu = self.parameters.G * (m_primary + m);
        let (dx, dv) = el.to_relative_state(mu);
        Ok((x_primary + dx, v_primary + dv))
    }

    /// Advance the system to exactly `t_target` with fixed steps of `h0`,
    /// shortening the last one. Advancing to the current time is a no-op.
    pub fn integrate(&mut self, t_target: f64) -> Result<()> {
        if t_target < self.system.t {
            return Err(SimError::Backwards { from: self.system.t, to: t_target });
        }
        let h0 = self.parameters.h0;
        let mut steps = 0usize;
        while self.system.t < t_target {
            let remaining = t_target - self.system.t;
            let last = remaining <= h0;
            let dt = if last { remaining } else { h0 };
            integrator::step(&self.engine.integrator, &mut self.system, &self.forces, dt);
            steps += 1;
            if last {
                self.system.t = t_target;
            }
            if let Some(bad) = self.system.first_non_finite() {
                return Err(SimError::Diverged { t: self.system.t, body: bad.name.clone() });
            }
        }
        debug!(t = self.system.t, steps, "advanced");
        Ok(())
    }
}

fn build_forces(extra: &[String], params: &Parameters) -> Result<AccelSet> {
    // Gravity is always attached first
    let mut forces = AccelSet::new();
    forces.push(load_force(GRAVITY, params)?);
    for name in extra {
        if forces.contains(name) {
            continue;
        }
        forces.push(load_force(name, params)?);
    }
    Ok(forces)
}

fn vector_from(body: &str, field: &str, comps: Option<&[f64]>) -> Result<NVec3> {
    match comps {
        None => Ok(NVec3::zeros()),
        Some([x, y]) => Ok(NVec3::new(*x, *y, 0.0)),
        Some([x, y, z]) => Ok(NVec3::new(*x, *y, *z)),
        Some(other) => Err(SimError::InvalidSetup(format!(
            "body `{body}` field `{field}` needs 2 or 3 components, got {}",
            other.len()
        ))),
    }
}
