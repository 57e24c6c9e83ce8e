//! High-level runtime engine settings
//!
//! Selects the integrator used when advancing a `Scenario`

use serde::{Deserialize, Serialize};

use crate::configuration::config::IntegratorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub integrator: IntegratorConfig, // verlet, leapfrog or rk4
}
