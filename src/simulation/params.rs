//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fixed integration step size `h0` (the last step before a sample is shortened),
//! - softening and gravitational constant (`eps2`, `G`)

use serde::{Deserialize, Serialize};

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub h0: f64, // step size
    pub eps2: f64, // softening
    pub G: f64, // gravitational constant
}
