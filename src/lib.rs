pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod output;
pub mod run;

pub use error::{Result, SimError};

pub use simulation::states::{Body, System, NVec3, Oblateness};
pub use simulation::forces::{Acceleration, AccelSet, NewtonianGravity, GravitationalHarmonics, load_force};
pub use simulation::integrator::{verlet_integrator, leapfrog_integrator, rk4_integrator};
pub use simulation::elements::OrbitalElements;
pub use simulation::scenario::Scenario;
pub use simulation::sampling::{TimeGrid, Trajectories, Track, sample_trajectories};

pub use configuration::config::{IntegratorConfig, EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig, RunConfig, OutputConfig};

pub use output::checkpoint::{Checkpoint, save_checkpoint, load_checkpoint};
pub use output::trajectory::{save_table, load_table};

pub use visualization::orbit_plot::{render_orbit_pdf, save_orbit_plot, PlotStyle};

pub use run::{run, RunOutputs};
