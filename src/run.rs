//! Linear run pipeline: scenario in, three output files out.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::configuration::config::ScenarioConfig;
use crate::error::Result;
use crate::output::checkpoint::save_checkpoint;
use crate::output::trajectory::save_table;
use crate::simulation::sampling::{sample_trajectories, TimeGrid, Trajectories};
use crate::simulation::scenario::Scenario;
use crate::visualization::orbit_plot::{save_orbit_plot, PlotStyle};

/// Where the outputs of a finished run landed.
#[derive(Debug, Clone)]
pub struct RunOutputs {
    pub plot: PathBuf,
    pub trajectory: PathBuf,
    pub checkpoint: PathBuf,
    pub trajectories: Trajectories,
}

/// Sample `scenario` over the configured grid, starting at its current time,
/// then write the plot, the trajectory table and the checkpoint into `out_dir`.
pub fn run<W: Write>(scenario: &mut Scenario, cfg: &ScenarioConfig, out_dir: &Path, progress: &mut W) -> Result<RunOutputs> {
    cfg.validate()?;
    // fail before integrating if the table would have nothing to write
    scenario.system.body(&cfg.output.tracked_body)?;

    let grid = TimeGrid::for_run(scenario.system.t, cfg.run.t_span(), cfg.run.n_samples());
    info!(
        samples = grid.len(),
        t_start = grid.span().0,
        t_end = grid.span().1,
        "starting integration"
    );

    let trajectories = sample_trajectories(scenario, &grid, progress)?;

    if !out_dir.as_os_str().is_empty() {
        fs::create_dir_all(out_dir)?;
    }
    let plot = out_dir.join(&cfg.output.plot);
    let trajectory = out_dir.join(&cfg.output.trajectory);
    let checkpoint = out_dir.join(&cfg.output.checkpoint);

    save_orbit_plot(&plot, &trajectories, &PlotStyle::default())?;
    save_table(&trajectory, &trajectories, &cfg.output.tracked_body)?;
    save_checkpoint(&scenario.checkpoint(), &checkpoint)?;

    Ok(RunOutputs { plot, trajectory, checkpoint, trajectories })
}
