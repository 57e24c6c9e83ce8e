//! Time grid and the integrate-then-record sampling loop.

use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::simulation::scenario::Scenario;

/// Evenly spaced sample times, endpoint included.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    start: f64,
    stop: f64,
    times: Vec<f64>,
}

impl TimeGrid {
    /// `n` evenly spaced values from `start` to `stop`. A single value is
    /// just `start`; the last of several values is exactly `stop`.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Self {
        let mut times = Vec::with_capacity(n);
        match n {
            0 => {}
            1 => times.push(start),
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                times.extend((0..n).map(|i| start + i as f64 * step));
                times[n - 1] = stop;
            }
        }
        Self { start, stop, times }
    }

    /// Grid of `n_samples` times spanning `t_span` from `t0`.
    pub fn for_run(t0: f64, t_span: f64, n_samples: usize) -> Self {
        Self::linspace(t0, t0 + t_span, n_samples)
    }

    /// Requested interval, even when a single sample only covers its start.
    pub fn span(&self) -> (f64, f64) {
        (self.start, self.stop)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

/// Planar positions of one body, one entry per grid time.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Sample times and one track per body, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectories {
    pub times: Vec<f64>,
    pub tracks: Vec<Track>,
}

impl Trajectories {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

/// Console line for one sample: `Current time is T, P% done`.
pub fn progress_line(t: f64, t_start: f64, t_end: f64) -> String {
    let span = t_end - t_start;
    let pct = if span > 0.0 { (t - t_start) / span * 1e2 } else { 100.0 };
    format!("Current time is {t:.3}, {pct:.2}% done")
}

/// Advance `scenario` through every grid time and record all planar positions.
///
/// Each progress line is written to `progress` followed by `\r` so a terminal
/// shows it in place; a final newline closes the line.
pub fn sample_trajectories<W: Write>(scenario: &mut Scenario, grid: &TimeGrid, progress: &mut W) -> Result<Trajectories> {
    let n = grid.len();
    let mut tracks: Vec<Track> = scenario
        .system
        .bodies
        .iter()
        .map(|b| Track { name: b.name.clone(), points: Vec::with_capacity(n) })
        .collect();

    let (t_start, t_end) = grid.span();

    for &t in grid.times() {
        scenario.integrate(t)?;
        write!(progress, "{}\r", progress_line(t, t_start, t_end))?;
        progress.flush()?;
        for (track, body) in tracks.iter_mut().zip(scenario.system.bodies.iter()) {
            track.points.push(body.planar_position());
        }
    }
    writeln!(progress)?;

    info!(samples = n, t = scenario.system.t, "integration finished");
    Ok(Trajectories { times: grid.times().to_vec(), tracks })
}
