use gravml::{load_checkpoint, run, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Integrate an orbit around an oblate (J2/J4) central body and write plot, table and checkpoint")]
struct Args {
    /// Scenario YAML; the built-in gravML defaults are used without it
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Resume from a checkpoint instead of building the scenario's bodies
    #[arg(short, long)]
    restart: Option<PathBuf>,

    /// Directory for orbit plot, trajectory table and checkpoint
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

// load here to keep main clean
fn load_config(args: &Args) -> Result<ScenarioConfig> {
    match &args.scenario {
        Some(path) => ScenarioConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display())),
        None => Ok(ScenarioConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gravml=info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let cfg = load_config(&args)?;

    let mut scenario = match &args.restart {
        Some(path) => {
            let ck = load_checkpoint(path).with_context(|| format!("failed to read checkpoint {}", path.display()))?;
            Scenario::from_checkpoint(ck).context("failed to restore checkpoint")?
        }
        None => Scenario::build_scenario(&cfg).context("failed to set up the simulation")?,
    };

    let stdout = io::stdout();
    let outputs = run(&mut scenario, &cfg, &args.out_dir, &mut stdout.lock()).context("run failed")?;

    info!(
        plot = %outputs.plot.display(),
        trajectory = %outputs.trajectory.display(),
        checkpoint = %outputs.checkpoint.display(),
        "done"
    );
    Ok(())
}
