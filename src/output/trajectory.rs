//! Plain-text trajectory table: one row per sample, `time x y`.
//!
//! Values use the `%.18e` layout (18 fractional digits, signed exponent with
//! at least two digits, e.g. `6.283185307179586232e+00`) separated by single
//! spaces, `\n` after every row, no header. 19 significant digits is enough
//! for every `f64` to read back bit-exactly.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, SimError};
use crate::simulation::sampling::Trajectories;

/// One `f64` in `%.18e` layout.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let s = format!("{v:.18e}");
    // Rust writes the exponent bare ("e0", "e-5"); pad and sign it
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

/// Write `time x y` rows for the named body.
pub fn write_table<W: Write>(out: &mut W, traj: &Trajectories, body: &str) -> Result<()> {
    let track = traj
        .track(body)
        .ok_or_else(|| SimError::UnknownBody(body.to_string()))?;
    for (t, [x, y]) in traj.times.iter().zip(track.points.iter()) {
        writeln!(out, "{} {} {}", format_value(*t), format_value(*x), format_value(*y))?;
    }
    Ok(())
}

pub fn save_table(path: &Path, traj: &Trajectories, body: &str) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_table(&mut out, traj, body)?;
    out.flush()?;
    info!(path = %path.display(), rows = traj.len(), body, "trajectory table written");
    Ok(())
}

/// Parse a table back into `[t, x, y]` rows. Blank lines are skipped.
pub fn read_table<R: BufRead>(input: R) -> Result<Vec<[f64; 3]>> {
    let mut rows = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(SimError::TableParse {
                line: idx + 1,
                reason: format!("expected 3 columns, found {}", fields.len()),
            });
        }
        let mut row = [0.0; 3];
        for (slot, field) in row.iter_mut().zip(fields) {
            *slot = field.parse().map_err(|e| SimError::TableParse {
                line: idx + 1,
                reason: format!("`{field}`: {e}"),
            })?;
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_table(path: &Path) -> Result<Vec<[f64; 3]>> {
    read_table(BufReader::new(File::open(path)?))
}
