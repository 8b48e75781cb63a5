use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use flightmap_engine::data::{snapshot_from_json, write_snapshot_to_file, Snapshot};
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SnapshotMetadata {
    source: String,
    airports: usize,
    reachable_pairs: usize,
    direct_pairs: usize,
    generated_at_epoch: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: build_snapshot <input.json> [output-dir]"))?;
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));

    let json = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let snapshot = snapshot_from_json(&json)
        .with_context(|| format!("failed to parse snapshot JSON from {}", input.display()))?;

    let (reachable_pairs, direct_pairs) = count_pairs(&snapshot);
    let unreachable = snapshot.matrix.len() * snapshot.matrix.len().saturating_sub(1) - reachable_pairs;
    if unreachable > 0 {
        warn!("{} origin/destination pairs are unreachable", unreachable);
    }

    fs::create_dir_all(&output_dir).context("failed to create snapshot output directory")?;
    let snapshot_path = output_dir.join("flightmap.bin");
    write_snapshot_to_file(&snapshot, &snapshot_path)
        .with_context(|| format!("failed to write snapshot to {}", snapshot_path.display()))?;

    let metadata = SnapshotMetadata {
        source: input.display().to_string(),
        airports: snapshot.points.len(),
        reachable_pairs,
        direct_pairs,
        generated_at_epoch: current_epoch_seconds(),
    };
    let metadata_path = output_dir.join("flightmap.meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote snapshot to {} ({} airports, {} reachable pairs, {} direct)",
        snapshot_path.display(),
        metadata.airports,
        metadata.reachable_pairs,
        metadata.direct_pairs
    );

    Ok(())
}

/// Off-diagonal pairs with a finite time, and how many of those are direct.
fn count_pairs(snapshot: &Snapshot) -> (usize, usize) {
    let m = &snapshot.matrix;
    let mut reachable = 0;
    let mut direct = 0;
    for o in 0..m.len() {
        for d in 0..m.len() {
            if o == d || !m.is_reachable(o, d) {
                continue;
            }
            reachable += 1;
            if m.is_direct(o, d) {
                direct += 1;
            }
        }
    }
    (reachable, direct)
}

fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
