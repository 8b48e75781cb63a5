use std::env;

use anyhow::Context;
use flightmap_engine::data::{read_snapshot_from_file, Snapshot};
use flightmap_engine::layout::coordinator::{compute_layout, warp_continuous_path, LayoutMode};
use flightmap_engine::matrix::TravelTimeMatrix;
use flightmap_engine::{EngineConfig, Point, Vec2};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static SNAPSHOT: Lazy<anyhow::Result<Snapshot>> = Lazy::new(|| {
    load_snapshot().or_else(|err| {
        warn!("falling back to sample snapshot: {:#}", err);
        sample_snapshot()
    })
});

fn load_snapshot() -> anyhow::Result<Snapshot> {
    let path = env::var("FLIGHTMAP_SNAPSHOT").context("FLIGHTMAP_SNAPSHOT is not set")?;
    let snapshot = read_snapshot_from_file(&path)
        .with_context(|| format!("failed to read snapshot from {path}"))?;
    info!("loaded snapshot with {} airports from {}", snapshot.points.len(), path);
    Ok(snapshot)
}

fn sample_snapshot() -> anyhow::Result<Snapshot> {
    // Tiny demo network; production deployments point FLIGHTMAP_SNAPSHOT at a real one.
    let points = vec![
        Point::new("SEA", [90.0, 70.0]),
        Point::new("DEN", [380.0, 260.0]),
        Point::new("ATL", [700.0, 420.0]),
        Point::new("JFK", [860.0, 170.0]),
    ];
    let inf = f64::INFINITY;
    let times = vec![
        vec![0.0, 150.0, 290.0, 320.0],
        vec![155.0, 0.0, 170.0, 225.0],
        vec![300.0, 175.0, 0.0, inf],
        vec![330.0, 230.0, inf, 0.0],
    ];
    let direct = vec![
        vec![false, true, false, true],
        vec![true, false, true, true],
        vec![false, true, false, false],
        vec![true, true, false, false],
    ];
    let codes = points.iter().map(|p| p.code.clone()).collect();
    let matrix = TravelTimeMatrix::new(codes, times, direct).context("sample matrix")?;
    Snapshot::new(matrix, points).context("sample snapshot")
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Layout {
        origin: String,
        #[serde(default)]
        mode: LayoutMode,
        #[serde(default)]
        config: EngineConfig,
    },
    Warp {
        samples: Vec<Vec2>,
        origin: String,
        #[serde(default = "full_transition")]
        t: f64,
        #[serde(default)]
        config: EngineConfig,
    },
}

fn full_transition() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Layout { airports: Vec<PlacedAirport> },
    Warp { samples: Vec<Vec2> },
    Error { message: String },
}

#[derive(Debug, Serialize)]
struct PlacedAirport {
    code: String,
    x: f64,
    y: f64,
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    let snapshot = SNAPSHOT
        .as_ref()
        .map_err(|err| Error::from(format!("no snapshot available: {err:#}")))?;
    let response = match event.payload {
        EngineRequest::Layout {
            origin,
            mode,
            config,
        } => match compute_layout(mode, &snapshot.matrix, &snapshot.points, &origin, &config) {
            Ok(positions) => {
                let airports = snapshot
                    .points
                    .iter()
                    .zip(positions)
                    .map(|(p, [x, y])| PlacedAirport {
                        code: p.code.clone(),
                        x,
                        y,
                    })
                    .collect();
                EngineResponse::Layout { airports }
            }
            Err(err) => EngineResponse::Error {
                message: err.to_string(),
            },
        },
        EngineRequest::Warp {
            samples,
            origin,
            t,
            config,
        } => {
            let originals: Vec<Vec2> = snapshot.points.iter().map(|p| p.geo).collect();
            let warped = compute_layout(
                LayoutMode::Radial,
                &snapshot.matrix,
                &snapshot.points,
                &origin,
                &config,
            )
            .and_then(|targets| warp_continuous_path(&samples, &originals, &targets, t, &config));
            match warped {
                Ok(samples) => EngineResponse::Warp { samples },
                Err(err) => EngineResponse::Error {
                    message: err.to_string(),
                },
            }
        }
    };
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_snapshot_is_consistent() {
        let snapshot = sample_snapshot().unwrap();
        assert_eq!(snapshot.points.len(), snapshot.matrix.len());
        assert_eq!(snapshot.matrix.index_of_code("ATL"), Some(2));
    }
}
