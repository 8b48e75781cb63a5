use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EngineError;
use crate::matrix::TravelTimeMatrix;
use crate::Point;

/// Compression level used when encoding serialized snapshots.
///
/// Snapshots ship alongside the service, so the slower maximum-ratio level
/// is worth it.
const SNAPSHOT_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
    #[error("Invalid snapshot: {0}")]
    Invalid(#[from] EngineError),
}

/// Immutable input bundle: the travel-time matrix plus the projected
/// position of every point, in matrix order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub matrix: TravelTimeMatrix,
    pub points: Vec<Point>,
}

impl Snapshot {
    pub fn new(matrix: TravelTimeMatrix, points: Vec<Point>) -> Result<Self, EngineError> {
        let snapshot = Snapshot { matrix, points };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the matrix shape and that points line up with matrix codes.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.matrix.validate()?;
        if self.points.len() != self.matrix.len() {
            return Err(EngineError::ShapeMismatch {
                what: "points",
                expected: self.matrix.len(),
                actual: self.points.len(),
            });
        }
        match self
            .points
            .iter()
            .zip(&self.matrix.codes)
            .find(|(p, code)| &p.code != *code)
        {
            Some((p, _)) => Err(EngineError::UnknownCode(p.code.clone())),
            None => Ok(()),
        }
    }

    fn finish_load(self) -> Result<Self, EngineError> {
        self.validate()?;
        Ok(self)
    }
}

pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(snapshot)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, SNAPSHOT_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn deserialize_snapshot(bytes: &[u8]) -> Result<Snapshot, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    let snapshot: Snapshot = bincode::deserialize(&decoded)?;
    Ok(snapshot.finish_load()?)
}

pub fn write_snapshot_to_file<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> Result<(), DataError> {
    let bytes = serialize_snapshot(snapshot)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_snapshot_from_file<P: AsRef<Path>>(path: P) -> Result<Snapshot, DataError> {
    let bytes = fs::read(path)?;
    deserialize_snapshot(&bytes)
}

/// Parses a JSON matrix; unreachable entries are `null`. Shape errors
/// surface as [`DataError::Json`].
pub fn matrix_from_json(json: &str) -> Result<TravelTimeMatrix, DataError> {
    Ok(serde_json::from_str(json)?)
}

pub fn snapshot_from_json(json: &str) -> Result<Snapshot, DataError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    Ok(snapshot.finish_load()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let matrix = TravelTimeMatrix::new(
            vec!["BOS".into(), "DCA".into()],
            vec![vec![0.0, 95.0], vec![f64::INFINITY, 0.0]],
            vec![vec![false, true], vec![false, false]],
        )
        .unwrap();
        let points = vec![Point::new("BOS", [870.0, 110.0]), Point::new("DCA", [800.0, 220.0])];
        Snapshot::new(matrix, points).unwrap()
    }

    #[test]
    fn snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.bin");
        write_snapshot_to_file(&snapshot(), &path).unwrap();
        let back = read_snapshot_from_file(&path).unwrap();
        assert_eq!(back.matrix.index_of_code("DCA"), Some(1));
        assert!(back.matrix.time(1, 0).is_infinite());
        assert_eq!(back.points, snapshot().points);
    }

    #[test]
    fn json_matrix_is_validated() {
        let ok = r#"{"codes":["A","B"],"times":[[0,10],[null,0]],"direct":[[false,true],[false,false]]}"#;
        let m = matrix_from_json(ok).unwrap();
        assert!(!m.is_reachable(1, 0));
        assert_eq!(m.index_of_code("B"), Some(1));

        let ragged = r#"{"codes":["A","B"],"times":[[0,10],[0]],"direct":[[false,true],[false,false]]}"#;
        assert!(matches!(matrix_from_json(ragged), Err(DataError::Json(_))));
    }

    #[test]
    fn misordered_points_are_rejected() {
        let s = snapshot();
        let swapped = vec![s.points[1].clone(), s.points[0].clone()];
        assert!(Snapshot::new(s.matrix, swapped).is_err());
    }
}
