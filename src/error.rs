use thiserror::Error;

/// Malformed input shape. Degenerate geometry never surfaces here; it is
/// absorbed by the fallback paths of the individual algorithms.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("{what} length mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("negative travel time {time} from row {origin} to column {dest}")]
    NegativeTime { origin: usize, dest: usize, time: f64 },
    #[error("origin index {index} out of range for {len} points")]
    OriginOutOfRange { index: usize, len: usize },
    #[error("unknown point code {0}")]
    UnknownCode(String),
}
