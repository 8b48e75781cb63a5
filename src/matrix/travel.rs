use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Square origin/destination travel-time table in minutes.
///
/// `times[o][d]` is the duration from `codes[o]` to `codes[d]`; unreachable
/// pairs hold a non-finite value. `direct[o][d]` marks nonstop routes. The
/// table may be asymmetric. Deserializing goes through [`TravelTimeMatrix::new`],
/// so a decoded matrix is always validated and indexed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawTravelTimeMatrix")]
pub struct TravelTimeMatrix {
    pub codes: Vec<String>,
    #[serde(with = "nullable_times")]
    pub times: Vec<Vec<f64>>,
    pub direct: Vec<Vec<bool>>,
    #[serde(skip)]
    code_index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct RawTravelTimeMatrix {
    codes: Vec<String>,
    #[serde(deserialize_with = "nullable_times::deserialize")]
    times: Vec<Vec<f64>>,
    direct: Vec<Vec<bool>>,
}

impl TryFrom<RawTravelTimeMatrix> for TravelTimeMatrix {
    type Error = EngineError;

    fn try_from(raw: RawTravelTimeMatrix) -> Result<Self, Self::Error> {
        TravelTimeMatrix::new(raw.codes, raw.times, raw.direct)
    }
}

impl TravelTimeMatrix {
    pub fn new(
        codes: Vec<String>,
        times: Vec<Vec<f64>>,
        direct: Vec<Vec<bool>>,
    ) -> Result<Self, EngineError> {
        let mut matrix = TravelTimeMatrix {
            codes,
            times,
            direct,
            code_index: HashMap::new(),
        };
        matrix.validate()?;
        matrix.rebuild_indices();
        Ok(matrix)
    }

    /// Checks that codes, times and direct flags describe the same square
    /// shape and that no duration is negative.
    pub fn validate(&self) -> Result<(), EngineError> {
        let n = self.codes.len();
        check_square("times", &self.times, n)?;
        check_square("direct", &self.direct, n)?;
        for (origin, row) in self.times.iter().enumerate() {
            if let Some(dest) = row.iter().position(|&t| t < 0.0) {
                return Err(EngineError::NegativeTime {
                    origin,
                    dest,
                    time: row[dest],
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn index_of_code(&self, code: &str) -> Option<usize> {
        self.code_index.get(code).copied()
    }

    pub fn row(&self, origin: usize) -> &[f64] {
        &self.times[origin]
    }

    pub fn row_for(&self, code: &str) -> Result<&[f64], EngineError> {
        let idx = self
            .index_of_code(code)
            .ok_or_else(|| EngineError::UnknownCode(code.to_string()))?;
        Ok(self.row(idx))
    }

    pub fn time(&self, origin: usize, dest: usize) -> f64 {
        self.times[origin][dest]
    }

    pub fn is_reachable(&self, origin: usize, dest: usize) -> bool {
        self.times[origin][dest].is_finite()
    }

    pub fn is_direct(&self, origin: usize, dest: usize) -> bool {
        self.direct[origin][dest]
    }

    /// Re-indexed sub-matrix over `codes`, in the requested order. Used when
    /// the active airport filter shrinks the visible set.
    pub fn subset<S: AsRef<str>>(&self, codes: &[S]) -> Result<TravelTimeMatrix, EngineError> {
        let indices = codes
            .iter()
            .map(|c| {
                self.index_of_code(c.as_ref())
                    .ok_or_else(|| EngineError::UnknownCode(c.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let times = indices
            .iter()
            .map(|&o| indices.iter().map(|&d| self.times[o][d]).collect())
            .collect();
        let direct = indices
            .iter()
            .map(|&o| indices.iter().map(|&d| self.direct[o][d]).collect())
            .collect();
        let codes = indices.iter().map(|&i| self.codes[i].clone()).collect();
        TravelTimeMatrix::new(codes, times, direct)
    }

    fn rebuild_indices(&mut self) {
        self.code_index = self
            .codes
            .iter()
            .enumerate()
            .map(|(idx, code)| (code.clone(), idx))
            .collect();
    }
}

fn check_square<T>(what: &'static str, rows: &[Vec<T>], n: usize) -> Result<(), EngineError> {
    if rows.len() != n {
        return Err(EngineError::ShapeMismatch {
            what,
            expected: n,
            actual: rows.len(),
        });
    }
    for (row, entries) in rows.iter().enumerate() {
        if entries.len() != n {
            return Err(EngineError::NotSquare {
                row,
                len: entries.len(),
                expected: n,
            });
        }
    }
    Ok(())
}

/// Unreachable entries are written as `null`, since JSON has no infinity.
mod nullable_times {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(times: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = times
            .iter()
            .map(|row| row.iter().map(|&t| t.is_finite().then_some(t)).collect())
            .collect();
        rows.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(d)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|t| t.unwrap_or(f64::INFINITY)).collect())
            .collect())
    }
}
