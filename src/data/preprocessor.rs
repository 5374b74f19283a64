// ============================================================
// Layer 4 - Input Preprocessor
// ============================================================
// Turns the untyped `data` field of a request into something a
// model can consume.
//
// Two shapes are supported:
//   - FeatureMatrix: a rectangular [rows, cols] numeric table,
//     which the autoencoder multiplies against its weights
//   - SampleBatch:   just the number of samples, for the
//     classifier, which accepts samples of any nesting depth
//     (e.g. [n, 100, 10] time-step windows)
//
// Validation happens here, once, so the models can assume a
// well-formed input. Errors name the offending row and column.

use anyhow::{anyhow, bail, Result};
use serde_json::Value;

/// A dense row-major matrix of f32 features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows:   usize,
    cols:   usize,
    values: Vec<f32>,
}

impl FeatureMatrix {
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> Result<Self> {
        if rows * cols != values.len() {
            bail!(
                "feature matrix of {rows}x{cols} needs {} values, got {}",
                rows * cols,
                values.len()
            );
        }
        Ok(Self { rows, cols, values })
    }

    pub fn empty() -> Self {
        Self { rows: 0, cols: 0, values: Vec::new() }
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn values(&self) -> &[f32] { &self.values }

    pub fn is_empty(&self) -> bool { self.rows == 0 }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(&self.values[start..start + self.cols])
    }
}

/// The classifier never looks at feature values, only at how many
/// samples it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleBatch {
    len: usize,
}

impl SampleBatch {
    pub fn new(len: usize) -> Self { Self { len } }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Parse `data` as a rectangular numeric table.
    /// `null` (a missing field) is treated as an empty table.
    pub fn features(&self, data: &Value) -> Result<FeatureMatrix> {
        let rows = match data {
            Value::Null        => return Ok(FeatureMatrix::empty()),
            Value::Array(rows) => rows,
            other              => bail!("`data` must be an array of rows, got {}", kind(other)),
        };

        let mut cols: Option<usize> = None;
        let mut values = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let cells = row
                .as_array()
                .ok_or_else(|| anyhow!("row {i} must be an array of numbers, got {}", kind(row)))?;

            // The first row fixes the width; every other row must match it
            let width = *cols.get_or_insert(cells.len());
            if cells.len() != width {
                bail!("row {i} has {} features, expected {width}", cells.len());
            }

            for (j, cell) in cells.iter().enumerate() {
                let v = cell
                    .as_f64()
                    .ok_or_else(|| anyhow!("row {i}, column {j} is not a number"))?;
                values.push(v as f32);
            }
        }

        FeatureMatrix::new(rows.len(), cols.unwrap_or(0), values)
    }

    /// Count the samples in `data` without inspecting their contents.
    pub fn samples(&self, data: &Value) -> Result<SampleBatch> {
        match data {
            Value::Null           => Ok(SampleBatch::new(0)),
            Value::Array(samples) => Ok(SampleBatch::new(samples.len())),
            other                 => bail!("`data` must be an array of samples, got {}", kind(other)),
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_rectangular_table() {
        let m = Preprocessor::new().features(&json!([[1, 2, 3], [4.5, 5, 6]])).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(1), Some(&[4.5f32, 5.0, 6.0][..]));
        assert_eq!(m.row(2), None);
    }

    #[test]
    fn test_null_and_empty_are_empty() {
        let p = Preprocessor::new();
        assert!(p.features(&Value::Null).unwrap().is_empty());
        assert!(p.features(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Preprocessor::new().features(&json!([[1, 2], [3]])).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 features, expected 2"));
    }

    #[test]
    fn test_non_numeric_cell_rejected() {
        let err = Preprocessor::new().features(&json!([[1, "x"]])).unwrap_err();
        assert!(err.to_string().contains("row 0, column 1"));
    }

    #[test]
    fn test_scalar_data_rejected() {
        assert!(Preprocessor::new().features(&json!(3)).is_err());
        assert!(Preprocessor::new().samples(&json!("abc")).is_err());
    }

    #[test]
    fn test_samples_counts_outer_dimension() {
        let batch = Preprocessor::new()
            .samples(&json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]], 9]))
            .unwrap();
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_matrix_new_checks_length() {
        assert!(FeatureMatrix::new(2, 2, vec![1.0; 3]).is_err());
    }
}
