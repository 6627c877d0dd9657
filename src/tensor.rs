//! Tensor helpers on top of `ndarray`
//!
//! `ndarray` is the tensor engine. This module adds the few operations the
//! training core needs that `ndarray` does not express directly: rank
//! promotion for single samples and label vectors, the nested-array encoding
//! used by persisted models, and 0/1 thresholding.
//!
//! Every helper returns a freshly owned array, so a cached forward value can
//! never alias a later result.

use crate::error::{NetworkError, Result};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Dimension, Ix2};

/// Promote an input to a batch: `[N]` becomes `[1, N]`, `[B, N]` is kept.
pub fn to_batch<S, D>(input: &ArrayBase<S, D>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    promote(input, "inputs", |n| (1, n))
}

/// Promote labels or predictions to a column: `[N]` becomes `[N, 1]`.
///
/// Rank-2 arrays are kept as they are; anything else is a format error
/// naming `role`.
pub fn to_column<S, D>(values: &ArrayBase<S, D>, role: &'static str) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    promote(values, role, |n| (n, 1))
}

fn promote<S, D>(
    values: &ArrayBase<S, D>,
    role: &'static str,
    vector_shape: impl Fn(usize) -> (usize, usize),
) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match values.ndim() {
        1 => {
            let data: Vec<f64> = values.iter().copied().collect();
            Ok(Array2::from_shape_vec(vector_shape(data.len()), data)?)
        }
        2 => Ok(values.view().into_dimensionality::<Ix2>()?.to_owned()),
        rank => Err(NetworkError::InvalidRank { role, rank }),
    }
}

/// Reshape any array into `shape`, keeping row-major element order.
pub fn reshape_to<S, D>(values: &ArrayBase<S, D>, shape: (usize, usize)) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if values.len() != shape.0 * shape.1 {
        return Err(NetworkError::ShapeMismatch {
            context: "reshape",
            expected: vec![shape.0, shape.1],
            actual: values.shape().to_vec(),
        });
    }
    let data: Vec<f64> = values.iter().copied().collect();
    Ok(Array2::from_shape_vec(shape, data)?)
}

/// Nested-array encoding of a matrix, one inner `Vec` per row.
pub fn to_nested(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.outer_iter().map(|row| row.to_vec()).collect()
}

/// Rebuild a matrix from its nested-array encoding.
///
/// Rows must all have the same length.
pub fn from_nested(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != cols) {
        return Err(NetworkError::ShapeMismatch {
            context: "nested array rows",
            expected: vec![cols],
            actual: vec![bad.len()],
        });
    }
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((rows.len(), cols), data)?)
}

/// Elementwise `x > threshold` as a 0/1 matrix.
pub fn greater(values: &Array2<f64>, threshold: f64) -> Array2<f64> {
    values.mapv(|v| if v > threshold { 1.0 } else { 0.0 })
}

/// One-hot encoding of the per-row argmax. Ties resolve to the first maximum.
pub fn argmax_one_hot(values: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros(values.raw_dim());
    for (row, mut target) in values.outer_iter().zip(out.outer_iter_mut()) {
        if let Some(index) = argmax(row.iter().copied()) {
            target[index] = 1.0;
        }
    }
    out
}

/// Index of the per-row maximum.
pub fn argmax_rows(values: &Array2<f64>) -> Array1<usize> {
    values
        .map_axis(Axis(1), |row| argmax(row.iter().copied()).unwrap_or(0))
}

fn argmax(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
