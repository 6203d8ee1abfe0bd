//! Weighted sampling over enum pools.
//!
//! One draw walks the cumulative weight array: compute running sums, draw a
//! uniform real over `[0, total]`, then binary-search for the first bound at
//! or above the draw. A draw landing exactly on the upper bound clamps to the
//! last index instead of falling off the end.
//!
//! Weights are popularity counts, not normalized probabilities. Callers pass
//! them raw; relative magnitude is all that matters.

use rand::Rng;
use thiserror::Error;

/// Errors from a single weighted draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("cannot sample from an empty domain")]
    EmptyDomain,
    #[error("values and weights differ in length ({values} values, {weights} weights)")]
    LengthMismatch { values: usize, weights: usize },
    #[error("weight at index {index} must be finite and non-negative (got {weight})")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("total weight must be positive (got {0})")]
    NonPositiveTotal(f64),
}

/// Draws one index from `weights`, proportionally to each weight.
///
/// Zero-weight entries are valid and (up to floating-point boundary draws)
/// never selected; they simply occupy an index.
pub fn sample_index<R: Rng>(weights: &[f64], rng: &mut R) -> Result<usize, SampleError> {
    if weights.is_empty() {
        return Err(SampleError::EmptyDomain);
    }

    let mut cumulative = Vec::with_capacity(weights.len());
    let mut total = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(SampleError::InvalidWeight { index, weight });
        }
        total += weight;
        cumulative.push(total);
    }
    if total <= 0.0 {
        return Err(SampleError::NonPositiveTotal(total));
    }

    let draw = rng.gen_range(0.0..=total);
    // First bound >= draw; a draw of exactly `total` clamps to the last index.
    let index = cumulative.partition_point(|&bound| bound < draw);
    Ok(index.min(weights.len() - 1))
}

/// Draws one value from `values`, weighted by `weights`.
///
/// Returns the value together with its index so callers that consume pools
/// can remove the winning entry.
pub fn sample<'a, T, R: Rng>(
    values: &'a [T],
    weights: &[f64],
    rng: &mut R,
) -> Result<(&'a T, usize), SampleError> {
    if values.len() != weights.len() {
        return Err(SampleError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    let index = sample_index(weights, rng)?;
    Ok((&values[index], index))
}
