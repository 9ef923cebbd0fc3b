use anyhow::Result;
use thiserror::Error;

use crate::structs::ContextProfile;
use crate::util::{LogAbuse, VecMath, LOG_FLOOR};

pub const DEFAULT_WEIGHT_CENTER: f64 = 1.6;
pub const DEFAULT_WEIGHT_DECAY: f64 = 0.85;

#[derive(Error, Debug)]
#[error("context window length must be odd, found: {length}")]
pub struct EvenWindowLengthError {
    pub length: usize,
}

#[derive(Error, Debug)]
#[error("weight vector {row} has {found} entries, expected {expected}")]
pub struct WeightVectorLengthError {
    pub row: usize,
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("invalid log weight: {value}")]
pub struct InvalidLogWeightError {
    pub value: f64,
}

#[derive(Error, Debug)]
#[error("invalid column weight parameters: center {weight_center}, decay {weight_decay}")]
pub struct InvalidColumnWeightsError {
    pub weight_center: f64,
    pub weight_decay: f64,
}

/// One entry of a context library.
///
/// The window weights are kept in log space. The pseudocount weights are kept
/// both in log space and, through `pc_distribution`, as the linear-space
/// emission distribution that is mixed into the output. A state is immutable
/// once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextState {
    /// The name of the state
    pub name: String,
    /// The log prior weight of the state
    bias_weight: f64,
    /// W x K log context weights
    window_weights: Vec<Vec<f64>>,
    /// K log pseudocount weights
    pc_log_weights: Vec<f64>,
    /// K predicted pseudocount probabilities at the central column
    pc_distribution: Vec<f64>,
}

impl ContextState {
    /// Build a state from raw log-space weights, e.g. the weights of a trained CRF state.
    ///
    /// Negative infinities are clamped to `LOG_FLOOR`; NaN and positive
    /// infinity are rejected.
    pub fn new(
        bias_weight: f64,
        mut window_weights: Vec<Vec<f64>>,
        mut pc_log_weights: Vec<f64>,
    ) -> Result<Self> {
        if window_weights.len() % 2 == 0 {
            return Err(EvenWindowLengthError {
                length: window_weights.len(),
            }
            .into());
        }

        let size = pc_log_weights.len();
        for (row, weights) in window_weights.iter().enumerate() {
            if weights.len() != size || size == 0 {
                return Err(WeightVectorLengthError {
                    row,
                    found: weights.len(),
                    expected: size,
                }
                .into());
            }
        }

        let bias_weight = clamp_log_weight(bias_weight)?;
        for weight in window_weights
            .iter_mut()
            .flatten()
            .chain(pc_log_weights.iter_mut())
        {
            *weight = clamp_log_weight(*weight)?;
        }

        let pc_distribution = pseudocounts_from_log_weights(&pc_log_weights);

        Ok(Self {
            name: "".to_string(),
            bias_weight,
            window_weights,
            pc_log_weights,
            pc_distribution,
        })
    }

    /// Build a state from a context profile, using its central column as the
    /// pseudocount column.
    pub fn from_context_profile(
        profile: &ContextProfile,
        weight_center: f64,
        weight_decay: f64,
    ) -> Result<Self> {
        profile.validate()?;
        let mut state = Self::from_profile_and_column(
            profile.prior,
            &profile.probabilities,
            profile.center_column(),
            weight_center,
            weight_decay,
        )?;
        state.name = profile.name.clone();
        Ok(state)
    }

    /// Build a state from linear-space window probabilities and a separate
    /// pseudocount column.
    ///
    /// The context weight of residue a in column j is w_j * ln(p[j][a]), where
    /// the column weights decay geometrically away from the center:
    /// w_c = weight_center, w_{c±i} = weight_center * weight_decay^i.
    pub fn from_profile_and_column(
        prior: f64,
        probabilities: &[Vec<f64>],
        column: &[f64],
        weight_center: f64,
        weight_decay: f64,
    ) -> Result<Self> {
        let column_weights = column_weights(probabilities.len(), weight_center, weight_decay)?;

        let window_weights = probabilities
            .iter()
            .zip(column_weights)
            .map(|(probs, weight)| {
                let mut probs = probs.clone();
                probs.normalize();
                probs.iter().map(|p| weight * p.ln_or_floor()).collect()
            })
            .collect();

        let mut column = column.to_vec();
        column.normalize();
        let pc_log_weights = column.iter().map(|p| p.ln_or_floor()).collect();

        Self::new(prior.ln_or_floor(), window_weights, pc_log_weights)
    }

    /// The number of columns in the context window (W).
    pub fn window_length(&self) -> usize {
        self.window_weights.len()
    }

    /// The index of the central column.
    pub fn center(&self) -> usize {
        (self.window_length() - 1) / 2
    }

    /// The number of residues (K) the weights are defined over.
    pub fn alphabet_size(&self) -> usize {
        self.pc_log_weights.len()
    }

    pub fn bias_weight(&self) -> f64 {
        self.bias_weight
    }

    pub fn window_weights(&self) -> &[Vec<f64>] {
        &self.window_weights
    }

    pub fn pc_log_weights(&self) -> &[f64] {
        &self.pc_log_weights
    }

    pub fn pc_distribution(&self) -> &[f64] {
        &self.pc_distribution
    }
}

/// The per-column weights of a window of `length` columns.
pub fn column_weights(length: usize, weight_center: f64, weight_decay: f64) -> Result<Vec<f64>> {
    if length % 2 == 0 {
        return Err(EvenWindowLengthError { length }.into());
    }

    if !weight_center.is_finite() || !weight_decay.is_finite() || weight_decay < 0.0 {
        return Err(InvalidColumnWeightsError {
            weight_center,
            weight_decay,
        }
        .into());
    }

    let center = (length - 1) / 2;
    Ok((0..length)
        .map(|j| weight_center * weight_decay.powi(j.abs_diff(center) as i32))
        .collect())
}

/// Convert log pseudocount weights to a linear-space distribution.
///
/// The weights are shifted by their maximum before exponentiating.
fn pseudocounts_from_log_weights(pc_log_weights: &[f64]) -> Vec<f64> {
    let max = pc_log_weights
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut pc: Vec<f64> = pc_log_weights.iter().map(|w| (w - max).exp()).collect();
    pc.normalize();
    pc
}

fn clamp_log_weight(weight: f64) -> Result<f64> {
    if weight.is_nan() || weight == f64::INFINITY {
        Err(InvalidLogWeightError { value: weight }.into())
    } else if weight == f64::NEG_INFINITY {
        Ok(LOG_FLOOR)
    } else {
        Ok(weight)
    }
}
