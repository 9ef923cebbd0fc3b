use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("context profile {name} has an even number of columns: {length}")]
pub struct EvenContextLengthError {
    pub name: String,
    pub length: usize,
}

#[derive(Error, Debug)]
#[error("context profile {name} column {column} has {found} entries, expected {expected}")]
pub struct ContextColumnLengthError {
    pub name: String,
    pub column: usize,
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("context profile {name} has an invalid probability: {value}")]
pub struct InvalidProbabilityError {
    pub name: String,
    pub value: f64,
}

/// A representative sequence context: a window of linear-space residue
/// probabilities with a prior probability. These are the building
/// blocks that context library states are derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextProfile {
    /// The name of the profile
    #[serde(default)]
    pub name: String,
    /// Prior probability of the context
    pub prior: f64,
    /// W x K residue probabilities, W odd
    pub probabilities: Vec<Vec<f64>>,
}

impl ContextProfile {
    pub fn new(name: &str, prior: f64, probabilities: Vec<Vec<f64>>) -> Result<Self> {
        let profile = Self {
            name: name.to_string(),
            prior,
            probabilities,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check that the window has a center column, that the columns
    /// are equally wide, and that every probability is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let length = self.length();
        if length % 2 == 0 {
            return Err(EvenContextLengthError {
                name: self.name.clone(),
                length,
            }
            .into());
        }

        let width = self.probabilities[0].len();
        for (column, probs) in self.probabilities.iter().enumerate() {
            if probs.len() != width || width == 0 {
                return Err(ContextColumnLengthError {
                    name: self.name.clone(),
                    column,
                    found: probs.len(),
                    expected: width,
                }
                .into());
            }
        }

        if let Some(&value) = self
            .probabilities
            .iter()
            .flatten()
            .chain(std::iter::once(&self.prior))
            .find(|p| !p.is_finite() || **p < 0.0)
        {
            return Err(InvalidProbabilityError {
                name: self.name.clone(),
                value,
            }
            .into());
        }

        Ok(())
    }

    /// The number of columns (W).
    pub fn length(&self) -> usize {
        self.probabilities.len()
    }

    /// The index of the central column.
    pub fn center(&self) -> usize {
        (self.length() - 1) / 2
    }

    pub fn center_column(&self) -> &[f64] {
        &self.probabilities[self.center()]
    }
}
