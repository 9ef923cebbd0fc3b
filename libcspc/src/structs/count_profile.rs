use anyhow::Result;
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::util::{entropy, VecMath};

use super::Sequence;

#[derive(Error, Debug)]
#[error("count profile row {row} has {found} columns, expected {expected}")]
pub struct CountRowLengthError {
    pub row: usize,
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("count profile has {rows} rows but {neff} neff values")]
pub struct NeffLengthError {
    pub rows: usize,
    pub neff: usize,
}

#[derive(Error, Debug)]
#[error("invalid count in row {row}: {value}")]
pub struct InvalidCountError {
    pub row: usize,
    pub value: f64,
}

#[derive(Error, Debug)]
#[error("alignment has no sequences")]
pub struct EmptyAlignmentError;

#[derive(Error, Debug)]
#[error("aligned sequence {name} has length {found}, expected {expected}")]
pub struct RaggedAlignmentError {
    pub name: String,
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("aligned sequence {name} uses the {found} alphabet, expected {expected}")]
pub struct MixedAlphabetError {
    pub name: String,
    pub found: Alphabet,
    pub expected: Alphabet,
}

/// A profile of observed residue frequencies.
///
/// Each row holds the normalized residue frequencies of one column,
/// alongside the effective number of sequences (neff) observed there.
#[derive(Clone, Debug, PartialEq)]
pub struct CountProfile {
    pub name: String,
    alphabet: Alphabet,
    counts: Vec<Vec<f64>>,
    neff: Vec<f64>,
}

impl CountProfile {
    /// Build a count profile from raw counts. Every row is normalized,
    /// so both absolute counts and frequencies are accepted.
    pub fn new(alphabet: Alphabet, mut counts: Vec<Vec<f64>>, neff: Vec<f64>) -> Result<Self> {
        if counts.len() != neff.len() {
            return Err(NeffLengthError {
                rows: counts.len(),
                neff: neff.len(),
            }
            .into());
        }

        for (row_idx, row) in counts.iter_mut().enumerate() {
            if row.len() != alphabet.size() {
                return Err(CountRowLengthError {
                    row: row_idx,
                    found: row.len(),
                    expected: alphabet.size(),
                }
                .into());
            }

            if let Some(&value) = row.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(InvalidCountError {
                    row: row_idx,
                    value,
                }
                .into());
            }

            row.normalize();
        }

        if let Some((row_idx, &value)) = neff
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(InvalidCountError {
                row: row_idx,
                value,
            }
            .into());
        }

        Ok(Self {
            name: "".to_string(),
            alphabet,
            counts,
            neff,
        })
    }

    /// A count profile with a single observation per column.
    ///
    /// Residue columns are one-hot; ANY and gap columns are uniform.
    pub fn from_sequence(seq: &Sequence) -> Self {
        let size = seq.alphabet.size();

        let counts = seq
            .digital_bytes
            .iter()
            .map(|&residue| {
                let mut row = vec![0.0; size];
                if seq.alphabet.is_residue(residue) {
                    row[residue as usize] = 1.0;
                } else {
                    row.fill_uniform();
                }
                row
            })
            .collect();

        Self {
            name: seq.name.clone(),
            alphabet: seq.alphabet,
            counts,
            neff: vec![1.0; seq.length],
        }
    }

    /// Build a count profile from a set of aligned sequences.
    ///
    /// Sequences are weighted with Henikoff position-based weights.
    /// Gap and ANY characters are not counted. The neff of a column
    /// is the exponential of the entropy of its residue frequencies.
    pub fn from_alignment(seqs: &[Sequence]) -> Result<Self> {
        let first = seqs.first().ok_or(EmptyAlignmentError)?;
        let alphabet = first.alphabet;
        let length = first.length;
        let size = alphabet.size();

        for seq in seqs {
            if seq.alphabet != alphabet {
                return Err(MixedAlphabetError {
                    name: seq.name.clone(),
                    found: seq.alphabet,
                    expected: alphabet,
                }
                .into());
            }
            if seq.length != length {
                return Err(RaggedAlignmentError {
                    name: seq.name.clone(),
                    found: seq.length,
                    expected: length,
                }
                .into());
            }
        }

        let weights = henikoff_weights(seqs, alphabet);

        let mut counts = vec![vec![0.0; size]; length];
        let mut neff = vec![1.0; length];

        for col_idx in 0..length {
            let row = &mut counts[col_idx];

            seqs.iter().zip(&weights).for_each(|(seq, weight)| {
                let residue = seq.digital_bytes[col_idx];
                if alphabet.is_residue(residue) {
                    row[residue as usize] += weight;
                }
            });

            if row.normalize() {
                neff[col_idx] = entropy(row).exp();
            }
        }

        Ok(Self {
            name: first.name.clone(),
            alphabet,
            counts,
            neff,
        })
    }

    pub fn length(&self) -> usize {
        self.counts.len()
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.counts[idx]
    }

    pub fn neff(&self, idx: usize) -> f64 {
        self.neff[idx]
    }
}

/// Henikoff & Henikoff position-based sequence weights, normalized to sum to one.
fn henikoff_weights(seqs: &[Sequence], alphabet: Alphabet) -> Vec<f64> {
    let size = alphabet.size();
    let mut weights = vec![0.0; seqs.len()];
    let mut residue_counts = vec![0usize; size];

    for col_idx in 0..seqs[0].length {
        residue_counts.iter_mut().for_each(|c| *c = 0);

        seqs.iter()
            .map(|seq| seq.digital_bytes[col_idx])
            .filter(|&r| alphabet.is_residue(r))
            .for_each(|r| residue_counts[r as usize] += 1);

        let distinct = residue_counts.iter().filter(|&&c| c > 0).count();
        if distinct == 0 {
            continue;
        }

        seqs.iter().zip(weights.iter_mut()).for_each(|(seq, weight)| {
            let residue = seq.digital_bytes[col_idx];
            if alphabet.is_residue(residue) {
                *weight += 1.0 / (distinct * residue_counts[residue as usize]) as f64;
            }
        });
    }

    weights.normalize();
    weights
}
