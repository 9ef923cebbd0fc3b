use std::fmt;
use std::fmt::Formatter;
use std::ops::Index;

use serde::Serialize;

use crate::alphabet::Alphabet;
use crate::util::VecMath;

/// A position-specific residue distribution: one K-length row per input position.
///
/// This is the output buffer of the pseudocount computations. It is owned
/// by the caller and filled in place.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Profile {
    /// The name of the profile
    pub name: String,
    /// The residue alphabet of the rows
    pub alphabet: Alphabet,
    rows: Vec<Vec<f64>>,
}

impl Profile {
    /// A profile of `length` zeroed rows.
    pub fn new(alphabet: Alphabet, length: usize) -> Self {
        Self {
            name: "".to_string(),
            alphabet,
            rows: vec![vec![0.0; alphabet.size()]; length],
        }
    }

    pub fn length(&self) -> usize {
        self.rows.len()
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.rows
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        &self.rows[idx]
    }

    pub fn row_mut(&mut self, idx: usize) -> &mut [f64] {
        &mut self.rows[idx]
    }

    /// Returns true if every row is a probability distribution within `tolerance`.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(|&p| p >= 0.0) && (row.total() - 1.0).abs() <= tolerance)
    }

    /// The most probable residue of each row, in UTF8.
    pub fn consensus(&self) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| {
                row.argmax()
                    .and_then(|a| self.alphabet.itoc(a as u8))
                    .unwrap_or(b'?')
            })
            .collect()
    }
}

impl Index<usize> for Profile {
    type Output = [f64];

    fn index(&self, idx: usize) -> &Self::Output {
        &self.rows[idx]
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#")?;
        for letter in self.alphabet.letters() {
            write!(f, "\t{letter}")?;
        }
        writeln!(f)?;

        for (idx, row) in self.rows.iter().enumerate() {
            write!(f, "{}", idx + 1)?;
            for p in row {
                write!(f, "\t{p:.4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let profile = Profile::new(Alphabet::Dna, 3);
        assert_eq!(profile.length(), 3);
        assert!(profile.rows().iter().all(|r| r == &vec![0.0; 4]));
        assert!(!profile.is_normalized(1e-6));
    }

    #[test]
    fn test_consensus_and_display() {
        let mut profile = Profile::new(Alphabet::Dna, 2);
        profile.row_mut(0).copy_from_slice(&[0.7, 0.1, 0.1, 0.1]);
        profile.row_mut(1).copy_from_slice(&[0.1, 0.1, 0.1, 0.7]);

        assert!(profile.is_normalized(1e-9));
        assert_eq!(profile.consensus(), b"AT".to_vec());
        assert_eq!(profile[1][3], 0.7);

        let text = profile.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#\tA\tC\tG\tT");
        assert_eq!(lines[1], "1\t0.7000\t0.1000\t0.1000\t0.1000");
    }
}
