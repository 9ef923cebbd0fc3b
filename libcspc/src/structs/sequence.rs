use seq_io::fasta::{Reader, Record};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

use crate::alphabet::{Alphabet, UTF8_SPACE};
use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("unknown UTF8 sequence byte: {byte} ({alphabet} alphabet)")]
pub struct UnknownUtf8SequenceByteError {
    pub byte: u8,
    pub alphabet: Alphabet,
}

#[derive(Error, Debug)]
#[error("unknown digital sequence byte: {byte} ({alphabet} alphabet)")]
pub struct UnknownDigitalSequenceByteError {
    pub byte: u8,
    pub alphabet: Alphabet,
}

/// This holds the both the "digital" data and string data of a biological sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The name of the sequence
    pub name: String,
    /// The sequence details. If the sequence comes from a fasta, this
    /// is the information following the sequence name in the header
    pub details: Option<String>,
    /// The alphabet the digital bytes are drawn from
    pub alphabet: Alphabet,
    /// The length of the sequence
    pub length: usize,
    /// The "digital" data of the sequence. These are the string bytes
    /// mapped to [0..K) for residues, plus the reserved ANY/GAP indices
    pub digital_bytes: Vec<u8>,
    /// The string data of the sequence. These are the UTF8 bytes
    /// that make up the sequence in the "normal" alphabet
    pub utf8_bytes: Vec<u8>,
}

impl Sequence {
    pub fn from_fasta<P: AsRef<Path>>(path: P, alphabet: Alphabet) -> Result<Vec<Self>> {
        let mut seqs: Vec<Self> = vec![];

        let mut reader = Reader::from_path(&path).with_context(|| {
            format!(
                "failed to open fasta file: {}",
                path.as_ref().to_string_lossy()
            )
        })?;

        while let Some(record) = reader.next() {
            let record = record.with_context(|| "failed to read fasta record")?;
            let mut header_bytes = record.head().to_vec();
            let first_space_idx = header_bytes.iter().position(|&b| b == UTF8_SPACE);

            let error_context: fn() -> &'static str =
                || "failed to create String from fasta header bytes";

            let (name, details) = match first_space_idx {
                Some(idx) => {
                    let details_bytes = header_bytes.split_off(idx + 1);
                    header_bytes.pop();
                    (
                        String::from_utf8(header_bytes).with_context(error_context)?,
                        Some(String::from_utf8(details_bytes).with_context(error_context)?),
                    )
                }
                None => (
                    String::from_utf8(header_bytes).with_context(error_context)?,
                    None,
                ),
            };

            let utf8_bytes: Vec<u8> = record.seq_lines().flatten().copied().collect();

            let mut seq = Self::from_utf8(alphabet, &utf8_bytes)?;
            seq.name = name;
            seq.details = details;
            seqs.push(seq);
        }
        Ok(seqs)
    }

    pub fn from_digital(alphabet: Alphabet, bytes: &[u8]) -> Result<Self> {
        let utf8_bytes = bytes
            .iter()
            .map(|&digital_byte| {
                alphabet
                    .itoc(digital_byte)
                    .ok_or(UnknownDigitalSequenceByteError {
                        byte: digital_byte,
                        alphabet,
                    })
            })
            .collect::<std::result::Result<Vec<u8>, _>>()?;

        Ok(Sequence {
            name: "".to_string(),
            details: None,
            alphabet,
            length: bytes.len(),
            digital_bytes: bytes.to_vec(),
            utf8_bytes,
        })
    }

    pub fn from_utf8(alphabet: Alphabet, bytes: &[u8]) -> Result<Self> {
        let digital_bytes = bytes
            .iter()
            .map(|&utf8_byte| {
                alphabet
                    .ctoi(utf8_byte)
                    .ok_or(UnknownUtf8SequenceByteError {
                        byte: utf8_byte,
                        alphabet,
                    })
            })
            .collect::<std::result::Result<Vec<u8>, _>>()?;

        Ok(Sequence {
            name: "".to_string(),
            details: None,
            alphabet,
            length: digital_bytes.len(),
            digital_bytes,
            utf8_bytes: bytes.to_vec(),
        })
    }

    /// Produce a sequence of uniformly drawn residues from a seeded generator.
    pub fn random(alphabet: Alphabet, length: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let digital_bytes: Vec<u8> = (0..length)
            .map(|_| rng.gen_range(0..alphabet.size()) as u8)
            .collect();

        let utf8_bytes = digital_bytes
            .iter()
            .map(|&b| alphabet.itoc(b).unwrap_or(b'?'))
            .collect();

        Sequence {
            name: format!("random-{seed}"),
            details: None,
            alphabet,
            length,
            digital_bytes,
            utf8_bytes,
        }
    }

    /// The digital residue at position `idx` (0-based).
    pub fn residue(&self, idx: usize) -> u8 {
        self.digital_bytes[idx]
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, ">{}", self.name)?;

        if let Some(ref details) = self.details {
            write!(f, " {details}")?
        };

        writeln!(f)?;

        let mut iter = self.utf8_bytes.chunks(80).peekable();

        while let Some(byte_chunk) = iter.next() {
            match std::str::from_utf8(byte_chunk) {
                Ok(seq_line) => {
                    write!(f, "{}", seq_line)?;
                    if iter.peek().is_some() {
                        // if we're not on the last
                        // line, add a linebreak
                        writeln!(f)?;
                    }
                }
                Err(_) => return Err(std::fmt::Error),
            }
        }
        Ok(())
    }
}

impl Debug for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.utf8_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_utf8() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Amino, b"ACDxY-")?;
        assert_eq!(seq.length, 6);
        assert_eq!(seq.digital_bytes, vec![0, 1, 2, 20, 19, 21]);
        assert_eq!(seq.residue(4), 19);
        Ok(())
    }

    #[test]
    fn test_from_utf8_unknown_byte() {
        let err = Sequence::from_utf8(Alphabet::Dna, b"ACGE").unwrap_err();
        let err = err
            .downcast_ref::<UnknownUtf8SequenceByteError>()
            .expect("wrong error type");
        assert_eq!(err.byte, b'E');
    }

    #[test]
    fn test_from_digital() -> anyhow::Result<()> {
        let seq = Sequence::from_digital(Alphabet::Dna, &[0, 1, 2, 3, 4])?;
        assert_eq!(seq.utf8_bytes, b"ACGTN".to_vec());
        assert!(Sequence::from_digital(Alphabet::Dna, &[9]).is_err());
        Ok(())
    }

    #[test]
    fn test_random_is_seeded() {
        let a = Sequence::random(Alphabet::Amino, 100, 7);
        let b = Sequence::random(Alphabet::Amino, 100, 7);
        let c = Sequence::random(Alphabet::Amino, 100, 8);
        assert!(a == b);
        assert!(a != c);
        assert!(a.digital_bytes.iter().all(|&r| Alphabet::Amino.is_residue(r)));
    }

    #[test]
    fn test_from_fasta() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, ">seq1 first sequence")?;
        writeln!(file, "ACGT")?;
        writeln!(file, "ACG")?;
        writeln!(file, ">seq2")?;
        writeln!(file, "nnac")?;
        file.flush()?;

        let seqs = Sequence::from_fasta(file.path(), Alphabet::Dna)?;
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].name, "seq1");
        assert_eq!(seqs[0].details.as_deref(), Some("first sequence"));
        assert_eq!(seqs[0].length, 7);
        assert_eq!(seqs[1].name, "seq2");
        assert_eq!(seqs[1].details, None);
        assert_eq!(seqs[1].digital_bytes, vec![4, 4, 0, 1]);
        Ok(())
    }
}
