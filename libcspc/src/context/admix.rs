use anyhow::Result;

use crate::structs::{CountProfile, Profile, Sequence};
use crate::util::VecMath;

use super::pseudocounts::{AlphabetMismatchError, ProfileLengthMismatchError};

/// Decides how much of the pseudocount distribution is mixed into the
/// observed counts of a column, given the column's effective number of
/// sequences.
pub trait Admix: Sync {
    /// The admixture coefficient, in [0, 1].
    fn tau(&self, neff: f64) -> f64;
}

/// The same admixture for every column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantAdmix {
    pub pca: f64,
}

impl Admix for ConstantAdmix {
    fn tau(&self, _neff: f64) -> f64 {
        self.pca.clamp(0.0, 1.0)
    }
}

/// tau = pca * (pcb + 1) / (pcb + neff)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CsBlastAdmix {
    pub pca: f64,
    pub pcb: f64,
}

impl Default for CsBlastAdmix {
    fn default() -> Self {
        Self { pca: 0.9, pcb: 12.0 }
    }
}

impl Admix for CsBlastAdmix {
    fn tau(&self, neff: f64) -> f64 {
        (self.pca * (self.pcb + 1.0) / (self.pcb + neff)).clamp(0.0, 1.0)
    }
}

/// tau = pca / (1 + (neff / pcb)^pcc)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HhsuiteAdmix {
    pub pca: f64,
    pub pcb: f64,
    pub pcc: f64,
}

impl Default for HhsuiteAdmix {
    fn default() -> Self {
        Self {
            pca: 1.0,
            pcb: 1.5,
            pcc: 1.0,
        }
    }
}

impl Admix for HhsuiteAdmix {
    fn tau(&self, neff: f64) -> f64 {
        (self.pca / (1.0 + (neff / self.pcb).powf(self.pcc))).clamp(0.0, 1.0)
    }
}

fn check_lengths(input: usize, pseudocounts: &Profile) -> Result<()> {
    if input != pseudocounts.length() {
        return Err(ProfileLengthMismatchError {
            input,
            profile: pseudocounts.length(),
        }
        .into());
    }
    Ok(())
}

/// Mix pseudocounts into the one-hot counts of a sequence, with neff = 1.
///
/// Positions that hold a reserved symbol take the pseudocount row as-is.
pub fn admix_sequence<A: Admix + ?Sized>(
    seq: &Sequence,
    pseudocounts: &Profile,
    admix: &A,
) -> Result<Profile> {
    check_lengths(seq.length, pseudocounts)?;
    if seq.alphabet != pseudocounts.alphabet() {
        return Err(AlphabetMismatchError {
            what: "sequence".to_string(),
            found: seq.alphabet,
            expected: pseudocounts.alphabet(),
        }
        .into());
    }

    let tau = admix.tau(1.0);
    let mut profile = pseudocounts.clone();
    profile.name = seq.name.clone();

    profile
        .rows_mut()
        .iter_mut()
        .zip(&seq.digital_bytes)
        .filter(|(_, &residue)| seq.alphabet.is_residue(residue))
        .for_each(|(row, &residue)| {
            row.scale(tau);
            row[residue as usize] += 1.0 - tau;
            row.normalize();
        });

    Ok(profile)
}

/// Mix pseudocounts into the observed frequencies of a count profile,
/// with the admixture of each column driven by its neff.
pub fn admix_count_profile<A: Admix + ?Sized>(
    cp: &CountProfile,
    pseudocounts: &Profile,
    admix: &A,
) -> Result<Profile> {
    check_lengths(cp.length(), pseudocounts)?;
    if cp.alphabet() != pseudocounts.alphabet() {
        return Err(AlphabetMismatchError {
            what: "count profile".to_string(),
            found: cp.alphabet(),
            expected: pseudocounts.alphabet(),
        }
        .into());
    }

    let mut profile = pseudocounts.clone();
    profile.name = cp.name.clone();

    profile
        .rows_mut()
        .iter_mut()
        .enumerate()
        .for_each(|(idx, row)| {
            let tau = admix.tau(cp.neff(idx));
            row.iter_mut()
                .zip(cp.column(idx))
                .for_each(|(p, observed)| *p = (1.0 - tau) * observed + tau * *p);
            row.normalize();
        });

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use assert2::check;

    fn uniform_pseudocounts(length: usize) -> Profile {
        let mut profile = Profile::new(Alphabet::Dna, length);
        profile.rows_mut().iter_mut().for_each(|r| r.fill_uniform());
        profile
    }

    #[test]
    fn test_tau() {
        check!(ConstantAdmix { pca: 0.4 }.tau(100.0) == 0.4);
        check!(ConstantAdmix { pca: 4.0 }.tau(1.0) == 1.0);

        let cs = CsBlastAdmix { pca: 0.9, pcb: 12.0 };
        check!((cs.tau(1.0) - 0.9).abs() < 1e-12);
        check!(cs.tau(10.0) < cs.tau(2.0));

        let hh = HhsuiteAdmix { pca: 1.0, pcb: 1.5, pcc: 1.0 };
        check!((hh.tau(1.5) - 0.5).abs() < 1e-12);
        check!(hh.tau(0.0) == 1.0);
    }

    #[test]
    fn test_admix_sequence() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Dna, b"AN")?;
        let pc = uniform_pseudocounts(2);

        let profile = admix_sequence(&seq, &pc, &ConstantAdmix { pca: 0.2 })?;
        check!((profile[0][0] - 0.85).abs() < 1e-12);
        check!((profile[0][1] - 0.05).abs() < 1e-12);
        // reserved symbols keep the pseudocounts
        check!(profile.row(1) == &[0.25; 4]);
        check!(profile.is_normalized(1e-12));
        Ok(())
    }

    #[test]
    fn test_admix_count_profile() -> anyhow::Result<()> {
        let cp = CountProfile::new(
            Alphabet::Dna,
            vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 1.0]],
            vec![1.5, 1000.0],
        )?;
        let pc = uniform_pseudocounts(2);
        let admix = HhsuiteAdmix::default();

        let profile = admix_count_profile(&cp, &pc, &admix)?;
        check!((profile[0][0] - (0.5 + 0.5 * 0.25)).abs() < 1e-12);
        // a deep column barely takes any pseudocounts
        check!(profile[1][3] > 0.99);
        check!(profile.is_normalized(1e-12));
        Ok(())
    }

    #[test]
    fn test_admix_length_mismatch() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Dna, b"ACG")?;
        let err = admix_sequence(&seq, &uniform_pseudocounts(2), &ConstantAdmix { pca: 0.5 })
            .unwrap_err();
        check!(err.downcast_ref::<ProfileLengthMismatchError>().is_some());
        Ok(())
    }
}
