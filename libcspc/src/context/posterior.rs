use std::ops::Range;

use log::debug;

use crate::util::{VecMath, VecUtils};

use super::{context_score, ContextLibrary, Window};

/// Compute the posterior probability of each library state given a window.
///
/// The state scores are shifted by their maximum before exponentiating, so
/// the largest term is always exp(0) = 1. The result is written to
/// `posterior`, which is resized to the library size. If the scores can't
/// be normalized, the uniform distribution is written instead and false is
/// returned.
pub fn posterior_probs(
    library: &ContextLibrary,
    window: &Window,
    columns: Range<usize>,
    include_bias: bool,
    posterior: &mut Vec<f64>,
) -> bool {
    posterior.resize_and_reset(library.len(), 0.0);

    posterior
        .iter_mut()
        .zip(library)
        .for_each(|(score, state)| {
            *score = context_score(state, window, columns.clone());
            if include_bias {
                *score += state.bias_weight();
            }
        });

    let max = posterior.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !max.is_finite() {
        debug!("non-finite context score: {max}, using a uniform posterior");
        posterior.fill_uniform();
        return false;
    }

    posterior
        .iter_mut()
        .for_each(|score| *score = (*score - max).exp());

    if !posterior.normalize() {
        debug!("posterior could not be normalized, using a uniform posterior");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::context::{ContextState, ContextWindow};
    use crate::structs::Sequence;
    use assert2::check;

    fn flat_state(weight: f64, bias: f64) -> ContextState {
        ContextState::new(bias, vec![vec![weight; 4]; 3], vec![0.0; 4]).unwrap()
    }

    #[test]
    fn test_single_state_is_certain() -> anyhow::Result<()> {
        let library = ContextLibrary::new(Alphabet::Dna, vec![flat_state(-3.0, 0.0)])?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"ACGT")?;
        let mut posterior = vec![];

        for center in 0..seq.length {
            check!(posterior_probs(
                &library,
                &seq.window(center, 3),
                0..3,
                false,
                &mut posterior
            ));
            check!(posterior == vec![1.0]);
        }
        Ok(())
    }

    #[test]
    fn test_large_score_gap_is_stable() -> anyhow::Result<()> {
        // scores differ by 500 log units over a full window
        let library = ContextLibrary::new(
            Alphabet::Dna,
            vec![flat_state(0.0, 0.0), flat_state(-500.0 / 3.0, 0.0)],
        )?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"AAA")?;
        let mut posterior = vec![];

        check!(posterior_probs(
            &library,
            &seq.window(1, 3),
            0..3,
            false,
            &mut posterior
        ));
        check!(posterior.iter().all(|p| p.is_finite()));
        check!(posterior[0] >= 0.999);
        check!((posterior.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_huge_scores_do_not_overflow() -> anyhow::Result<()> {
        let library = ContextLibrary::new(
            Alphabet::Dna,
            vec![flat_state(1000.0, 0.0), flat_state(999.0, 0.0)],
        )?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"AAA")?;
        let mut posterior = vec![];

        check!(posterior_probs(
            &library,
            &seq.window(1, 3),
            0..3,
            false,
            &mut posterior
        ));
        // the scores differ by 3 over a full window
        let expected = 1.0 / (1.0 + (-3.0f64).exp());
        check!((posterior[0] - expected).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_equal_scores_are_uniform() -> anyhow::Result<()> {
        let library = ContextLibrary::new(
            Alphabet::Dna,
            vec![flat_state(-708.0, 0.0); 4],
        )?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"NNN")?;
        let mut posterior = vec![0.3; 10];

        check!(posterior_probs(
            &library,
            &seq.window(1, 3),
            0..3,
            false,
            &mut posterior
        ));
        check!(posterior == vec![0.25; 4]);
        Ok(())
    }

    #[test]
    fn test_bias_weights() -> anyhow::Result<()> {
        let library = ContextLibrary::new(
            Alphabet::Dna,
            vec![flat_state(0.0, 0.5f64.ln()), flat_state(0.0, 0.25f64.ln())],
        )?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"ACG")?;
        let window = seq.window(1, 3);
        let mut posterior = vec![];

        posterior_probs(&library, &window, 0..3, false, &mut posterior);
        check!(posterior == vec![0.5, 0.5]);

        posterior_probs(&library, &window, 0..3, true, &mut posterior);
        check!((posterior[0] - 2.0 / 3.0).abs() < 1e-12);
        check!((posterior[1] - 1.0 / 3.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_non_finite_scores_fall_back_to_uniform() -> anyhow::Result<()> {
        let library = ContextLibrary::new(
            Alphabet::Dna,
            vec![flat_state(f64::MAX, 0.0), flat_state(0.0, 0.0)],
        )?;
        let seq = Sequence::from_utf8(Alphabet::Dna, b"AAA")?;
        let mut posterior = vec![];

        // f64::MAX summed over three columns overflows to +inf
        check!(!posterior_probs(
            &library,
            &seq.window(1, 3),
            0..3,
            false,
            &mut posterior
        ));
        check!(posterior == vec![0.5, 0.5]);
        Ok(())
    }
}
