use std::ops::Range;

use super::{Column, ContextState, Window};

/// The raw log-odds score of a window under one context state.
///
/// Sums window_weights[j][a] * x(j, a) over the window positions in
/// `columns`, where x is a one-hot indicator for residue columns and the
/// residue probabilities for frequency columns. Positions outside the input,
/// or outside the state's window, are skipped. Reserved symbols score zero.
pub fn context_score(state: &ContextState, window: &Window, columns: Range<usize>) -> f64 {
    let end = columns
        .end
        .min(window.length())
        .min(state.window_length());

    (columns.start..end)
        .filter_map(|j| Some((&state.window_weights()[j], window.column(j)?)))
        .map(|(weights, column)| match column {
            Column::Residue(residue) => weights.get(*residue as usize).copied().unwrap_or(0.0),
            Column::Frequencies(frequencies) => weights
                .iter()
                .zip(frequencies.iter())
                .map(|(w, p)| w * p)
                .sum(),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::context::ContextWindow;
    use crate::structs::{CountProfile, Sequence};
    use assert2::check;

    fn state() -> ContextState {
        ContextState::new(
            0.0,
            vec![
                vec![1.0, 2.0, 3.0, 4.0],
                vec![10.0, 20.0, 30.0, 40.0],
                vec![100.0, 200.0, 300.0, 400.0],
            ],
            vec![0.0; 4],
        )
        .unwrap()
    }

    #[test]
    fn test_sequence_score() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Dna, b"ACGT")?;
        let state = state();

        // A C G
        check!(context_score(&state, &seq.window(1, 3), 0..3) == 1.0 + 20.0 + 300.0);
        // _ A C
        check!(context_score(&state, &seq.window(0, 3), 0..3) == 10.0 + 200.0);
        // G T _
        check!(context_score(&state, &seq.window(3, 3), 0..3) == 3.0 + 40.0);
        // only the suffix of the window
        check!(context_score(&state, &seq.window(1, 3), 1..3) == 20.0 + 300.0);
        // ranges past the window end are clipped
        check!(context_score(&state, &seq.window(1, 3), 2..10) == 300.0);
        Ok(())
    }

    #[test]
    fn test_reserved_symbols_score_zero() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Dna, b"N-A")?;
        check!(context_score(&state(), &seq.window(1, 3), 0..3) == 100.0);
        Ok(())
    }

    #[test]
    fn test_profile_score() -> anyhow::Result<()> {
        let cp = CountProfile::new(
            Alphabet::Dna,
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.5, 0.5, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 1.0],
            ],
            vec![1.0; 3],
        )?;

        check!(context_score(&state(), &cp.window(1, 3), 0..3) == 1.0 + 15.0 + 400.0);
        Ok(())
    }

    #[test]
    fn test_one_hot_profile_matches_sequence() -> anyhow::Result<()> {
        let seq = Sequence::random(Alphabet::Dna, 20, 7);
        let cp = CountProfile::from_sequence(&seq);
        let state = state();

        for center in 0..seq.length {
            check!(
                context_score(&state, &seq.window(center, 3), 0..3)
                    == context_score(&state, &cp.window(center, 3), 0..3)
            );
        }
        Ok(())
    }
}
