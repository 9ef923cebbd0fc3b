use std::cell::RefCell;
use std::ops::Range;

use anyhow::Result;
use log::info;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
use thiserror::Error;
use thread_local::ThreadLocal;

use crate::alphabet::Alphabet;
use crate::structs::{CountProfile, PoGraph, Profile, Sequence};
use crate::util::VecMath;

use super::library::EmptyLibraryError;
use super::{posterior_probs, ContextLibrary, ContextWindow};

/// Rows that already sum to one within this tolerance are not renormalized.
const ROW_SUM_TOLERANCE: f64 = 1e-12;

#[derive(Error, Debug)]
#[error("input has no positions")]
pub struct EmptyInputError;

#[derive(Error, Debug)]
#[error("input has length {input}, but the output profile has length {profile}")]
pub struct ProfileLengthMismatchError {
    pub input: usize,
    pub profile: usize,
}

#[derive(Error, Debug)]
#[error("{what} uses the {found} alphabet, but the library uses {expected}")]
pub struct AlphabetMismatchError {
    pub what: String,
    pub found: Alphabet,
    pub expected: Alphabet,
}

#[derive(Error, Debug)]
#[error("invalid window column range {start}..{end} for a window of length {window_length}")]
pub struct InvalidColumnRangeError {
    pub start: usize,
    pub end: usize,
    pub window_length: usize,
}

/// Adds context-specific pseudocounts to an input using a context library.
///
/// For every input position, the window around it is scored against each
/// library state, the scores are turned into a posterior over states, and
/// the output row is the posterior-weighted mixture of the state pseudocount
/// distributions.
#[derive(Clone, Debug)]
pub struct LibraryPseudocounts<'a> {
    library: &'a ContextLibrary,
    columns: Range<usize>,
    include_bias: bool,
    threaded: bool,
}

impl<'a> LibraryPseudocounts<'a> {
    pub fn new(library: &'a ContextLibrary) -> Self {
        Self {
            library,
            columns: 0..library.window_length(),
            include_bias: false,
            threaded: true,
        }
    }

    /// Only score the window positions in `columns`.
    pub fn with_columns(mut self, columns: Range<usize>) -> Result<Self> {
        if columns.is_empty() || columns.end > self.library.window_length() {
            return Err(InvalidColumnRangeError {
                start: columns.start,
                end: columns.end,
                window_length: self.library.window_length(),
            }
            .into());
        }

        self.columns = columns;
        Ok(self)
    }

    /// Add each state's bias weight to its window score.
    pub fn with_bias_weights(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    /// Compute the output rows in parallel, or on the calling thread.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    pub fn library(&self) -> &ContextLibrary {
        self.library
    }

    pub fn add_to_sequence(&self, seq: &Sequence, profile: &mut Profile) -> Result<()> {
        info!("adding library pseudocounts to sequence {}", seq.name);
        self.compute(seq, profile)
    }

    pub fn add_to_count_profile(&self, cp: &CountProfile, profile: &mut Profile) -> Result<()> {
        info!("adding library pseudocounts to count profile {}", cp.name);
        self.compute(cp, profile)
    }

    pub fn add_to_po_graph(&self, graph: &PoGraph, profile: &mut Profile) -> Result<()> {
        info!("adding library pseudocounts to partial-order graph {}", graph.name);
        self.compute(graph, profile)
    }

    /// Allocate a profile for `input` and fill it with pseudocounts.
    pub fn pseudocounts<W: ContextWindow + ?Sized>(&self, input: &W) -> Result<Profile> {
        let mut profile = Profile::new(input.alphabet(), input.length());
        profile.name = input.name().to_string();
        self.compute(input, &mut profile)?;
        Ok(profile)
    }

    /// Fill each row of `profile` with the pseudocounts of the matching input position.
    ///
    /// Every precondition is checked before any row is written.
    pub fn compute<W: ContextWindow + ?Sized>(&self, input: &W, profile: &mut Profile) -> Result<()> {
        self.check(input, profile)?;

        if self.threaded {
            let thread_local_posterior: ThreadLocal<RefCell<Vec<f64>>> = ThreadLocal::new();

            profile
                .rows_mut()
                .par_iter_mut()
                .enumerate()
                .for_each(|(center, row)| {
                    let mut posterior = thread_local_posterior
                        .get_or(|| RefCell::new(Vec::with_capacity(self.library.len())))
                        .borrow_mut();

                    self.fill_row(input, center, row, &mut posterior);
                });
        } else {
            let mut posterior = Vec::with_capacity(self.library.len());

            profile
                .rows_mut()
                .iter_mut()
                .enumerate()
                .for_each(|(center, row)| self.fill_row(input, center, row, &mut posterior));
        }

        Ok(())
    }

    fn check<W: ContextWindow + ?Sized>(&self, input: &W, profile: &Profile) -> Result<()> {
        if self.library.is_empty() {
            return Err(EmptyLibraryError.into());
        }

        if input.length() == 0 {
            return Err(EmptyInputError.into());
        }

        if input.length() != profile.length() {
            return Err(ProfileLengthMismatchError {
                input: input.length(),
                profile: profile.length(),
            }
            .into());
        }

        let expected = self.library.alphabet();
        for (what, found) in [("input", input.alphabet()), ("profile", profile.alphabet())] {
            if found != expected {
                return Err(AlphabetMismatchError {
                    what: what.to_string(),
                    found,
                    expected,
                }
                .into());
            }
        }

        Ok(())
    }

    fn fill_row<W: ContextWindow + ?Sized>(
        &self,
        input: &W,
        center: usize,
        row: &mut [f64],
        posterior: &mut Vec<f64>,
    ) {
        let window = input.window(center, self.library.window_length());
        posterior_probs(
            self.library,
            &window,
            self.columns.clone(),
            self.include_bias,
            posterior,
        );

        row.iter_mut().for_each(|p| *p = 0.0);
        posterior
            .iter()
            .zip(self.library)
            .for_each(|(weight, state)| {
                row.iter_mut()
                    .zip(state.pc_distribution())
                    .for_each(|(p, pc)| *p += weight * pc);
            });

        if (row.total() - 1.0).abs() > ROW_SUM_TOLERANCE {
            row.normalize();
        }
    }
}
