use std::ops::Index;

use anyhow::Result;
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::structs::ContextProfile;

use super::ContextState;

#[derive(Error, Debug)]
#[error("context library has no states")]
pub struct EmptyLibraryError;

#[derive(Error, Debug)]
#[error("state {state} has window length {found}, expected {expected}")]
pub struct WindowLengthMismatchError {
    pub state: usize,
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("state {state} is {found} residues wide, the {alphabet} alphabet has {expected}")]
pub struct AlphabetSizeMismatchError {
    pub state: usize,
    pub found: usize,
    pub expected: usize,
    pub alphabet: Alphabet,
}

/// An ordered collection of context states that share one odd window length.
///
/// A library is read-only once built, so it can be shared across
/// threads without any locking.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextLibrary {
    alphabet: Alphabet,
    window_length: usize,
    states: Vec<ContextState>,
}

impl ContextLibrary {
    pub fn new(alphabet: Alphabet, states: Vec<ContextState>) -> Result<Self> {
        let window_length = states
            .first()
            .ok_or(EmptyLibraryError)?
            .window_length();

        for (idx, state) in states.iter().enumerate() {
            if state.window_length() != window_length {
                return Err(WindowLengthMismatchError {
                    state: idx,
                    found: state.window_length(),
                    expected: window_length,
                }
                .into());
            }

            if state.alphabet_size() != alphabet.size() {
                return Err(AlphabetSizeMismatchError {
                    state: idx,
                    found: state.alphabet_size(),
                    expected: alphabet.size(),
                    alphabet,
                }
                .into());
            }
        }

        Ok(Self {
            alphabet,
            window_length,
            states,
        })
    }

    /// Build a library with one state per context profile.
    pub fn from_context_profiles(
        alphabet: Alphabet,
        profiles: &[ContextProfile],
        weight_center: f64,
        weight_decay: f64,
    ) -> Result<Self> {
        let states = profiles
            .iter()
            .map(|p| ContextState::from_context_profile(p, weight_center, weight_decay))
            .collect::<Result<Vec<_>>>()?;

        Self::new(alphabet, states)
    }

    /// The number of states in the library.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for a successfully constructed library.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// The index of the central window column.
    pub fn center(&self) -> usize {
        (self.window_length - 1) / 2
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn states(&self) -> &[ContextState] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContextState> {
        self.states.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&ContextState> {
        self.states.get(idx)
    }
}

impl Index<usize> for ContextLibrary {
    type Output = ContextState;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.states[idx]
    }
}

impl<'a> IntoIterator for &'a ContextLibrary {
    type Item = &'a ContextState;
    type IntoIter = std::slice::Iter<'a, ContextState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
