use std::borrow::Cow;
use std::ops::Range;

use crate::alphabet::Alphabet;
use crate::structs::po_graph::Direction;
use crate::structs::{CountProfile, PoGraph, Sequence};

/// The observed evidence in one window column.
#[derive(Clone, Debug, PartialEq)]
pub enum Column<'a> {
    /// A single observed symbol in digital form. Reserved symbols
    /// (ANY, gap, end gap) are allowed and carry no context weight.
    Residue(u8),
    /// A K-length residue probability vector
    Frequencies(Cow<'a, [f64]>),
}

/// A centered view of an input: one optional column per window position.
///
/// A column is None when it falls outside the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Window<'a> {
    columns: Vec<Option<Column<'a>>>,
}

impl<'a> Window<'a> {
    pub fn new(columns: Vec<Option<Column<'a>>>) -> Self {
        Self { columns }
    }

    /// The number of window positions (W).
    pub fn length(&self) -> usize {
        self.columns.len()
    }

    /// The index of the central window position.
    pub fn center(&self) -> usize {
        self.columns.len().saturating_sub(1) / 2
    }

    pub fn column(&self, idx: usize) -> Option<&Column<'a>> {
        self.columns.get(idx).and_then(|c| c.as_ref())
    }

    /// The span of window positions that are inside the input.
    pub fn valid_columns(&self) -> Range<usize> {
        let start = self
            .columns
            .iter()
            .position(|c| c.is_some())
            .unwrap_or(self.columns.len());
        let end = self
            .columns
            .iter()
            .rposition(|c| c.is_some())
            .map_or(start, |idx| idx + 1);
        start..end
    }
}

/// The one capability the scoring code needs from an input: a window of
/// columns centered at a position. Every input kind that pseudocounts
/// can be added to implements this.
pub trait ContextWindow: Sync {
    /// The number of positions in the input.
    fn length(&self) -> usize;

    fn alphabet(&self) -> Alphabet;

    /// A name for the input, used to name the output profile.
    fn name(&self) -> &str {
        ""
    }

    /// The window of `window_length` columns centered at `center`.
    fn window(&self, center: usize, window_length: usize) -> Window<'_>;
}

/// Build a window over a linear input of `length` positions.
fn linear_window<'a, F>(length: usize, center: usize, window_length: usize, column: F) -> Window<'a>
where
    F: Fn(usize) -> Column<'a>,
{
    let half = window_length.saturating_sub(1) / 2;
    let columns = (0..window_length)
        .map(|j| {
            (center + j)
                .checked_sub(half)
                .filter(|&idx| idx < length)
                .map(&column)
        })
        .collect();

    Window::new(columns)
}

impl ContextWindow for Sequence {
    fn length(&self) -> usize {
        self.length
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self, center: usize, window_length: usize) -> Window<'_> {
        linear_window(self.length, center, window_length, |idx| {
            Column::Residue(self.digital_bytes[idx])
        })
    }
}

impl ContextWindow for CountProfile {
    fn length(&self) -> usize {
        self.length()
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self, center: usize, window_length: usize) -> Window<'_> {
        linear_window(self.length(), center, window_length, |idx| {
            Column::Frequencies(Cow::Borrowed(self.column(idx)))
        })
    }
}

impl ContextWindow for PoGraph {
    fn length(&self) -> usize {
        self.length()
    }

    fn alphabet(&self) -> Alphabet {
        self.alphabet()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self, center: usize, window_length: usize) -> Window<'_> {
        if center >= self.length() {
            return Window::new(vec![None; window_length]);
        }

        let half = window_length.saturating_sub(1) / 2;
        let to_column = |c: Option<Vec<f64>>| c.map(|f| Column::Frequencies(Cow::Owned(f)));

        let mut columns: Vec<Option<Column>> = self
            .neighborhood(center, half, Direction::Predecessors)
            .into_iter()
            .rev()
            .map(to_column)
            .collect();

        columns.push(Some(Column::Frequencies(Cow::Borrowed(
            &self.node(center).frequencies,
        ))));

        columns.extend(
            self.neighborhood(center, half, Direction::Successors)
                .into_iter()
                .map(to_column),
        );

        Window::new(columns)
    }
}
