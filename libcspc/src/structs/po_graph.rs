use std::collections::BTreeMap;

use anyhow::Result;
use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::util::VecMath;

use super::{CountProfile, Sequence};

#[derive(Error, Debug)]
#[error("node column has {found} entries, expected {expected}")]
pub struct NodeColumnLengthError {
    pub found: usize,
    pub expected: usize,
}

#[derive(Error, Debug)]
#[error("invalid frequency in node column: {value}")]
pub struct InvalidNodeFrequencyError {
    pub value: f64,
}

#[derive(Error, Debug)]
#[error("edge {from} -> {to} is not a forward edge between existing nodes (graph has {num_nodes} nodes)")]
pub struct InvalidEdgeError {
    pub from: usize,
    pub to: usize,
    pub num_nodes: usize,
}

#[derive(Error, Debug)]
#[error("edge {from} -> {to} has an invalid weight: {weight}")]
pub struct InvalidEdgeWeightError {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Which way to walk from a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Predecessors,
    Successors,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoNode {
    /// Normalized residue frequencies emitted at this node
    pub frequencies: Vec<f64>,
    predecessors: Vec<(usize, f64)>,
    successors: Vec<(usize, f64)>,
}

impl PoNode {
    pub fn predecessors(&self) -> &[(usize, f64)] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[(usize, f64)] {
        &self.successors
    }

    fn edges(&self, direction: Direction) -> &[(usize, f64)] {
        match direction {
            Direction::Predecessors => &self.predecessors,
            Direction::Successors => &self.successors,
        }
    }
}

/// A partial-order graph of residue columns.
///
/// Edges always point from a lower to a higher node index, so the
/// node order is a topological order and the graph is acyclic.
#[derive(Clone, Debug, PartialEq)]
pub struct PoGraph {
    pub name: String,
    alphabet: Alphabet,
    nodes: Vec<PoNode>,
}

impl PoGraph {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            name: "".to_string(),
            alphabet,
            nodes: vec![],
        }
    }

    /// A linear chain with one node per count profile column.
    pub fn from_count_profile(profile: &CountProfile) -> Self {
        let mut graph = Self::new(profile.alphabet());
        graph.name = profile.name.clone();

        graph.nodes = profile
            .counts()
            .iter()
            .enumerate()
            .map(|(idx, column)| PoNode {
                frequencies: column.clone(),
                predecessors: if idx > 0 { vec![(idx - 1, 1.0)] } else { vec![] },
                successors: if idx + 1 < profile.length() {
                    vec![(idx + 1, 1.0)]
                } else {
                    vec![]
                },
            })
            .collect();

        graph
    }

    pub fn from_sequence(seq: &Sequence) -> Self {
        Self::from_count_profile(&CountProfile::from_sequence(seq))
    }

    /// Add a node with the given residue frequencies and return its index.
    pub fn add_node(&mut self, mut frequencies: Vec<f64>) -> Result<usize> {
        if frequencies.len() != self.alphabet.size() {
            return Err(NodeColumnLengthError {
                found: frequencies.len(),
                expected: self.alphabet.size(),
            }
            .into());
        }

        if let Some(&value) = frequencies.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(InvalidNodeFrequencyError { value }.into());
        }

        frequencies.normalize();
        self.nodes.push(PoNode {
            frequencies,
            ..Default::default()
        });
        Ok(self.nodes.len() - 1)
    }

    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        if from >= to || to >= self.nodes.len() {
            return Err(InvalidEdgeError {
                from,
                to,
                num_nodes: self.nodes.len(),
            }
            .into());
        }

        if !weight.is_finite() || weight <= 0.0 {
            return Err(InvalidEdgeWeightError { from, to, weight }.into());
        }

        self.nodes[from].successors.push((to, weight));
        self.nodes[to].predecessors.push((from, weight));
        Ok(())
    }

    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn node(&self, idx: usize) -> &PoNode {
        &self.nodes[idx]
    }

    /// The mixed residue columns found 1..=`steps` edges away from `center`.
    ///
    /// Walking from the center, each node passes its probability mass on to its
    /// neighbors in proportion to the edge weights. The column at distance d is
    /// the mass-weighted mixture of the node columns reached in exactly d steps,
    /// or None once every path has ended. Mass is accumulated in node order
    /// so that the result does not depend on edge insertion order.
    pub fn neighborhood(
        &self,
        center: usize,
        steps: usize,
        direction: Direction,
    ) -> Vec<Option<Vec<f64>>> {
        let size = self.alphabet.size();
        let mut columns = Vec::with_capacity(steps);
        let mut frontier: BTreeMap<usize, f64> = BTreeMap::from([(center, 1.0)]);

        for _ in 0..steps {
            let mut next: BTreeMap<usize, f64> = BTreeMap::new();

            for (&node_idx, &mass) in frontier.iter() {
                let edges = self.nodes[node_idx].edges(direction);
                let total_weight: f64 = edges.iter().map(|(_, w)| w).sum();

                for &(neighbor_idx, weight) in edges {
                    *next.entry(neighbor_idx).or_insert(0.0) += mass * weight / total_weight;
                }
            }

            if next.is_empty() {
                columns.push(None);
                frontier = next;
                continue;
            }

            let mut column = vec![0.0; size];
            for (&node_idx, &mass) in next.iter() {
                column
                    .iter_mut()
                    .zip(&self.nodes[node_idx].frequencies)
                    .for_each(|(c, f)| *c += mass * f);
            }
            column.normalize();

            columns.push(Some(column));
            frontier = next;
        }

        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(a: usize) -> Vec<f64> {
        let mut v = vec![0.0; 4];
        v[a] = 1.0;
        v
    }

    #[test]
    fn test_from_count_profile_is_a_chain() -> anyhow::Result<()> {
        let seq = Sequence::from_utf8(Alphabet::Dna, b"ACG")?;
        let graph = PoGraph::from_sequence(&seq);

        assert_eq!(graph.length(), 3);
        assert!(graph.node(0).predecessors().is_empty());
        assert_eq!(graph.node(1).predecessors(), &[(0, 1.0)]);
        assert_eq!(graph.node(1).successors(), &[(2, 1.0)]);
        assert!(graph.node(2).successors().is_empty());
        Ok(())
    }

    #[test]
    fn test_add_edge_errors() -> anyhow::Result<()> {
        let mut graph = PoGraph::new(Alphabet::Dna);
        graph.add_node(one_hot(0))?;
        graph.add_node(one_hot(1))?;

        let err = graph.add_edge(1, 0, 1.0).unwrap_err();
        assert!(err.downcast_ref::<InvalidEdgeError>().is_some());
        let err = graph.add_edge(0, 2, 1.0).unwrap_err();
        assert!(err.downcast_ref::<InvalidEdgeError>().is_some());
        let err = graph.add_edge(0, 1, 0.0).unwrap_err();
        assert!(err.downcast_ref::<InvalidEdgeWeightError>().is_some());

        let err = graph.add_node(vec![1.0]).unwrap_err();
        assert!(err.downcast_ref::<NodeColumnLengthError>().is_some());
        Ok(())
    }

    #[test]
    fn test_neighborhood_mixes_branches() -> anyhow::Result<()> {
        // 0 -> {1, 2} -> 3, with the branch through 1 three times heavier
        let mut graph = PoGraph::new(Alphabet::Dna);
        graph.add_node(one_hot(0))?;
        graph.add_node(one_hot(1))?;
        graph.add_node(one_hot(2))?;
        graph.add_node(one_hot(3))?;
        graph.add_edge(0, 1, 3.0)?;
        graph.add_edge(0, 2, 1.0)?;
        graph.add_edge(1, 3, 3.0)?;
        graph.add_edge(2, 3, 1.0)?;

        let right = graph.neighborhood(0, 3, Direction::Successors);
        assert_eq!(right.len(), 3);
        assert_eq!(right[0], Some(vec![0.0, 0.75, 0.25, 0.0]));
        assert_eq!(right[1], Some(vec![0.0, 0.0, 0.0, 1.0]));
        assert_eq!(right[2], None);

        let left = graph.neighborhood(3, 2, Direction::Predecessors);
        assert_eq!(left[0], Some(vec![0.0, 0.75, 0.25, 0.0]));
        assert_eq!(left[1], Some(vec![1.0, 0.0, 0.0, 0.0]));
        Ok(())
    }
}
