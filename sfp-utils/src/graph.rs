use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Range;

/// A directed entry of the CSR edge array.
///
/// Undirected graphs store every input edge twice, once per direction, and
/// link the two entries through `reverse`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub reverse: Option<usize>,
    pub active: bool,
}

/// Graph stored as Compressed Sparse Row: the edges leaving node `u` are
/// `edges[ptrs[u]..ptrs[u + 1]]`.
///
/// Topology is fixed after [`Graph::new`]. Only the weight and the
/// activation flag of an edge may change, and both always change together
/// with the reverse twin.
#[derive(Debug, Clone)]
pub struct Graph {
    num_nodes: usize,
    ptrs: Vec<usize>,
    edges: Vec<Edge>,
    total_weight: f64,
    bidirectional: bool,
}

impl Graph {
    pub fn new(
        num_nodes: usize,
        edge_list: &[(usize, usize, f64)],
        bidirectional: bool,
    ) -> Result<Self> {
        if num_nodes == 0 {
            return Err(anyhow!("Number of nodes must be positive"));
        }
        if edge_list.is_empty() {
            return Err(anyhow!("Edge list cannot be empty"));
        }
        for &(source, target, weight) in edge_list {
            if source >= num_nodes || target >= num_nodes {
                return Err(anyhow!(
                    "Edge ({}, {}) references a node outside 0..{}",
                    source,
                    target,
                    num_nodes
                ));
            }
            if !weight.is_finite() {
                return Err(anyhow!(
                    "Edge ({}, {}) has a non-finite weight",
                    source,
                    target
                ));
            }
        }

        // Pass 1: counting sort of the directed entries by source.
        let mut degrees = vec![0usize; num_nodes];
        for &(source, target, _) in edge_list {
            degrees[source] += 1;
            if bidirectional {
                degrees[target] += 1;
            }
        }
        let mut ptrs = Vec::with_capacity(num_nodes + 1);
        ptrs.push(0);
        for node in 0..num_nodes {
            ptrs.push(ptrs[node] + degrees[node]);
        }

        let num_edges = ptrs[num_nodes];
        let mut slots: Vec<Option<Edge>> = vec![None; num_edges];
        let mut next = ptrs[..num_nodes].to_vec();
        let mut total_weight = 0.0;
        for &(source, target, weight) in edge_list {
            let forward = next[source];
            next[source] += 1;
            // Pass 2: each input edge is linked to its own twin, so parallel
            // edges never share a reverse entry.
            let reverse = if bidirectional {
                let backward = next[target];
                next[target] += 1;
                slots[backward] = Some(Edge {
                    source: target,
                    target: source,
                    weight,
                    reverse: Some(forward),
                    active: true,
                });
                Some(backward)
            } else {
                None
            };
            slots[forward] = Some(Edge {
                source,
                target,
                weight,
                reverse,
                active: true,
            });
            total_weight += weight;
        }

        let edges = slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| anyhow!("CSR slot left unfilled")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            num_nodes,
            ptrs,
            edges,
            total_weight,
            bidirectional,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn ptrs(&self) -> &[usize] {
        &self.ptrs
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge_idx: usize) -> &Edge {
        &self.edges[edge_idx]
    }

    /// Sum of the weights of active edges, each undirected edge counted once.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// Index range of the edges leaving `node`.
    pub fn edge_range(&self, node: usize) -> Range<usize> {
        self.ptrs[node]..self.ptrs[node + 1]
    }

    /// Whether `edge_idx` is the representative of its undirected edge.
    ///
    /// For a twin pair the entry stored first wins, which is the `source <
    /// target` direction for every edge that is not a self-loop.
    pub fn is_canonical(&self, edge_idx: usize) -> bool {
        self.edges[edge_idx]
            .reverse
            .map_or(true, |reverse| edge_idx < reverse)
    }

    /// Maps either direction of an edge to its canonical entry.
    pub fn canonical(&self, edge_idx: usize) -> usize {
        match self.edges[edge_idx].reverse {
            Some(reverse) if reverse < edge_idx => reverse,
            _ => edge_idx,
        }
    }

    pub fn canonical_edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.edges.len()).filter(move |&i| self.is_canonical(i))
    }

    /// Linear scan of the edges leaving `source`.
    pub fn get_edge(&self, source: usize, target: usize) -> Option<usize> {
        self.edge_range(source)
            .find(|&i| self.edges[i].target == target)
    }

    pub fn set_edge_status(&mut self, edge_idx: usize, active: bool) {
        assert!(
            edge_idx < self.edges.len(),
            "edge index {} out of bounds ({} edges)",
            edge_idx,
            self.edges.len()
        );
        let edge = &mut self.edges[edge_idx];
        if edge.active == active {
            return;
        }
        edge.active = active;
        if active {
            self.total_weight += edge.weight;
        } else {
            self.total_weight -= edge.weight;
        }
        if let Some(reverse) = edge.reverse {
            self.edges[reverse].active = active;
        }
    }

    pub fn set_all_edges_status(&mut self, active: bool) {
        for edge in self.edges.iter_mut() {
            edge.active = active;
        }
        self.total_weight = self.active_canonical_weight();
    }

    /// Changes the weight of an edge and its twin.
    pub fn set_edge_weight(&mut self, edge_idx: usize, weight: f64) {
        assert!(
            edge_idx < self.edges.len(),
            "edge index {} out of bounds ({} edges)",
            edge_idx,
            self.edges.len()
        );
        let edge = &mut self.edges[edge_idx];
        let previous = edge.weight;
        let active = edge.active;
        edge.weight = weight;
        if let Some(reverse) = edge.reverse {
            self.edges[reverse].weight = weight;
        }
        if active {
            if previous.is_finite() && weight.is_finite() {
                self.total_weight += weight - previous;
            } else {
                self.total_weight = self.active_canonical_weight();
            }
        }
    }

    fn active_canonical_weight(&self) -> f64 {
        self.canonical_edges()
            .filter(|&i| self.edges[i].active)
            .map(|i| self.edges[i].weight)
            .sum()
    }

    /// Breadth-first search over active edges.
    pub fn is_reachable(&self, source: usize, target: usize) -> bool {
        if source == target {
            return true;
        }
        let mut visited = vec![false; self.num_nodes];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            for edge in &self.edges[self.edge_range(u)] {
                if !edge.active || visited[edge.target] {
                    continue;
                }
                if edge.target == target {
                    return true;
                }
                visited[edge.target] = true;
                queue.push_back(edge.target);
            }
        }
        false
    }

    /// Whether every node is reachable from node 0 over active edges.
    pub fn is_connected(&self) -> bool {
        let mut visited = vec![false; self.num_nodes];
        let mut queue = VecDeque::new();
        let mut count = 1;
        visited[0] = true;
        queue.push_back(0);
        while let Some(u) = queue.pop_front() {
            for edge in &self.edges[self.edge_range(u)] {
                if edge.active && !visited[edge.target] {
                    visited[edge.target] = true;
                    count += 1;
                    queue.push_back(edge.target);
                }
            }
        }
        count == self.num_nodes
    }

    pub fn has_negative_weights(&self) -> bool {
        self.edges.iter().any(|e| e.active && e.weight < 0.0)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Weight: {}", self.total_weight)?;
        writeln!(f, "Is Bidirectional: {}", self.bidirectional)?;
        for node in 0..self.num_nodes {
            write!(f, "Node {} ->", node)?;
            for edge in self.edges[self.edge_range(node)].iter().filter(|e| e.active) {
                write!(f, " {{Target {}, Weight {}}}", edge.target, edge.weight)?;
            }
            writeln!(f, ";")?;
        }
        Ok(())
    }
}
