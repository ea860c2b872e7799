use crate::QUALITY_PRECISION;
mod baselines;
mod solution;
pub use solution::{Move, MoveKind, Solution, SolutionData};

use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sfp_utils::{Dsu, Graph};
use std::collections::HashSet;

/// Parameters of a generated instance.
#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct Track {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_terminal_pairs: usize,
    pub max_weight: u32,
}

/// Unvalidated instance data, as handed over by a parser.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Instance {
    #[serde(default)]
    pub name: String,
    pub num_nodes: usize,
    pub edges: Vec<(usize, usize, f64)>,
    pub terminal_pairs: Vec<(usize, usize)>,
}

/// A Steiner Forest instance: a connected, non-negatively weighted
/// undirected graph and the terminal pairs that must end up connected.
///
/// Read-only once built; every [`Solution`] borrows it.
#[derive(Debug, Clone)]
pub struct Problem {
    name: String,
    seed: [u8; 32],
    graph: Graph,
    terminal_pairs: Vec<(usize, usize)>,
}

impl Problem {
    pub fn new(graph: Graph, terminal_pairs: Vec<(usize, usize)>) -> Result<Self> {
        if !graph.is_bidirectional() {
            return Err(anyhow!("Steiner forest graphs must be undirected"));
        }
        if graph.has_negative_weights() {
            return Err(anyhow!("Graph has negative weights"));
        }
        if !graph.is_connected() {
            return Err(anyhow!("Graph is not connected"));
        }
        if let Some(&(u, v)) = terminal_pairs
            .iter()
            .find(|&&(u, v)| u >= graph.num_nodes() || v >= graph.num_nodes())
        {
            return Err(anyhow!(
                "Terminal pair ({}, {}) references a node outside 0..{}",
                u,
                v,
                graph.num_nodes()
            ));
        }
        Ok(Self {
            name: "Manual".to_string(),
            seed: [0; 32],
            graph,
            terminal_pairs,
        })
    }

    pub fn from_instance(instance: &Instance) -> Result<Self> {
        let graph = Graph::new(instance.num_nodes, &instance.edges, true)?;
        let problem = Self::new(graph, instance.terminal_pairs.clone())?;
        Ok(if instance.name.is_empty() {
            problem
        } else {
            problem.with_name(&instance.name)
        })
    }

    /// Random connected instance: a random spanning tree topped up with
    /// extra edges, integer weights in `1..=max_weight`, and terminal pairs
    /// with distinct endpoints.
    pub fn generate_instance(seed: &[u8; 32], track: &Track) -> Result<Self> {
        if track.num_nodes < 2 {
            return Err(anyhow!("Number of nodes must be at least 2"));
        }
        if track.max_weight == 0 {
            return Err(anyhow!("Max weight must be positive"));
        }
        let max_edges = track.num_nodes * (track.num_nodes - 1) / 2;
        if track.num_edges < track.num_nodes - 1 || track.num_edges > max_edges {
            return Err(anyhow!(
                "Number of edges must be between {} and {}",
                track.num_nodes - 1,
                max_edges
            ));
        }
        let mut rng = SmallRng::from_seed(seed.clone());

        let mut order: Vec<usize> = (0..track.num_nodes).collect();
        order.shuffle(&mut rng);

        let mut edges = Vec::with_capacity(track.num_edges);
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(track.num_edges);
        let weight = |rng: &mut SmallRng| rng.gen_range(1..=track.max_weight) as f64;
        for i in 1..order.len() {
            let (u, v) = (order[i], order[rng.gen_range(0..i)]);
            seen.insert((u.min(v), u.max(v)));
            edges.push((u, v, weight(&mut rng)));
        }
        while edges.len() < track.num_edges {
            let u = rng.gen_range(0..track.num_nodes);
            let v = rng.gen_range(0..track.num_nodes);
            if u == v || !seen.insert((u.min(v), u.max(v))) {
                continue;
            }
            edges.push((u, v, weight(&mut rng)));
        }

        let terminal_pairs = (0..track.num_terminal_pairs)
            .map(|_| {
                let u = rng.gen_range(0..track.num_nodes);
                let mut v = rng.gen_range(0..track.num_nodes - 1);
                if v >= u {
                    v += 1;
                }
                (u, v)
            })
            .collect();

        let graph = Graph::new(track.num_nodes, &edges, true)?;
        let mut problem = Self::new(graph, terminal_pairs)?;
        problem.seed = *seed;
        problem.name = format!(
            "generated_n{}_e{}_p{}",
            track.num_nodes, track.num_edges, track.num_terminal_pairs
        );
        Ok(problem)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn terminal_pairs(&self) -> &[(usize, usize)] {
        &self.terminal_pairs
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Number of directed edge entries, i.e. twice the undirected count.
    pub fn num_edges(&self) -> usize {
        self.graph.num_edges()
    }

    /// Marks every node that appears in a terminal pair.
    pub fn terminal_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.num_nodes()];
        for &(u, v) in &self.terminal_pairs {
            mask[u] = true;
            mask[v] = true;
        }
        mask
    }

    pub fn to_instance(&self) -> Instance {
        let edges = self
            .graph
            .canonical_edges()
            .map(|i| {
                let edge = self.graph.edge(i);
                (edge.source, edge.target, edge.weight)
            })
            .collect();
        Instance {
            name: self.name.clone(),
            num_nodes: self.num_nodes(),
            edges,
            terminal_pairs: self.terminal_pairs.clone(),
        }
    }

    pub fn empty_solution(&self) -> Solution<'_> {
        Solution::new(self)
    }

    /// Connects the pairs one by one, in shuffled order, along shortest
    /// paths of the unmodified graph.
    pub fn compute_greedy_baseline(&self, seed: &[u8; 32]) -> Result<Solution<'_>> {
        let mut rng = SmallRng::from_seed(seed.clone());
        baselines::shortest_paths::solve_problem(self, &mut rng)
    }

    pub fn evaluate_total_weight(&self, solution: &Solution) -> Result<f64> {
        if !std::ptr::eq(solution.problem(), self) {
            return Err(anyhow!("Solution belongs to a different problem"));
        }
        let mut dsu = Dsu::new(self.num_nodes());
        if !solution.is_feasible(&mut dsu) {
            return Err(anyhow!("Some terminal pairs are not connected"));
        }
        Ok(solution.objective_value())
    }

    /// Relative improvement over the greedy baseline, in units of
    /// `1 / QUALITY_PRECISION`.
    pub fn evaluate_solution(&self, solution: &Solution) -> Result<i32> {
        let total_weight = self.evaluate_total_weight(solution)?;
        let baseline = self.compute_greedy_baseline(&self.seed)?;
        let baseline_weight = self.evaluate_total_weight(&baseline)?;
        if baseline_weight <= 0.0 {
            return Ok(0);
        }
        let quality = (baseline_weight - total_weight) / baseline_weight;
        let quality = quality.clamp(-10.0, 10.0) * QUALITY_PRECISION as f64;
        Ok(quality.round() as i32)
    }
}
