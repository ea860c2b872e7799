use super::Problem;
use serde::{Deserialize, Serialize};
use sfp_utils::Dsu;
use std::fmt;

/// Edge activation overlay on a [`Problem`], with its cost cached.
///
/// The activation vector is indexed by directed edge entry and always holds
/// the same value for an edge and its twin. It only changes through
/// [`Move::apply`] and [`Move::undo`], which keep the cached cost equal to
/// the weight of the active undirected edges.
#[derive(Debug, Clone)]
pub struct Solution<'a> {
    problem: &'a Problem,
    active: Vec<bool>,
    cost: f64,
}

impl<'a> Solution<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            active: vec![false; problem.num_edges()],
            cost: 0.0,
        }
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    pub fn objective_value(&self) -> f64 {
        self.cost
    }

    pub fn is_edge_active(&self, edge_idx: usize) -> bool {
        self.active[edge_idx]
    }

    /// Canonical indices of the active edges.
    pub fn active_edges(&self) -> impl Iterator<Item = usize> + '_ {
        let graph = self.problem.graph();
        (0..self.active.len()).filter(move |&i| self.active[i] && graph.is_canonical(i))
    }

    pub fn num_active_edges(&self) -> usize {
        self.active_edges().count()
    }

    /// One `Add` per inactive undirected edge, in canonical order.
    pub fn add_moves(&self) -> Vec<Move> {
        let graph = self.problem.graph();
        graph
            .canonical_edges()
            .filter(|&i| !self.active[i])
            .map(|i| Move::add(self.problem, i))
            .collect()
    }

    /// One `Remove` per active undirected edge, in canonical order.
    pub fn remove_moves(&self) -> Vec<Move> {
        self.active_edges()
            .map(|i| Move::remove(self.problem, i))
            .collect()
    }

    /// Strictly cheaper than `other`.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.cost < other.cost
    }

    /// Rebuilds connectivity from the active edges into `dsu` and checks
    /// that every terminal pair shares a component.
    pub fn is_feasible(&self, dsu: &mut Dsu) -> bool {
        dsu.reset();
        let graph = self.problem.graph();
        for i in self.active_edges() {
            let edge = graph.edge(i);
            dsu.unite(edge.source, edge.target);
        }
        self.problem
            .terminal_pairs()
            .iter()
            .all(|&(u, v)| dsu.is_connected(u, v))
    }

    pub fn to_data(&self) -> SolutionData {
        let graph = self.problem.graph();
        SolutionData {
            cost: self.cost,
            edges: self
                .active_edges()
                .map(|i| {
                    let edge = graph.edge(i);
                    (edge.source, edge.target, edge.weight)
                })
                .collect(),
        }
    }

    fn set_active(&mut self, edge_idx: usize, active: bool) {
        self.active[edge_idx] = active;
        if let Some(reverse) = self.problem.graph().edge(edge_idx).reverse {
            self.active[reverse] = active;
        }
    }
}

impl fmt::Display for Solution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution Cost: {}", self.cost)?;
        write!(f, "Active Edges: [")?;
        let graph = self.problem.graph();
        let mut count = 0;
        for i in self.active_edges() {
            let edge = graph.edge(i);
            write!(f, " ({}->{})", edge.source, edge.target)?;
            count += 1;
        }
        if count == 0 {
            write!(f, " None")?;
        }
        write!(f, " ]")
    }
}

/// Owned snapshot of a solution for reporting.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolutionData {
    pub cost: f64,
    pub edges: Vec<(usize, usize, f64)>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveKind {
    Add,
    Remove,
}

/// Activation or deactivation of one undirected edge. `cost_delta` is the
/// edge weight: credited by `Add`, debited by `Remove`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Move {
    pub kind: MoveKind,
    pub edge_index: usize,
    pub cost_delta: f64,
}

impl Move {
    pub fn new(kind: MoveKind, edge_index: usize, cost_delta: f64) -> Self {
        Self {
            kind,
            edge_index,
            cost_delta,
        }
    }

    /// Adds `edge_index` at its weight in `problem`.
    pub fn add(problem: &Problem, edge_index: usize) -> Self {
        Self::new(
            MoveKind::Add,
            edge_index,
            problem.graph().edge(edge_index).weight,
        )
    }

    /// Removes `edge_index` at its weight in `problem`.
    pub fn remove(problem: &Problem, edge_index: usize) -> Self {
        Self::new(
            MoveKind::Remove,
            edge_index,
            problem.graph().edge(edge_index).weight,
        )
    }

    pub fn apply(&self, solution: &mut Solution) {
        match self.kind {
            MoveKind::Add => self.activate(solution),
            MoveKind::Remove => self.deactivate(solution),
        }
    }

    pub fn undo(&self, solution: &mut Solution) {
        match self.kind {
            MoveKind::Add => self.deactivate(solution),
            MoveKind::Remove => self.activate(solution),
        }
    }

    fn activate(&self, solution: &mut Solution) {
        assert!(
            !solution.active[self.edge_index],
            "edge {} is already active",
            self.edge_index
        );
        solution.set_active(self.edge_index, true);
        solution.cost += self.cost_delta;
    }

    fn deactivate(&self, solution: &mut Solution) {
        assert!(
            solution.active[self.edge_index],
            "edge {} is not active",
            self.edge_index
        );
        solution.set_active(self.edge_index, false);
        solution.cost -= self.cost_delta;
    }
}
