use super::types::is_improvement;
use log::debug;
use logging_timer::time;
use sfp_challenges::steiner_forest::{Move, Solution};
use sfp_utils::{Dsu, Graph, ShortestPathEngine};
use std::collections::VecDeque;

/// Edge-removal neighbourhood with first-improvement acceptance.
///
/// A neighbour drops one active edge and reconnects every pair the removal
/// split along shortest paths that avoid the dropped edge. Dangling
/// non-terminal branches are pruned before and after the descent.
#[derive(Debug, Copy, Clone, Default)]
pub struct LocalSearch;

impl LocalSearch {
    pub fn new() -> Self {
        Self
    }

    /// Descends until no single-edge removal improves the cost. Returns
    /// whether the solution changed.
    #[time]
    pub fn optimize(&self, solution: &mut Solution<'_>) -> bool {
        let problem = solution.problem();
        let mut working = problem.graph().clone();
        let mut engine = ShortestPathEngine::new(problem.num_nodes());
        let mut dsu = Dsu::new(problem.num_nodes());

        let mut improved = self.prune(solution);
        let mut steps = 0usize;
        while let Some(candidate) =
            self.first_improvement(solution, &mut working, &mut engine, &mut dsu)
        {
            debug!(
                "local search step {}: {} -> {}",
                steps,
                solution.objective_value(),
                candidate.objective_value()
            );
            *solution = candidate;
            improved = true;
            steps += 1;
        }
        if self.prune(solution) {
            improved = true;
        }
        improved
    }

    /// Repeatedly strips active edges hanging off non-terminal leaves.
    /// Returns whether any edge was removed.
    pub fn prune(&self, solution: &mut Solution<'_>) -> bool {
        let problem = solution.problem();
        let graph = problem.graph();
        let is_terminal = problem.terminal_mask();

        let mut degree = vec![0usize; problem.num_nodes()];
        for edge_idx in solution.active_edges() {
            let edge = graph.edge(edge_idx);
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        let mut queue: VecDeque<usize> = (0..problem.num_nodes())
            .filter(|&u| degree[u] == 1 && !is_terminal[u])
            .collect();
        let mut removed = 0usize;
        while let Some(u) = queue.pop_front() {
            if degree[u] != 1 {
                continue;
            }
            let Some(edge_idx) = graph
                .edge_range(u)
                .find(|&i| solution.is_edge_active(i))
            else {
                continue;
            };
            let v = graph.edge(edge_idx).target;
            Move::remove(problem, edge_idx).apply(solution);
            degree[u] -= 1;
            degree[v] -= 1;
            removed += 1;
            if degree[v] == 1 && !is_terminal[v] {
                queue.push_back(v);
            }
        }
        if removed > 0 {
            debug!("pruned {} dangling edges", removed);
        }
        removed > 0
    }

    fn first_improvement<'a>(
        &self,
        solution: &Solution<'a>,
        working: &mut Graph,
        engine: &mut ShortestPathEngine,
        dsu: &mut Dsu,
    ) -> Option<Solution<'a>> {
        let active: Vec<usize> = solution.active_edges().collect();
        for &removed in &active {
            // A disabled edge is an infinitely expensive one to the path search.
            working.set_edge_status(removed, false);
            let candidate = self.repair(solution, removed, &active, working, engine, dsu);
            working.set_edge_status(removed, true);

            if let Some(candidate) = candidate {
                if is_improvement(candidate.objective_value(), solution.objective_value()) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Drops `removed` and reconnects the pairs it split. `None` when some
    /// pair cannot be reconnected without it.
    fn repair<'a>(
        &self,
        solution: &Solution<'a>,
        removed: usize,
        active: &[usize],
        working: &Graph,
        engine: &mut ShortestPathEngine,
        dsu: &mut Dsu,
    ) -> Option<Solution<'a>> {
        let problem = solution.problem();
        let graph = problem.graph();

        dsu.reset();
        for &edge_idx in active.iter().filter(|&&i| i != removed) {
            let edge = graph.edge(edge_idx);
            dsu.unite(edge.source, edge.target);
        }

        let mut candidate = solution.clone();
        Move::remove(problem, removed).apply(&mut candidate);
        for &(source, target) in problem.terminal_pairs() {
            if dsu.is_connected(source, target) {
                continue;
            }
            let path = engine.shortest_path(working, source, target);
            if !path.is_reachable() || !path.cost.is_finite() {
                return None;
            }
            for edge_idx in path.edges {
                if !candidate.is_edge_active(edge_idx) {
                    Move::add(problem, edge_idx).apply(&mut candidate);
                }
                let edge = graph.edge(edge_idx);
                dsu.unite(edge.source, edge.target);
            }
        }
        Some(candidate)
    }
}
