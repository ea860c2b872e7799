use crate::steiner_forest::{Move, Problem, Solution};
use anyhow::{anyhow, Result};
use log::debug;
use rand::{seq::SliceRandom, Rng};
use sfp_utils::{Dsu, ShortestPathEngine};

pub fn solve_problem<'a, R: Rng>(problem: &'a Problem, rng: &mut R) -> Result<Solution<'a>> {
    let graph = problem.graph();
    let mut solution = problem.empty_solution();
    let mut dsu = Dsu::new(problem.num_nodes());
    let mut engine = ShortestPathEngine::new(problem.num_nodes());

    let mut pairs = problem.terminal_pairs().to_vec();
    pairs.shuffle(rng);

    for (source, target) in pairs {
        if dsu.is_connected(source, target) {
            continue;
        }
        let path = engine.shortest_path(graph, source, target);
        if !path.is_reachable() {
            return Err(anyhow!("No path between {} and {}", source, target));
        }
        for edge_idx in path.edges {
            if !solution.is_edge_active(edge_idx) {
                Move::add(problem, edge_idx).apply(&mut solution);
                let edge = graph.edge(edge_idx);
                dsu.unite(edge.source, edge.target);
            }
        }
    }

    debug!(
        "greedy baseline for {}: {} edges, cost {}",
        problem.name(),
        solution.num_active_edges(),
        solution.objective_value()
    );
    Ok(solution)
}
