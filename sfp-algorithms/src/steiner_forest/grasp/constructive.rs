use crate::{seeded_hasher, HashMap};
use anyhow::{anyhow, Result};
use log::debug;
use logging_timer::time;
use rand::Rng;
use sfp_challenges::steiner_forest::{Move, Problem, Solution};
use sfp_utils::{Dsu, ShortestPathEngine};

#[derive(Debug, Copy, Clone)]
struct Candidate {
    source: usize,
    target: usize,
    cost: f64,
}

/// Randomized greedy construction of a feasible forest.
///
/// Terminal groups are reduced to a list of pairs. Every round re-prices the
/// remaining pairs on a working copy of the graph in which edges already
/// bought cost nothing, then connects one pair drawn from the cheapest
/// `max(1, floor(len * alpha))` candidates.
#[derive(Debug, Copy, Clone)]
pub struct GraspConstructive {
    alpha: f64,
}

impl GraspConstructive {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(anyhow!("alpha must be within [0, 1], got {}", alpha));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn rcl_size(&self, num_candidates: usize) -> usize {
        ((num_candidates as f64 * self.alpha).floor() as usize).max(1)
    }

    #[time]
    pub fn generate<'a, R: Rng>(&self, problem: &'a Problem, rng: &mut R) -> Result<Solution<'a>> {
        let mut solution = problem.empty_solution();
        let mut working = problem.graph().clone();
        let mut engine = ShortestPathEngine::new(problem.num_nodes());

        let mut candidates: Vec<Candidate> = pair_terminals(group_terminals(problem), rng)
            .into_iter()
            .map(|(source, target)| Candidate {
                source,
                target,
                cost: f64::INFINITY,
            })
            .collect();
        debug!(
            "constructing from {} candidate pairs with alpha {}",
            candidates.len(),
            self.alpha
        );

        while !candidates.is_empty() {
            for candidate in candidates.iter_mut() {
                let path = engine.shortest_path(&working, candidate.source, candidate.target);
                if !path.is_reachable() {
                    return Err(anyhow!(
                        "Terminals {} and {} are not connected",
                        candidate.source,
                        candidate.target
                    ));
                }
                candidate.cost = path.cost;
            }
            candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));

            let pick = rng.gen_range(0..self.rcl_size(candidates.len()));
            let chosen = candidates.remove(pick);
            let path = engine.shortest_path(&working, chosen.source, chosen.target);
            for edge_idx in path.edges {
                if !solution.is_edge_active(edge_idx) {
                    Move::add(problem, edge_idx).apply(&mut solution);
                }
                working.set_edge_weight(edge_idx, 0.0);
            }
        }
        Ok(solution)
    }
}

/// Nodes of the connected components induced by the terminal pairs, in
/// ascending node order. Singleton groups are dropped.
fn group_terminals(problem: &Problem) -> Vec<Vec<usize>> {
    let mut dsu = Dsu::new(problem.num_nodes());
    for &(u, v) in problem.terminal_pairs() {
        dsu.unite(u, v);
    }

    let mut group_of: HashMap<usize, usize> = HashMap::with_hasher(seeded_hasher(problem.seed()));
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (node, is_terminal) in problem.terminal_mask().into_iter().enumerate() {
        if !is_terminal {
            continue;
        }
        let root = dsu.find(node);
        let idx = *group_of.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(node);
    }
    groups.retain(|group| group.len() > 1);
    groups
}

/// Spans every group with `len - 1` pairs: a random pivot leaves the group
/// and is paired with a random node that stays.
fn pair_terminals<R: Rng>(groups: Vec<Vec<usize>>, rng: &mut R) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for mut group in groups {
        while group.len() > 1 {
            let pivot = group.swap_remove(rng.gen_range(0..group.len()));
            let destination = group[rng.gen_range(0..group.len())];
            pairs.push((pivot, destination));
        }
    }
    pairs
}
