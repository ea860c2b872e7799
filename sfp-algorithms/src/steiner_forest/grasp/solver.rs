use super::constructive::GraspConstructive;
use super::local_search::LocalSearch;
use super::types::Hyperparameters;
use anyhow::{anyhow, Result};
use log::{debug, info};
use logging_timer::time;
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::{Map, Value};
use sfp_challenges::steiner_forest::{Problem, Solution};

/// Multi-start driver: construct, refine, keep the cheapest.
#[derive(Debug, Clone)]
pub struct Grasp {
    hyperparameters: Hyperparameters,
    constructive: GraspConstructive,
    local_search: LocalSearch,
}

impl Grasp {
    pub fn new(hyperparameters: Hyperparameters) -> Result<Self> {
        hyperparameters.validate()?;
        Ok(Self {
            constructive: GraspConstructive::new(hyperparameters.alpha)?,
            local_search: LocalSearch::new(),
            hyperparameters,
        })
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn solve<'a>(&self, problem: &'a Problem) -> Result<Solution<'a>> {
        self.solve_with(problem, &|_| Ok(()))
    }

    /// Runs every iteration and hands each new incumbent to `save_solution`.
    /// The incumbent is only replaced by a strictly cheaper solution.
    #[time]
    pub fn solve_with<'a>(
        &self,
        problem: &'a Problem,
        save_solution: &dyn Fn(&Solution) -> Result<()>,
    ) -> Result<Solution<'a>> {
        let mut rng = match self.hyperparameters.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut best: Option<Solution<'a>> = None;
        for iteration in 0..self.hyperparameters.iterations {
            let mut solution = self.constructive.generate(problem, &mut rng)?;
            let constructed = solution.objective_value();
            self.local_search.optimize(&mut solution);
            debug!(
                "iteration {}: constructed {}, refined {}",
                iteration,
                constructed,
                solution.objective_value()
            );

            if best
                .as_ref()
                .map_or(true, |incumbent| solution.is_better_than(incumbent))
            {
                info!(
                    "{}: iteration {} improved best to {}",
                    problem.name(),
                    iteration,
                    solution.objective_value()
                );
                save_solution(&solution)?;
                best = Some(solution);
            }
        }
        best.ok_or_else(|| anyhow!("No iterations were run"))
    }
}

pub fn solve_problem(
    problem: &Problem,
    save_solution: &dyn Fn(&Solution) -> Result<()>,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<()> {
    let hyperparameters = Hyperparameters::from_map(hyperparameters)?;
    Grasp::new(hyperparameters)?.solve_with(problem, save_solution)?;
    Ok(())
}

pub fn help() {
    println!("Steiner Forest Solver - GRASP");
    println!();
    println!("DESCRIPTION:");
    println!("  Greedy Randomized Adaptive Search Procedure. Each iteration builds a");
    println!("  forest by connecting terminal pairs along shortest paths, where edges");
    println!("  already bought are free, then refines it with an edge-removal local");
    println!("  search. The cheapest forest over all iterations is kept.");
    println!();
    println!("HYPERPARAMETERS:");
    println!("  alpha: number in [0, 1] (default 1.0)");
    println!("    share of the cheapest candidate pairs eligible at each step;");
    println!("    0.0 is purely greedy, 1.0 is purely random");
    println!("  iterations: positive integer (default 50)");
    println!("  seed: unsigned integer (default: fresh entropy)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sfp_utils::Graph;
    use std::cell::RefCell;

    fn diamond() -> Problem {
        let graph = Graph::new(
            4,
            &[(0, 1, 4.0), (1, 3, 4.0), (0, 2, 1.0), (2, 3, 1.0), (1, 2, 1.0)],
            true,
        )
        .unwrap();
        Problem::new(graph, vec![(0, 3), (1, 3)]).unwrap()
    }

    #[test]
    fn test_saved_costs_strictly_decrease() {
        let problem = diamond();
        let saved = RefCell::new(Vec::new());
        let grasp = Grasp::new(Hyperparameters {
            alpha: 1.0,
            iterations: 20,
            seed: Some(5),
        })
        .unwrap();
        let best = grasp
            .solve_with(&problem, &|s| {
                saved.borrow_mut().push(s.objective_value());
                Ok(())
            })
            .unwrap();

        let saved = saved.into_inner();
        assert!(!saved.is_empty());
        assert!(saved.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(*saved.last().unwrap(), best.objective_value());
        assert_eq!(best.objective_value(), 3.0);
    }

    #[test]
    fn test_save_errors_propagate() {
        let problem = diamond();
        let grasp = Grasp::new(Hyperparameters::default()).unwrap();
        let result = grasp.solve_with(&problem, &|_| Err(anyhow!("disk full")));
        assert!(result.is_err());
    }

    #[test]
    fn test_solve_problem_validates_hyperparameters() {
        let problem = diamond();
        let bad = json!({"alpha": 2.0}).as_object().cloned();
        assert!(solve_problem(&problem, &|_| Ok(()), &bad).is_err());
        let good = json!({"iterations": 3, "seed": 1}).as_object().cloned();
        assert!(solve_problem(&problem, &|_| Ok(()), &good).is_ok());
    }
}
