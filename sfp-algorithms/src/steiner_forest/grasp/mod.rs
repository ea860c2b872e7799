pub mod constructive;
pub mod local_search;
pub mod solver;
pub mod types;

pub use constructive::GraspConstructive;
pub use local_search::LocalSearch;
pub use solver::{help, solve_problem, Grasp};
pub use types::Hyperparameters;
