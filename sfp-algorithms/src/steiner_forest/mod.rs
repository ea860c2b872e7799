pub mod grasp;

pub use grasp::{help, solve_problem};
