mod dsu;
pub use dsu::*;
mod graph;
pub use graph::*;
mod json;
pub use json::*;
mod shortest_path;
pub use shortest_path::*;
