pub mod shortest_paths;
