pub mod analysis;
pub mod deadlock;
pub mod domain;
pub mod grid;
pub mod heuristic;
pub mod keeper;
pub mod map;
pub mod plan;
pub mod search;
pub mod solver;
pub mod worker;
