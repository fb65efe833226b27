pub mod error;
pub mod grid;
pub mod interleave;
pub mod mapper;
pub mod planner;
pub mod render;
pub mod solver;
pub mod types;
