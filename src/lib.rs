pub mod budget;
pub mod clearance;
pub mod config;
pub mod constants;
pub mod cost_grid;
pub mod distance_transform;
pub mod engine;
pub mod error;
pub mod exit_perimeter;
pub mod goals;
pub mod installation;
pub mod location;
pub mod planner;
pub mod room_data;
pub mod search;
pub mod terrain;

pub mod visual;
pub use visual::*;

pub use budget::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use installation::*;
pub use location::*;
pub use planner::*;
pub use room_data::*;
