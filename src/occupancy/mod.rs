pub mod evaluator;
pub mod status;

pub use evaluator::{OccupancyEvaluator, OccupancyResult, evaluate_occupancy};
pub use status::{SpotState, SpotStatus, write_status};
