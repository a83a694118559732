pub mod generator;
pub mod record;
pub mod summary;

pub use generator::{interpolate, partition_diagonal_lot, partition_diagonal_lot_checked};
pub use record::{Lot, ParkingSpace, build_lot, load_lots_or_empty, read_lots, write_lots};
pub use summary::{LotSummary, SummaryColor};
