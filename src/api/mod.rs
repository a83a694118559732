pub mod snapshot;

pub use snapshot::{SavedSnapshot, SnapshotSource, capture_snapshot, fetch_snapshot};
