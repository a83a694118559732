use thiserror::Error;

/// Invalid input handed to one of the pure engines.
///
/// Neither engine clamps or repairs its input; every malformed value is
/// reported through one of these variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("row count must be non-negative, got {0}")]
    NegativeRowCount(i64),

    #[error("degenerate lot corners: {0}")]
    DegenerateLot(&'static str),

    #[error("region of interest must have positive size, got {width} x {height}")]
    InvalidRoi { width: f64, height: f64 },

    #[error("overlap threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("clip polygon must be convex")]
    NonConvexClip,

    #[error("no parking space with id {0}")]
    UnknownSpace(u32),
}
