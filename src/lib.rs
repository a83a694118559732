//! parkwatch - parking spot occupancy checks and diagonal lot layouts

pub mod api;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod lot;
pub mod occupancy;

pub use error::ConfigError;
