//! Floating island world library
//!
//! Island synthesis, the rail network connecting the islands and the train
//! running on it. Re-exports modules for use by binaries and tools.

pub mod config;
pub mod export;
pub mod island;
pub mod noise;
pub mod rail;
pub mod seeds;
pub mod tilemap;
pub mod train;
pub mod world;
