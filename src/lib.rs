//! Car Simulation Library
//!
//! Cars driving over a tile-based road network, with an ASCII renderer.

pub mod render;
pub mod simulation;
