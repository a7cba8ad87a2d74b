//! Core types and utilities for the Hatchery toroidal evolution simulator.

pub mod config;
pub mod error;
pub mod geometry;
pub mod stats;

pub use config::*;
pub use error::{Error, Result};
pub use geometry::*;
pub use stats::*;
