//! CLI command implementations.

pub mod contour;
pub mod tools;
