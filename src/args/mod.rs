//! Command-line argument parsing and handling.

pub mod cache;
pub mod definition;

pub use definition::{Args, determine_log_level};
