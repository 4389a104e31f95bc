//! Shared drawing constants for toast content

pub mod colors;

pub use colors::*;
