//! Command-line player and checker

pub mod play;
pub mod terminal;
