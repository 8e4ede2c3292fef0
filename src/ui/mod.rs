//! Operator-facing surfaces

pub mod prompt;
