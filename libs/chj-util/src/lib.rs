//! Small utilities shared between the jx crates.

pub mod warn;
