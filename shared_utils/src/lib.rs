//! Small helpers shared across the workspace.

pub mod env;
