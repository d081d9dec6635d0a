//! Report renderers for scan results.
//!
//! - [`terminal`]: colored manifest table with a per-manager summary box; respects
//!   `--verbose` / `--quiet`.
//!
//! JSON output is the serialized [`DependencyReport`](crate::models::DependencyReport).

pub mod terminal;
