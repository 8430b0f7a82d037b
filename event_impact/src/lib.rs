//! Temporal alignment and normalization engine for post-versus-price analysis.
//!
//! The crate takes a regularly sampled price series and a set of timestamped
//! posts and produces:
//! - the average price at post time ([`joiner`]),
//! - one normalized price trajectory per post ([`window`]),
//! - the cross-post mean "impact curve" with its post-event peak ([`aggregate`]).
//!
//! [`analysis`] wires those pieces together the way a dashboard consumes them;
//! loading, rendering, and the causal-impact model itself live elsewhere.

#![deny(missing_docs)]

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod errors;
pub mod filter;
pub mod intervention;
pub mod joiner;
pub mod kpi;
pub mod lookup;
pub mod models;
pub mod store;
pub mod time_align;
pub mod window;

pub use errors::{ImpactError, Result};
