//! Error taxonomy for the impact engine.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ImpactError>;

/// The unified error type for the `event_impact` crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    /// A calendar timestamp could not be parsed under any accepted format.
    #[error("Invalid timestamp format: {input:?} (expected {expected})")]
    InvalidTimestampFormat {
        /// The offending input, verbatim.
        input: String,
        /// Human-readable description of the accepted format(s).
        expected: String,
    },

    /// A lookup was attempted against a price series with zero points.
    #[error("Price series is empty")]
    EmptySeries,

    /// The anchor price used for normalization is zero.
    #[error("Anchor price is zero at minute {event_minute}")]
    DivisionByZeroPrice {
        /// Floored minute (epoch seconds) of the event being normalized.
        event_minute: i64,
    },

    /// An IANA time zone name was not recognized.
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// A local wall time occurs twice (DST fall-back) and the policy did not pick one.
    #[error("Ambiguous local time: {0}")]
    AmbiguousLocalTime(String),

    /// A local wall time is skipped (DST spring-forward) and the policy did not shift it.
    #[error("Nonexistent local time: {0}")]
    NonexistentLocalTime(String),

    /// A range whose start lies after its end.
    #[error("Inverted range: {from} > {to}")]
    InvertedRange {
        /// Inclusive start (epoch seconds).
        from: i64,
        /// Inclusive end (epoch seconds).
        to: i64,
    },
}
