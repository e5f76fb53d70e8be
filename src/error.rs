//! Error handling for the frozen-trie library
//!
//! Only the range constructors can fail; every other operation is total over well-formed
//! tries.

use thiserror::Error;

/// Main error type for the frozen-trie library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A zero step with distinct bounds would never terminate
    #[error("zero step size for range {start}..{end}")]
    ZeroStep {
        /// First value of the range
        start: i64,
        /// Exclusive bound of the range
        end: i64,
    },

    /// The step points away from the end of the range
    #[error("range {start}..{end} never reaches its end with step {step}")]
    UnreachableEnd {
        /// First value of the range
        start: i64,
        /// Exclusive bound of the range
        end: i64,
        /// Distance between consecutive values
        step: i64,
    },
}
