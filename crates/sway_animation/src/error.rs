//! Build error types

use thiserror::Error;

/// Errors surfaced when a tween or timeline is finalized.
///
/// Builders never fail mid-chain: the first problem is recorded and
/// returned from `build()`, `start()` or `start_in()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// No accessor was registered for the target's type
    #[error("no accessor registered for target type `{type_name}`")]
    MissingAccessor { type_name: &'static str },

    /// Target values don't match the accessor's channel count
    #[error("expected {expected} target values, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// A delay, duration or pause is negative or not finite
    #[error("invalid {field}: {value}")]
    InvalidTime { field: &'static str, value: f32 },

    /// Children with unbounded repeats have no end a timeline can lay out
    #[error("an animation repeating forever can't be pushed into a timeline")]
    InfiniteChild,

    /// `end()` was called with no open nested scope
    #[error("end() called without a matching begin_parallel()/begin_sequence()")]
    UnmatchedEnd,

    /// The timeline was finalized with nested scopes still open
    #[error("timeline finalized with {depth} unclosed nested scope(s)")]
    UnclosedScope { depth: usize },
}

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, BuildError>;

/// Rejects negative or non-finite time values.
pub(crate) fn check_time(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BuildError::InvalidTime { field, value })
    }
}
