#![forbid(unsafe_code)]

use crate::Duration;

/// Represents all possible errors that can occur in this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The OS monotonic clock could not be read, or a sleep on it failed.
    #[error("monotonic clock error: {0}")]
    Clock(#[from] nix::Error),

    /// A sleep returned early because the thread received a signal.
    ///
    /// `remaining` is how much of the requested span had not yet elapsed.
    #[error("sleep interrupted with {remaining} remaining")]
    Interrupted { remaining: Duration },

    /// The magnitude cannot be represented as a whole number of nanoseconds.
    #[error("duration overflows i64 nanoseconds")]
    Overflow,

    /// A NaN or infinite magnitude was given to a floating point constructor.
    #[error("duration magnitude is not finite: {0}")]
    NonFinite(f64),

    /// A negative span has no `std::time::Duration` equivalent.
    #[error("negative duration {0} cannot be converted to std::time::Duration")]
    Negative(Duration),

    /// The input is not a valid duration string such as `1.5ms`.
    #[error("invalid duration {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },
}
