//! Monotonic instants and signed, nanosecond-exact durations.
//!
//! [`Instant`] wraps a `CLOCK_MONOTONIC` reading and is immune to wall-clock
//! adjustments. Subtracting instants yields a [`Duration`], which supports
//! exact arithmetic, hashing, and unit-picking formatting:
//!
//! ```
//! use monotime::{Duration, Instant};
//!
//! let start = Instant::now();
//! let took = Duration::measure(|| {
//!     let _ = (0..1_000).sum::<u64>();
//! })?;
//! assert!(!took.is_negative());
//! assert!(start.elapsed() >= took);
//!
//! assert_eq!(Duration::from_micros(1_250).to_string(), "1.25ms");
//! assert_eq!(format!("{:.1}", Duration::from_micros(1_250)), "1.2ms");
//! # Ok::<(), monotime::Error>(())
//! ```
#![forbid(unsafe_code)]

pub mod clock;
mod duration;
mod error;
mod format;
mod instant;
mod parse;
mod unit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::Duration;
pub use error::Error;
pub use instant::Instant;
