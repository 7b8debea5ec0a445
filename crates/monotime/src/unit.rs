#![forbid(unsafe_code)]

pub(crate) const NANOS_PER_MICRO: i64 = 1_000;
pub(crate) const NANOS_PER_MILLI: i64 = 1_000_000;
pub(crate) const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Units a [`Duration`](crate::Duration) is rendered and parsed in, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl Unit {
    const ALL: [Unit; 4] = [Unit::Seconds, Unit::Millis, Unit::Micros, Unit::Nanos];

    /// Length of one unit in nanoseconds.
    pub(crate) const fn nanos(self) -> u64 {
        match self {
            Unit::Seconds => NANOS_PER_SEC as u64,
            Unit::Millis => NANOS_PER_MILLI as u64,
            Unit::Micros => NANOS_PER_MICRO as u64,
            Unit::Nanos => 1,
        }
    }

    /// Number of decimal digits below one unit that still carry nanoseconds.
    pub(crate) const fn digits(self) -> usize {
        match self {
            Unit::Seconds => 9,
            Unit::Millis => 6,
            Unit::Micros => 3,
            Unit::Nanos => 0,
        }
    }

    pub(crate) const fn suffix(self) -> &'static str {
        match self {
            Unit::Seconds => "s",
            Unit::Millis => "ms",
            Unit::Micros => "μs",
            Unit::Nanos => "ns",
        }
    }

    /// The largest unit in which `magnitude` nanoseconds is at least one.
    ///
    /// Zero falls through to nanoseconds.
    pub(crate) fn for_magnitude(magnitude: u64) -> Unit {
        Self::ALL
            .into_iter()
            .find(|unit| magnitude >= unit.nanos())
            .unwrap_or(Unit::Nanos)
    }

    /// Accepts the rendered suffixes plus the ASCII `us` and the micro sign `µs`.
    pub(crate) fn from_suffix(suffix: &str) -> Option<Unit> {
        match suffix {
            "s" => Some(Unit::Seconds),
            "ms" => Some(Unit::Millis),
            "μs" | "µs" | "us" => Some(Unit::Micros),
            "ns" => Some(Unit::Nanos),
            _ => None,
        }
    }
}
