#![forbid(unsafe_code)]

use crate::clock::{Clock, SystemClock};
use crate::format::{self, DEFAULT_PRECISION};
use crate::{Duration, Error};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tracing::debug;

/// An opaque reading of the monotonic clock.
///
/// Instants are nanosecond offsets from an arbitrary epoch private to this
/// process; they only mean something relative to each other. Subtracting two
/// of them gives a signed [`Duration`].
///
/// ```
/// # use monotime::{Duration, Instant};
/// let start = Instant::now();
/// let deadline = start + Duration::from_millis(5);
/// assert!(start < deadline);
/// assert_eq!(deadline - start, Duration::from_millis(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    nanos: i64,
}

impl Instant {
    /// Only clocks mint instants from raw readings.
    pub(crate) const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub(crate) const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Read the system monotonic clock.
    ///
    /// # Panics
    ///
    /// If the OS refuses to report `CLOCK_MONOTONIC`, which does not happen on
    /// supported platforms. Use [`Instant::try_now`] to handle it instead.
    pub fn now() -> Self {
        match Self::try_now() {
            Ok(now) => now,
            Err(err) => panic!("failed to read the monotonic clock: {err}"),
        }
    }

    pub fn try_now() -> Result<Self, Error> {
        SystemClock.now()
    }

    /// Time passed since this instant was taken.
    pub fn elapsed(&self) -> Duration {
        Self::now() - *self
    }

    pub fn elapsed_with<C: Clock + ?Sized>(&self, clock: &C) -> Result<Duration, Error> {
        Ok(clock.now()? - *self)
    }

    /// Signed: negative when `earlier` is actually later.
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        *self - earlier
    }

    pub fn checked_add(&self, duration: Duration) -> Option<Instant> {
        self.nanos
            .checked_add(duration.as_nanos())
            .map(Self::from_nanos)
    }

    pub fn checked_sub(&self, duration: Duration) -> Option<Instant> {
        self.nanos
            .checked_sub(duration.as_nanos())
            .map(Self::from_nanos)
    }

    /// Sleep until `duration` after this instant, then report how far off the
    /// wake-up was: `(self + duration) - Instant::now()`.
    ///
    /// The result is usually slightly negative, since sleeps tend to overrun.
    /// If the target has already passed, no sleep happens and the (negative)
    /// overrun is returned straight away. A target past the end of the clock
    /// is [`Error::Overflow`].
    pub fn sleep(&self, duration: Duration) -> Result<Duration, Error> {
        self.sleep_with(&SystemClock, duration)
    }

    pub fn sleep_with<C: Clock + ?Sized>(
        &self,
        clock: &C,
        duration: Duration,
    ) -> Result<Duration, Error> {
        let target = self.checked_add(duration).ok_or(Error::Overflow)?;
        if clock.now()? < target {
            debug!(until = %duration, "sleeping");
            clock.sleep_until(target)?;
        }
        let remaining = target - clock.now()?;
        debug!(%remaining, "woke from sleep");
        Ok(remaining)
    }

    /// Async counterpart of [`Instant::sleep`] on the tokio timer.
    #[cfg(feature = "tokio")]
    pub async fn sleep_async(&self, duration: Duration) -> Result<Duration, Error> {
        let target = self.checked_add(duration).ok_or(Error::Overflow)?;
        (target - Self::try_now()?).sleep_async().await;
        let remaining = target - Self::try_now()?;
        debug!(%remaining, "woke from sleep");
        Ok(remaining)
    }
}

impl fmt::Display for Instant {
    /// Renders the time elapsed since this instant, honouring `{:.N}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        format::pad(f, &format::render(self.elapsed().as_nanos(), precision))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("overflow when adding duration to instant"))
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("overflow when subtracting duration from instant"))
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        match self.nanos.checked_sub(rhs.nanos) {
            Some(nanos) => Duration::from_nanos(nanos),
            None => panic!("overflow when subtracting instants"),
        }
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl SubAssign<Duration> for Instant {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::hash::{BuildHasher, RandomState};

    #[test]
    fn monotonic() {
        for _ in 0..10 {
            let a = Instant::now();
            let b = Instant::now();
            assert!(a <= b);
        }
    }

    #[test]
    fn equality() {
        let a = Instant::now();
        let dur = Duration::from_nanos(1);
        let copy = a;
        let hasher = RandomState::new();

        assert_eq!(a, copy);
        assert_eq!(hasher.hash_one(a), hasher.hash_one(copy));
        assert_eq!(a.cmp(&copy), std::cmp::Ordering::Equal);
        assert!(a < a + dur);
        assert!(a > a - dur);
        assert_ne!(a, a + dur);
        assert_eq!(a + Duration::ZERO, a);
    }

    #[test]
    fn hashing() {
        let inst0 = Instant::now();
        let inst1 = inst0 + Duration::from_nanos(1);
        let inst2 = inst0 + Duration::from_secs(1);
        let inst3 = inst0 + Duration::from_secs(10);

        let map = HashMap::from([(inst0, 0), (inst1, 1), (inst2, 2), (inst3, 3)]);
        assert_eq!(map[&inst0], 0);
        assert_eq!(map[&inst1], 1);
        assert_eq!(map[&inst2], 2);
        assert_eq!(map[&inst3], 3);

        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![inst0, inst1, inst2, inst3]);
    }

    #[test]
    fn differences_are_signed() {
        let clock = ManualClock::new();
        let a = clock.now().unwrap();
        clock.advance(Duration::from_millis(5));
        let b = clock.now().unwrap();

        assert_eq!(b - a, Duration::from_millis(5));
        assert_eq!(a - b, Duration::from_millis(-5));
        assert_eq!(a.duration_since(b), Duration::from_millis(-5));
        assert_eq!(a.elapsed_with(&clock), Ok(Duration::from_millis(5)));
    }

    #[test]
    fn assign_operators() {
        let start = ManualClock::new().now().unwrap();
        let mut t = start;
        t += Duration::from_secs(2);
        t -= Duration::from_secs(1);
        assert_eq!(t - start, Duration::SECOND);
    }

    #[test]
    fn checked_offsets() {
        let late = Instant::from_nanos(i64::MAX);
        assert_eq!(late.checked_add(Duration::NANOSECOND), None);
        assert_eq!(late.checked_sub(Duration::NANOSECOND), Some(Instant::from_nanos(i64::MAX - 1)));
        assert_eq!(Instant::from_nanos(i64::MIN).checked_sub(Duration::NANOSECOND), None);
    }

    #[test]
    fn sleep_reports_drift() {
        let clock = ManualClock::with_oversleep(Duration::from_micros(50));
        let t = clock.now().unwrap();

        let a = t.sleep_with(&clock, Duration::from_millis(10)).unwrap();
        assert_eq!(a, Duration::from_micros(-50));

        clock.advance(Duration::from_millis(10));
        let b = t.sleep_with(&clock, Duration::from_millis(10)).unwrap();
        assert_eq!(b, Duration::from_micros(-10_050));
        assert!(a > b);
        assert!(b.is_negative());

        // the second target had already passed, so only one sleep was issued
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn sleep_for_partially_elapsed_target() {
        let clock = ManualClock::new();
        let t = clock.now().unwrap();
        clock.advance(Duration::from_millis(4));

        let remaining = t.sleep_with(&clock, Duration::from_millis(10)).unwrap();
        assert_eq!(remaining, Duration::ZERO);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(6)]);
    }

    #[test]
    fn sleep_past_end_of_clock_is_overflow() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_secs(1));
        let t = clock.now().unwrap();

        assert_eq!(t.sleep_with(&clock, Duration::MAX), Err(Error::Overflow));
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn displays_elapsed_time() {
        let long_ago = Instant::now() - Duration::from_secs(100);
        let rendered = format!("{long_ago:.0}");
        assert!(rendered.ends_with('s') && !rendered.ends_with("ms"), "{rendered}");
        assert!(rendered.starts_with("10"), "{rendered}");
    }

    proptest! {
        #[test]
        fn offsets_order_consistently(start in -(1i64 << 62)..(1i64 << 62), nanos in 1i64..(1i64 << 40)) {
            let t = Instant::from_nanos(start);
            let d = Duration::from_nanos(nanos);
            prop_assert!(t < t + d);
            prop_assert!(t > t - d);
            prop_assert_eq!((t + d) - t, d);
            prop_assert_eq!((t - d) - t, -d);
        }
    }
}
