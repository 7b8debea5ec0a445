#![forbid(unsafe_code)]

use crate::{Duration, Error, Instant};
use nix::sys::time::TimeSpec;
use nix::time::{ClockId, clock_gettime};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::warn;

/// Source of monotonic readings and thread sleeps.
///
/// Everything in this crate that touches real time goes through a `Clock`, so
/// tests can swap in a [`ManualClock`].
pub trait Clock: Send + Sync {
    fn now(&self) -> Result<Instant, Error>;

    /// Block the calling thread for roughly `duration`. Non-positive spans
    /// return immediately.
    fn sleep(&self, duration: Duration) -> Result<(), Error>;

    /// Block until the clock reads at least `deadline`, as far as the
    /// underlying sleep allows.
    fn sleep_until(&self, deadline: Instant) -> Result<(), Error> {
        self.sleep(deadline - self.now()?)
    }
}

/// The OS `CLOCK_MONOTONIC`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    fn to_timespec(nanos: i64) -> TimeSpec {
        let secs = nanos.div_euclid(crate::unit::NANOS_PER_SEC);
        let subsec = nanos.rem_euclid(crate::unit::NANOS_PER_SEC);
        TimeSpec::new(secs as _, subsec as _)
    }

    /// `duration` after `now`, pinned to the last representable instant for
    /// spans that would run off the end of the clock.
    fn deadline(now: Instant, duration: Duration) -> Instant {
        now.checked_add(duration)
            .unwrap_or(Instant::from_nanos(i64::MAX))
    }

    fn from_timespec(ts: TimeSpec) -> Result<i64, Error> {
        #[allow(clippy::useless_conversion)]
        let (secs, subsec) = (i64::from(ts.tv_sec()), i64::from(ts.tv_nsec()));
        secs.checked_mul(crate::unit::NANOS_PER_SEC)
            .and_then(|nanos| nanos.checked_add(subsec))
            .ok_or(Error::Overflow)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Result<Instant, Error> {
        let ts = clock_gettime(ClockId::CLOCK_MONOTONIC)?;
        Ok(Instant::from_nanos(Self::from_timespec(ts)?))
    }

    fn sleep(&self, duration: Duration) -> Result<(), Error> {
        if !duration.is_positive() {
            return Ok(());
        }
        // an absolute deadline lets an interrupted sleep report what was left
        self.sleep_until(Self::deadline(self.now()?, duration))
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn sleep_until(&self, deadline: Instant) -> Result<(), Error> {
        use nix::errno::Errno;
        use nix::time::{ClockNanosleepFlags, clock_nanosleep};

        let request = Self::to_timespec(deadline.as_nanos());
        match clock_nanosleep(
            ClockId::CLOCK_MONOTONIC,
            ClockNanosleepFlags::TIMER_ABSTIME,
            &request,
        ) {
            Ok(_) => Ok(()),
            Err(Errno::EINTR) => {
                let remaining = deadline - self.now()?;
                warn!(%remaining, "sleep interrupted by signal");
                Err(Error::Interrupted { remaining })
            }
            Err(errno) => Err(Error::Clock(errno)),
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn sleep_until(&self, deadline: Instant) -> Result<(), Error> {
        // std retries on EINTR, so interruptions never surface here
        if let Ok(remaining) = std::time::Duration::try_from(deadline - self.now()?) {
            std::thread::sleep(remaining);
        }
        Ok(())
    }
}

/// A clock that only moves when told to.
///
/// Sleeping advances the reading by the requested span plus a fixed
/// `oversleep`, and every requested span is recorded.
///
/// ```
/// # use monotime::{Clock, Duration, ManualClock};
/// let clock = ManualClock::with_oversleep(Duration::from_micros(20));
/// let start = clock.now()?;
/// let drift = start.sleep_with(&clock, Duration::from_millis(1))?;
/// assert_eq!(drift, Duration::from_micros(-20));
/// assert_eq!(clock.sleeps(), vec![Duration::from_millis(1)]);
/// # Ok::<(), monotime::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicI64,
    oversleep: Duration,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_oversleep(oversleep: Duration) -> Self {
        Self {
            oversleep,
            ..Self::default()
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(duration.as_nanos(), Ordering::SeqCst);
    }

    /// Every positive span passed to [`Clock::sleep`], oldest first.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Result<Instant, Error> {
        Ok(Instant::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }

    fn sleep(&self, duration: Duration) -> Result<(), Error> {
        if !duration.is_positive() {
            return Ok(());
        }
        self.sleeps.lock().push(duration);
        self.advance(duration + self.oversleep);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let mut last = clock.now().unwrap();
        for _ in 0..100 {
            let now = clock.now().unwrap();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn system_clock_sleeps_at_least_requested() {
        let clock = SystemClock;
        let start = clock.now().unwrap();
        clock.sleep(Duration::from_millis(5)).unwrap();
        assert!(clock.now().unwrap() - start >= Duration::from_millis(5));
    }

    #[test]
    fn system_clock_sleep_until_past_deadline_returns() {
        let clock = SystemClock;
        let past = clock.now().unwrap() - Duration::from_secs(1);
        clock.sleep_until(past).unwrap();
        clock.sleep(Duration::from_secs(-1)).unwrap();
    }

    #[test]
    fn timespec_conversion_handles_negative_offsets() {
        let ts = SystemClock::to_timespec(-1);
        assert_eq!(ts.tv_sec(), -1);
        assert_eq!(ts.tv_nsec(), 999_999_999);
        assert_eq!(SystemClock::from_timespec(ts), Ok(-1));

        let ts = SystemClock::to_timespec(1_500_000_000);
        assert_eq!(SystemClock::from_timespec(ts), Ok(1_500_000_000));
    }

    #[test]
    fn deadline_saturates_for_huge_spans() {
        let now = Instant::from_nanos(1_000);
        assert_eq!(
            SystemClock::deadline(now, Duration::from_millis(1)),
            Instant::from_nanos(1_001_000)
        );
        assert_eq!(
            SystemClock::deadline(now, Duration::MAX),
            Instant::from_nanos(i64::MAX)
        );

        let far = SystemClock::to_timespec(i64::MAX);
        assert_eq!(SystemClock::from_timespec(far), Ok(i64::MAX));
    }

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::with_oversleep(Duration::from_nanos(7));
        let start = clock.now().unwrap();
        clock.sleep(Duration::from_millis(2)).unwrap();
        clock.sleep(Duration::ZERO).unwrap();
        clock.advance(Duration::from_millis(1));

        assert_eq!(clock.now().unwrap() - start, Duration::from_nanos(3_000_007));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(2)]);
    }

    #[test]
    fn manual_clock_is_shareable() {
        let clock = std::sync::Arc::new(ManualClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || clock.sleep(Duration::from_millis(1)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(clock.sleeps().len(), 4);
        assert_eq!(clock.now().unwrap() - Instant::from_nanos(0), Duration::from_millis(4));
    }
}
