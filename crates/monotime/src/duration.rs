#![forbid(unsafe_code)]

use crate::clock::{Clock, SystemClock};
use crate::format::{self, DEFAULT_PRECISION};
use crate::parse::parse_duration;
use crate::unit::{NANOS_PER_MICRO, NANOS_PER_MILLI, NANOS_PER_SEC};
use crate::Error;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use tracing::debug;

/// 2^63, the first float magnitude that no longer fits in `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A signed span of time, exact to the nanosecond.
///
/// Equality, ordering and hashing only look at the nanosecond count, so two
/// durations built different ways but covering the same span are
/// interchangeable, including as map keys.
///
/// ```
/// # use monotime::Duration;
/// let total = Duration::from_secs(1) + Duration::from_millis(500);
/// assert_eq!(total.to_string(), "1.5s");
/// assert_eq!(format!("{:.0}", total), "2s");
/// assert!((-total).is_negative());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration::from_nanos(0);
    pub const NANOSECOND: Duration = Duration::from_nanos(1);
    pub const MICROSECOND: Duration = Duration::from_nanos(NANOS_PER_MICRO);
    pub const MILLISECOND: Duration = Duration::from_nanos(NANOS_PER_MILLI);
    pub const SECOND: Duration = Duration::from_nanos(NANOS_PER_SEC);
    pub const MIN: Duration = Duration::from_nanos(i64::MIN);
    pub const MAX: Duration = Duration::from_nanos(i64::MAX);

    /// A zero-length span, the same as [`Duration::ZERO`].
    pub const fn zero() -> Self {
        Self::ZERO
    }

    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// # Panics
    ///
    /// If the span does not fit in `i64` nanoseconds.
    pub const fn from_micros(micros: i64) -> Self {
        Self::from_unit(micros, NANOS_PER_MICRO)
    }

    /// # Panics
    ///
    /// If the span does not fit in `i64` nanoseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self::from_unit(millis, NANOS_PER_MILLI)
    }

    /// # Panics
    ///
    /// If the span does not fit in `i64` nanoseconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self::from_unit(secs, NANOS_PER_SEC)
    }

    const fn from_unit(magnitude: i64, nanos_per_unit: i64) -> Self {
        match magnitude.checked_mul(nanos_per_unit) {
            Some(nanos) => Self { nanos },
            None => panic!("overflow when constructing Duration"),
        }
    }

    /// Build from fractional seconds, rounded to the nearest nanosecond with
    /// halves going away from zero.
    ///
    /// # Panics
    ///
    /// If `secs` is not finite or does not fit in `i64` nanoseconds. See
    /// [`Duration::try_from_secs_f64`] for the fallible form.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::from_f64(secs, NANOS_PER_SEC)
    }

    pub fn from_millis_f64(millis: f64) -> Self {
        Self::from_f64(millis, NANOS_PER_MILLI)
    }

    pub fn from_micros_f64(micros: f64) -> Self {
        Self::from_f64(micros, NANOS_PER_MICRO)
    }

    pub fn from_nanos_f64(nanos: f64) -> Self {
        Self::from_f64(nanos, 1)
    }

    pub fn try_from_secs_f64(secs: f64) -> Result<Self, Error> {
        Self::try_from_f64(secs, NANOS_PER_SEC)
    }

    pub fn try_from_millis_f64(millis: f64) -> Result<Self, Error> {
        Self::try_from_f64(millis, NANOS_PER_MILLI)
    }

    pub fn try_from_micros_f64(micros: f64) -> Result<Self, Error> {
        Self::try_from_f64(micros, NANOS_PER_MICRO)
    }

    pub fn try_from_nanos_f64(nanos: f64) -> Result<Self, Error> {
        Self::try_from_f64(nanos, 1)
    }

    fn from_f64(magnitude: f64, nanos_per_unit: i64) -> Self {
        match Self::try_from_f64(magnitude, nanos_per_unit) {
            Ok(duration) => duration,
            Err(err) => panic!("cannot construct Duration: {err}"),
        }
    }

    fn try_from_f64(magnitude: f64, nanos_per_unit: i64) -> Result<Self, Error> {
        if !magnitude.is_finite() {
            return Err(Error::NonFinite(magnitude));
        }
        let nanos = (magnitude * nanos_per_unit as f64).round();
        if nanos >= I64_LIMIT || nanos < -I64_LIMIT {
            return Err(Error::Overflow);
        }
        Ok(Self {
            nanos: nanos as i64,
        })
    }

    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Whole microseconds, truncated toward zero.
    pub const fn as_micros(self) -> i64 {
        self.nanos / NANOS_PER_MICRO
    }

    /// Whole milliseconds, truncated toward zero.
    pub const fn as_millis(self) -> i64 {
        self.nanos / NANOS_PER_MILLI
    }

    /// Whole seconds, truncated toward zero.
    pub const fn as_secs(self) -> i64 {
        self.nanos / NANOS_PER_SEC
    }

    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    pub fn as_millis_f64(self) -> f64 {
        self.nanos as f64 / NANOS_PER_MILLI as f64
    }

    pub fn as_micros_f64(self) -> f64 {
        self.nanos as f64 / NANOS_PER_MICRO as f64
    }

    pub const fn is_zero(self) -> bool {
        self.nanos == 0
    }

    pub const fn is_negative(self) -> bool {
        self.nanos < 0
    }

    pub const fn is_positive(self) -> bool {
        self.nanos > 0
    }

    /// `-1`, `0` or `1` following the sign of the span.
    pub const fn signum(self) -> i64 {
        self.nanos.signum()
    }

    /// # Panics
    ///
    /// On [`Duration::MIN`], whose magnitude has no positive counterpart.
    pub const fn abs(self) -> Self {
        match self.nanos.checked_abs() {
            Some(nanos) => Self { nanos },
            None => panic!("overflow when taking the absolute value of Duration::MIN"),
        }
    }

    pub const fn checked_add(self, rhs: Duration) -> Option<Duration> {
        match self.nanos.checked_add(rhs.nanos) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    pub const fn checked_sub(self, rhs: Duration) -> Option<Duration> {
        match self.nanos.checked_sub(rhs.nanos) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    pub const fn checked_mul(self, rhs: i64) -> Option<Duration> {
        match self.nanos.checked_mul(rhs) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    /// Divide by an integer, rounding to the nearest nanosecond with halves
    /// going away from zero. `None` on division by zero or overflow.
    pub const fn checked_div(self, rhs: i64) -> Option<Duration> {
        let Some(quotient) = self.nanos.checked_div(rhs) else {
            return None;
        };
        let remainder = (self.nanos % rhs).unsigned_abs();
        let rounded = if remainder >= rhs.unsigned_abs() - remainder {
            // same sign operands round up, mixed signs round down
            if (self.nanos < 0) == (rhs < 0) {
                quotient + 1
            } else {
                quotient - 1
            }
        } else {
            quotient
        };
        Some(Self { nanos: rounded })
    }

    pub const fn checked_neg(self) -> Option<Duration> {
        match self.nanos.checked_neg() {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    pub const fn saturating_add(self, rhs: Duration) -> Duration {
        Self {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }

    pub const fn saturating_sub(self, rhs: Duration) -> Duration {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }

    /// Scale by a float, rounded to the nearest nanosecond.
    ///
    /// Spans longer than 2^53 nanoseconds (about 104 days) lose precision in
    /// the intermediate float.
    ///
    /// # Panics
    ///
    /// If `rhs` is not finite or the result overflows.
    pub fn mul_f64(self, rhs: f64) -> Duration {
        Self::from_nanos_f64(self.nanos as f64 * rhs)
    }

    /// # Panics
    ///
    /// If `rhs` is zero or not finite, or the result overflows.
    pub fn div_f64(self, rhs: f64) -> Duration {
        assert!(rhs != 0.0, "attempt to divide Duration by zero");
        Self::from_nanos_f64(self.nanos as f64 / rhs)
    }

    /// How many times `rhs` fits into `self`.
    ///
    /// # Panics
    ///
    /// If `rhs` is zero.
    pub fn div_duration_f64(self, rhs: Duration) -> f64 {
        assert!(!rhs.is_zero(), "attempt to divide Duration by a zero Duration");
        self.nanos as f64 / rhs.nanos as f64
    }

    /// Render with at most `precision` fractional digits, like `{:.precision$}`.
    pub fn to_string_with_precision(self, precision: usize) -> String {
        format::render(self.nanos, precision)
    }

    /// Run `f` on the calling thread and return how long it took on the
    /// monotonic clock.
    ///
    /// There is no timeout: if `f` never returns, neither does this.
    pub fn measure(f: impl FnOnce()) -> Result<Duration, Error> {
        Self::measure_with(&SystemClock, f)
    }

    pub fn measure_with<C: Clock + ?Sized>(clock: &C, f: impl FnOnce()) -> Result<Duration, Error> {
        Self::with_measure_with(clock, f).map(|((), elapsed)| elapsed)
    }

    /// Like [`Duration::measure`], also handing back what `f` returned.
    pub fn with_measure<T>(f: impl FnOnce() -> T) -> Result<(T, Duration), Error> {
        Self::with_measure_with(&SystemClock, f)
    }

    pub fn with_measure_with<C: Clock + ?Sized, T>(
        clock: &C,
        f: impl FnOnce() -> T,
    ) -> Result<(T, Duration), Error> {
        let start = clock.now()?;
        let value = f();
        let elapsed = clock.now()? - start;
        debug!(%elapsed, "measured");
        Ok((value, elapsed))
    }

    /// Block the calling thread for roughly this long.
    ///
    /// Zero and negative spans return at once. A sleep cut short by a signal
    /// returns [`Error::Interrupted`] carrying the time that was left.
    pub fn sleep(self) -> Result<(), Error> {
        self.sleep_with(&SystemClock)
    }

    pub fn sleep_with<C: Clock + ?Sized>(self, clock: &C) -> Result<(), Error> {
        if !self.is_positive() {
            return Ok(());
        }
        debug!(duration = %self, "sleeping");
        clock.sleep(self)
    }

    /// Async counterpart of [`Duration::sleep`] on the tokio timer.
    #[cfg(feature = "tokio")]
    pub async fn sleep_async(self) {
        if let Ok(duration) = std::time::Duration::try_from(self) {
            debug!(duration = %self, "sleeping");
            tokio::time::sleep(duration).await;
        }
    }
}

impl fmt::Display for Duration {
    /// `{}` renders up to nine fractional digits; `{:.N}` rounds to `N`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        format::pad(f, &format::render(self.nanos, precision))
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s)
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = Error;

    fn try_from(duration: std::time::Duration) -> Result<Self, Self::Error> {
        let nanos = i64::try_from(duration.as_nanos()).map_err(|_| Error::Overflow)?;
        Ok(Self { nanos })
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = Error;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        let nanos = u64::try_from(duration.nanos).map_err(|_| Error::Negative(duration))?;
        Ok(std::time::Duration::from_nanos(nanos))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("overflow when adding durations"))
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("overflow when subtracting durations"))
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        self.checked_mul(rhs)
            .unwrap_or_else(|| panic!("overflow when multiplying duration by scalar"))
    }
}

impl Mul<Duration> for i64 {
    type Output = Duration;

    fn mul(self, rhs: Duration) -> Duration {
        rhs * self
    }
}

impl Mul<f64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: f64) -> Duration {
        self.mul_f64(rhs)
    }
}

impl Div<i64> for Duration {
    type Output = Duration;

    fn div(self, rhs: i64) -> Duration {
        assert!(rhs != 0, "attempt to divide Duration by zero");
        self.checked_div(rhs)
            .unwrap_or_else(|| panic!("overflow when dividing duration by scalar"))
    }
}

impl Div<f64> for Duration {
    type Output = Duration;

    fn div(self, rhs: f64) -> Duration {
        self.div_f64(rhs)
    }
}

impl Div for Duration {
    type Output = f64;

    fn div(self, rhs: Duration) -> f64 {
        self.div_duration_f64(rhs)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        self.checked_neg()
            .unwrap_or_else(|| panic!("overflow when negating Duration::MIN"))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl MulAssign<i64> for Duration {
    fn mul_assign(&mut self, rhs: i64) {
        *self = *self * rhs;
    }
}

impl DivAssign<i64> for Duration {
    fn div_assign(&mut self, rhs: i64) {
        *self = *self / rhs;
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Duration> for Duration {
    fn sum<I: Iterator<Item = &'a Duration>>(iter: I) -> Duration {
        iter.copied().sum()
    }
}
