#![forbid(unsafe_code)]

use crate::{Duration, Error, unit::Unit};

/// Parse strings like `1.5ms`, `-20s` or `250us` exactly, without going
/// through floating point. Digits finer than a nanosecond are rounded half
/// away from zero.
pub(crate) fn parse_duration(input: &str) -> Result<Duration, Error> {
    let invalid = |reason| Error::Parse {
        input: input.to_owned(),
        reason,
    };

    let s = input.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);
    if number.is_empty() {
        return Err(invalid("missing magnitude"));
    }
    if suffix.is_empty() {
        return Err(invalid("missing unit"));
    }
    let unit = Unit::from_suffix(suffix).ok_or_else(|| invalid("unknown unit"))?;

    let (whole, frac) = match number.split_once('.') {
        Some((_, "")) => return Err(invalid("missing digits after decimal point")),
        Some((_, frac)) if frac.contains('.') => return Err(invalid("more than one decimal point")),
        Some((whole, frac)) => (whole, frac),
        None => (number, ""),
    };

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| Error::Overflow)?.into()
    };

    let mut magnitude = whole * u128::from(unit.nanos());
    let digits = unit.digits();
    let (kept, rest) = frac.split_at(frac.len().min(digits));
    if !kept.is_empty() {
        let scale = 10u128.pow((digits - kept.len()) as u32);
        let kept: u128 = kept.parse().map_err(|_| invalid("invalid fraction"))?;
        magnitude += kept * scale;
    }
    if rest.bytes().next().is_some_and(|digit| digit >= b'5') {
        magnitude += 1;
    }

    let magnitude = i128::try_from(magnitude).map_err(|_| Error::Overflow)?;
    let nanos = if negative { -magnitude } else { magnitude };
    let nanos = i64::try_from(nanos).map_err(|_| Error::Overflow)?;
    Ok(Duration::from_nanos(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("15ms"), Ok(Duration::from_millis(15)));
        assert_eq!(parse_duration("7μs"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("7us"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("42ns"), Ok(Duration::from_nanos(42)));
    }

    #[test]
    fn parses_fractions_exactly() {
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("0.000000001s"), Ok(Duration::from_nanos(1)));
        assert_eq!(parse_duration(".25ms"), Ok(Duration::from_micros(250)));
        assert_eq!(parse_duration("1.26μs"), Ok(Duration::from_nanos(1260)));
    }

    #[test]
    fn rounds_below_a_nanosecond() {
        assert_eq!(parse_duration("1.2345μs"), Ok(Duration::from_nanos(1235)));
        assert_eq!(parse_duration("1.2344μs"), Ok(Duration::from_nanos(1234)));
        assert_eq!(parse_duration("0.5ns"), Ok(Duration::from_nanos(1)));
        assert_eq!(parse_duration("-0.5ns"), Ok(Duration::from_nanos(-1)));
    }

    #[test]
    fn accepts_signs_and_whitespace() {
        assert_eq!(parse_duration(" -3ms "), Ok(Duration::from_millis(-3)));
        assert_eq!(parse_duration("+3ms"), Ok(Duration::from_millis(3)));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "s", "10", "1.s", "1..5s", "1.2.3s", "10 s", "10m", "--1s", "abc"] {
            assert!(
                matches!(parse_duration(input), Err(Error::Parse { .. })),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(parse_duration("9223372037s"), Err(Error::Overflow));
        assert_eq!(parse_duration("99999999999999999999999s"), Err(Error::Overflow));
        assert_eq!(
            parse_duration("-9223372036.854775808s"),
            Ok(Duration::from_nanos(i64::MIN))
        );
        assert_eq!(parse_duration("9223372036.854775808s"), Err(Error::Overflow));
    }
}
