#![forbid(unsafe_code)]

use crate::unit::Unit;
use std::fmt::{self, Alignment, Write};

/// Precision used by `{}`. Nine fractional digits of a second is one nanosecond,
/// so nothing is ever lost at this precision.
pub(crate) const DEFAULT_PRECISION: usize = 9;

/// Render `nanos` in the largest unit it fills, e.g. `1.5ms` or `-20s`.
///
/// The fractional part is rounded at `precision` digits, half to even, on the
/// exact decimal value, and trailing fractional zeros are dropped. The unit is
/// chosen before rounding, so `999_960ns` at precision 1 renders as `1000ms`.
pub(crate) fn render(nanos: i64, precision: usize) -> String {
    let magnitude = nanos.unsigned_abs();
    let unit = Unit::for_magnitude(magnitude);

    let mut whole = magnitude / unit.nanos();
    let mut frac = magnitude % unit.nanos();
    let mut digits = unit.digits();

    let precision = precision.min(DEFAULT_PRECISION);
    if precision < digits {
        let scale = 10u64.pow((digits - precision) as u32);
        let mut kept = frac / scale;
        let dropped = frac % scale;
        let half = scale / 2;

        let odd = if precision == 0 {
            whole % 2 == 1
        } else {
            kept % 2 == 1
        };
        if dropped > half || (dropped == half && odd) {
            kept += 1;
        }
        if kept == 10u64.pow(precision as u32) {
            kept = 0;
            whole += 1;
        }

        frac = kept;
        digits = precision;
    }

    let mut out = String::new();
    if nanos < 0 {
        out.push('-');
    }
    // writing into a String cannot fail
    let _ = write!(out, "{whole}");
    if digits > 0 {
        let padded = format!("{frac:0digits$}");
        let trimmed = padded.trim_end_matches('0');
        if !trimmed.is_empty() {
            out.push('.');
            out.push_str(trimmed);
        }
    }
    out.push_str(unit.suffix());
    out
}

/// Write `s` honouring the formatter's width, fill and alignment.
///
/// `Formatter::pad` would treat the precision as a maximum length, which
/// clashes with using it as the number of fractional digits.
pub(crate) fn pad(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let len = s.chars().count();
    let Some(padding) = f.width().and_then(|width| width.checked_sub(len)) else {
        return f.write_str(s);
    };

    let (before, after) = match f.align() {
        Some(Alignment::Right) => (padding, 0),
        Some(Alignment::Center) => (padding / 2, padding - padding / 2),
        Some(Alignment::Left) | None => (0, padding),
    };
    let fill = f.fill();
    for _ in 0..before {
        f.write_char(fill)?;
    }
    f.write_str(s)?;
    for _ in 0..after {
        f.write_char(fill)?;
    }
    Ok(())
}
