//! Formatting and field-usage helpers
//!
//! Numbers sent to the controller are rendered in fixed notation with
//! trailing zeros removed. Message fields count as "used" when they carry a
//! value; empty strings and empty sequences are wildcards.

/// Default number of fractional digits used when rendering floats
pub const DEFAULT_PRECISION: usize = 4;

/// Render `value` in fixed notation at `precision` digits, then drop trailing
/// zeros and a dangling decimal point.
///
/// Negative zero (including values that round to it) renders as `0`.
/// Non-finite values are passed through as `NaN`, `inf` or `-inf`; rejecting
/// them is up to the caller.
pub fn float_to_string_no_trailing(value: f64, precision: usize) -> String {
    let mut out = format!("{:.*}", precision, value);

    if value.is_finite() && out.contains('.') {
        let trimmed_len = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed_len);
    }

    if out == "-0" {
        return "0".to_string();
    }
    out
}

/// Join rendered numbers with a single space
pub fn params_to_string<T>(values: &[T], precision: usize) -> String
where
    T: Copy + Into<f64>,
{
    values
        .iter()
        .map(|v| float_to_string_no_trailing((*v).into(), precision))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A message field that may or may not carry a value
pub trait Used {
    fn is_used(&self) -> bool;
}

impl Used for str {
    fn is_used(&self) -> bool {
        !self.is_empty()
    }
}

impl Used for String {
    fn is_used(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Used for [T] {
    fn is_used(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Used for Vec<T> {
    fn is_used(&self) -> bool {
        !self.is_empty()
    }
}

/// True when the sample field is used and the message field differs from it.
///
/// An unused sample field is a wildcard, so this is false regardless of what
/// the message carries.
pub fn used_and_not_equal<T>(sample: &T, msg: &T) -> bool
where
    T: Used + PartialEq + ?Sized,
{
    sample.is_used() && sample != msg
}
