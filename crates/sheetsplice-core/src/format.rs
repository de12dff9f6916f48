//! Text forms of cell values
//!
//! Numbers and dates are written into `<v>` elements as plain text. The forms
//! produced here are what spreadsheet applications expect to read back:
//! integers as plain decimal digits, floats as the shortest text that
//! round-trips, dates as `YYYY-MM-DDTHH:MM:SS[.fraction]`.

use chrono::{NaiveDateTime, Timelike};
use std::fmt;

/// A value that can be written as the numeric payload of a cell
///
/// Implemented for the primitive integer and float types and for strings,
/// which are written verbatim.
pub trait NumberValue {
    /// The text written into the cell's `<v>` element
    fn to_number_text(&self) -> String;
}

macro_rules! impl_number_value_int {
    ($($t:ty),*) => {
        $(
            impl NumberValue for $t {
                fn to_number_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_number_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl NumberValue for f64 {
    fn to_number_text(&self) -> String {
        format_float(*self)
    }
}

impl NumberValue for f32 {
    fn to_number_text(&self) -> String {
        float_text(*self, self.is_nan(), self.is_infinite())
    }
}

impl NumberValue for str {
    fn to_number_text(&self) -> String {
        self.to_string()
    }
}

impl NumberValue for String {
    fn to_number_text(&self) -> String {
        self.clone()
    }
}

impl<T: NumberValue + ?Sized> NumberValue for &T {
    fn to_number_text(&self) -> String {
        (**self).to_number_text()
    }
}

/// Format a float the way `%v` does: the shortest round-trip digits, switching
/// to exponent form when the decimal exponent is below -4 or at least 6.
///
/// # Examples
/// ```
/// use sheetsplice_core::format_float;
///
/// assert_eq!(format_float(56.78), "56.78");
/// assert_eq!(format_float(100.0), "100");
/// assert_eq!(format_float(1e6), "1e+06");
/// ```
pub fn format_float(value: f64) -> String {
    float_text(value, value.is_nan(), value.is_infinite())
}

fn float_text<T>(value: T, nan: bool, infinite: bool) -> String
where
    T: fmt::Display + fmt::LowerExp + PartialOrd + Default,
{
    if nan {
        return "NaN".to_string();
    }
    if infinite {
        return if value > T::default() { "+Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return value.to_string(),
    };

    if (-4..6).contains(&exponent) {
        return value.to_string();
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS[.fraction]`
///
/// The fraction carries as many digits as are significant, and is omitted
/// together with its dot when the timestamp falls on a whole second.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use sheetsplice_core::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9)
///     .unwrap()
///     .and_hms_milli_opt(7, 5, 1, 250)
///     .unwrap();
/// assert_eq!(format_date(&date), "2024-03-09T07:05:01.25");
/// ```
pub fn format_date(value: &NaiveDateTime) -> String {
    let mut text = value.format("%Y-%m-%dT%H:%M:%S").to_string();

    // Leap seconds are reported as nanos >= 1s
    let nanos = value.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }

    text
}
