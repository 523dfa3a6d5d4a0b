//! Compact number formatting
//!
//! Shortens a numeric magnitude into a display string with a thousands
//! suffix: `1500` becomes `"1.5k"`, `45600` becomes `"46k"`. Values below one
//! thousand are printed as-is. Everything that rounds past 999 thousand is
//! reported as the fixed label `"1M"`.

use crate::utils::error::{CompactError, Result};

const THOUSAND: f64 = 1_000.0;
const TEN_THOUSAND: f64 = 10_000.0;
const HUNDRED_THOUSAND: f64 = 100_000.0;
const MAX_THOUSANDS: f64 = 999.0;
const THOUSANDS_SUFFIX: &str = "k";

/// Label for every value whose rounded thousands exceed 999.
///
/// There is no further `M` scaling: 5,000,000 also yields `"1M"`.
pub const MILLION_LABEL: &str = "1M";

/// How out-of-domain input is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatMode {
    /// Never fails; negative and non-finite values fall through the
    /// threshold checks like any other number.
    #[default]
    Permissive,
    /// Rejects NaN, infinities and negative values.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactNumberFormatter {
    mode: FormatMode,
}

impl CompactNumberFormatter {
    pub fn new(mode: FormatMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(FormatMode::Strict)
    }

    pub fn mode(&self) -> FormatMode {
        self.mode
    }

    /// Formats `num` permissively, whatever the configured mode.
    pub fn format(&self, num: f64) -> String {
        format_compact_number(num)
    }

    /// Formats `num`, rejecting values a compact label cannot describe.
    ///
    /// For finite, non-negative input the result is identical to [`format`].
    ///
    /// [`format`]: CompactNumberFormatter::format
    pub fn try_format(&self, num: f64) -> Result<String> {
        let reason = if num.is_nan() {
            Some("value is not a number")
        } else if num.is_infinite() {
            Some("value is infinite")
        } else if num < 0.0 {
            Some("negative values have no compact form")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(CompactError::UnsupportedValueError {
                value: plain_number(num),
                reason: reason.to_string(),
            }),
            None => Ok(format_compact_number(num)),
        }
    }

    /// Formats according to the configured [`FormatMode`].
    pub fn apply(&self, num: f64) -> Result<String> {
        match self.mode {
            FormatMode::Permissive => Ok(self.format(num)),
            FormatMode::Strict => self.try_format(num),
        }
    }
}

/// Formats a number compactly with a `k` suffix
///
/// # Examples
/// ```
/// use compactnum::format_compact_number;
///
/// assert_eq!(format_compact_number(999.0), "999");
/// assert_eq!(format_compact_number(1500.0), "1.5k");
/// assert_eq!(format_compact_number(45600.0), "46k");
/// assert_eq!(format_compact_number(999_499.0), "999k");
/// assert_eq!(format_compact_number(999_500.0), "1M");
/// ```
pub fn format_compact_number(num: f64) -> String {
    if num < THOUSAND {
        return plain_number(num);
    }

    if num < TEN_THOUSAND {
        let fixed = to_fixed_one(num / THOUSAND);
        let trimmed = fixed.strip_suffix(".0").unwrap_or(&fixed);
        return format!("{}{}", trimmed, THOUSANDS_SUFFIX);
    }

    let rounded = (num / THOUSAND).round();
    if num < HUNDRED_THOUSAND || rounded <= MAX_THOUSANDS {
        format!("{}{}", rounded, THOUSANDS_SUFFIX)
    } else {
        // NaN and +inf land here too
        MILLION_LABEL.to_string()
    }
}

/// Rounds `x` to one decimal place, ties away from zero, using the exact
/// binary value of `x`. Only called with `1 <= x < 10`.
fn to_fixed_one(x: f64) -> String {
    // 60 places cover every fraction digit of a double below 10
    let exact = format!("{:.60}", x);
    let digits = exact
        .split_once('.')
        .map(|(_, frac)| frac.as_bytes())
        .unwrap_or_default();

    let mut whole = x.trunc() as u64;
    let mut tenth = digits.first().map_or(0, |d| d - b'0');
    if digits.get(1).is_some_and(|d| *d >= b'5') {
        tenth += 1;
        if tenth == 10 {
            tenth = 0;
            whole += 1;
        }
    }

    format!("{}.{}", whole, tenth)
}

/// Plain decimal rendering with JavaScript number-to-string rules:
/// shortest round-trip digits with ties to even, `-0` as `"0"`, exponent
/// form outside `[1e-6, 1e21)`.
fn plain_number(num: f64) -> String {
    if num == 0.0 {
        return "0".to_string();
    }
    ryu_js::Buffer::new().format(num).to_string()
}
