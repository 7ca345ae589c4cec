use std::fmt;
use std::str::FromStr;

use super::style_error::StyleError;

/// NTSC broadcast rates written as decimals, mapped to their exact rationals.
const NTSC_RATES: &[(&str, u32, u32)] = &[
    ("23.976", 24000, 1001),
    ("23.98", 24000, 1001),
    ("29.97", 30000, 1001),
    ("47.952", 48000, 1001),
    ("59.94", 60000, 1001),
    ("119.88", 120000, 1001),
];

const MAX_FRACTION_DIGITS: usize = 6;

/// An exact frame rate, always kept as a reduced rational so the filter
/// receives `24000/1001` rather than a rounded decimal that drifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRate {
    numerator: u32,
    denominator: u32,
}

impl FrameRate {
    /// Returns `None` when either part is zero.
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return None;
        }
        let divisor = gcd(u64::from(numerator), u64::from(denominator)) as u32;
        Some(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl FromStr for FrameRate {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StyleError::InvalidFrameRate(s.to_string());
        let text = s.trim();

        if let Some((num, den)) = text.split_once('/') {
            let num: u32 = num.trim().parse().map_err(|_| invalid())?;
            let den: u32 = den.trim().parse().map_err(|_| invalid())?;
            return FrameRate::new(num, den).ok_or_else(invalid);
        }

        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
        let fraction = fraction.trim_end_matches('0');
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > MAX_FRACTION_DIGITS
        {
            return Err(invalid());
        }

        let normalized = if fraction.is_empty() {
            whole.trim_start_matches('0').to_string()
        } else {
            format!("{}.{}", whole.trim_start_matches('0'), fraction)
        };
        if let Some(&(_, num, den)) = NTSC_RATES.iter().find(|(name, _, _)| *name == normalized) {
            return FrameRate::new(num, den).ok_or_else(invalid);
        }

        let scale = 10u64.pow(fraction.len() as u32);
        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        let numerator = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(fraction))
            .ok_or_else(invalid)?;
        let divisor = gcd(numerator, scale).max(1);
        let numerator = u32::try_from(numerator / divisor).map_err(|_| invalid())?;
        let denominator = u32::try_from(scale / divisor).map_err(|_| invalid())?;
        FrameRate::new(numerator, denominator).ok_or_else(invalid)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Whether to keep the source frame rate or convert to a fixed one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameRatePreference {
    #[default]
    Auto,
    Fixed(FrameRate),
}

impl FromStr for FrameRatePreference {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(FrameRatePreference::Auto)
        } else {
            s.parse().map(FrameRatePreference::Fixed)
        }
    }
}

impl fmt::Display for FrameRatePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRatePreference::Auto => write!(f, "auto"),
            FrameRatePreference::Fixed(rate) => write!(f, "{rate}"),
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
