//! Time units and smoothing kernels.
//!
//! Slices are centred on a midpoint γ that advances one [`TimeUnit`] at a
//! time. Around each midpoint, a [`Kernel`] decides which statements count and
//! how much:
//!
//! ```text
//! u = (t − γ) / h          h = half the window width
//!
//! Uniform        1                 |u| ≤ 1   (plain sliding window)
//! Triangular     1 − |u|           |u| ≤ 1
//! Epanechnikov   1 − u²            |u| ≤ 1
//! Gaussian       exp(−u² / 2)      all t     (h acts as the bandwidth)
//! ```
//!
//! All kernels peak at 1, so a statement at the midpoint always carries full
//! weight. Compact kernels only look at statements inside the window;
//! the Gaussian kernel looks at every statement in the data range.

use crate::error::{Error, Result};
use chrono::{Duration, Months, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 30.436_875;
const DAYS_PER_YEAR: f64 = 365.242_5;

/// Step size of the moving midpoint and unit of the window width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeUnit {
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    #[default]
    Days,
    /// Weeks.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl TimeUnit {
    fn fixed_seconds(self) -> Option<i64> {
        match self {
            TimeUnit::Minutes => Some(60),
            TimeUnit::Hours => Some(3_600),
            TimeUnit::Days => Some(86_400),
            TimeUnit::Weeks => Some(604_800),
            TimeUnit::Months | TimeUnit::Years => None,
        }
    }

    /// Move `t` by `units` whole units (calendar-aware for months and years).
    pub fn shift(self, t: NaiveDateTime, units: i64) -> Option<NaiveDateTime> {
        match self.fixed_seconds() {
            Some(secs) => t.checked_add_signed(Duration::try_seconds(secs.checked_mul(units)?)?),
            None => {
                let months = if self == TimeUnit::Years {
                    units.checked_mul(12)?
                } else {
                    units
                };
                let m = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
                if months >= 0 {
                    t.checked_add_months(m)
                } else {
                    t.checked_sub_months(m)
                }
            }
        }
    }

    /// Window bounds `[γ − h, γ + h]` for a window of `width` units.
    ///
    /// `h` is exactly half the width for fixed-length units; for months and
    /// years it is `width / 2` whole units. A bound past the representable
    /// calendar saturates at [`NaiveDateTime::MIN`] or [`NaiveDateTime::MAX`].
    pub fn window(self, middle: NaiveDateTime, width: u32) -> (NaiveDateTime, NaiveDateTime) {
        let (lo, hi) = match self.fixed_seconds() {
            Some(secs) => {
                let half = Duration::try_seconds(secs * i64::from(width) / 2);
                (
                    half.and_then(|h| middle.checked_sub_signed(h)),
                    half.and_then(|h| middle.checked_add_signed(h)),
                )
            }
            None => {
                let half = i64::from(width / 2);
                (self.shift(middle, -half), self.shift(middle, half))
            }
        };
        (
            lo.unwrap_or(NaiveDateTime::MIN),
            hi.unwrap_or(NaiveDateTime::MAX),
        )
    }

    /// Half-window length in units, matching [`TimeUnit::window`].
    pub fn half_width(self, width: u32) -> f64 {
        match self.fixed_seconds() {
            Some(_) => f64::from(width) / 2.0,
            None => f64::from(width / 2),
        }
    }

    /// Signed distance from `from` to `to`, in (average-length) units.
    pub fn distance(self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        let seconds = (to - from).num_seconds() as f64;
        let unit = match self.fixed_seconds() {
            Some(s) => s as f64,
            None if self == TimeUnit::Months => DAYS_PER_MONTH * SECONDS_PER_DAY,
            None => DAYS_PER_YEAR * SECONDS_PER_DAY,
        };
        seconds / unit
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Years => "years",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            "week" | "weeks" => Ok(TimeUnit::Weeks),
            "month" | "months" => Ok(TimeUnit::Months),
            "year" | "years" => Ok(TimeUnit::Years),
            _ => Err(Error::UnknownName {
                kind: "time unit",
                name: s.to_string(),
            }),
        }
    }
}

/// Weighting of statements by their distance to the slice midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Kernel {
    /// Plain sliding window.
    #[default]
    Uniform,
    /// Linear decay to the window edge.
    Triangular,
    /// Quadratic decay to the window edge.
    Epanechnikov,
    /// Gaussian smoothing over the whole data range.
    Gaussian,
}

impl Kernel {
    /// True for kernels that ignore statements outside the window.
    pub fn is_compact(self) -> bool {
        !matches!(self, Kernel::Gaussian)
    }

    /// Weight of a statement at `distance` units from the midpoint, for a
    /// half-window of `half_width` units.
    ///
    /// Statements reaching a uniform kernel were already selected by window,
    /// so it returns 1 without re-checking the bounds.
    pub fn weight(self, distance: f64, half_width: f64) -> f64 {
        if self == Kernel::Uniform {
            return 1.0;
        }
        if half_width <= 0.0 {
            return if distance == 0.0 { 1.0 } else { 0.0 };
        }
        let u = distance / half_width;
        match self {
            Kernel::Uniform => 1.0,
            Kernel::Triangular => (1.0 - u.abs()).max(0.0),
            Kernel::Epanechnikov => (1.0 - u * u).max(0.0),
            Kernel::Gaussian => (-0.5 * u * u).exp(),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kernel::Uniform => "uniform",
            Kernel::Triangular => "triangular",
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Gaussian => "gaussian",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Kernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "no" | "window" | "windowed" => Ok(Kernel::Uniform),
            "triangular" => Ok(Kernel::Triangular),
            "epanechnikov" => Ok(Kernel::Epanechnikov),
            "gaussian" => Ok(Kernel::Gaussian),
            _ => Err(Error::UnknownName {
                kind: "kernel",
                name: s.to_string(),
            }),
        }
    }
}
