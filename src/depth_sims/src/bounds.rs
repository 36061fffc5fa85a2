use std::fmt::{self, Display, Formatter};

/// Two-sided interval widths for which confidence bounds are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalWidth {
    P90,
    P95,
    P99,
}

impl IntervalWidth {
    /// Every reported width, in output column order.
    pub const ALL: [Self; 3] = [Self::P90, Self::P95, Self::P99];

    /// Lower and upper tail probabilities of this interval, i.e. `((1-w)/2, (1+w)/2)`.
    /// 
    /// Values are kept literal, so that `floor(0.05 * 100)` does indeed yield `5`.
    #[must_use]
    pub fn tails(self) -> (f64, f64) {
        match self {
            Self::P90 => (0.05,  0.95),
            Self::P95 => (0.025, 0.975),
            Self::P99 => (0.005, 0.995),
        }
    }

    /// Compute the `(low, high)` empirical quantiles of an ascending-sorted distribution.
    /// 
    /// - low : `sorted[floor(lower_tail * n)]`, clamped to the minimum.
    /// - high: `sorted[ceil(upper_tail * n)]`, clamped to the maximum.
    /// 
    /// Returns `None` if `sorted` is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn quantiles(self, sorted: &[f64]) -> Option<(f64, f64)> {
        let last = sorted.len().checked_sub(1)?;
        let n = sorted.len() as f64;
        let (lower_tail, upper_tail) = self.tails();

        let lower = ((lower_tail * n).floor() as usize).min(last);
        let upper = ((upper_tail * n).ceil()  as usize).min(last);
        Some((sorted[lower], sorted[upper]))
    }
}

/// Empirical two-sided 90/95/99% bounds of a simulated delta SNP-index distribution.
/// 
/// Bounds obtained from [`ConfidenceBounds::from_sorted`] are nested:
/// `p99_low <= p95_low <= p90_low <= p90_high <= p95_high <= p99_high`
/// 
/// An "unsupported" sentinel (see [`ConfidenceBounds::unsupported`]) is used whenever no simulated replicate
/// was available to estimate the bounds. All of its values are `NaN`, and are displayed as `NA`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBounds {
    pub p90_low : f64,
    pub p90_high: f64,
    pub p95_low : f64,
    pub p95_high: f64,
    pub p99_low : f64,
    pub p99_high: f64,
}

impl ConfidenceBounds {
    /// Number of values held by a set of confidence bounds.
    pub const LEN: usize = 6;

    /// Compute confidence bounds from an ascending-sorted sequence of deltas.
    /// Returns `None` if `sorted` is empty.
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let mut values = [0.0; Self::LEN];
        for (width, interval) in IntervalWidth::ALL.into_iter().zip(values.chunks_exact_mut(2)) {
            let (low, high) = width.quantiles(sorted)?;
            interval.copy_from_slice(&[low, high]);
        }
        Some(Self::from_values(values))
    }

    /// Sentinel value for depth pairs lacking any simulated support.
    #[must_use]
    pub fn unsupported() -> Self {
        Self::from_values([f64::NAN; Self::LEN])
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.values().iter().all(|value| !value.is_nan())
    }

    /// Values in output column order: `p90L p90H p95L p95H p99L p99H`
    #[must_use]
    pub fn values(&self) -> [f64; Self::LEN] {
        [self.p90_low, self.p90_high, self.p95_low, self.p95_high, self.p99_low, self.p99_high]
    }

    /// Inverse of [`ConfidenceBounds::values`].
    #[must_use]
    pub fn from_values(values: [f64; Self::LEN]) -> Self {
        let [p90_low, p90_high, p95_low, p95_high, p99_low, p99_high] = values;
        Self{p90_low, p90_high, p95_low, p95_high, p99_low, p99_high}
    }
}

/// Tab-separated values, rounded to two decimal places. `NaN` values are written as `NA`.
impl Display for ConfidenceBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            match value.is_nan() {
                true  => write!(f, "NA")?,
                false => write!(f, "{value:.2}")?,
            }
        }
        Ok(())
    }
}
