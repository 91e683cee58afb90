//! # Current Tide Estimation
//!
//! Linear interpolation of the tide height at an arbitrary instant between the
//! two samples bracketing it. There is no extrapolation: outside the series
//! the current height is simply unknown.

use crate::mapper::{seconds_between, Scale};
use crate::{check_series, ChartError, PlotPoint, Sample, Viewport};
use chrono::{DateTime, Utc};

/// Estimate the tide height at `now`.
///
/// Returns `Ok(None)` when `now` lies before the first or after the last
/// sample. Both ends are inclusive, so `now` equal to any sample timestamp
/// returns that sample's height exactly.
///
/// # Errors
/// [`ChartError::MalformedSeries`] when timestamps are not strictly
/// increasing, rather than dividing by a zero or negative interval.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_chart_lib::{interpolator::current_height, Sample, TideKind};
///
/// let at = |t, h| Sample { timestamp: Utc.timestamp_opt(t, 0).unwrap(), height: h, kind: TideKind::Low };
/// let samples = [at(0, 1.0), at(3600, 2.0)];
///
/// let now = Utc.timestamp_opt(1800, 0).unwrap();
/// assert_eq!(current_height(&samples, now).unwrap(), Some(1.5));
/// ```
pub fn current_height(samples: &[Sample], now: DateTime<Utc>) -> Result<Option<f64>, ChartError> {
    check_series(samples)?;

    let Some(after_index) = samples.iter().position(|s| s.timestamp > now) else {
        // Nothing later than `now`: only the final instant itself is covered
        return Ok(samples
            .last()
            .filter(|last| last.timestamp == now)
            .map(|last| last.height));
    };
    if after_index == 0 {
        return Ok(None);
    }

    let before = &samples[after_index - 1];
    let after = &samples[after_index];
    let progress =
        seconds_between(before.timestamp, now) / seconds_between(before.timestamp, after.timestamp);
    Ok(Some(before.height + (after.height - before.height) * progress))
}

/// Pixel position of the live marker, if `now` falls inside the series.
pub fn current_marker(
    samples: &[Sample],
    viewport: Viewport,
    now: DateTime<Utc>,
) -> Result<Option<PlotPoint>, ChartError> {
    let Some(height) = current_height(samples, now)? else {
        return Ok(None);
    };
    Ok(Scale::fit(samples, viewport).map(|scale| scale.project(now, height)))
}
