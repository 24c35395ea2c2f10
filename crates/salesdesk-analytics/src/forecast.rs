//! Statistical demand projection: a least-squares trend blended with the
//! recent average and floored at a fraction of it.

use salesdesk_core::{add_months, UnitPoint};

use crate::error::AnalyticsError;

pub const MIN_HORIZON: u32 = 1;
pub const MAX_HORIZON: u32 = 12;
/// Number of trailing months averaged into `recent_avg`.
pub const RECENT_WINDOW: usize = 6;
pub const TREND_WEIGHT: f64 = 0.7;
pub const RECENT_WEIGHT: f64 = 0.3;
/// No projected month may fall below this fraction of `recent_avg`.
pub const FLOOR_RATIO: f64 = 0.6;

#[must_use]
pub fn clamp_horizon(horizon: u32) -> u32 {
    horizon.clamp(MIN_HORIZON, MAX_HORIZON)
}

/// `units = slope * index + intercept`, fitted over month indices `0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Ordinary least squares over `values`.
    ///
    /// With fewer than two points the line is flat through the single value
    /// (or zero when there are none).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        if n < 2 {
            return Self {
                slope: 0.0,
                intercept: values.first().copied().unwrap_or(0.0),
            };
        }

        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n_f;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        Self {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    }

    #[must_use]
    pub fn at(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

/// Output of [`forecast_units`], with the inputs of the blend exposed for
/// logging and for checking model-produced forecasts against the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalForecast {
    pub points: Vec<UnitPoint>,
    pub trend: TrendLine,
    pub recent_avg: f64,
    pub floor: f64,
}

/// Project `horizon` months (clamped to 1..=12) past the end of `history`.
///
/// `history` must be sorted by month ascending. Forecast months are the
/// consecutive calendar months after the last history month.
///
/// # Errors
///
/// Returns [`AnalyticsError::DataUnavailable`] if `history` is empty.
#[allow(clippy::cast_precision_loss)]
pub fn forecast_units(
    history: &[UnitPoint],
    horizon: u32,
) -> Result<StatisticalForecast, AnalyticsError> {
    let Some(last) = history.last() else {
        return Err(AnalyticsError::DataUnavailable(
            "cannot forecast without history".to_string(),
        ));
    };

    let values: Vec<f64> = history.iter().map(|p| p.units).collect();
    let trend = TrendLine::fit(&values);

    let recent = &values[values.len().saturating_sub(RECENT_WINDOW)..];
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let floor = FLOOR_RATIO * recent_avg;

    let n = values.len() as f64;
    let points = (1..=clamp_horizon(horizon))
        .map(|step| {
            let trend_value = trend.at(n + f64::from(step) - 1.0);
            let blended = TREND_WEIGHT * trend_value + RECENT_WEIGHT * recent_avg;
            UnitPoint {
                month: add_months(last.month, step),
                units: blended.max(floor),
            }
        })
        .collect();

    Ok(StatisticalForecast {
        points,
        trend,
        recent_avg,
        floor,
    })
}
