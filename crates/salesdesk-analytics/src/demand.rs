//! Per-product demand forecasting.
//!
//! The statistical projection is always computed first. When a text generator
//! is configured it is asked for its own projection, which replaces the
//! statistical values only if it parses cleanly and covers exactly the
//! expected months.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use salesdesk_core::{
    AppConfig, DateWindow, ForecastMethod, ProductDemandSeries, ProductRef, UnitPoint,
};
use salesdesk_llm::{
    parse_embedded_json, Attempt, CompletionRequest, FallbackChain, GenerationError,
    OpenAiClient, Terminal, TextGenerator,
};
use serde::Deserialize;

use crate::error::AnalyticsError;
use crate::forecast::{clamp_horizon, forecast_units, StatisticalForecast};
use crate::source::SalesSource;

pub const STATISTICAL_EXPLANATION: &str =
    "Baseline linear trend forecast blended with recent performance.";

/// Trailing history months included in the model prompt.
const PROMPT_HISTORY_MONTHS: usize = 24;
const FORECAST_MAX_TOKENS: u32 = 200;
const FORECAST_TEMPERATURE: f32 = 0.2;
const PRODUCT_SEARCH_LIMIT: usize = 5;

/// Everything a forecast strategy sees for one product.
pub struct ForecastInput {
    pub product: ProductRef,
    pub history: Vec<UnitPoint>,
    pub statistical: StatisticalForecast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    pub points: Vec<UnitPoint>,
    pub explanation: String,
    pub method: ForecastMethod,
}

pub struct DemandForecaster {
    chain: FallbackChain<ForecastInput, ForecastOutcome>,
}

impl DemandForecaster {
    /// Forecaster that may consult `generator` before keeping the statistical
    /// projection.
    #[must_use]
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        let chain = FallbackChain::new(KeepStatistical).with_optional_attempt(
            generator.map(|generator| ModelForecast { generator, timeout }),
        );
        Self { chain }
    }

    /// Forecaster that never calls out.
    #[must_use]
    pub fn statistical_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Builds from config; the remote path is only wired when the configured
    /// credential looks usable.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let generator = OpenAiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
        Ok(Self::new(
            generator,
            Duration::from_secs(config.llm_timeout_secs),
        ))
    }

    /// Forecast `horizon` months (clamped to 1..=12) of unit demand.
    ///
    /// With no `product_id` the product with the highest unit volume in the
    /// window is used.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] when no product can be resolved or
    /// the product has no history in the window, and
    /// [`AnalyticsError::Source`] when a query fails.
    pub async fn forecast<S: SalesSource>(
        &self,
        source: &S,
        product_id: Option<i64>,
        window: &DateWindow,
        horizon: u32,
    ) -> Result<ProductDemandSeries, AnalyticsError> {
        let product_id = match product_id {
            Some(id) => id,
            None => source
                .top_product_by_units(window)
                .await?
                .map(|p| p.id)
                .ok_or_else(|| {
                    AnalyticsError::NotFound("no products available for forecasting".to_string())
                })?,
        };

        let rows = source.product_monthly_units(product_id, window).await?;
        let Some(first) = rows.first() else {
            return Err(AnalyticsError::NotFound(format!(
                "no sales history for product {product_id}"
            )));
        };
        let product = ProductRef {
            id: product_id,
            name: first.product_name.clone(),
        };

        #[allow(clippy::cast_precision_loss)]
        let mut history: Vec<UnitPoint> = rows
            .iter()
            .map(|r| UnitPoint {
                month: r.month,
                units: r.units as f64,
            })
            .collect();
        history.sort_by_key(|p| p.month);

        let statistical = forecast_units(&history, horizon)?;
        tracing::debug!(
            product_id,
            history_months = history.len(),
            horizon = statistical.points.len(),
            recent_avg = statistical.recent_avg,
            slope = statistical.trend.slope,
            "statistical forecast computed"
        );

        let input = ForecastInput {
            product,
            history,
            statistical,
        };
        let outcome = self.chain.run(&input).await;

        Ok(ProductDemandSeries {
            product_id: input.product.id,
            product_name: input.product.name,
            window: *window,
            history: input.history,
            forecast: outcome.points,
            explanation: outcome.explanation,
            method: outcome.method,
        })
    }

    /// Forecast the first catalog product whose name contains `term`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::NotFound`] when no catalog product matches,
    /// otherwise the errors of [`DemandForecaster::forecast`].
    pub async fn forecast_by_name<S: SalesSource>(
        &self,
        source: &S,
        term: &str,
        window: &DateWindow,
        horizon: u32,
    ) -> Result<ProductDemandSeries, AnalyticsError> {
        let matches = source.find_products(term, PRODUCT_SEARCH_LIMIT).await?;
        let Some(product) = matches.into_iter().next() else {
            return Err(AnalyticsError::NotFound(format!(
                "no product matching '{}'",
                term.trim()
            )));
        };
        tracing::debug!(
            term,
            product_id = product.id,
            product = %product.name,
            "product resolved by name"
        );
        self.forecast(source, Some(product.id), window, horizon).await
    }
}

struct KeepStatistical;

impl Terminal<ForecastInput, ForecastOutcome> for KeepStatistical {
    fn produce(&self, input: &ForecastInput) -> ForecastOutcome {
        ForecastOutcome {
            points: input.statistical.points.clone(),
            explanation: STATISTICAL_EXPLANATION.to_string(),
            method: ForecastMethod::Statistical,
        }
    }
}

struct ModelForecast {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ModelForecastBody {
    #[serde(default)]
    forecast: Vec<ModelForecastPoint>,
    #[serde(default)]
    explanation: String,
}

#[derive(Deserialize)]
struct ModelForecastPoint {
    month: String,
    units: f64,
}

impl ModelForecast {
    async fn run(&self, input: &ForecastInput) -> Result<ForecastOutcome, GenerationError> {
        let request = CompletionRequest::new(
            forecast_prompt(input),
            FORECAST_MAX_TOKENS,
            self.timeout,
        )
        .with_temperature(FORECAST_TEMPERATURE);

        let text = self.generator.complete(&request).await?;
        let outcome = parse_model_forecast(&text, &input.statistical.points)?;

        let under_floor = outcome
            .points
            .iter()
            .filter(|p| p.units < input.statistical.floor)
            .count();
        if under_floor > 0 {
            tracing::warn!(
                product_id = input.product.id,
                under_floor,
                floor = input.statistical.floor,
                "model forecast falls below the recency floor"
            );
        }
        Ok(outcome)
    }
}

impl Attempt<ForecastInput, ForecastOutcome> for ModelForecast {
    fn name(&self) -> &'static str {
        "model_forecast"
    }

    fn attempt<'a>(
        &'a self,
        input: &'a ForecastInput,
    ) -> BoxFuture<'a, Result<ForecastOutcome, GenerationError>> {
        self.run(input).boxed()
    }
}

fn forecast_prompt(input: &ForecastInput) -> String {
    let horizon = input.statistical.points.len();
    let start = input.history.len().saturating_sub(PROMPT_HISTORY_MONTHS);
    let mut history = String::new();
    for point in &input.history[start..] {
        let _ = writeln!(history, "{}: {:.0}", point.month.format("%Y-%m"), point.units);
    }

    format!(
        "You are a demand forecasting assistant. Given historical monthly units for {name}, \
         predict the next {horizon} months of units sold.\n\n\
         History:\n{history}\n\
         Return strictly JSON with the structure:\n\
         {{\n  \"forecast\": [{{\"month\":\"YYYY-MM\",\"units\":1234}}, ... exactly {horizon} entries],\n  \
         \"explanation\": \"Short explanation (20-40 words) describing the drivers behind the forecast\"\n}}\n\
         Months must be consecutive calendar months immediately following the latest history month.",
        name = input.product.name,
    )
}

/// Validate model output against the months the statistical forecast covers.
///
/// Extra trailing entries are ignored; too few entries, mislabelled months,
/// and negative or non-finite units reject the whole response.
fn parse_model_forecast(
    text: &str,
    expected: &[UnitPoint],
) -> Result<ForecastOutcome, GenerationError> {
    let body: ModelForecastBody = parse_embedded_json(text, "model forecast")
        .map_err(|e| GenerationError::MalformedForecast(e.to_string()))?;

    if body.forecast.len() < expected.len() {
        return Err(GenerationError::MalformedForecast(format!(
            "expected {} entries, got {}",
            expected.len(),
            body.forecast.len()
        )));
    }

    let points = expected
        .iter()
        .zip(&body.forecast)
        .map(|(want, got)| {
            let label = want.month.format("%Y-%m").to_string();
            if got.month.trim() != label {
                return Err(GenerationError::MalformedForecast(format!(
                    "expected month {label}, got {}",
                    got.month
                )));
            }
            if !got.units.is_finite() || got.units < 0.0 {
                return Err(GenerationError::MalformedForecast(format!(
                    "invalid units {} for {label}",
                    got.units
                )));
            }
            Ok(UnitPoint {
                month: want.month,
                units: got.units,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let explanation = body.explanation.trim();
    Ok(ForecastOutcome {
        points,
        explanation: if explanation.is_empty() {
            STATISTICAL_EXPLANATION.to_string()
        } else {
            explanation.to_string()
        },
        method: ForecastMethod::Llm,
    })
}

#[cfg(test)]
#[path = "demand_test.rs"]
mod tests;
