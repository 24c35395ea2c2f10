//! Subcommand handlers. Each returns the JSON document printed to stdout.

use anyhow::Context as _;
use chrono::NaiveDate;
use salesdesk_analytics::{
    build_customer_snapshot, compute_roi, customer_segmentation, sales_by_location,
    salesperson_performance, top_customers, top_products, DemandForecaster, InMemorySource,
};
use salesdesk_core::{AppConfig, DataTable, DateWindow};
use salesdesk_narrative::{EmailDraftComposer, EmailFacts, EmailScenario, NarrativeEngine};
use serde_json::{json, Value};

use crate::Commands;

pub(crate) async fn run(
    config: &AppConfig,
    command: Commands,
    today: NaiveDate,
) -> anyhow::Result<Value> {
    let source = InMemorySource::from_json_file(&config.data_path)
        .with_context(|| format!("loading sales data from {}", config.data_path.display()))?;

    match command {
        Commands::Roi { window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let metrics = compute_roi(&source, &window).await?;
            Ok(json!({ "window": window, "metrics": metrics }))
        }
        Commands::Forecast {
            product,
            product_name,
            horizon,
            window,
        } => {
            let window = window.resolve(DateWindow::forecast_default(today));
            let forecaster = DemandForecaster::from_config(config)?;
            let series = match product_name {
                Some(term) => {
                    forecaster
                        .forecast_by_name(&source, &term, &window, horizon)
                        .await?
                }
                None => {
                    forecaster
                        .forecast(&source, product, &window, horizon)
                        .await?
                }
            };
            Ok(serde_json::to_value(series)?)
        }
        Commands::Ask {
            question,
            context,
            window,
        } => {
            let window = window.resolve(DateWindow::metrics_default());
            // No data is a narrative outcome here, not a command failure.
            let metrics = match compute_roi(&source, &window).await {
                Ok(metrics) => metrics,
                Err(salesdesk_analytics::AnalyticsError::DataUnavailable(reason)) => {
                    tracing::info!(%reason, "no metrics for question window");
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };
            let table = DataTable::from(metrics.as_slice());
            let engine = NarrativeEngine::from_config(config)?;
            let narrative = engine
                .summarize(&table, &question, context.as_deref())
                .await;
            Ok(json!({ "window": window, "question": question, "narrative": narrative }))
        }
        Commands::Email {
            scenario,
            customer,
            recipient,
            facts,
            context,
            window,
        } => {
            let window = window.resolve(DateWindow::metrics_default());
            let snapshot = match customer.as_deref() {
                Some(name) => Some(build_customer_snapshot(&source, name, &window).await?),
                None => None,
            };
            let facts = match (facts, &snapshot) {
                (Some(raw), _) => serde_json::from_str::<EmailFacts>(&raw)
                    .context("parsing --facts as an email facts object")?,
                (None, Some(snapshot)) => EmailFacts::from_snapshot(snapshot),
                (None, None) => EmailFacts::default(),
            };
            let recipient = recipient
                .or_else(|| snapshot.as_ref().map(|s| s.name.clone()))
                .unwrap_or_default();

            let composer = EmailDraftComposer::from_config(config)?;
            let draft = composer
                .compose(
                    EmailScenario::from_tag_or_default(&scenario),
                    &recipient,
                    &facts,
                    context.as_deref(),
                )
                .await;
            Ok(serde_json::to_value(draft)?)
        }
        Commands::TopCustomers { limit, window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let rows = top_customers(&source, &window, limit).await?;
            Ok(json!({ "window": window, "customers": rows }))
        }
        Commands::TopProducts { limit, window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let rows = top_products(&source, &window, limit).await?;
            Ok(json!({ "window": window, "products": rows }))
        }
        Commands::Salespeople { window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let rows = salesperson_performance(&source, &window).await?;
            Ok(json!({ "window": window, "salespeople": rows }))
        }
        Commands::Locations { limit, window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let rows = sales_by_location(&source, &window, limit).await?;
            Ok(json!({ "window": window, "locations": rows }))
        }
        Commands::Segments { window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let report = customer_segmentation(&source, &window).await?;
            Ok(serde_json::to_value(report)?)
        }
        Commands::Customer { name, window } => {
            let window = window.resolve(DateWindow::metrics_default());
            let snapshot = build_customer_snapshot(&source, &name, &window).await?;
            Ok(serde_json::to_value(snapshot)?)
        }
    }
}
