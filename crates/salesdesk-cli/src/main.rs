mod commands;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use salesdesk_core::DateWindow;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "salesdesk-cli")]
#[command(about = "Sales analytics: ROI, reports, demand forecasts, narratives, and email drafts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Optional inclusive date range. Each command picks its own default.
#[derive(Debug, Clone, Copy, Default, Args)]
struct WindowArgs {
    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl WindowArgs {
    fn resolve(self, default: DateWindow) -> DateWindow {
        DateWindow::new(
            self.start.unwrap_or(default.start),
            self.end.unwrap_or(default.end),
        )
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Monthly revenue, COGS, gross margin, and ROI
    Roi {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Forecast monthly unit demand for a product
    Forecast {
        /// Product id; defaults to the top seller in the window
        #[arg(long, conflicts_with = "product_name")]
        product: Option<i64>,

        /// Catalog product name (or part of one) to forecast
        #[arg(long)]
        product_name: Option<String>,

        /// Months to project (1-12)
        #[arg(long, default_value_t = 6)]
        horizon: u32,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Ask a question about the monthly ROI table
    Ask {
        question: String,

        /// Extra business context passed to the analysis
        #[arg(long)]
        context: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Draft a customer email for a scenario tag (e.g. `payment_reminder`)
    Email {
        scenario: String,

        /// Customer name to look up; supplies recipient and relationship facts
        #[arg(long)]
        customer: Option<String>,

        /// Recipient name used in the greeting
        #[arg(long)]
        recipient: Option<String>,

        /// Email facts as a JSON object
        #[arg(long)]
        facts: Option<String>,

        #[arg(long)]
        context: Option<String>,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Customers ranked by revenue
    TopCustomers {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Products ranked by units sold, with profit margin
    TopProducts {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Revenue, profit, and margin per salesperson
    Salespeople {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Revenue by customer delivery city
    Locations {
        #[arg(long, default_value_t = 100)]
        limit: usize,

        #[command(flatten)]
        window: WindowArgs,
    },
    /// Segment customers by spend and purchase frequency
    Segments {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Snapshot of one customer found by name
    Customer {
        name: String,

        #[command(flatten)]
        window: WindowArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = salesdesk_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, data_path = %config.data_path.display(), "configuration loaded");

    let today = Utc::now().date_naive();
    let output = commands::run(&config, cli.command, today).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests;
