use std::path::PathBuf;

use salesdesk_core::{AppConfig, Environment};

use super::*;

fn fixture_config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        data_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sales.json"),
        openai_api_key: None,
        openai_model: "gpt-4o-mini".to_string(),
        openai_base_url: "https://api.openai.com/v1".to_string(),
        llm_timeout_secs: 10,
        llm_long_timeout_secs: 15,
        sender_name: "The Sales Team".to_string(),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn parses_roi_with_window() {
    let cli = Cli::try_parse_from([
        "salesdesk-cli",
        "roi",
        "--start",
        "2016-01-01",
        "--end",
        "2016-06-30",
    ])
    .expect("expected valid cli args");

    let Commands::Roi { window } = cli.command else {
        panic!("expected roi command");
    };
    assert_eq!(window.start, Some(ymd(2016, 1, 1)));
    assert_eq!(window.end, Some(ymd(2016, 6, 30)));
}

#[test]
fn forecast_defaults_horizon_and_product() {
    let cli = Cli::try_parse_from(["salesdesk-cli", "forecast"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Forecast {
            product: None,
            product_name: None,
            horizon: 6,
            ..
        }
    ));
}

#[test]
fn forecast_rejects_id_and_name_together() {
    let result = Cli::try_parse_from([
        "salesdesk-cli",
        "forecast",
        "--product",
        "3",
        "--product-name",
        "mug",
    ]);
    assert!(result.is_err());
}

#[test]
fn report_commands_default_limits() {
    let cli = Cli::try_parse_from(["salesdesk-cli", "top-products"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::TopProducts { limit: 10, .. }));

    let cli = Cli::try_parse_from(["salesdesk-cli", "locations", "--limit", "5"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Locations { limit: 5, .. }));
}

#[test]
fn email_takes_scenario_and_options() {
    let cli = Cli::try_parse_from([
        "salesdesk-cli",
        "email",
        "payment_reminder",
        "--customer",
        "Tailspin",
        "--context",
        "Second notice",
    ])
    .expect("expected valid cli args");
    let Commands::Email {
        scenario,
        customer,
        context,
        ..
    } = cli.command
    else {
        panic!("expected email command");
    };
    assert_eq!(scenario, "payment_reminder");
    assert_eq!(customer.as_deref(), Some("Tailspin"));
    assert_eq!(context.as_deref(), Some("Second notice"));
}

#[test]
fn invalid_date_is_rejected() {
    let result = Cli::try_parse_from(["salesdesk-cli", "segments", "--start", "last-week"]);
    assert!(result.is_err());
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["salesdesk-cli"]).is_err());
}

#[test]
fn window_args_fill_missing_bounds_from_default() {
    let args = WindowArgs {
        start: Some(ymd(2016, 3, 1)),
        end: None,
    };
    let window = args.resolve(DateWindow::metrics_default());
    assert_eq!(window.start, ymd(2016, 3, 1));
    assert_eq!(window.end, ymd(2016, 12, 31));
}

#[tokio::test]
async fn roi_command_reads_fixture() {
    let output = commands::run(
        &fixture_config(),
        Commands::Roi {
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    assert_eq!(output["metrics"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn ask_without_credential_uses_pattern_analysis() {
    let output = commands::run(
        &fixture_config(),
        Commands::Ask {
            question: "How is revenue trending?".to_string(),
            context: None,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    assert_eq!(output["narrative"]["generated_by"], "fallback");
    assert!(output["narrative"]["insight"]
        .as_str()
        .unwrap()
        .contains("Average gross margin"));
}

#[tokio::test]
async fn email_for_known_customer_uses_snapshot_facts() {
    let output = commands::run(
        &fixture_config(),
        Commands::Email {
            scenario: "appreciation".to_string(),
            customer: Some("Tailspin".to_string()),
            recipient: None,
            facts: None,
            context: None,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    assert_eq!(output["generated_by"], "fallback");
    assert!(output["body"]
        .as_str()
        .unwrap()
        .contains("Dear Tailspin Toys (Head Office),"));
}

#[tokio::test]
async fn unknown_customer_fails() {
    let result = commands::run(
        &fixture_config(),
        Commands::Customer {
            name: "Contoso".to_string(),
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn top_customers_command_ranks_fixture_by_revenue() {
    let output = commands::run(
        &fixture_config(),
        Commands::TopCustomers {
            limit: 2,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    let customers = output["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["customer_name"], "Tailspin Toys (Head Office)");
    assert_eq!(customers[0]["total_revenue"], "535553.17");
    assert_eq!(customers[1]["customer_id"], 2);
}

#[tokio::test]
async fn top_products_command_uses_catalog() {
    let output = commands::run(
        &fixture_config(),
        Commands::TopProducts {
            limit: 10,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    let products = output["products"].as_array().unwrap();
    assert_eq!(products.len(), 6);
    assert_eq!(products[0]["product_id"], 6);
    assert_eq!(products[0]["total_units"], 2412);
    assert_eq!(products[1]["brand"], "Northwind");
}

#[tokio::test]
async fn salespeople_command_includes_unassigned_revenue() {
    let output = commands::run(
        &fixture_config(),
        Commands::Salespeople {
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    let rows = output["salespeople"].as_array().unwrap();
    let names: Vec<&str> = rows
        .iter()
        .map(|r| r["salesperson"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "Kayla Woodcock",
            "Archer Lamble",
            "Lily Code",
            "Hudson Onslow",
            "Unknown"
        ]
    );
}

#[tokio::test]
async fn locations_command_skips_customers_without_address() {
    let output = commands::run(
        &fixture_config(),
        Commands::Locations {
            limit: 100,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    let rows = output["locations"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["city"], "Lisco");
}

#[tokio::test]
async fn forecast_by_product_name_reads_fixture() {
    let output = commands::run(
        &fixture_config(),
        Commands::Forecast {
            product: None,
            product_name: Some("joke mug".to_string()),
            horizon: 3,
            window: WindowArgs::default(),
        },
        ymd(2017, 1, 1),
    )
    .await
    .unwrap();
    assert_eq!(output["product_id"], 3);
    assert_eq!(output["method"], "statistical");
    assert_eq!(output["forecast"].as_array().unwrap().len(), 3);
}
