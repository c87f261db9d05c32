use std::fs;
use tracing::info;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xrates::cli::OutputFormat;
use xrates::core::{FailureKind, Operation, RateError, RateRequest};

const CURRENCIES_JSON: &str = r#"{
    "EUR": "Euro",
    "GBP": "British Pound",
    "TRY": "Turkish Lira",
    "USD": "United States Dollar"
}"#;

mod test_utils {
    use super::*;

    pub async fn create_frankfurter_mock() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/currencies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CURRENCIES_JSON))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "EUR"))
            .and(query_param("amount", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount": 10.0, "base": "EUR", "date": "2024-01-05",
                    "rates": {"GBP": 8.6, "TRY": 330.5, "USD": 10.9}}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/2024-01-01..2024-01-03"))
            .and(query_param("from", "EUR"))
            .and(query_param("amount", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount": 1.0, "base": "EUR",
                    "start_date": "2024-01-01", "end_date": "2024-01-03",
                    "rates": {
                        "2024-01-01": {"USD": 1.1037, "TRY": 32.6},
                        "2024-01-02": {"USD": 1.0956, "TRY": 32.5},
                        "2024-01-03": {"USD": 1.0919, "TRY": 32.4}
                    }}"#,
            ))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Writes a config pointing at `mock_server` with a fast retry policy.
    pub fn write_config(mock_server: &MockServer) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            cache:
              ttl_secs: 60
            providers:
              frankfurter:
                base_url: {}
                timeout_secs: 5
                retry:
                  max_retries: 1
                  base_delay_ms: 1
                  max_jitter_ms: 1
            "#,
            mock_server.uri()
        );
        fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_latest_rates_table_hides_denylisted_currencies() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let config_file = test_utils::write_config(&mock_server);

    let mut request = RateRequest::new(Operation::Latest);
    request.amount = Some(rust_decimal::Decimal::TEN);

    let output = xrates::execute_command(
        &request,
        OutputFormat::Table,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .expect("latest rates should succeed");
    info!("\n{output}");

    assert!(output.contains("USD"));
    assert!(output.contains("10.9"));
    assert!(output.contains("GBP"));
    assert!(!output.contains("TRY"));
}

#[test_log::test(tokio::test)]
async fn test_time_series_json_is_paginated_by_date() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let config_file = test_utils::write_config(&mock_server);

    let mut request = RateRequest::new(Operation::TimeSeries);
    request.start_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1);
    request.end_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 3);
    request.page_size = Some(2);

    let output = xrates::execute_command(
        &request,
        OutputFormat::Json,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .expect("time series should succeed");

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total_count"], 3);
    assert_eq!(value["returned_count"], 2);
    let rates = value["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 2);
    assert!(rates.contains_key("2024-01-01"));
    assert!(rates.contains_key("2024-01-02"));
    assert!(rates["2024-01-01"].get("TRY").is_none());
}

#[test_log::test(tokio::test)]
async fn test_denylisted_base_currency_is_rejected() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let config_file = test_utils::write_config(&mock_server);

    let mut request = RateRequest::new(Operation::Latest);
    request.base_currency = Some("try".to_string());

    let err = xrates::execute_command(
        &request,
        OutputFormat::Table,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();

    let rate_error = err.downcast_ref::<RateError>().expect("typed failure");
    assert_eq!(rate_error.kind(), FailureKind::UnsupportedCurrency);
}

#[test_log::test(tokio::test)]
async fn test_unknown_provider_is_configuration_error() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let config_file = test_utils::write_config(&mock_server);

    let mut request = RateRequest::new(Operation::Currencies);
    request.provider_name = Some("Unknown".to_string());

    let err = xrates::execute_command(
        &request,
        OutputFormat::Table,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<RateError>().map(RateError::kind),
        Some(FailureKind::Configuration)
    );
    assert_eq!(err.to_string(), "Provider Unknown is not supported.");
}

#[test_log::test(tokio::test)]
async fn test_currencies_include_denylisted_codes() {
    let mock_server = test_utils::create_frankfurter_mock().await;
    let config_file = test_utils::write_config(&mock_server);

    let output = xrates::execute_command(
        &RateRequest::new(Operation::Currencies),
        OutputFormat::Table,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap();

    assert!(output.contains("Turkish Lira"));
    assert!(output.contains("United States Dollar"));
}

#[test_log::test(tokio::test)]
async fn test_upstream_outage_surfaces_as_upstream_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;
    let config_file = test_utils::write_config(&mock_server);

    let err = xrates::execute_command(
        &RateRequest::new(Operation::Currencies),
        OutputFormat::Json,
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<RateError>().map(RateError::kind),
        Some(FailureKind::Upstream)
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_config_path_fails() {
    let result = xrates::execute_command(
        &RateRequest::new(Operation::Currencies),
        OutputFormat::Table,
        Some("/nonexistent/xrates/config.yaml"),
    )
    .await;
    assert!(result.is_err());
}
