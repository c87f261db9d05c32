use super::ui;
use crate::core::{CurrencyCatalog, PageInfo, RateResponse, RateSet, TimeSeries};
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn render(response: &RateResponse, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(response)?);
    }
    Ok(match response {
        RateResponse::Latest(set) => rate_set_table(set),
        RateResponse::Historical(historical) => format!(
            "{}\n{}",
            rate_set_table(&historical.rate_set),
            page_footer(&historical.page, "rates")
        ),
        RateResponse::TimeSeries(series) => series_table(series),
        RateResponse::Currencies(catalog) => catalog_table(catalog),
        RateResponse::Supported(supported) => {
            if *supported {
                ui::style_text("Supported", ui::StyleType::Positive)
            } else {
                ui::style_text("Not supported", ui::StyleType::Error)
            }
        }
    })
}

fn rate_set_table(set: &RateSet) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (code, rate) in &set.rates {
        table.add_row(vec![Cell::new(code), ui::rate_cell(*rate)]);
    }

    format!(
        "{} {} on {}\n\n{}",
        ui::style_text(&set.amount.normalize().to_string(), ui::StyleType::Label),
        ui::style_text(&set.base_currency, ui::StyleType::Title),
        set.as_of,
        table
    )
}

fn series_table(series: &TimeSeries) -> String {
    let codes: BTreeSet<&String> = series.rates.values().flat_map(|day| day.keys()).collect();

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date")];
    header.extend(codes.iter().map(|code| ui::header_cell(code)));
    table.set_header(header);

    for (day, rates) in &series.rates {
        let mut row = vec![Cell::new(day.to_string())];
        row.extend(
            codes
                .iter()
                .map(|code| rates.get(*code).map_or_else(ui::na_cell, |r| ui::rate_cell(*r))),
        );
        table.add_row(row);
    }

    format!(
        "{} {} from {} to {}\n\n{}\n{}",
        ui::style_text(&series.amount.normalize().to_string(), ui::StyleType::Label),
        ui::style_text(&series.base_currency, ui::StyleType::Title),
        series.start_date,
        series.end_date,
        table,
        page_footer(&series.page, "dates")
    )
}

fn catalog_table(catalog: &CurrencyCatalog) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Name")]);
    for (code, name) in catalog.iter() {
        table.add_row(vec![Cell::new(code), Cell::new(name)]);
    }
    table.to_string()
}

fn page_footer(page: &PageInfo, unit: &str) -> String {
    ui::style_text(
        &format!(
            "Page {} ({} of {} {unit}, {} per page)",
            page.page, page.returned_count, page.total_count, page.page_size
        ),
        ui::StyleType::Subtle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HistoricalRateSet, Rates};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn page(total: usize, returned: usize) -> PageInfo {
        PageInfo {
            page: 1,
            page_size: 2,
            total_count: total,
            returned_count: returned,
        }
    }

    #[test]
    fn test_historical_table_lists_rates_and_page() {
        let response = RateResponse::Historical(HistoricalRateSet {
            rate_set: RateSet {
                base_currency: "EUR".into(),
                amount: dec!(1),
                as_of: day(5),
                rates: Rates::from([
                    ("GBP".to_string(), dec!(0.85)),
                    ("USD".to_string(), dec!(1.10)),
                ]),
            },
            page: page(4, 2),
        });

        let output = render(&response, OutputFormat::Table).unwrap();
        assert!(output.contains("GBP"));
        assert!(output.contains("0.85"));
        assert!(output.contains("1.1"));
        assert!(output.contains("2024-01-05"));
        assert!(output.contains("2 of 4 rates"));
    }

    #[test]
    fn test_series_table_marks_missing_rates() {
        let response = RateResponse::TimeSeries(TimeSeries {
            base_currency: "EUR".into(),
            amount: dec!(1),
            start_date: day(1),
            end_date: day(2),
            rates: BTreeMap::from([
                (day(1), Rates::from([("USD".to_string(), dec!(1.1))])),
                (day(2), Rates::from([("GBP".to_string(), dec!(0.86))])),
            ]),
            page: page(2, 2),
        });

        let output = render(&response, OutputFormat::Table).unwrap();
        assert!(output.contains("N/A"));
        assert!(output.contains("2024-01-02"));
        assert!(output.contains("2 of 2 dates"));
    }

    #[test]
    fn test_json_output() {
        let response = RateResponse::Supported(false);
        assert_eq!(render(&response, OutputFormat::Json).unwrap(), "false");

        let catalog: CurrencyCatalog = [("EUR".to_string(), "Euro".to_string())]
            .into_iter()
            .collect();
        let json = render(&RateResponse::Currencies(catalog), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["EUR"], "Euro");
    }
}
