// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FuelPrices DK.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Shared scraping helpers: price and label cleanup, HTML row extraction

use fuelprices_core::{FetchError, FetchResult};
use fuelprices_types::Company;
use rust_decimal::{Decimal, RoundingStrategy};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::str::FromStr;

/// Parse a retailer price label like `"Pris inkl. moms: 13,49 kr."` into DKK
pub fn clean_price(company: Company, raw: &str) -> FetchResult<Decimal> {
    let cleaned = raw
        .replace("Pris inkl. moms: ", "")
        .replace(" kr.", "")
        .replace(" kr/kWh", "")
        .replace(',', ".");
    let cleaned = cleaned.trim();

    Decimal::from_str(cleaned)
        .map(|price| price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .map_err(|e| FetchError::parse(company, format!("invalid price '{}': {e}", raw.trim())))
}

/// JSON APIs send prices either as numbers or as strings
pub fn json_price(company: Company, value: &Value) -> FetchResult<Decimal> {
    match value {
        Value::String(s) => clean_price(company, s),
        Value::Number(n) => clean_price(company, &n.to_string()),
        other => Err(FetchError::parse(
            company,
            format!("price is not a number: {other}"),
        )),
    }
}

/// Strip the `Beskrivelse: ` prefix, whitespace and one trailing period
pub fn clean_product_name(raw: &str) -> String {
    let name = raw.replace("Beskrivelse: ", "");
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_owned()
}

fn selector(company: Company, css: &str) -> FetchResult<Selector> {
    Selector::parse(css)
        .map_err(|e| FetchError::parse(company, format!("invalid selector '{css}': {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect()
}

/// Text of every `<td>` for each `<tr>`, in document order.
///
/// Rows without data cells (header rows) are kept as empty vectors so that
/// callers can address rows by position.
pub fn table_rows(company: Company, html: &str) -> FetchResult<Vec<Vec<String>>> {
    rows(company, html, "tr", "td")
}

/// Same as [`table_rows`] for ARIA grids built from `div[role=row]` and
/// `div[role=gridcell]`
pub fn grid_rows(company: Company, html: &str) -> FetchResult<Vec<Vec<String>>> {
    rows(company, html, r#"div[role="row"]"#, r#"div[role="gridcell"]"#)
}

fn rows(company: Company, html: &str, row_css: &str, cell_css: &str) -> FetchResult<Vec<Vec<String>>> {
    let row_selector = selector(company, row_css)?;
    let cell_selector = selector(company, cell_css)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&row_selector)
        .map(|row| row.select(&cell_selector).map(cell_text).collect())
        .collect())
}
