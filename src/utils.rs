// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate, NaiveTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::models::hhmm;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts `H:MM` or `HH:MM`; the parsed value always formats back zero padded.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), hhmm::FORMAT)
        .with_context(|| format!("Invalid time '{}', expected HH:MM", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_id(s: &str) -> Result<i64> {
    let raw = s.trim();
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| anyhow!("Invalid id '{}'", raw))
}

/// Wall-clock date in local time. Re-read on every call.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn fmt_time(t: &NaiveTime) -> String {
    t.format(hhmm::FORMAT).to_string()
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn trimmed(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_pads_single_digit_hours() {
        let t = parse_time(" 9:05 ").unwrap();
        assert_eq!(fmt_time(&t), "09:05");
    }

    #[test]
    fn parse_time_rejects_garbage() {
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn parse_id_rejects_non_positive() {
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
    }

    #[test]
    fn fmt_money_keeps_two_places() {
        assert_eq!(fmt_money(&Decimal::new(1205, 1), "BRL"), "BRL 120.50");
    }
}
