// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

/// Overrides the platform data dir location of the database file.
pub const DB_ENV: &str = "CLINICBOOK_DB";

pub const DEFAULT_CURRENCY: &str = "BRL";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const KEY_CURRENCY: &str = "currency";
pub const KEY_BUSY_TIMEOUT: &str = "busy_timeout_ms";
pub const KNOWN_KEYS: [&str; 2] = [KEY_CURRENCY, KEY_BUSY_TIMEOUT];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub currency: String,
    pub busy_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: DEFAULT_CURRENCY.to_string(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        KEY_CURRENCY => {
            if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(anyhow!("Invalid currency '{}', expected a 3-letter code", value));
            }
        }
        KEY_BUSY_TIMEOUT => {
            let ms = value
                .parse::<u64>()
                .with_context(|| format!("Invalid timeout '{}', expected milliseconds", value))?;
            if ms == 0 {
                return Err(anyhow!("Timeout must be greater than zero"));
            }
        }
        other => {
            return Err(anyhow!(
                "Unknown setting '{}' (known: {})",
                other,
                KNOWN_KEYS.join(", ")
            ));
        }
    }
    let stored = if key == KEY_CURRENCY {
        value.to_uppercase()
    } else {
        value.to_string()
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, stored],
    )?;
    Ok(())
}

pub fn load(conn: &Connection) -> Result<Settings> {
    let mut settings = Settings::default();
    if let Some(c) = get_setting(conn, KEY_CURRENCY)? {
        settings.currency = c;
    }
    if let Some(ms) = get_setting(conn, KEY_BUSY_TIMEOUT)? {
        let ms = ms
            .parse::<u64>()
            .with_context(|| format!("Invalid stored {} '{}'", KEY_BUSY_TIMEOUT, ms))?;
        settings.busy_timeout = Duration::from_millis(ms);
    }
    Ok(settings)
}

/// Applies connection-level settings. Writes blocked longer than the busy
/// timeout fail with SQLITE_BUSY, surfaced as `EngineError::Timeout`.
pub fn apply(conn: &Connection, settings: &Settings) -> Result<()> {
    conn.busy_timeout(settings.busy_timeout)?;
    Ok(())
}
