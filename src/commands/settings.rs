// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            match config::get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            config::set_setting(conn, key, value)?;
            println!("{} set to {}", key, config::get_setting(conn, key)?.unwrap_or_default());
        }
        Some(("list", _)) => {
            let s = config::load(conn)?;
            let rows = KNOWN_KEYS
                .iter()
                .map(|k| {
                    let v = match *k {
                        config::KEY_CURRENCY => s.currency.clone(),
                        _ => s.busy_timeout.as_millis().to_string(),
                    };
                    vec![k.to_string(), v]
                })
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
