// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::reconcile;
use crate::error::EngineError;
use crate::models::{Client, NewClient};
use crate::store::{AppointmentStore, ClientStore, SqliteStore};
use crate::utils::{fmt_time, maybe_print_json, parse_id, pretty_table, trimmed};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = trimmed(sub, "name").ok_or_else(|| anyhow!("Client name must not be empty"))?;
            let client = store.create_client(&NewClient {
                name,
                email: trimmed(sub, "email"),
                phone: trimmed(sub, "phone"),
            })?;
            println!("Added client '{}' (id {})", client.name, client.id);
        }
        Some(("list", sub)) => {
            let clients = store.all_clients()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &clients)? {
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Email", "Phone"], client_rows(&clients))
                );
            }
        }
        Some(("show", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let client = store
                .client(id)?
                .ok_or_else(|| EngineError::not_found("Client", id))?;
            let history = store.appointments_for_client(id)?;
            if !maybe_print_json(
                sub.get_flag("json"),
                sub.get_flag("jsonl"),
                &serde_json::json!({ "client": client, "appointments": history }),
            )? {
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Email", "Phone"], client_rows(&[client]))
                );
                let rows = history
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.date.to_string(),
                            fmt_time(&a.time),
                            a.r#type.clone(),
                            a.status.label().to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Appt", "Date", "Time", "Type", "Status"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            reconcile::delete_client(&store, id)?;
            println!("Removed client {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn client_rows(clients: &[Client]) -> Vec<Vec<String>> {
    clients
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.email.clone().unwrap_or_default(),
                c.phone.clone().unwrap_or_default(),
            ]
        })
        .collect()
}
