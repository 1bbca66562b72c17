// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use clinicbook::error::EngineError;
use clinicbook::{cli, commands, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    let outcome = match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
            Ok(())
        }
        Some(("client", sub)) => commands::clients::handle(&conn, sub),
        Some(("appt", sub)) => commands::appointments::handle(&conn, sub),
        Some(("calendar", sub)) => commands::calendar::handle(&conn, sub),
        Some(("fin", sub)) => commands::finance::handle(&conn, sub),
        Some(("settings", sub)) => commands::settings::handle(&conn, sub),
        Some(("doctor", _)) => commands::doctor::handle(&conn),
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };
    if let Err(err) = &outcome {
        let storage = err
            .chain()
            .filter_map(|e| e.downcast_ref::<EngineError>())
            .any(EngineError::is_persistence);
        if storage {
            tracing::error!("{err:#}");
        }
    }
    outcome
}
