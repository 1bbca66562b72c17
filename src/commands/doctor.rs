// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::reconcile::{self, Issue};
use crate::store::SqliteStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = report(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn report(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let store = SqliteStore::new(conn);
    let rows = reconcile::audit(&store)?
        .into_iter()
        .map(|issue| match issue {
            Issue::DanglingLink {
                record_id,
                appointment_id,
            } => vec![
                "dangling_appointment_link".into(),
                format!("record #{} -> missing appointment #{}", record_id, appointment_id),
            ],
            Issue::SignMismatch { record_id } => vec![
                "amount_sign_mismatch".into(),
                format!("record #{}", record_id),
            ],
            Issue::UnpaidCompleted { appointment_id } => vec![
                "completed_without_payment".into(),
                format!("appointment #{}", appointment_id),
            ],
        })
        .collect();
    Ok(rows)
}
