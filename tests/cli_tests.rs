// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clinicbook::commands::{appointments, calendar, clients, doctor, finance, settings};
use clinicbook::engine::ledger::Period;
use clinicbook::models::AppointmentStatus;
use clinicbook::{cli, config, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO clients(id, name) VALUES (1, 'Ana'), (2, 'Bruno')",
        [],
    )
    .unwrap();
    let rows = [
        (1, "2024-05-10", "14:00", "scheduled"),
        (2, "2024-05-10", "09:00", "confirmed"),
        (1, "2024-05-03", "10:00", "completed"),
        (2, "2024-06-01", "08:00", "scheduled"),
    ];
    for (client, date, time, status) in rows {
        conn.execute(
            "INSERT INTO appointments(client_id, client_name, type, date, time, duration, location, status)
             VALUES (?1, (SELECT name FROM clients WHERE id=?1), 'Sessão', ?2, ?3, 50, 'online', ?4)",
            params![client, date, time, status],
        )
        .unwrap();
    }
    conn
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["clinicbook"];
    argv.extend_from_slice(args);
    let mut m = cli::build_cli().get_matches_from(argv);
    for _ in args.iter().take_while(|a| !a.starts_with("--")) {
        let (_, next) = m.remove_subcommand().expect("subcommand");
        m = next;
    }
    m
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["clinicbook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("client", sub)) => clients::handle(conn, sub),
        Some(("appt", sub)) => appointments::handle(conn, sub),
        Some(("fin", sub)) => finance::handle(conn, sub),
        Some(("settings", sub)) => settings::handle(conn, sub),
        other => panic!("unexpected command {:?}", other.map(|(n, _)| n)),
    }
}

#[test]
fn appt_list_by_date_is_time_ordered() {
    let conn = setup();
    let m = sub_matches(&["appt", "list", "--date", "2024-05-10"]);
    let rows = appointments::query_rows(&conn, &m).unwrap();
    let times: Vec<_> = rows.iter().map(|a| a.time.format("%H:%M").to_string()).collect();
    assert_eq!(times, vec!["09:00", "14:00"]);
}

#[test]
fn appt_list_range_and_status_combine() {
    let conn = setup();
    let m = sub_matches(&[
        "appt", "list", "--from", "2024-05-01", "--to", "2024-05-31", "--status", "scheduled",
    ]);
    let rows = appointments::query_rows(&conn, &m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AppointmentStatus::Scheduled);
    assert_eq!(rows[0].date.to_string(), "2024-05-10");
}

#[test]
fn appt_list_by_client_is_most_recent_first() {
    let conn = setup();
    let m = sub_matches(&["appt", "list", "--client", "1"]);
    let dates: Vec<_> = appointments::query_rows(&conn, &m)
        .unwrap()
        .iter()
        .map(|a| a.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2024-05-10", "2024-05-03"]);
}

#[test]
fn appt_list_rejects_unknown_status() {
    let conn = setup();
    let m = sub_matches(&["appt", "list", "--status", "late"]);
    let err = appointments::query_rows(&conn, &m).unwrap_err();
    assert!(err.to_string().contains("late"));
}

#[test]
fn appt_add_normalizes_time_and_snapshots_client() {
    let conn = setup();
    run(
        &conn,
        &[
            "appt", "add", "--client", " 2 ", "--type", "Avaliação", "--date", "2024-07-01",
            "--time", "9:05", "--duration", "45",
        ],
    )
    .unwrap();
    let (name, time, location, status): (String, String, String, String) = conn
        .query_row(
            "SELECT client_name, time, location, status FROM appointments WHERE date='2024-07-01'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(name, "Bruno");
    assert_eq!(time, "09:05");
    assert_eq!(location, "in_person");
    assert_eq!(status, "scheduled");
}

#[test]
fn appt_execute_books_payment_and_blocks_deletion() {
    let conn = setup();
    run(
        &conn,
        &["appt", "execute", "--id", "1", "--amount", "180", "--description", "Sessão maio"],
    )
    .unwrap();
    let (status,): (String,) = conn
        .query_row("SELECT status FROM appointments WHERE id=1", [], |r| Ok((r.get(0)?,)))
        .unwrap();
    assert_eq!(status, "completed");
    let (amount, appt): (String, i64) = conn
        .query_row(
            "SELECT amount, appointment_id FROM financial_records",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount.parse::<Decimal>().unwrap(), Decimal::from(180));
    assert_eq!(appt, 1);

    let err = run(&conn, &["appt", "rm", "--id", "1"]).unwrap_err();
    assert!(err.to_string().contains("linked financial record"));
}

#[test]
fn appt_status_rejects_unknown_value() {
    let conn = setup();
    let err = run(&conn, &["appt", "status", "--id", "2", "--status", "done"]).unwrap_err();
    assert!(err.to_string().contains("Unrecognized appointment status"));
    run(&conn, &["appt", "status", "--id", "2", "--status", "no_show"]).unwrap();
}

#[test]
fn calendar_month_view_loads_padding_days_too() {
    let conn = setup();
    let m = sub_matches(&["calendar", "--view", "month", "--date", "2024-05-20"]);
    let days = calendar::agenda_for(&conn, &m).unwrap();
    assert_eq!(days.len(), 42);
    let total: usize = days.iter().map(|d| d.appointments.len()).sum();
    // 2024-06-01 falls in the trailing padding of the May grid
    assert_eq!(total, 4);
}

#[test]
fn calendar_offset_moves_the_anchor() {
    let conn = setup();
    let m = sub_matches(&[
        "calendar", "--view", "week", "--date", "2024-05-20", "--offset", "-2",
    ]);
    let days = calendar::agenda_for(&conn, &m).unwrap();
    assert_eq!(days[0].cell.date.to_string(), "2024-05-05");
    let total: usize = days.iter().map(|d| d.appointments.len()).sum();
    assert_eq!(total, 2);
}

fn seed_ledger(conn: &Connection) {
    run(conn, &["fin", "add", "--amount", "200", "--description", "Sessão", "--type", "income", "--date", "2024-05-10", "--client", "1"]).unwrap();
    run(conn, &["fin", "add", "--amount", "80", "--description", "Aluguel", "--type", "expense", "--date", "2024-05-12", "--category", "Aluguel"]).unwrap();
    run(conn, &["fin", "add", "--amount", "50", "--description", "Sessão", "--type", "income", "--date", "2024-04-02", "--client", "2"]).unwrap();
}

#[test]
fn fin_range_implies_custom_period() {
    let m = sub_matches(&["fin", "list", "--from", "2024-05-01", "--to", "2024-05-31"]);
    let criteria = finance::criteria_from(&m).unwrap();
    assert_eq!(criteria.period, Period::Custom);

    let m = sub_matches(&["fin", "summary"]);
    assert_eq!(finance::criteria_from(&m).unwrap().period, Period::All);
}

#[test]
fn fin_list_filters_and_stores_signed_amounts() {
    let conn = setup();
    seed_ledger(&conn);
    let m = sub_matches(&["fin", "list", "--period", "custom", "--from", "2024-05-01", "--to", "2024-05-31"]);
    let rows = finance::query_rows(&conn, &m).unwrap();
    let amounts: Vec<_> = rows.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![Decimal::from(-80), Decimal::from(200)]);

    let m = sub_matches(&["fin", "list", "--period", "custom", "--from", "2024-05-01"]);
    assert_eq!(finance::query_rows(&conn, &m).unwrap().len(), 3);

    let m = sub_matches(&["fin", "list", "--client", "2"]);
    assert_eq!(finance::query_rows(&conn, &m).unwrap().len(), 1);

    let m = sub_matches(&["fin", "list", "--limit", "1"]);
    let newest = finance::query_rows(&conn, &m).unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].date.to_string(), "2024-05-12");
}

#[test]
fn fin_add_rejects_non_positive_amount() {
    let conn = setup();
    let err = run(&conn, &["fin", "add", "--amount", "0", "--description", "x", "--type", "income"]).unwrap_err();
    assert!(err.to_string().contains("amount"));
}

#[test]
fn settings_round_trip_and_validation() {
    let conn = setup();
    run(&conn, &["settings", "set", "--key", "currency", "--value", "eur"]).unwrap();
    assert_eq!(config::load(&conn).unwrap().currency, "EUR");
    assert!(run(&conn, &["settings", "set", "--key", "busy_timeout_ms", "--value", "0"]).is_err());
    assert!(run(&conn, &["settings", "set", "--key", "theme", "--value", "dark"]).is_err());
    run(&conn, &["settings", "set", "--key", "busy_timeout_ms", "--value", "250"]).unwrap();
    assert_eq!(config::load(&conn).unwrap().busy_timeout.as_millis(), 250);
}

#[test]
fn doctor_flags_completed_appointment_without_payment() {
    let conn = setup();
    let rows = doctor::report(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "completed_without_payment");
    conn.execute(
        "UPDATE appointments SET status='scheduled' WHERE status='completed'",
        [],
    )
    .unwrap();
    assert!(doctor::report(&conn).unwrap().is_empty());
}

#[test]
fn open_at_creates_schema_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.sqlite");
    let conn = db::open_at(&path).unwrap();
    assert_eq!(config::load(&conn).unwrap(), config::Settings::default());
    drop(conn);
    let again = db::open_at(&path).unwrap();
    let tables: i64 = again
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('clients','appointments','financial_records','settings')",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(tables, 4);
}

#[test]
fn fin_update_re_signs_on_type_change() {
    let conn = setup();
    seed_ledger(&conn);
    run(&conn, &["fin", "update", "--id", "1", "--type", "expense", "--category", "Estorno"]).unwrap();
    let (amount, kind, category): (String, String, String) = conn
        .query_row(
            "SELECT amount, type, category FROM financial_records WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(amount.parse::<Decimal>().unwrap(), Decimal::from(-200));
    assert_eq!(kind, "expense");
    assert_eq!(category, "Estorno");

    assert!(run(&conn, &["fin", "update", "--id", "1"]).is_err());
    assert!(run(&conn, &["fin", "update", "--id", "99", "--amount", "5"]).is_err());
}

#[test]
fn appt_execute_negative_amount_completes_without_booking() {
    let conn = setup();
    run(&conn, &["appt", "execute", "--id", "2", "--amount", "-5"]).unwrap();
    let (status,): (String,) = conn
        .query_row("SELECT status FROM appointments WHERE id=2", [], |r| Ok((r.get(0)?,)))
        .unwrap();
    assert_eq!(status, "completed");
    let records: i64 = conn
        .query_row("SELECT COUNT(*) FROM financial_records", [], |r| r.get(0))
        .unwrap();
    assert_eq!(records, 0);
}

#[test]
fn appt_execute_failure_names_the_appointment() {
    let conn = setup();
    let err = run(&conn, &["appt", "execute", "--id", "99", "--amount", "10"]).unwrap_err();
    assert_eq!(err.to_string(), "Executing appointment 99 failed");
    assert!(format!("{err:#}").contains("Appointment 99 not found"));
}
