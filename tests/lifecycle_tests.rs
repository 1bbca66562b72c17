// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveTime};
use clinicbook::engine::lifecycle::{
    self, AppointmentDraft, PaymentInput, plan_execution, transition,
};
use clinicbook::error::{EngineError, EngineResult};
use clinicbook::models::{
    Appointment, AppointmentPatch, AppointmentStatus, Client, FinancialRecord, FinancialType,
    Location, NewAppointment, NewClient, NewFinancialRecord, RecordPatch,
};
use clinicbook::store::{
    AppointmentStore, ClientStore, FinancialStore, MemoryStore, SqliteStore, Store,
};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn draft(client_id: i64) -> AppointmentDraft {
    AppointmentDraft {
        client_id,
        r#type: "Consulta".into(),
        date: d("2024-05-10"),
        time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        duration: 50,
        location: Location::InPerson,
        status: None,
        notes: None,
    }
}

fn seeded<S: Store>(store: &S) -> Appointment {
    let client = store
        .create_client(&NewClient {
            name: "Ana Souza".into(),
            ..Default::default()
        })
        .unwrap();
    lifecycle::create(store, draft(client.id)).unwrap()
}

fn payment(amount: i64, kind: FinancialType) -> PaymentInput {
    PaymentInput {
        amount: Decimal::from(amount),
        description: "x".into(),
        r#type: kind,
        category: None,
    }
}

#[test]
fn create_snapshots_client_name_and_defaults_to_scheduled() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    assert_eq!(appt.client_name, "Ana Souza");
    assert_eq!(appt.status, AppointmentStatus::Scheduled);
}

#[test]
fn create_rejects_unknown_client_and_zero_duration() {
    let store = MemoryStore::new();
    let err = lifecycle::create(&store, draft(42)).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "Client", id: 42 }));

    let client = store.create_client(&NewClient { name: "B".into(), ..Default::default() }).unwrap();
    let mut bad = draft(client.id);
    bad.duration = 0;
    let err = lifecycle::create(&store, bad).unwrap_err();
    assert!(matches!(err, EngineError::Validation { field: "duration", .. }));
}

#[test]
fn transition_allows_every_pair_and_touches_only_status() {
    let store = MemoryStore::new();
    let base = seeded(&store);
    for from in AppointmentStatus::ALL {
        for to in AppointmentStatus::ALL {
            let start = transition(&base, from);
            let next = transition(&start, to);
            assert_eq!(next.status, to);
            assert_eq!((next.date, next.time, next.duration), (base.date, base.time, base.duration));
            assert_eq!(start.status, from);
        }
    }
}

#[test]
fn set_status_persists_and_returns_fresh_copy() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let updated = lifecycle::set_status(&store, appt.id, AppointmentStatus::NoShow).unwrap();
    assert_eq!(updated.status, AppointmentStatus::NoShow);
    assert_eq!(store.appointment(appt.id).unwrap().unwrap().status, AppointmentStatus::NoShow);
    let back = lifecycle::set_status(&store, appt.id, AppointmentStatus::Scheduled).unwrap();
    assert_eq!(back.status, AppointmentStatus::Scheduled);
}

#[test]
fn set_status_rejects_unknown_value_without_changing_anything() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let err = lifecycle::set_status_str(&store, appt.id, "postponed").unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(ref s) if s == "postponed"));
    assert!(err.is_validation());
    assert_eq!(store.appointment(appt.id).unwrap().unwrap().status, AppointmentStatus::Scheduled);
}

#[test]
fn set_status_on_missing_appointment_is_not_found() {
    let store = MemoryStore::new();
    let err = lifecycle::set_status(&store, 7, AppointmentStatus::Confirmed).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { entity: "Appointment", id: 7 }));
}

#[test]
fn execute_with_positive_payment_books_one_linked_record() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let today = d("2024-05-11");
    let out = lifecycle::execute(&store, appt.id, Some(&payment(100, FinancialType::Income)), today)
        .unwrap();
    assert_eq!(out.appointment.status, AppointmentStatus::Completed);
    let rec = out.financial_record.expect("record booked");
    assert_eq!(rec.appointment_id, Some(appt.id));
    assert_eq!(rec.client_id, Some(appt.client_id));
    assert_eq!(rec.amount, Decimal::from(100));
    assert_eq!(rec.date, today);
    assert_eq!(rec.description, "x");
    assert_eq!(store.all_records().unwrap().len(), 1);
}

#[test]
fn execute_without_payment_only_completes() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let out = lifecycle::execute(&store, appt.id, None, d("2024-05-11")).unwrap();
    assert_eq!(out.appointment.status, AppointmentStatus::Completed);
    assert!(out.financial_record.is_none());
    assert!(store.all_records().unwrap().is_empty());
}

#[test]
fn execute_with_zero_or_negative_amount_books_nothing() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    for amount in [0, -20] {
        let out = lifecycle::execute(
            &store,
            appt.id,
            Some(&payment(amount, FinancialType::Income)),
            d("2024-05-11"),
        )
        .unwrap();
        assert_eq!(out.appointment.status, AppointmentStatus::Completed);
        assert!(out.financial_record.is_none());
    }
    assert!(store.all_records().unwrap().is_empty());
}

#[test]
fn execute_expense_payment_is_stored_negative() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let out = lifecycle::execute(
        &store,
        appt.id,
        Some(&payment(35, FinancialType::Expense)),
        d("2024-05-11"),
    )
    .unwrap();
    assert_eq!(out.financial_record.unwrap().amount, Decimal::from(-35));
}

#[test]
fn execute_missing_appointment_is_not_found() {
    let store = MemoryStore::new();
    let err = lifecycle::execute(&store, 3, None, d("2024-05-11")).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn plan_fills_blank_description_from_appointment() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let mut p = payment(80, FinancialType::Income);
    p.description = "  ".into();
    let plan = plan_execution(&appt, Some(&p), d("2024-05-11"));
    assert_eq!(plan.record.unwrap().description, "Consulta - Ana Souza");
    assert_eq!(plan.appointment.status, AppointmentStatus::Completed);
    // planning never touches the store
    assert_eq!(store.appointment(appt.id).unwrap().unwrap().status, AppointmentStatus::Scheduled);
}

#[test]
fn update_moves_schedule_but_rejects_empty_patch() {
    let store = MemoryStore::new();
    let appt = seeded(&store);
    let patch = AppointmentPatch {
        date: Some(d("2024-05-17")),
        time: Some(NaiveTime::from_hms_opt(11, 0, 0).unwrap()),
        ..Default::default()
    };
    let moved = lifecycle::update(&store, appt.id, &patch).unwrap();
    assert_eq!(moved.date, d("2024-05-17"));
    assert_eq!(moved.status, AppointmentStatus::Scheduled);

    let err = lifecycle::update(&store, appt.id, &AppointmentPatch::default()).unwrap_err();
    assert!(err.is_validation());
}

/// Delegates to a MemoryStore but refuses every financial-record write.
struct FailingLedger(MemoryStore);

impl ClientStore for FailingLedger {
    fn all_clients(&self) -> EngineResult<Vec<Client>> {
        self.0.all_clients()
    }
    fn client(&self, id: i64) -> EngineResult<Option<Client>> {
        self.0.client(id)
    }
    fn create_client(&self, new: &NewClient) -> EngineResult<Client> {
        self.0.create_client(new)
    }
    fn delete_client(&self, id: i64) -> EngineResult<()> {
        self.0.delete_client(id)
    }
}

impl AppointmentStore for FailingLedger {
    fn all_appointments(&self) -> EngineResult<Vec<Appointment>> {
        self.0.all_appointments()
    }
    fn appointment(&self, id: i64) -> EngineResult<Option<Appointment>> {
        self.0.appointment(id)
    }
    fn create_appointment(&self, new: &NewAppointment) -> EngineResult<Appointment> {
        self.0.create_appointment(new)
    }
    fn update_appointment(&self, id: i64, patch: &AppointmentPatch) -> EngineResult<Appointment> {
        self.0.update_appointment(id, patch)
    }
    fn delete_appointment(&self, id: i64) -> EngineResult<()> {
        self.0.delete_appointment(id)
    }
}

impl FinancialStore for FailingLedger {
    fn all_records(&self) -> EngineResult<Vec<FinancialRecord>> {
        self.0.all_records()
    }
    fn record(&self, id: i64) -> EngineResult<Option<FinancialRecord>> {
        self.0.record(id)
    }
    fn create_record(&self, _new: &NewFinancialRecord) -> EngineResult<FinancialRecord> {
        Err(EngineError::Persistence("ledger offline".into()))
    }
    fn update_record(&self, id: i64, patch: &RecordPatch) -> EngineResult<FinancialRecord> {
        self.0.update_record(id, patch)
    }
    fn delete_record(&self, id: i64) -> EngineResult<()> {
        self.0.delete_record(id)
    }
}

impl Store for FailingLedger {}

#[test]
fn failed_payment_write_restores_previous_status() {
    let store = FailingLedger(MemoryStore::new());
    let appt = seeded(&store);
    lifecycle::set_status(&store, appt.id, AppointmentStatus::Confirmed).unwrap();

    let err = lifecycle::execute(
        &store,
        appt.id,
        Some(&payment(100, FinancialType::Income)),
        d("2024-05-11"),
    )
    .unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(
        store.appointment(appt.id).unwrap().unwrap().status,
        AppointmentStatus::Confirmed
    );
    assert!(store.all_records().unwrap().is_empty());
}

#[test]
fn failing_ledger_still_completes_when_no_payment_is_due() {
    let store = FailingLedger(MemoryStore::new());
    let appt = seeded(&store);
    let out = lifecycle::execute(&store, appt.id, None, d("2024-05-11")).unwrap();
    assert_eq!(out.appointment.status, AppointmentStatus::Completed);
}

fn sqlite() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    clinicbook::db::init_schema(&conn).unwrap();
    conn
}

#[test]
fn sqlite_execute_commits_both_writes() {
    let conn = sqlite();
    let store = SqliteStore::new(&conn);
    let appt = seeded(&store);
    let out = lifecycle::execute(
        &store,
        appt.id,
        Some(&payment(150, FinancialType::Income)),
        d("2024-05-11"),
    )
    .unwrap();
    assert_eq!(out.appointment.status, AppointmentStatus::Completed);
    let linked = store.records_for_appointment(appt.id).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].amount, Decimal::from(150));
    assert_eq!(Some(linked[0].id), out.financial_record.map(|r| r.id));
}

#[test]
fn sqlite_execute_rolls_back_status_when_record_insert_fails() {
    let conn = sqlite();
    let store = SqliteStore::new(&conn);
    let appt = seeded(&store);
    conn.execute_batch(
        "CREATE TRIGGER refuse_records BEFORE INSERT ON financial_records
         BEGIN SELECT RAISE(ABORT, 'ledger offline'); END;",
    )
    .unwrap();

    let err = lifecycle::execute(
        &store,
        appt.id,
        Some(&payment(150, FinancialType::Income)),
        d("2024-05-11"),
    )
    .unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(
        store.appointment(appt.id).unwrap().unwrap().status,
        AppointmentStatus::Scheduled
    );
    assert!(store.all_records().unwrap().is_empty());
    assert!(conn.is_autocommit());
}

#[test]
fn sqlite_execute_times_out_on_a_locked_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.sqlite");
    let holder = clinicbook::db::open_at(&path).unwrap();
    let appt = seeded(&SqliteStore::new(&holder));
    clinicbook::config::set_setting(&holder, "busy_timeout_ms", "50").unwrap();

    let conn = clinicbook::db::open_at(&path).unwrap();
    let store = SqliteStore::new(&conn);
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();

    let started = std::time::Instant::now();
    let err = lifecycle::execute(
        &store,
        appt.id,
        Some(&payment(150, FinancialType::Income)),
        d("2024-05-11"),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)), "{err:?}");
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    assert!(conn.is_autocommit());

    holder.execute_batch("ROLLBACK").unwrap();
    assert_eq!(
        store.appointment(appt.id).unwrap().unwrap().status,
        AppointmentStatus::Scheduled
    );
    assert!(store.all_records().unwrap().is_empty());
}
