// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::engine::calendar::{first_of_month, last_of_month};
use crate::error::{EngineError, EngineResult};
use crate::models::{FinancialRecord, FinancialType, NewFinancialRecord, RecordPatch};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// The calendar month containing the evaluation date.
    Current,
    /// The caller's `date_range`; an incomplete range applies no period constraint.
    Custom,
    #[default]
    All,
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "current" => Ok(Period::Current),
            "custom" => Ok(Period::Custom),
            "all" => Ok(Period::All),
            other => Err(EngineError::validation(
                "period",
                format!("'{}' (expected current|custom|all)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }
}

/// `None` on any dimension means "no constraint", not "field must be empty".
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub client_id: Option<i64>,
    pub category: Option<String>,
    pub r#type: Option<FinancialType>,
    pub period: Period,
    pub date_range: Option<DateRange>,
}

/// Inclusive date window selected by `criteria`, or `None` when unbounded.
pub fn period_bounds(criteria: &FilterCriteria, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match criteria.period {
        Period::Current => Some((first_of_month(today), last_of_month(today))),
        Period::Custom => criteria.date_range.and_then(|r| r.bounds()),
        Period::All => None,
    }
}

/// Records matching every active criterion, in input order. `today` anchors
/// the `current` period and must be supplied fresh on every call.
pub fn filter(
    all: &[FinancialRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<FinancialRecord> {
    let window = period_bounds(criteria, today);
    all.iter()
        .filter(|r| window.is_none_or(|(start, end)| start <= r.date && r.date <= end))
        .filter(|r| criteria.client_id.is_none_or(|c| r.client_id == Some(c)))
        .filter(|r| {
            criteria
                .category
                .as_deref()
                .is_none_or(|c| r.category.as_deref() == Some(c))
        })
        .filter(|r| criteria.r#type.is_none_or(|t| r.r#type == t))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Expenses are summed by magnitude, so the result is the same whether
/// expense amounts were stored negative or positive. Totals beyond the
/// `Decimal` range fail with a validation error on `amount`.
pub fn summarize(records: &[FinancialRecord]) -> EngineResult<Summary> {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for r in records {
        let (total, delta) = match r.r#type {
            FinancialType::Income => (&mut income, r.amount),
            FinancialType::Expense => (&mut expenses, r.amount.abs()),
        };
        *total = total.checked_add(delta).ok_or_else(overflow)?;
    }
    Ok(Summary {
        income,
        expenses,
        balance: income.checked_sub(expenses).ok_or_else(overflow)?,
    })
}

fn overflow() -> EngineError {
    EngineError::validation("amount", "totals exceed the supported range")
}

pub const UNCATEGORIZED: &str = "(uncategorized)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub key: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Per-category totals, sorted by category name.
pub fn by_category(records: &[FinancialRecord]) -> EngineResult<Vec<Breakdown>> {
    group_by(records, |r| {
        r.category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    })
}

/// Per-month (`YYYY-MM`) totals, oldest first.
pub fn by_month(records: &[FinancialRecord]) -> EngineResult<Vec<Breakdown>> {
    group_by(records, |r| r.date.format("%Y-%m").to_string())
}

fn group_by<F>(records: &[FinancialRecord], key: F) -> EngineResult<Vec<Breakdown>>
where
    F: Fn(&FinancialRecord) -> String,
{
    let mut groups: BTreeMap<String, Vec<FinancialRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(key(r)).or_default().push(r.clone());
    }
    groups
        .into_iter()
        .map(|(key, rs)| {
            Ok(Breakdown {
                key,
                summary: summarize(&rs)?,
            })
        })
        .collect()
}

/// Manual ledger entry. `amount` is a magnitude and must be strictly positive.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub r#type: FinancialType,
    pub category: Option<String>,
    pub client_id: Option<i64>,
    pub appointment_id: Option<i64>,
}

pub fn record<S: Store + ?Sized>(store: &S, draft: RecordDraft) -> EngineResult<FinancialRecord> {
    if draft.amount <= Decimal::ZERO {
        return Err(EngineError::validation("amount", "must be greater than zero"));
    }
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(EngineError::validation("description", "must not be empty"));
    }
    let mut client_id = draft.client_id;
    if let Some(cid) = client_id {
        store
            .client(cid)?
            .ok_or_else(|| EngineError::not_found("Client", cid))?;
    }
    if let Some(aid) = draft.appointment_id {
        let appt = store
            .appointment(aid)?
            .ok_or_else(|| EngineError::not_found("Appointment", aid))?;
        client_id = client_id.or(Some(appt.client_id));
    }
    let new = NewFinancialRecord {
        amount: draft.r#type.signed(draft.amount),
        description: description.to_string(),
        date: draft.date,
        r#type: draft.r#type,
        category: draft.category.filter(|c| !c.trim().is_empty()),
        client_id,
        appointment_id: draft.appointment_id,
    };
    let created = store.create_record(&new)?;
    info!(record = created.id, kind = %created.r#type, "ledger entry booked");
    Ok(created)
}

/// Edits a ledger entry. A new `amount` is a magnitude like in [`record`];
/// the stored sign is re-derived from the resulting type.
pub fn update_record<S: Store + ?Sized>(
    store: &S,
    id: i64,
    patch: &RecordPatch,
) -> EngineResult<FinancialRecord> {
    if patch.is_empty() {
        return Err(EngineError::validation("patch", "nothing to update"));
    }
    if let Some(a) = patch.amount {
        if a <= Decimal::ZERO {
            return Err(EngineError::validation("amount", "must be greater than zero"));
        }
    }
    if let Some(d) = &patch.description {
        if d.trim().is_empty() {
            return Err(EngineError::validation("description", "must not be empty"));
        }
    }
    store
        .record(id)?
        .ok_or_else(|| EngineError::not_found("Financial record", id))?;
    store.update_record(id, patch)?;
    info!(record = id, "ledger entry updated");
    store
        .record(id)?
        .ok_or_else(|| EngineError::not_found("Financial record", id))
}
