// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Canceled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Canceled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    /// Display label (pt-BR).
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendado",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Completed => "Concluído",
            AppointmentStatus::Canceled => "Cancelado",
            AppointmentStatus::NoShow => "Não Compareceu",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        AppointmentStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == raw)
            .ok_or_else(|| EngineError::InvalidStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Online,
    InPerson,
    HomeVisit,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Online => "online",
            Location::InPerson => "in_person",
            Location::HomeVisit => "home_visit",
        }
    }
}

impl FromStr for Location {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "online" => Ok(Location::Online),
            "in_person" => Ok(Location::InPerson),
            "home_visit" => Ok(Location::HomeVisit),
            other => Err(EngineError::validation(
                "location",
                format!("'{}' (expected online|in_person|home_visit)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialType {
    Income,
    Expense,
}

impl FinancialType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialType::Income => "income",
            FinancialType::Expense => "expense",
        }
    }

    /// Applies the storage sign convention: income positive, expense negative.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            FinancialType::Income => amount.abs(),
            FinancialType::Expense => -amount.abs(),
        }
    }
}

impl FromStr for FinancialType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(FinancialType::Income),
            "expense" => Ok(FinancialType::Expense),
            other => Err(EngineError::validation(
                "type",
                format!("'{}' (expected income|expense)", other),
            )),
        }
    }
}

macro_rules! text_column {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: EngineError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(AppointmentStatus);
text_column!(Location);
text_column!(FinancialType);

/// `HH:MM` (24h, zero padded) wire form for appointment times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String, // snapshot taken at creation
    pub r#type: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32, // minutes
    pub location: Location,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_id: i64,
    pub client_name: String,
    pub r#type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: u32,
    pub location: Location,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub r#type: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<u32>,
    pub location: Option<Location>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<Option<String>>,
}

impl AppointmentPatch {
    pub fn status(status: AppointmentStatus) -> Self {
        AppointmentPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.r#type.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.duration.is_none()
            && self.location.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    pub fn apply(&self, appt: &mut Appointment) {
        if let Some(t) = &self.r#type {
            appt.r#type = t.clone();
        }
        if let Some(d) = self.date {
            appt.date = d;
        }
        if let Some(t) = self.time {
            appt.time = t;
        }
        if let Some(d) = self.duration {
            appt.duration = d;
        }
        if let Some(l) = self.location {
            appt.location = l;
        }
        if let Some(s) = self.status {
            appt.status = s;
        }
        if let Some(n) = &self.notes {
            appt.notes = n.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: i64,
    pub amount: Decimal, // signed: income > 0, expense < 0
    pub description: String,
    pub date: NaiveDate,
    pub r#type: FinancialType,
    pub category: Option<String>,
    pub client_id: Option<i64>,
    #[serde(alias = "related_appointment")]
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFinancialRecord {
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub r#type: FinancialType,
    pub category: Option<String>,
    pub client_id: Option<i64>,
    pub appointment_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

impl FromStr for ViewMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(EngineError::validation(
                "view",
                format!("'{}' (expected day|week|month)", other),
            )),
        }
    }
}

/// One cell of a rendered calendar grid. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_current_period: bool,
}

/// Partial update for a financial record. A changed amount or type is
/// re-signed with [`FinancialType::signed`].
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub r#type: Option<FinancialType>,
    pub category: Option<Option<String>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.r#type.is_none()
            && self.category.is_none()
    }

    pub fn apply(&self, rec: &mut FinancialRecord) {
        if let Some(t) = self.r#type {
            rec.r#type = t;
        }
        if let Some(a) = self.amount {
            rec.amount = a;
        }
        if self.amount.is_some() || self.r#type.is_some() {
            rec.amount = rec.r#type.signed(rec.amount);
        }
        if let Some(d) = &self.description {
            rec.description = d.clone();
        }
        if let Some(d) = self.date {
            rec.date = d;
        }
        if let Some(c) = &self.category {
            rec.category = c.clone();
        }
    }
}
