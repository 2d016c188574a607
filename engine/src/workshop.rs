//! Workshop entities: clients and work orders created on this device.
//!
//! Drafts carry what the intake form collects. Turning a draft into a
//! [`Record`] fills in the defaults a new ticket starts with.

use crate::{error::Result, Record, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Work order status, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    #[default]
    Draft,
    Received,
    InProgress,
    Quoted,
    Accepted,
    Rejected,
    Working,
    Ready,
    Delivered,
    Finalized,
}

impl WorkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkStatus::Draft => "DRAFT",
            WorkStatus::Received => "RECEIVED",
            WorkStatus::InProgress => "IN_PROGRESS",
            WorkStatus::Quoted => "QUOTED",
            WorkStatus::Accepted => "ACCEPTED",
            WorkStatus::Rejected => "REJECTED",
            WorkStatus::Working => "WORKING",
            WorkStatus::Ready => "READY",
            WorkStatus::Delivered => "DELIVERED",
            WorkStatus::Finalized => "FINALIZED",
        }
    }
}

/// Default cleaning price (LEI).
pub const DEFAULT_CLEANING_PRICE: f64 = 170.0;
/// Default reconditioning price (LEI).
pub const DEFAULT_RECONDITIONING_PRICE: f64 = 170.0;
/// Default turbo price (LEI).
pub const DEFAULT_TURBO_PRICE: f64 = 240.0;

/// Zero-padded work number for a sequence, e.g. `1` -> `"00001"`.
pub fn format_work_number(sequence: u64) -> String {
    format!("{sequence:05}")
}

/// Next free work sequence given the known work orders.
///
/// Uses `work_sequence` when present and falls back to a purely numeric
/// `work_number`. Starts at 1.
pub fn next_work_sequence<'a>(work_orders: impl IntoIterator<Item = &'a Record>) -> u64 {
    work_orders
        .into_iter()
        .filter_map(|wo| {
            wo.field("work_sequence")
                .and_then(|v| v.as_u64())
                .or_else(|| match wo.field("work_number")? {
                    serde_json::Value::Number(n) => n.as_u64(),
                    serde_json::Value::String(s) => s.parse().ok(),
                    _ => None,
                })
        })
        .max()
        .map_or(1, |max| max + 1)
}

/// Client details collected at intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientDraft {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tax_number: String,
    #[serde(default)]
    pub notes: String,
}

impl ClientDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Build the client record under `id`.
    pub fn into_record(self, id: impl Into<RecordId>) -> Result<Record> {
        Record::from_value(json!({
            "id": id.into(),
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "address": self.address,
            "company_name": self.company_name,
            "tax_number": self.tax_number,
            "notes": self.notes,
        }))
    }
}

/// Work order details collected at intake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderDraft {
    pub client_id: RecordId,
    pub turbo_code: String,
    #[serde(default)]
    pub car_make: String,
    #[serde(default)]
    pub car_model: String,
    #[serde(default)]
    pub car_year: Option<i32>,
    #[serde(default)]
    pub engine_code: String,
    #[serde(default)]
    pub general_notes: String,
}

impl WorkOrderDraft {
    pub fn new(client_id: impl Into<RecordId>, turbo_code: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            turbo_code: turbo_code.into(),
            ..Self::default()
        }
    }

    /// Build a new `DRAFT` work order record under `id` with the given
    /// sequence.
    pub fn into_record(self, id: impl Into<RecordId>, sequence: u64) -> Result<Record> {
        Record::from_value(json!({
            "id": id.into(),
            "work_number": format_work_number(sequence),
            "work_sequence": sequence,
            "client_id": self.client_id,
            "turbo_code": self.turbo_code,
            "car_make": self.car_make,
            "car_model": self.car_model,
            "car_year": self.car_year,
            "engine_code": self.engine_code,
            "general_notes": self.general_notes,
            "parts": [],
            "processes": [],
            "status_passed": false,
            "status_refused": false,
            "cleaning_price": DEFAULT_CLEANING_PRICE,
            "reconditioning_price": DEFAULT_RECONDITIONING_PRICE,
            "turbo_price": DEFAULT_TURBO_PRICE,
            "status": WorkStatus::Draft,
            "is_finalized": false,
        }))
    }
}
