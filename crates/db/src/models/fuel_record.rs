//! Fuel record entity model and DTOs.

use fuelmark_core::labeling::GroupStatus;
use fuelmark_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `fuel_records` table: one detected fuel-level-change
/// marker. Rows sharing a `group_id` form one review group.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FuelRecord {
    pub id: DbId,
    pub group_id: String,
    pub vehicle_plate: String,
    pub display_date: String,
    pub mark_timestamp: Option<Timestamp>,
    /// Ordinal of this marker within its group; unique per group only.
    pub mark_id: i32,
    pub chart_url: Option<String>,
    /// `normal`, `abnormal`, a rejection sentinel, empty, or NULL.
    pub result: Option<String>,
    /// Meaningful only while `result` is `abnormal`.
    pub liter_amount: Option<f64>,
    /// Precomputed display-only delta against the prior marker.
    pub fuel_diff_prior_mark: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// DTO for inserting a new fuel record.
#[derive(Debug, Clone)]
pub struct NewFuelRecord {
    pub group_id: String,
    pub vehicle_plate: String,
    pub display_date: String,
    pub mark_timestamp: Option<Timestamp>,
    pub mark_id: i32,
    pub chart_url: Option<String>,
    pub result: Option<String>,
    pub liter_amount: Option<f64>,
    pub fuel_diff_prior_mark: Option<f64>,
}

/// A point label write against one record.
///
/// `liter_amount` is persisted only when `result` is `abnormal`; the
/// repository forces it NULL for every other result.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelUpdate {
    pub record_id: DbId,
    pub result: String,
    pub liter_amount: Option<f64>,
}

/// A point result write used by the whole-group rejection operation.
/// Liter rules do not apply here.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectUpdate {
    pub record_id: DbId,
    pub result: String,
}

/// Flat-level listing filter.
///
/// Substring matches are case-insensitive; `vehicle` is an exact match.
/// `status` is only pushed down to SQL on the ungrouped path — grouped
/// status filtering happens after aggregation in the grouping engine.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub group_id_like: Option<String>,
    pub date_like: Option<String>,
    pub vehicle: Option<String>,
    pub status: Option<GroupStatus>,
}

/// Outcome of a bulk point-update pass.
///
/// Postgres reports only rows affected per statement, so `matched` and
/// `modified` both accumulate `rows_affected`; a no-change UPDATE still
/// rewrites the row.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BulkWriteSummary {
    pub matched: u64,
    pub modified: u64,
}
