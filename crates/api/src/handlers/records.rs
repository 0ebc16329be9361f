//! Handlers for the `/records` resource.
//!
//! Fuel-detection markers are ingested in batches, listed either flat or
//! grouped by review group, and labeled through two bulk update paths:
//! per-marker label writes and whole-group chart rejection.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use fuelmark_core::error::CoreError;
use fuelmark_core::labeling::{
    validate_label_result, validate_rejection_reason, GroupStatus, RESULT_ABNORMAL,
};
use fuelmark_core::timeparse::normalize_mark_timestamp;
use fuelmark_core::types::DbId;
use fuelmark_db::models::fuel_record::{LabelUpdate, NewFuelRecord, RecordFilter, RejectUpdate};
use fuelmark_db::repositories::FuelRecordRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::{DataResponse, PageMeta, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /records`.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub records: Vec<RawRecord>,
}

/// One raw marker from the ingestion process or a labeling-session create.
///
/// `mark_timestamp` arrives as `"YYYY-MM-DD HH:MM"` text (time optional)
/// and is normalized to UTC; an unparseable value degrades to the current
/// server time rather than rejecting the record.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub group_id: String,
    pub mark_id: i32,
    pub mark_timestamp: Option<String>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
    #[serde(default)]
    pub display_date: Option<String>,
    pub chart_url: Option<String>,
    pub result: Option<String>,
    pub liter_amount: Option<f64>,
    pub fuel_diff_prior_mark: Option<f64>,
}

/// Response payload for `POST /records`.
#[derive(Debug, Serialize)]
pub struct IngestSummary {
    pub created_count: usize,
    pub created_ids: Vec<DbId>,
}

/// Query parameters for `GET /records`.
#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    /// 1-based page number. Defaults to 1.
    pub page: Option<i64>,
    /// Page size. Defaults to 10, capped at 100.
    pub limit: Option<i64>,
    /// When true, return groups instead of raw records.
    #[serde(default)]
    pub grouped: bool,
    /// Exact vehicle plate match.
    pub vehicle: Option<String>,
    /// Case-insensitive substring match on group id.
    pub filter_id: Option<String>,
    /// Case-insensitive substring match on display date.
    pub filter_date: Option<String>,
    /// Derived-status filter: `pending`, `completed`, `reject`, or `all`.
    pub filter_status: Option<String>,
}

/// Body of `PUT /records`.
#[derive(Debug, Deserialize)]
pub struct UpdateLabelsRequest {
    pub updates: Vec<LabelUpdateRequest>,
}

/// One label write: `result` must be `normal` or `abnormal`, and abnormal
/// requires a numeric liter.
#[derive(Debug, Deserialize)]
pub struct LabelUpdateRequest {
    pub record_id: DbId,
    pub result: String,
    pub liter: Option<f64>,
}

/// Body of `PUT /records/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectRecordsRequest {
    pub updates: Vec<RejectRequest>,
}

/// One rejection write: `result` must be a rejection sentinel.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub record_id: DbId,
    pub result: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/records
///
/// Ingest a batch of markers. Returns 201 with the generated ids; a
/// repeated `(group_id, mark_id)` pair surfaces as 409 naming the unique
/// constraint.
pub async fn ingest_records(
    State(state): State<AppState>,
    Json(body): Json<IngestRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestSummary>>)> {
    if body.records.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "records must not be empty".to_string(),
        )));
    }

    let now = Utc::now();
    let mut rows = Vec::with_capacity(body.records.len());
    for (i, raw) in body.records.iter().enumerate() {
        if raw.group_id.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "records[{i}]: group_id must not be empty"
            ))));
        }
        if let Some(result) = raw.result.as_deref().filter(|r| !r.is_empty()) {
            validate_label_result(result)
                .or_else(|_| validate_rejection_reason(result))
                .map_err(|_| {
                    CoreError::Validation(format!(
                        "records[{i}]: invalid result '{result}'"
                    ))
                })?;
        }

        rows.push(NewFuelRecord {
            group_id: raw.group_id.clone(),
            vehicle_plate: raw.vehicle_plate.clone().unwrap_or_default(),
            display_date: raw.display_date.clone().unwrap_or_default(),
            mark_timestamp: normalize_mark_timestamp(raw.mark_timestamp.as_deref(), now),
            mark_id: raw.mark_id,
            chart_url: raw.chart_url.clone(),
            result: raw.result.clone().filter(|r| !r.is_empty()),
            liter_amount: raw.liter_amount,
            fuel_diff_prior_mark: raw.fuel_diff_prior_mark,
        });
    }

    let created_ids = FuelRecordRepo::insert_many(&state.pool, &rows).await?;
    tracing::info!(count = created_ids.len(), "Ingested fuel records");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IngestSummary {
                created_count: created_ids.len(),
                created_ids,
            },
        }),
    ))
}

/// GET /api/v1/records
///
/// Flat listing by default; `grouped=true` aggregates records into review
/// groups with a derived status and paginates over groups instead.
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<ListRecordsQuery>,
) -> AppResult<Response> {
    let filter = RecordFilter {
        group_id_like: params.filter_id.filter(|s| !s.is_empty()),
        date_like: params.filter_date.filter(|s| !s.is_empty()),
        vehicle: params.vehicle.filter(|s| !s.is_empty()),
        status: parse_status_filter(params.filter_status.as_deref())?,
    };
    let pagination = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let (page, limit) = (pagination.page(), pagination.limit());

    if params.grouped {
        let grouped = FuelRecordRepo::list_groups(&state.pool, &filter, page, limit).await?;
        let meta = PageMeta::new(page, limit, grouped.total_groups as i64, grouped.groups.len());
        Ok(Json(PageResponse {
            data: grouped.groups,
            pagination: meta,
        })
        .into_response())
    } else {
        let (records, total) = FuelRecordRepo::list(&state.pool, &filter, page, limit).await?;
        let meta = PageMeta::new(page, limit, total, records.len());
        Ok(Json(PageResponse {
            data: records,
            pagination: meta,
        })
        .into_response())
    }
}

/// PUT /api/v1/records
///
/// Apply a batch of label writes. The whole batch is validated before any
/// store interaction; one bad element fails the request with no side
/// effects.
pub async fn update_labels(
    State(state): State<AppState>,
    Json(body): Json<UpdateLabelsRequest>,
) -> AppResult<Json<DataResponse<fuelmark_db::models::fuel_record::BulkWriteSummary>>> {
    if body.updates.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "updates must not be empty".to_string(),
        )));
    }

    let mut writes = Vec::with_capacity(body.updates.len());
    for update in &body.updates {
        validate_label_result(&update.result)?;
        let liter = if update.result == RESULT_ABNORMAL {
            match update.liter {
                Some(l) if l.is_finite() => Some(l),
                _ => {
                    return Err(AppError::Core(CoreError::Validation(format!(
                        "record {}: a numeric liter value is required for abnormal results",
                        update.record_id
                    ))))
                }
            }
        } else {
            // Liter is only meaningful for abnormal results; clear it.
            None
        };
        writes.push(LabelUpdate {
            record_id: update.record_id,
            result: update.result.clone(),
            liter_amount: liter,
        });
    }

    let summary = FuelRecordRepo::bulk_update_labels(&state.pool, &writes).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// PUT /api/v1/records/reject
///
/// Mark a batch of records with a rejection sentinel. No liter rules
/// apply on this path.
pub async fn reject_records(
    State(state): State<AppState>,
    Json(body): Json<RejectRecordsRequest>,
) -> AppResult<Json<DataResponse<fuelmark_db::models::fuel_record::BulkWriteSummary>>> {
    if body.updates.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "updates must not be empty".to_string(),
        )));
    }

    let mut writes = Vec::with_capacity(body.updates.len());
    for update in &body.updates {
        validate_rejection_reason(&update.result)?;
        writes.push(RejectUpdate {
            record_id: update.record_id,
            result: update.result.clone(),
        });
    }

    let summary = FuelRecordRepo::bulk_update_results(&state.pool, &writes).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// Translate the `filter_status` query value. Empty and `all` mean no
/// filter; anything else must parse as a [`GroupStatus`].
fn parse_status_filter(raw: Option<&str>) -> Result<Option<GroupStatus>, AppError> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => Ok(Some(value.parse().map_err(AppError::Core)?)),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_status_filter_absent_and_all_mean_no_filter() {
        assert_matches!(parse_status_filter(None), Ok(None));
        assert_matches!(parse_status_filter(Some("")), Ok(None));
        assert_matches!(parse_status_filter(Some("all")), Ok(None));
    }

    #[test]
    fn test_status_filter_parses_known_statuses() {
        assert_matches!(
            parse_status_filter(Some("pending")),
            Ok(Some(GroupStatus::Pending))
        );
        assert_matches!(
            parse_status_filter(Some("completed")),
            Ok(Some(GroupStatus::Completed))
        );
        assert_matches!(
            parse_status_filter(Some("reject")),
            Ok(Some(GroupStatus::Reject))
        );
    }

    #[test]
    fn test_status_filter_rejects_unknown_value() {
        assert_matches!(
            parse_status_filter(Some("bogus")),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
