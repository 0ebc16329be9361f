//! Repository for the `fuel_records` table.

use fuelmark_core::labeling::{
    GroupStatus, REJECT_CHART_PROBLEM, REJECT_VEHICLE_NOT_RUN, RESULT_ABNORMAL,
};
use fuelmark_core::types::DbId;
use sqlx::PgPool;

use crate::grouping::{build_groups, paginate_groups, GroupProjection};
use crate::models::fuel_record::{
    BulkWriteSummary, FuelRecord, LabelUpdate, NewFuelRecord, RecordFilter, RejectUpdate,
};
use crate::models::group::GroupedPage;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, group_id, vehicle_plate, display_date, mark_timestamp, \
    mark_id, chart_url, result, liter_amount, fuel_diff_prior_mark, \
    created_at, updated_at";

/// Shared optional-filter clause: substring matches on group id and display
/// date (case-insensitive), exact match on vehicle plate. NULL binds
/// disable a condition.
const FILTER_CLAUSE: &str = "($1::TEXT IS NULL OR group_id ILIKE '%' || $1 || '%') \
    AND ($2::TEXT IS NULL OR display_date ILIKE '%' || $2 || '%') \
    AND ($3::TEXT IS NULL OR vehicle_plate = $3)";

/// Provides listing, ingestion, and bulk label writes for fuel records.
pub struct FuelRecordRepo;

impl FuelRecordRepo {
    /// SQL fragment translating a derived-status filter into a flat
    /// predicate over `result`. Only valid on the ungrouped path; grouped
    /// status filtering happens post-aggregation in [`crate::grouping`].
    fn status_fragment(status: Option<GroupStatus>) -> String {
        match status {
            None => String::new(),
            Some(GroupStatus::Pending) => " AND (result IS NULL OR result = '')".to_string(),
            Some(GroupStatus::Completed) => format!(
                " AND result IS NOT NULL AND result <> '' \
                 AND result NOT IN ('{REJECT_VEHICLE_NOT_RUN}', '{REJECT_CHART_PROBLEM}')"
            ),
            Some(GroupStatus::Reject) => format!(
                " AND result IN ('{REJECT_VEHICLE_NOT_RUN}', '{REJECT_CHART_PROBLEM}')"
            ),
        }
    }

    /// Flat, paginated listing with an independent total count.
    ///
    /// Pages are 1-based. Rows are ordered by `display_date` descending
    /// with `id` as a tiebreaker.
    pub async fn list(
        pool: &PgPool,
        filter: &RecordFilter,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<FuelRecord>, i64), sqlx::Error> {
        let status = Self::status_fragment(filter.status);
        let offset = (page - 1).max(0) * limit;

        let query = format!(
            "SELECT {COLUMNS} FROM fuel_records \
             WHERE {FILTER_CLAUSE}{status} \
             ORDER BY display_date DESC, id \
             LIMIT $4 OFFSET $5"
        );
        let records = sqlx::query_as::<_, FuelRecord>(&query)
            .bind(&filter.group_id_like)
            .bind(&filter.date_like)
            .bind(&filter.vehicle)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query =
            format!("SELECT COUNT(*) FROM fuel_records WHERE {FILTER_CLAUSE}{status}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&filter.group_id_like)
            .bind(&filter.date_like)
            .bind(&filter.vehicle)
            .fetch_one(pool)
            .await?;

        Ok((records, total))
    }

    /// Every record matching the flat filter, ignoring the status filter
    /// (which is only computable after grouping). Ordered by group id then
    /// insertion order; input to the grouping engine.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &RecordFilter,
    ) -> Result<Vec<FuelRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fuel_records \
             WHERE {FILTER_CLAUSE} \
             ORDER BY group_id, id"
        );
        sqlx::query_as::<_, FuelRecord>(&query)
            .bind(&filter.group_id_like)
            .bind(&filter.date_like)
            .bind(&filter.vehicle)
            .fetch_all(pool)
            .await
    }

    /// Grouped, paginated listing.
    ///
    /// Fetches the flat filtered set once, then runs the classification
    /// pipeline twice: a full projection for the returned page and a
    /// count-only projection for the independent total.
    pub async fn list_groups(
        pool: &PgPool,
        filter: &RecordFilter,
        page: i64,
        limit: i64,
    ) -> Result<GroupedPage, sqlx::Error> {
        let records = Self::list_filtered(pool, filter).await?;
        tracing::debug!(records = records.len(), "Grouping filtered record set");

        let groups = build_groups(&records, filter.status, GroupProjection::Full);
        let total_groups =
            build_groups(&records, filter.status, GroupProjection::CountOnly).len();

        Ok(GroupedPage {
            groups: paginate_groups(groups, page, limit),
            total_groups,
        })
    }

    /// Insert a batch of records, returning the generated ids.
    ///
    /// A `uq_fuel_records_group_mark` violation bubbles up as a database
    /// error for the API layer to classify.
    pub async fn insert_many(
        pool: &PgPool,
        records: &[NewFuelRecord],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(
            "INSERT INTO fuel_records \
             (group_id, vehicle_plate, display_date, mark_timestamp, mark_id, \
              chart_url, result, liter_amount, fuel_diff_prior_mark, updated_at) ",
        );
        builder.push_values(records, |mut row, record| {
            row.push_bind(&record.group_id)
                .push_bind(&record.vehicle_plate)
                .push_bind(&record.display_date)
                .push_bind(record.mark_timestamp)
                .push_bind(record.mark_id)
                .push_bind(&record.chart_url)
                .push_bind(&record.result)
                .push_bind(record.liter_amount)
                .push_bind(record.fuel_diff_prior_mark)
                .push("NOW()");
        });
        builder.push(" RETURNING id");

        builder.build_query_scalar().fetch_all(pool).await
    }

    /// Apply label updates as independent point writes.
    ///
    /// No transaction spans the batch: a failure on one element leaves the
    /// earlier elements applied, matching store-level bulk semantics.
    /// `liter_amount` is forced NULL unless the written result is abnormal.
    pub async fn bulk_update_labels(
        pool: &PgPool,
        updates: &[LabelUpdate],
    ) -> Result<BulkWriteSummary, sqlx::Error> {
        let query = format!(
            "UPDATE fuel_records SET \
                result = $2, \
                liter_amount = CASE WHEN $2 = '{RESULT_ABNORMAL}' THEN $3 ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1"
        );

        let mut summary = BulkWriteSummary::default();
        for update in updates {
            let result = sqlx::query(&query)
                .bind(update.record_id)
                .bind(&update.result)
                .bind(update.liter_amount)
                .execute(pool)
                .await?;
            summary.matched += result.rows_affected();
            summary.modified += result.rows_affected();
        }
        Ok(summary)
    }

    /// Apply rejection writes as independent point writes: result and
    /// `updated_at` only, leaving `liter_amount` untouched.
    pub async fn bulk_update_results(
        pool: &PgPool,
        updates: &[RejectUpdate],
    ) -> Result<BulkWriteSummary, sqlx::Error> {
        let mut summary = BulkWriteSummary::default();
        for update in updates {
            let result = sqlx::query(
                "UPDATE fuel_records SET result = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(update.record_id)
            .bind(&update.result)
            .execute(pool)
            .await?;
            summary.matched += result.rows_affected();
            summary.modified += result.rows_affected();
        }
        Ok(summary)
    }
}
