//! Derived review group model.

use fuelmark_core::labeling::GroupStatus;
use serde::Serialize;

use crate::models::fuel_record::FuelRecord;

/// All fuel records sharing one `group_id`, classified for review.
///
/// Never persisted; assembled by the grouping engine from a flat record
/// set. `display_date` and `chart_url` are taken from the group's first
/// member for list display.
#[derive(Debug, Clone, Serialize)]
pub struct FuelGroup {
    pub group_id: String,
    /// Member records in store order. Empty under a count-only projection.
    pub items: Vec<FuelRecord>,
    pub count: usize,
    pub completed_count: usize,
    pub status: GroupStatus,
    pub display_date: String,
    pub chart_url: Option<String>,
}

/// One page of grouped results plus the independently computed total.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedPage {
    pub groups: Vec<FuelGroup>,
    pub total_groups: usize,
}
