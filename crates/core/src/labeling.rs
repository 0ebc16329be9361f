//! Label result vocabulary and group status derivation.
//!
//! A fuel record's `result` column is a nullable text field holding either
//! an operator label (`normal` / `abnormal`), one of two rejection
//! sentinels marking the group's chart as unusable, or nothing at all
//! (NULL or empty string) while the record is still unlabeled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Label for a marker judged to be a normal fuel-level change.
pub const RESULT_NORMAL: &str = "normal";

/// Label for a marker judged to be an abnormal fuel-level change.
/// Abnormal markers carry a liter quantity.
pub const RESULT_ABNORMAL: &str = "abnormal";

/// All label values an operator may assign to an individual marker.
pub const LABEL_RESULTS: &[&str] = &[RESULT_NORMAL, RESULT_ABNORMAL];

/// Rejection sentinel: the vehicle did not run on the charted day.
pub const REJECT_VEHICLE_NOT_RUN: &str = "vehicle did not run";

/// Rejection sentinel: the chart image itself is unusable.
pub const REJECT_CHART_PROBLEM: &str = "chart has a problem";

/// Result values that mark a whole group's chart as rejected.
pub const REJECTION_SENTINELS: &[&str] = &[REJECT_VEHICLE_NOT_RUN, REJECT_CHART_PROBLEM];

/* --------------------------------------------------------------------------
Result predicates
-------------------------------------------------------------------------- */

/// A record is unlabeled while its result is NULL or the empty string.
pub fn is_unlabeled_result(result: Option<&str>) -> bool {
    matches!(result, None | Some(""))
}

/// A record counts as rejected when its result is one of the two
/// rejection sentinels.
pub fn is_rejected_result(result: Option<&str>) -> bool {
    result.is_some_and(|r| REJECTION_SENTINELS.contains(&r))
}

/// A record counts as completed when it carries any non-empty result that
/// is not a rejection sentinel.
pub fn is_completed_result(result: Option<&str>) -> bool {
    !is_unlabeled_result(result) && !is_rejected_result(result)
}

/// Validate a label value submitted for an individual marker.
///
/// Only `normal` and `abnormal` are accepted here; the rejection sentinels
/// travel through the dedicated whole-group rejection operation.
pub fn validate_label_result(result: &str) -> Result<(), CoreError> {
    if LABEL_RESULTS.contains(&result) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid result '{result}'. Must be one of: {}",
            LABEL_RESULTS.join(", ")
        )))
    }
}

/// Validate a rejection reason for the whole-group reject operation.
pub fn validate_rejection_reason(reason: &str) -> Result<(), CoreError> {
    if REJECTION_SENTINELS.contains(&reason) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid rejection reason '{reason}'. Must be one of: {}",
            REJECTION_SENTINELS.join(", ")
        )))
    }
}

/* --------------------------------------------------------------------------
Group status
-------------------------------------------------------------------------- */

/// Review status of a whole group, derived from its members' results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    /// At least one member is still unlabeled (and none is rejected).
    Pending,
    /// Every member carries a non-empty, non-sentinel result.
    Completed,
    /// At least one member carries a rejection sentinel.
    Reject,
}

impl GroupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Completed => "completed",
            GroupStatus::Reject => "reject",
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GroupStatus::Pending),
            "completed" => Ok(GroupStatus::Completed),
            "reject" => Ok(GroupStatus::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid status filter '{other}'. Must be one of: pending, completed, reject"
            ))),
        }
    }
}

/// Derive a group's status from its members' results.
///
/// Precedence (first match wins): any rejection sentinel makes the whole
/// group `Reject`, no matter how many other members are labeled; otherwise
/// the group is `Completed` only when every member is completed; anything
/// else is `Pending`. An empty group is `Pending`.
pub fn derive_status<'a, I>(results: I) -> GroupStatus
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut count = 0usize;
    let mut completed = 0usize;
    let mut rejected = 0usize;

    for result in results {
        count += 1;
        if is_rejected_result(result) {
            rejected += 1;
        } else if is_completed_result(result) {
            completed += 1;
        }
    }

    if rejected > 0 {
        GroupStatus::Reject
    } else if count > 0 && completed == count {
        GroupStatus::Completed
    } else {
        GroupStatus::Pending
    }
}

/// Allocate the next custom marker id within a group.
///
/// Mark ids are unique within a group; the next one is `max + 1` over all
/// known ids (persisted and unsaved custom markers alike), or 1 when the
/// group has none.
pub fn next_mark_id(existing: &[i32]) -> i32 {
    existing.iter().copied().max().map_or(1, |max| max + 1)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
