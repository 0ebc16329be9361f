//! Grouping & status engine.
//!
//! Turns a flat, filtered record set into review groups with a derived
//! status, supports filtering by that derived status, and paginates over
//! groups rather than raw records. One classification pipeline serves both
//! the page query and the total-count query, parameterized by
//! [`GroupProjection`] and invoked once for each.
//!
//! Status filtering must happen here, after aggregation: a group's status
//! depends on every member, so it cannot be pushed down to the flat SQL
//! level when grouping is requested.

use std::collections::BTreeMap;

use fuelmark_core::labeling::{derive_status, is_completed_result, GroupStatus};

use crate::models::fuel_record::FuelRecord;
use crate::models::group::FuelGroup;

/// What each produced group should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupProjection {
    /// Full member records, for the page actually returned to the client.
    Full,
    /// Counts and status only, for the independent total-count pass.
    CountOnly,
}

/// Group records by `group_id`, derive each group's status, apply the
/// post-grouping status filter, and sort groups by id ascending
/// (lexicographic).
///
/// Member order within a group follows the input (store order); it is not
/// resorted by `mark_id`.
pub fn build_groups(
    records: &[FuelRecord],
    status_filter: Option<GroupStatus>,
    projection: GroupProjection,
) -> Vec<FuelGroup> {
    // BTreeMap gives the ascending group_id sort for free.
    let mut by_group: BTreeMap<&str, Vec<&FuelRecord>> = BTreeMap::new();
    for record in records {
        by_group.entry(&record.group_id).or_default().push(record);
    }

    by_group
        .into_iter()
        .filter_map(|(group_id, members)| {
            let count = members.len();
            let completed_count = members
                .iter()
                .filter(|m| is_completed_result(m.result.as_deref()))
                .count();
            let status = derive_status(members.iter().map(|m| m.result.as_deref()));

            if let Some(wanted) = status_filter {
                if status != wanted {
                    return None;
                }
            }

            let first = members.first().expect("group has at least one member");
            let display_date = first.display_date.clone();
            let chart_url = first.chart_url.clone();

            let items = match projection {
                GroupProjection::Full => members.into_iter().cloned().collect(),
                GroupProjection::CountOnly => Vec::new(),
            };

            Some(FuelGroup {
                group_id: group_id.to_string(),
                items,
                count,
                completed_count,
                status,
                display_date,
                chart_url,
            })
        })
        .collect()
}

/// Page over groups: skip `(page - 1) * limit`, take `limit`.
/// Pages are 1-based.
pub fn paginate_groups(groups: Vec<FuelGroup>, page: i64, limit: i64) -> Vec<FuelGroup> {
    let skip = ((page - 1).max(0) * limit.max(0)) as usize;
    groups
        .into_iter()
        .skip(skip)
        .take(limit.max(0) as usize)
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fuelmark_core::labeling::{
        REJECT_CHART_PROBLEM, REJECT_VEHICLE_NOT_RUN, RESULT_ABNORMAL, RESULT_NORMAL,
    };

    use super::*;

    fn record(id: i64, group_id: &str, mark_id: i32, result: Option<&str>) -> FuelRecord {
        FuelRecord {
            id,
            group_id: group_id.to_string(),
            vehicle_plate: "AB-1234".to_string(),
            display_date: "2024-03-05".to_string(),
            mark_timestamp: None,
            mark_id,
            chart_url: Some(format!("https://charts.example/{group_id}.png")),
            result: result.map(str::to_string),
            liter_amount: None,
            fuel_diff_prior_mark: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_single_sentinel_rejects_whole_group() {
        // Two members fully labeled, one rejected: reject dominates.
        let records = vec![
            record(1, "g1", 1, Some(RESULT_NORMAL)),
            record(2, "g1", 2, Some(RESULT_ABNORMAL)),
            record(3, "g1", 3, Some(REJECT_VEHICLE_NOT_RUN)),
        ];
        let groups = build_groups(&records, None, GroupProjection::Full);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].status, GroupStatus::Reject);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].completed_count, 2);
    }

    #[test]
    fn test_completed_iff_every_member_labeled() {
        let records = vec![
            record(1, "done", 1, Some(RESULT_NORMAL)),
            record(2, "done", 2, Some(RESULT_ABNORMAL)),
            record(3, "half", 1, Some(RESULT_NORMAL)),
            record(4, "half", 2, None),
            record(5, "blank", 1, Some("")),
        ];
        let groups = build_groups(&records, None, GroupProjection::Full);
        let status_of = |id: &str| groups.iter().find(|g| g.group_id == id).unwrap().status;

        assert_eq!(status_of("done"), GroupStatus::Completed);
        assert_eq!(status_of("half"), GroupStatus::Pending);
        assert_eq!(status_of("blank"), GroupStatus::Pending);
    }

    #[test]
    fn test_status_filter_applies_after_grouping() {
        let records = vec![
            record(1, "g1", 1, Some(RESULT_NORMAL)),
            record(2, "g2", 1, Some(REJECT_CHART_PROBLEM)),
            record(3, "g3", 1, None),
        ];
        let rejected = build_groups(&records, Some(GroupStatus::Reject), GroupProjection::Full);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].group_id, "g2");

        let pending = build_groups(&records, Some(GroupStatus::Pending), GroupProjection::Full);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].group_id, "g3");
    }

    #[test]
    fn test_groups_sorted_lexicographically() {
        let records = vec![
            record(1, "veh-10", 1, None),
            record(2, "veh-2", 1, None),
            record(3, "veh-1", 1, None),
        ];
        let groups = build_groups(&records, None, GroupProjection::Full);
        let ids: Vec<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
        // Lexicographic, not numeric: "veh-10" sorts before "veh-2".
        assert_eq!(ids, vec!["veh-1", "veh-10", "veh-2"]);
    }

    #[test]
    fn test_member_order_follows_input_not_mark_id() {
        let records = vec![
            record(1, "g1", 3, None),
            record(2, "g1", 1, None),
            record(3, "g1", 2, None),
        ];
        let groups = build_groups(&records, None, GroupProjection::Full);
        let marks: Vec<i32> = groups[0].items.iter().map(|i| i.mark_id).collect();
        assert_eq!(marks, vec![3, 1, 2]);
    }

    #[test]
    fn test_count_only_projection_matches_full() {
        let records = vec![
            record(1, "g1", 1, Some(RESULT_NORMAL)),
            record(2, "g1", 2, None),
            record(3, "g2", 1, Some(REJECT_CHART_PROBLEM)),
        ];
        let full = build_groups(&records, None, GroupProjection::Full);
        let counted = build_groups(&records, None, GroupProjection::CountOnly);

        assert_eq!(full.len(), counted.len());
        for (f, c) in full.iter().zip(&counted) {
            assert_eq!(f.group_id, c.group_id);
            assert_eq!(f.status, c.status);
            assert_eq!(f.count, c.count);
            assert_eq!(f.completed_count, c.completed_count);
            assert!(c.items.is_empty());
            assert_eq!(f.items.len(), f.count);
        }
    }

    #[test]
    fn test_group_display_fields_come_from_first_member() {
        let mut second = record(2, "g1", 2, None);
        second.chart_url = Some("https://charts.example/other.png".to_string());
        let records = vec![record(1, "g1", 1, None), second];

        let groups = build_groups(&records, None, GroupProjection::Full);
        assert_eq!(
            groups[0].chart_url.as_deref(),
            Some("https://charts.example/g1.png")
        );
    }

    #[test]
    fn test_pagination_slices_groups() {
        let records: Vec<FuelRecord> = (0..7)
            .map(|i| record(i, &format!("g{i}"), 1, None))
            .collect();
        let groups = build_groups(&records, None, GroupProjection::Full);
        assert_eq!(groups.len(), 7);

        let page2 = paginate_groups(groups.clone(), 2, 3);
        let ids: Vec<&str> = page2.iter().map(|g| g.group_id.as_str()).collect();
        assert_eq!(ids, vec!["g3", "g4", "g5"]);

        let past_end = paginate_groups(groups, 4, 3);
        assert!(past_end.is_empty());
    }
}
