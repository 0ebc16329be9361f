//! Operator-side labeling session for one group.
//!
//! [`LabelingSession`] reconciles the labels an operator enters against the
//! group's persisted records (which become point updates) and any custom
//! markers drawn during the session (which become inserts). The session is
//! transport-agnostic: [`LabelingSession::build_save_plan`] validates and
//! partitions the pending work, the caller issues the two independent
//! store operations, and [`LabelingSession::apply_save_outcome`] folds the
//! results back into session state.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::labeling::{next_mark_id, RESULT_ABNORMAL, RESULT_NORMAL};
use crate::types::{DbId, Timestamp};

/// A group member as loaded from the store, seeding the session.
#[derive(Debug, Clone)]
pub struct PersistedMarker {
    pub record_id: DbId,
    pub mark_id: i32,
    pub result: Option<String>,
    pub liter: Option<f64>,
}

/// A marker added by the operator during the session. Never persisted
/// until a save succeeds.
#[derive(Debug, Clone)]
pub struct CustomMarker {
    pub mark_id: i32,
    pub mark_timestamp: Option<Timestamp>,
}

/// Pending label state for one marker.
///
/// `liter` is kept as the operator's raw text entry; numeric validation
/// happens once, at save time.
#[derive(Debug, Clone, Default)]
struct PendingLabel {
    result: Option<String>,
    liter: Option<String>,
}

/// One element of the update half of a save plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelWrite {
    pub record_id: DbId,
    pub mark_id: i32,
    pub result: String,
    /// `Some` only when `result` is abnormal.
    pub liter: Option<f64>,
}

/// One element of the create half of a save plan.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCreate {
    pub group_id: String,
    pub mark_id: i32,
    pub mark_timestamp: Timestamp,
    pub result: String,
    pub liter: Option<f64>,
}

/// Validated, partitioned save work: updates for persisted records,
/// creates for custom markers.
#[derive(Debug, Clone, Default)]
pub struct SavePlan {
    pub updates: Vec<LabelWrite>,
    pub creates: Vec<MarkerCreate>,
}

/// Result of one of the two save sub-operations, as observed by the caller.
pub type OperationOutcome = Result<(), String>;

/// Combined report over both save sub-operations.
///
/// The two requests are independent; a failure on one side never rolls
/// back the other. `affected` counts markers on the sides that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub affected: usize,
    pub errors: Vec<String>,
    /// True when at least one side succeeded and the group's data should
    /// be refetched from the store.
    pub needs_refresh: bool,
}

/// Labeling state for the currently selected group.
#[derive(Debug, Clone)]
pub struct LabelingSession {
    group_id: String,
    persisted: Vec<PersistedMarker>,
    labels: BTreeMap<i32, PendingLabel>,
    custom: Vec<CustomMarker>,
}

impl LabelingSession {
    /// Start a session for a group, pre-populating pending labels from the
    /// results already stored on its members.
    pub fn new(group_id: impl Into<String>, items: Vec<PersistedMarker>) -> Self {
        let mut labels = BTreeMap::new();
        for item in &items {
            labels.insert(
                item.mark_id,
                PendingLabel {
                    result: item.result.clone().filter(|r| !r.is_empty()),
                    liter: item.liter.map(|l| l.to_string()),
                },
            );
        }
        Self {
            group_id: group_id.into(),
            persisted: items,
            labels,
            custom: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// All mark ids known to the session, persisted and custom, ascending.
    pub fn mark_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .persisted
            .iter()
            .map(|m| m.mark_id)
            .chain(self.custom.iter().map(|m| m.mark_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn custom_markers(&self) -> &[CustomMarker] {
        &self.custom
    }

    /// Current pending result for a marker, if any.
    pub fn result_for(&self, mark_id: i32) -> Option<&str> {
        self.labels.get(&mark_id)?.result.as_deref()
    }

    /// Current raw liter entry for a marker, if any.
    pub fn liter_for(&self, mark_id: i32) -> Option<&str> {
        self.labels.get(&mark_id)?.liter.as_deref()
    }

    fn is_known(&self, mark_id: i32) -> bool {
        self.persisted.iter().any(|m| m.mark_id == mark_id)
            || self.custom.iter().any(|m| m.mark_id == mark_id)
    }

    /// Set the result for a marker. Moving away from `abnormal` clears any
    /// pending liter entry, because liter is only meaningful for abnormal
    /// markers.
    pub fn set_result(&mut self, mark_id: i32, result: &str) -> Result<(), CoreError> {
        if !self.is_known(mark_id) {
            return Err(CoreError::Validation(format!(
                "Unknown marker {mark_id} in group {}",
                self.group_id
            )));
        }
        let entry = self.labels.entry(mark_id).or_default();
        entry.result = Some(result.to_string());
        if result != RESULT_ABNORMAL {
            entry.liter = None;
        }
        Ok(())
    }

    /// Record a raw liter entry for a marker. Retained only while the
    /// marker's pending result is `abnormal`; otherwise the entry is
    /// dropped on the floor.
    pub fn set_liter(&mut self, mark_id: i32, raw: &str) {
        if let Some(entry) = self.labels.get_mut(&mark_id) {
            if entry.result.as_deref() == Some(RESULT_ABNORMAL) {
                entry.liter = Some(raw.to_string());
            }
        }
    }

    /// Bulk-set every known marker to `normal`, clearing liters.
    pub fn select_all_normal(&mut self) {
        for mark_id in self.mark_ids() {
            let entry = self.labels.entry(mark_id).or_default();
            entry.result = Some(RESULT_NORMAL.to_string());
            entry.liter = None;
        }
    }

    /// Bulk-set every known marker to `abnormal`, preserving any liter
    /// value already entered per marker.
    pub fn select_all_abnormal(&mut self) {
        for mark_id in self.mark_ids() {
            let entry = self.labels.entry(mark_id).or_default();
            entry.result = Some(RESULT_ABNORMAL.to_string());
        }
    }

    /// Add a custom marker with the next free mark id. Datetime, result,
    /// and liter all start empty, pending operator input.
    pub fn add_custom_marker(&mut self) -> i32 {
        let existing = self.mark_ids();
        let mark_id = next_mark_id(&existing);
        self.custom.push(CustomMarker {
            mark_id,
            mark_timestamp: None,
        });
        mark_id
    }

    /// Set the event time of a custom marker.
    pub fn set_custom_datetime(&mut self, mark_id: i32, ts: Timestamp) -> Result<(), CoreError> {
        match self.custom.iter_mut().find(|m| m.mark_id == mark_id) {
            Some(marker) => {
                marker.mark_timestamp = Some(ts);
                Ok(())
            }
            None => Err(CoreError::Validation(format!(
                "Marker {mark_id} is not a custom marker"
            ))),
        }
    }

    /// Remove a custom marker and its pending label state. Persisted
    /// records are never touched. Returns false when `mark_id` does not
    /// name a custom marker.
    pub fn remove_custom_marker(&mut self, mark_id: i32) -> bool {
        let before = self.custom.len();
        self.custom.retain(|m| m.mark_id != mark_id);
        if self.custom.len() == before {
            return false;
        }
        self.labels.remove(&mark_id);
        true
    }

    /// Validate and partition all markers carrying a pending result.
    ///
    /// The whole save aborts with a single combined error report if any
    /// abnormal marker lacks a numeric liter value or any labeled custom
    /// marker lacks a datetime; nothing is submitted on failure.
    pub fn build_save_plan(&self) -> Result<SavePlan, CoreError> {
        let mut plan = SavePlan::default();
        let mut problems: Vec<String> = Vec::new();

        for (&mark_id, label) in &self.labels {
            let result = match label.result.as_deref() {
                Some(r) if !r.is_empty() => r,
                _ => continue,
            };

            let liter = if result == RESULT_ABNORMAL {
                match parse_liter(label.liter.as_deref()) {
                    Some(l) => Some(l),
                    None => {
                        problems.push(format!("marker {mark_id}: abnormal requires a liter value"));
                        continue;
                    }
                }
            } else {
                None
            };

            if let Some(persisted) = self.persisted.iter().find(|m| m.mark_id == mark_id) {
                plan.updates.push(LabelWrite {
                    record_id: persisted.record_id,
                    mark_id,
                    result: result.to_string(),
                    liter,
                });
            } else if let Some(custom) = self.custom.iter().find(|m| m.mark_id == mark_id) {
                match custom.mark_timestamp {
                    Some(ts) => plan.creates.push(MarkerCreate {
                        group_id: self.group_id.clone(),
                        mark_id,
                        mark_timestamp: ts,
                        result: result.to_string(),
                        liter,
                    }),
                    None => problems.push(format!("marker {mark_id}: custom marker has no datetime")),
                }
            }
        }

        if !problems.is_empty() {
            return Err(CoreError::Validation(problems.join("; ")));
        }
        if plan.updates.is_empty() && plan.creates.is_empty() {
            return Err(CoreError::Validation(
                "Select a result for at least one marker".to_string(),
            ));
        }
        Ok(plan)
    }

    /// Fold the outcome of the two save requests back into the session.
    ///
    /// Custom markers that were successfully created are cleared from the
    /// session even when the update side failed at the same time; the side
    /// that succeeded is never rolled back.
    pub fn apply_save_outcome(
        &mut self,
        plan: &SavePlan,
        updates: Option<OperationOutcome>,
        creates: Option<OperationOutcome>,
    ) -> SaveReport {
        let mut affected = 0usize;
        let mut errors = Vec::new();

        match updates {
            Some(Ok(())) => affected += plan.updates.len(),
            Some(Err(msg)) => errors.push(format!("update: {msg}")),
            None => {}
        }

        match creates {
            Some(Ok(())) => {
                affected += plan.creates.len();
                for created in &plan.creates {
                    self.remove_custom_marker(created.mark_id);
                }
            }
            Some(Err(msg)) => errors.push(format!("create: {msg}")),
            None => {}
        }

        SaveReport {
            affected,
            errors,
            needs_refresh: affected > 0,
        }
    }
}

/// Parse an operator's raw liter entry. Only finite numbers count.
fn parse_liter(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
