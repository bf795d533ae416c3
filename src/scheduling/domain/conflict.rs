//! Committed resource usage and the conflicts it can cause.

use super::{MachineId, OperatorId, ResourceKind, ResourceRef, ResourceSet, TaskId, TimeWindow};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// One committed window during which a task holds a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentWindow {
    /// Resource held during the window.
    pub resource: ResourceRef,
    /// Task holding the resource.
    pub task_id: TaskId,
    /// Title of the task holding the resource.
    pub task_title: String,
    /// Slot window of the holding task.
    pub window: TimeWindow,
}

/// Schedule a task write claims: its slot windows on its resources.
///
/// Adapters re-check the claim against committed assignments inside the
/// atomic write, so writers that do not share a lock table still cannot
/// both commit overlapping bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleClaim {
    /// Candidate slot windows.
    pub windows: Vec<TimeWindow>,
    /// Machines and operators held during every window.
    pub resources: ResourceSet,
}

impl ScheduleClaim {
    /// Returns whether the claim can never conflict.
    #[must_use]
    pub fn is_vacuous(&self) -> bool {
        self.windows.is_empty() || self.resources.is_empty()
    }

    /// Returns the first conflict between this claim and `committed`.
    #[must_use]
    pub fn first_conflict(&self, committed: &[AssignmentWindow]) -> Option<ConflictReport> {
        find_conflict(&self.windows, &self.resources, committed)
    }
}

/// Double booking found by the conflict detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    resource: ResourceRef,
    conflicting_task_id: TaskId,
    conflicting_task_title: String,
    overlap: TimeWindow,
}

impl ConflictReport {
    /// Creates a report for `existing` colliding with `overlap`.
    #[must_use]
    pub fn new(existing: &AssignmentWindow, overlap: TimeWindow) -> Self {
        Self {
            resource: existing.resource.clone(),
            conflicting_task_id: existing.task_id,
            conflicting_task_title: existing.task_title.clone(),
            overlap,
        }
    }

    /// Returns whether a machine or an operator is double booked.
    #[must_use]
    pub const fn conflict_type(&self) -> ResourceKind {
        self.resource.kind()
    }

    /// Returns the double-booked resource.
    #[must_use]
    pub const fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// Returns the task already holding the resource.
    #[must_use]
    pub const fn conflicting_task_id(&self) -> TaskId {
        self.conflicting_task_id
    }

    /// Returns the title of the task already holding the resource.
    #[must_use]
    pub fn conflicting_task_title(&self) -> &str {
        &self.conflicting_task_title
    }

    /// Returns the window claimed by both tasks.
    #[must_use]
    pub const fn overlap(&self) -> TimeWindow {
        self.overlap
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" is already assigned to task \"{}\" from {} to {}",
            self.resource.kind().label(),
            self.resource.name(),
            self.conflicting_task_title,
            self.overlap.start().format("%-I:%M %p"),
            self.overlap.end().format("%-I:%M %p"),
        )
    }
}

/// Returns the first conflict between `windows` and `committed`.
///
/// Windows are examined in ascending start order. Within one window machines
/// are checked before operators, each kind in `resources` order, and
/// committed windows in ascending start order. The reported window is the
/// intersection of the two colliding windows.
#[must_use]
pub fn find_conflict(
    windows: &[TimeWindow],
    resources: &ResourceSet,
    committed: &[AssignmentWindow],
) -> Option<ConflictReport> {
    let mut ordered_windows = windows.to_vec();
    ordered_windows.sort_by_key(|window| (window.start(), window.end()));
    let mut ordered_committed: Vec<&AssignmentWindow> = committed.iter().collect();
    ordered_committed.sort_by_key(|assignment| assignment.window.start());

    let requested: Vec<(ResourceKind, Uuid)> = resources
        .machine_ids()
        .iter()
        .map(|id| (ResourceKind::Machine, MachineId::into_inner(*id)))
        .chain(
            resources
                .operator_ids()
                .iter()
                .map(|id| (ResourceKind::Operator, OperatorId::into_inner(*id))),
        )
        .collect();

    ordered_windows.iter().find_map(|window| {
        requested.iter().find_map(|(kind, id)| {
            ordered_committed
                .iter()
                .filter(|assignment| {
                    assignment.resource.kind() == *kind && assignment.resource.id() == *id
                })
                .find_map(|assignment| {
                    window
                        .intersection(&assignment.window)
                        .map(|overlap| ConflictReport::new(assignment, overlap))
                })
        })
    })
}
