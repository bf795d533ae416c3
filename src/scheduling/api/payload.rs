//! Wire payloads accepted at the boundary and their normalization.
//!
//! Payloads use camelCase field names. Singular `machineId`/`operatorId`
//! fields are still accepted and merged into the plural lists.

use crate::scheduling::{
    domain::{ItemId, MachineId, OperatorId, ProjectId, ResourceSet, SlotSpec, TaskId, TaskStatus},
    services::{ConflictQuery, ItemLink, PatchTaskRequest, ScheduleTaskRequest},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// One requested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPayload {
    /// Slot start.
    pub start_date_time: DateTime<Utc>,
    /// Explicit slot end; derived from the duration when absent.
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    /// Slot length in minutes.
    pub duration_min: u32,
}

impl From<SlotPayload> for SlotSpec {
    fn from(payload: SlotPayload) -> Self {
        let spec = Self::new(payload.start_date_time, payload.duration_min);
        payload.end_date_time.map_or(spec, |end| spec.with_end(end))
    }
}

/// Machine and operator ids in plural and legacy singular shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    /// Assigned machines.
    #[serde(default)]
    pub machine_ids: Option<Vec<MachineId>>,
    /// Legacy single machine.
    #[serde(default)]
    pub machine_id: Option<MachineId>,
    /// Assigned operators.
    #[serde(default)]
    pub operator_ids: Option<Vec<OperatorId>>,
    /// Legacy single operator.
    #[serde(default)]
    pub operator_id: Option<OperatorId>,
}

impl ResourcePayload {
    /// Merged machine list, or `None` when neither shape was sent.
    #[must_use]
    pub fn machines(&self) -> Option<Vec<MachineId>> {
        merge_legacy(self.machine_ids.as_deref(), self.machine_id)
    }

    /// Merged operator list, or `None` when neither shape was sent.
    #[must_use]
    pub fn operators(&self) -> Option<Vec<OperatorId>> {
        merge_legacy(self.operator_ids.as_deref(), self.operator_id)
    }

    /// Normalized resource set; unsent lists are empty.
    #[must_use]
    pub fn to_resource_set(&self) -> ResourceSet {
        ResourceSet::new(
            self.machines().unwrap_or_default(),
            self.operators().unwrap_or_default(),
        )
    }
}

fn merge_legacy<T: Copy + PartialEq>(plural: Option<&[T]>, singular: Option<T>) -> Option<Vec<T>> {
    if plural.is_none() && singular.is_none() {
        return None;
    }
    let mut merged: Vec<T> = plural.unwrap_or_default().to_vec();
    if let Some(single) = singular
        && !merged.contains(&single)
    {
        merged.push(single);
    }
    Some(merged)
}

/// Body of create and full-replace requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    /// Task title; a missing title fails validation.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Status, defaulting to pending.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Planned quantity, defaulting to 1.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Completed quantity, defaulting to 0.
    #[serde(default)]
    pub completed_quantity: Option<u32>,
    /// Owning item; wins over `project_id`.
    #[serde(default)]
    pub item_id: Option<ItemId>,
    /// Project whose default item the task is linked to.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Resource assignments.
    #[serde(flatten)]
    pub resources: ResourcePayload,
    /// Requested slots.
    #[serde(default)]
    pub time_slots: Option<Vec<SlotPayload>>,
}

impl From<TaskPayload> for ScheduleTaskRequest {
    fn from(payload: TaskPayload) -> Self {
        let resources = payload.resources.to_resource_set();
        let mut request = Self::new(payload.title.unwrap_or_default())
            .with_status(payload.status.unwrap_or_default())
            .with_quantity(payload.quantity.unwrap_or(1))
            .with_completed_quantity(payload.completed_quantity.unwrap_or(0))
            .with_item_link(item_link(payload.item_id, payload.project_id))
            .with_machines(resources.machine_ids().iter().copied())
            .with_operators(resources.operator_ids().iter().copied())
            .with_slots(
                payload
                    .time_slots
                    .unwrap_or_default()
                    .into_iter()
                    .map(SlotSpec::from),
            );
        if let Some(description) = payload.description {
            request = request.with_description(description);
        }
        request
    }
}

/// Body of partial update requests; only sent fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatchPayload {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description; an explicit `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// New planned quantity.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// New completed quantity.
    #[serde(default)]
    pub completed_quantity: Option<u32>,
    /// New owning item; an explicit `null` unlinks the task.
    #[serde(default, deserialize_with = "present")]
    pub item_id: Option<Option<ItemId>>,
    /// Project whose default item the task is relinked to.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Replacement resource assignments.
    #[serde(flatten)]
    pub resources: ResourcePayload,
    /// Replacement slots.
    #[serde(default)]
    pub time_slots: Option<Vec<SlotPayload>>,
}

impl From<TaskPatchPayload> for PatchTaskRequest {
    fn from(payload: TaskPatchPayload) -> Self {
        let mut request = Self::new();
        if let Some(title) = payload.title {
            request = request.with_title(title);
        }
        if let Some(description) = payload.description {
            request = request.with_description(description);
        }
        if let Some(status) = payload.status {
            request = request.with_status(status);
        }
        if let Some(quantity) = payload.quantity {
            request = request.with_quantity(quantity);
        }
        if let Some(completed) = payload.completed_quantity {
            request = request.with_completed_quantity(completed);
        }
        match (payload.item_id, payload.project_id) {
            (Some(Some(item_id)), _) => request = request.with_item_link(ItemLink::Item(item_id)),
            (_, Some(project_id)) => {
                request = request.with_item_link(ItemLink::ProjectDefault(project_id));
            }
            (Some(None), None) => request = request.with_item_link(ItemLink::Unlinked),
            (None, None) => {}
        }
        if let Some(machines) = payload.resources.machines() {
            request = request.with_machines(machines);
        }
        if let Some(operators) = payload.resources.operators() {
            request = request.with_operators(operators);
        }
        if let Some(slots) = payload.time_slots {
            request = request.with_slots(slots.into_iter().map(SlotSpec::from));
        }
        request
    }
}

/// Body of a standalone conflict pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckPayload {
    /// Proposed start.
    pub scheduled_at: DateTime<Utc>,
    /// Proposed length in minutes.
    pub duration_min: u32,
    /// Resources to check.
    #[serde(flatten)]
    pub resources: ResourcePayload,
    /// Task whose own assignments are ignored.
    #[serde(default)]
    pub exclude_task_id: Option<TaskId>,
}

impl From<ConflictCheckPayload> for ConflictQuery {
    fn from(payload: ConflictCheckPayload) -> Self {
        Self::new(payload.scheduled_at, payload.duration_min)
            .with_resources(payload.resources.to_resource_set())
            .with_excluded_task(payload.exclude_task_id)
    }
}

const fn item_link(item_id: Option<ItemId>, project_id: Option<ProjectId>) -> ItemLink {
    match (item_id, project_id) {
        (Some(item), _) => ItemLink::Item(item),
        (None, Some(project)) => ItemLink::ProjectDefault(project),
        (None, None) => ItemLink::Unlinked,
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
