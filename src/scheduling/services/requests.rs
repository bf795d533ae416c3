//! Request payloads accepted by the task write service.

use crate::scheduling::domain::{
    ItemId, MachineId, OperatorId, ProjectId, ResourceSet, SlotSpec, TaskStatus,
};

/// How a task is linked to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemLink {
    /// The task is not linked to an item.
    #[default]
    Unlinked,
    /// Link to an existing item.
    Item(ItemId),
    /// Link to the project's default item, creating it when missing.
    ProjectDefault(ProjectId),
}

/// Complete description of a task, used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTaskRequest {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) status: TaskStatus,
    pub(crate) quantity: u32,
    pub(crate) completed_quantity: u32,
    pub(crate) item_link: ItemLink,
    pub(crate) resources: ResourceSet,
    pub(crate) slots: Vec<SlotSpec>,
}

impl ScheduleTaskRequest {
    /// Creates a request with a title and every other field defaulted:
    /// pending status, quantity 1, nothing completed, no item, no resources,
    /// no slots.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            quantity: 1,
            completed_quantity: 0,
            item_link: ItemLink::default(),
            resources: ResourceSet::default(),
            slots: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the planned quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the completed quantity.
    #[must_use]
    pub const fn with_completed_quantity(mut self, completed_quantity: u32) -> Self {
        self.completed_quantity = completed_quantity;
        self
    }

    /// Sets the item link.
    #[must_use]
    pub const fn with_item_link(mut self, item_link: ItemLink) -> Self {
        self.item_link = item_link;
        self
    }

    /// Sets the assigned machines.
    #[must_use]
    pub fn with_machines(mut self, machine_ids: impl IntoIterator<Item = MachineId>) -> Self {
        self.resources = self.resources.with_machines(machine_ids);
        self
    }

    /// Sets the assigned operators.
    #[must_use]
    pub fn with_operators(mut self, operator_ids: impl IntoIterator<Item = OperatorId>) -> Self {
        self.resources = self.resources.with_operators(operator_ids);
        self
    }

    /// Sets the slots.
    #[must_use]
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = SlotSpec>) -> Self {
        self.slots = slots.into_iter().collect();
        self
    }
}

/// Partial update; only fields that were set are touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchTaskRequest {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<Option<String>>,
    pub(crate) status: Option<TaskStatus>,
    pub(crate) quantity: Option<u32>,
    pub(crate) completed_quantity: Option<u32>,
    pub(crate) item_link: Option<ItemLink>,
    pub(crate) machine_ids: Option<Vec<MachineId>>,
    pub(crate) operator_ids: Option<Vec<OperatorId>>,
    pub(crate) slots: Option<Vec<SlotSpec>>,
}

impl PatchTaskRequest {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description; `None` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the planned quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Replaces the completed quantity.
    #[must_use]
    pub const fn with_completed_quantity(mut self, completed_quantity: u32) -> Self {
        self.completed_quantity = Some(completed_quantity);
        self
    }

    /// Replaces the item link.
    #[must_use]
    pub const fn with_item_link(mut self, item_link: ItemLink) -> Self {
        self.item_link = Some(item_link);
        self
    }

    /// Replaces the machine assignments.
    #[must_use]
    pub fn with_machines(mut self, machine_ids: impl IntoIterator<Item = MachineId>) -> Self {
        self.machine_ids = Some(machine_ids.into_iter().collect());
        self
    }

    /// Replaces the operator assignments.
    #[must_use]
    pub fn with_operators(mut self, operator_ids: impl IntoIterator<Item = OperatorId>) -> Self {
        self.operator_ids = Some(operator_ids.into_iter().collect());
        self
    }

    /// Replaces the slots.
    #[must_use]
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = SlotSpec>) -> Self {
        self.slots = Some(slots.into_iter().collect());
        self
    }

    /// Returns whether the patch changes slots or resource assignments.
    #[must_use]
    pub const fn touches_schedule(&self) -> bool {
        self.slots.is_some() || self.machine_ids.is_some() || self.operator_ids.is_some()
    }
}
