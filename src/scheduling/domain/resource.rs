//! Reference entities the scheduler assigns or links but never mutates.

use super::{ItemId, MachineId, OperatorId, ProjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shop-floor machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Machine {
    id: MachineId,
    name: String,
    machine_type: Option<String>,
}

impl Machine {
    /// Creates a machine with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(MachineId::new(), name, None)
    }

    /// Reconstructs a machine from stored parts.
    #[must_use]
    pub fn from_parts(
        id: MachineId,
        name: impl Into<String>,
        machine_type: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            machine_type,
        }
    }

    /// Sets the machine type label.
    #[must_use]
    pub fn with_type(mut self, machine_type: impl Into<String>) -> Self {
        self.machine_type = Some(machine_type.into());
        self
    }

    /// Returns the machine identifier.
    #[must_use]
    pub const fn id(&self) -> MachineId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the machine type label, if any.
    #[must_use]
    pub fn machine_type(&self) -> Option<&str> {
        self.machine_type.as_deref()
    }
}

/// Machine operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    id: OperatorId,
    name: String,
    shift: Option<String>,
}

impl Operator {
    /// Creates an operator with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(OperatorId::new(), name, None)
    }

    /// Reconstructs an operator from stored parts.
    #[must_use]
    pub fn from_parts(id: OperatorId, name: impl Into<String>, shift: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            shift,
        }
    }

    /// Sets the shift label.
    #[must_use]
    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = Some(shift.into());
        self
    }

    /// Returns the operator identifier.
    #[must_use]
    pub const fn id(&self) -> OperatorId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shift label, if any.
    #[must_use]
    pub fn shift(&self) -> Option<&str> {
        self.shift.as_deref()
    }
}

/// Customer project grouping items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: ProjectId,
    name: String,
}

impl Project {
    /// Creates a project with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_parts(ProjectId::new(), name)
    }

    /// Reconstructs a project from stored parts.
    #[must_use]
    pub fn from_parts(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Item produced within a project; tasks hang off items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    id: ItemId,
    project_id: ProjectId,
    name: String,
}

impl Item {
    /// Creates an item under `project_id` with a fresh identifier.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self::from_parts(ItemId::new(), project_id, name)
    }

    /// Reconstructs an item from stored parts.
    #[must_use]
    pub fn from_parts(id: ItemId, project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Kind of assignable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A machine.
    Machine,
    /// An operator.
    Operator,
}

impl ResourceKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Machine => "machine",
            Self::Operator => "operator",
        }
    }

    /// Returns the capitalised label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Machine => "Machine",
            Self::Operator => "Operator",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named reference to a machine or operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceRef {
    kind: ResourceKind,
    id: Uuid,
    name: String,
}

impl ResourceRef {
    /// Creates a resource reference.
    #[must_use]
    pub fn new(kind: ResourceKind, id: Uuid, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }

    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the raw resource identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&Machine> for ResourceRef {
    fn from(machine: &Machine) -> Self {
        Self::new(ResourceKind::Machine, machine.id().into_inner(), machine.name())
    }
}

impl From<&Operator> for ResourceRef {
    fn from(operator: &Operator) -> Self {
        Self::new(
            ResourceKind::Operator,
            operator.id().into_inner(),
            operator.name(),
        )
    }
}

/// Normalized machine and operator lists assigned to one task.
///
/// Duplicates are dropped while preserving first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    machine_ids: Vec<MachineId>,
    operator_ids: Vec<OperatorId>,
}

impl ResourceSet {
    /// Creates a normalized resource set.
    #[must_use]
    pub fn new(
        machine_ids: impl IntoIterator<Item = MachineId>,
        operator_ids: impl IntoIterator<Item = OperatorId>,
    ) -> Self {
        Self {
            machine_ids: dedup_in_order(machine_ids),
            operator_ids: dedup_in_order(operator_ids),
        }
    }

    /// Returns the assigned machines.
    #[must_use]
    pub fn machine_ids(&self) -> &[MachineId] {
        &self.machine_ids
    }

    /// Returns the assigned operators.
    #[must_use]
    pub fn operator_ids(&self) -> &[OperatorId] {
        &self.operator_ids
    }

    /// Returns whether no resource is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.machine_ids.is_empty() && self.operator_ids.is_empty()
    }

    /// Returns a copy with the machine list replaced.
    #[must_use]
    pub fn with_machines(&self, machine_ids: impl IntoIterator<Item = MachineId>) -> Self {
        Self::new(machine_ids, self.operator_ids.iter().copied())
    }

    /// Returns a copy with the operator list replaced.
    #[must_use]
    pub fn with_operators(&self, operator_ids: impl IntoIterator<Item = OperatorId>) -> Self {
        Self::new(self.machine_ids.iter().copied(), operator_ids)
    }
}

fn dedup_in_order<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
