//! Task with its full relation graph, as returned to callers.

use super::{Item, Machine, Operator, Project, Task, TimeSlot};
use serde::Serialize;

/// Task together with its item, project, resources, and slots.
///
/// Slots are ordered by start instant ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    task: Task,
    item: Option<Item>,
    project: Option<Project>,
    machines: Vec<Machine>,
    operators: Vec<Operator>,
    slots: Vec<TimeSlot>,
}

/// Parameter object for assembling a [`ScheduledTask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTaskParts {
    /// Task row.
    pub task: Task,
    /// Linked item, if any.
    pub item: Option<Item>,
    /// Project of the linked item, if any.
    pub project: Option<Project>,
    /// Assigned machines.
    pub machines: Vec<Machine>,
    /// Assigned operators.
    pub operators: Vec<Operator>,
    /// Slots in any order.
    pub slots: Vec<TimeSlot>,
}

impl ScheduledTask {
    /// Assembles the graph, sorting slots by start instant.
    #[must_use]
    pub fn new(parts: ScheduledTaskParts) -> Self {
        let ScheduledTaskParts {
            task,
            item,
            project,
            machines,
            operators,
            mut slots,
        } = parts;
        slots.sort_by_key(|slot| (slot.window().start(), slot.window().end()));
        Self {
            task,
            item,
            project,
            machines,
            operators,
            slots,
        }
    }

    /// Returns the task row.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the linked item, if any.
    #[must_use]
    pub const fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Returns the project of the linked item, if any.
    #[must_use]
    pub const fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Returns the assigned machines.
    #[must_use]
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Returns the assigned operators.
    #[must_use]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Returns the slots ordered by start instant.
    #[must_use]
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }
}
