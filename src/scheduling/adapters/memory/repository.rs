//! In-memory repository for scheduling tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::scheduling::{
    domain::{
        AssignmentWindow, Item, ItemId, Machine, MachineId, Operator, OperatorId, Project,
        ProjectId, ResourceRef, ScheduledTask, ScheduledTaskParts, SlotStartFilter, Task, TaskId,
        TimeSlot,
    },
    ports::{
        SchedulingRepository, SchedulingRepositoryError, SchedulingRepositoryResult,
        TaskUnitOfWork, TaskWrite,
    },
};

/// Thread-safe in-memory scheduling repository.
///
/// Units of work are applied to a copy of the state that replaces the live
/// state only when every step succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchedulingRepository {
    state: Arc<RwLock<InMemorySchedulingState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemorySchedulingState {
    projects: HashMap<ProjectId, Project>,
    items: HashMap<ItemId, Item>,
    machines: HashMap<MachineId, Machine>,
    operators: HashMap<OperatorId, Operator>,
    tasks: HashMap<TaskId, Task>,
    task_order: Vec<TaskId>,
    slots: HashMap<TaskId, Vec<TimeSlot>>,
    machine_assignments: HashMap<TaskId, Vec<MachineId>>,
    operator_assignments: HashMap<TaskId, Vec<OperatorId>>,
}

impl InMemorySchedulingRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a project.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn insert_project(&self, project: Project) -> SchedulingRepositoryResult<()> {
        self.write()?.projects.insert(project.id(), project);
        Ok(())
    }

    /// Registers an item under an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::MissingReference`] when the
    /// project is unknown.
    pub fn insert_item(&self, item: Item) -> SchedulingRepositoryResult<()> {
        let mut state = self.write()?;
        state.insert_item(item)
    }

    /// Registers a machine.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn insert_machine(&self, machine: Machine) -> SchedulingRepositoryResult<()> {
        self.write()?.machines.insert(machine.id(), machine);
        Ok(())
    }

    /// Registers an operator.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn insert_operator(&self, operator: Operator) -> SchedulingRepositoryResult<()> {
        self.write()?.operators.insert(operator.id(), operator);
        Ok(())
    }

    fn read(&self) -> SchedulingRepositoryResult<RwLockReadGuard<'_, InMemorySchedulingState>> {
        self.state.read().map_err(|err| {
            SchedulingRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> SchedulingRepositoryResult<RwLockWriteGuard<'_, InMemorySchedulingState>> {
        self.state.write().map_err(|err| {
            SchedulingRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemorySchedulingState {
    fn insert_item(&mut self, item: Item) -> SchedulingRepositoryResult<()> {
        if !self.projects.contains_key(&item.project_id()) {
            return Err(missing("project", item.project_id().into_inner()));
        }
        self.items.insert(item.id(), item);
        Ok(())
    }

    fn apply(&mut self, unit: TaskUnitOfWork) -> SchedulingRepositoryResult<()> {
        let TaskUnitOfWork {
            new_item,
            task,
            slots,
            machine_ids,
            operator_ids,
            claim,
        } = unit;

        let task_id = task.task().id();
        if let Some(claimed) = claim.filter(|claimed| !claimed.is_vacuous()) {
            let committed = self.assignments_for(
                claimed.resources.machine_ids(),
                claimed.resources.operator_ids(),
                Some(task_id),
            );
            if let Some(report) = claimed.first_conflict(&committed) {
                return Err(SchedulingRepositoryError::Conflict(Box::new(report)));
            }
        }

        if let Some(item) = new_item {
            self.insert_item(item)?;
        }

        match task {
            TaskWrite::Insert(task) => {
                if self.tasks.contains_key(&task_id) {
                    return Err(SchedulingRepositoryError::DuplicateTask(task_id));
                }
                self.check_item(&task)?;
                self.tasks.insert(task_id, task);
                self.task_order.push(task_id);
            }
            TaskWrite::Update(task) => {
                if !self.tasks.contains_key(&task_id) {
                    return Err(SchedulingRepositoryError::TaskNotFound(task_id));
                }
                self.check_item(&task)?;
                self.tasks.insert(task_id, task);
            }
        }

        if let Some(new_slots) = slots {
            self.slots.insert(task_id, new_slots);
        }
        if let Some(ids) = machine_ids {
            if let Some(unknown) = ids.iter().find(|id| !self.machines.contains_key(*id)) {
                return Err(missing("machine", unknown.into_inner()));
            }
            self.machine_assignments.insert(task_id, ids);
        }
        if let Some(ids) = operator_ids {
            if let Some(unknown) = ids.iter().find(|id| !self.operators.contains_key(*id)) {
                return Err(missing("operator", unknown.into_inner()));
            }
            self.operator_assignments.insert(task_id, ids);
        }
        Ok(())
    }

    fn check_item(&self, task: &Task) -> SchedulingRepositoryResult<()> {
        match task.item_id() {
            Some(item_id) if !self.items.contains_key(&item_id) => {
                Err(missing("item", item_id.into_inner()))
            }
            _ => Ok(()),
        }
    }

    fn remove_task(&mut self, id: TaskId) -> SchedulingRepositoryResult<()> {
        if self.tasks.remove(&id).is_none() {
            return Err(SchedulingRepositoryError::TaskNotFound(id));
        }
        self.task_order.retain(|task_id| *task_id != id);
        self.slots.remove(&id);
        self.machine_assignments.remove(&id);
        self.operator_assignments.remove(&id);
        Ok(())
    }

    fn slots_of(&self, id: TaskId) -> &[TimeSlot] {
        self.slots.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    fn assemble(&self, task: &Task) -> ScheduledTask {
        let item = task.item_id().and_then(|id| self.items.get(&id)).cloned();
        let project = item
            .as_ref()
            .and_then(|item| self.projects.get(&item.project_id()))
            .cloned();
        let machines: Vec<Machine> = self
            .machine_assignments
            .get(&task.id())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.machines.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        let operators: Vec<Operator> = self
            .operator_assignments
            .get(&task.id())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.operators.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        ScheduledTask::new(ScheduledTaskParts {
            task: task.clone(),
            item,
            project,
            machines,
            operators,
            slots: self.slots_of(task.id()).to_vec(),
        })
    }

    /// Collects every committed window of the given resources, ordered by
    /// start, skipping `exclude_task_id`.
    fn assignments_for(
        &self,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
        exclude_task_id: Option<TaskId>,
    ) -> Vec<AssignmentWindow> {
        let mut windows: Vec<AssignmentWindow> = self
            .task_order
            .iter()
            .filter(|id| Some(**id) != exclude_task_id)
            .filter_map(|id| self.tasks.get(id))
            .flat_map(|task| self.windows_of(task, machine_ids, operator_ids))
            .collect();
        windows.sort_by_key(|assignment| assignment.window.start());
        windows
    }

    /// Collects `(resource, slot)` windows for one task.
    fn windows_of(
        &self,
        task: &Task,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
    ) -> Vec<AssignmentWindow> {
        let resources: Vec<ResourceRef> = self
            .machine_assignments
            .get(&task.id())
            .into_iter()
            .flatten()
            .filter(|id| machine_ids.contains(id))
            .filter_map(|id| self.machines.get(id).map(ResourceRef::from))
            .chain(
                self.operator_assignments
                    .get(&task.id())
                    .into_iter()
                    .flatten()
                    .filter(|id| operator_ids.contains(id))
                    .filter_map(|id| self.operators.get(id).map(ResourceRef::from)),
            )
            .collect();

        self.slots_of(task.id())
            .iter()
            .flat_map(|slot| {
                resources.iter().map(move |resource| AssignmentWindow {
                    resource: resource.clone(),
                    task_id: task.id(),
                    task_title: task.title().as_str().to_owned(),
                    window: slot.window(),
                })
            })
            .collect()
    }
}

fn missing(entity: &'static str, id: uuid::Uuid) -> SchedulingRepositoryError {
    SchedulingRepositoryError::MissingReference { entity, id }
}

#[async_trait]
impl SchedulingRepository for InMemorySchedulingRepository {
    async fn find_assignments_for(
        &self,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingRepositoryResult<Vec<AssignmentWindow>> {
        Ok(self
            .read()?
            .assignments_for(machine_ids, operator_ids, exclude_task_id))
    }

    async fn run_atomic(&self, unit: TaskUnitOfWork) -> SchedulingRepositoryResult<()> {
        let mut state = self.write()?;
        let mut staged = state.clone();
        staged.apply(unit)?;
        *state = staged;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> SchedulingRepositoryResult<()> {
        self.write()?.remove_task(id)
    }

    async fn find_task(&self, id: TaskId) -> SchedulingRepositoryResult<Option<ScheduledTask>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).map(|task| state.assemble(task)))
    }

    async fn list_tasks(
        &self,
        filter: SlotStartFilter,
    ) -> SchedulingRepositoryResult<Vec<ScheduledTask>> {
        let state = self.read()?;
        let tasks = state
            .task_order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| {
                filter.is_unbounded()
                    || state
                        .slots_of(task.id())
                        .iter()
                        .any(|slot| filter.contains(slot.window().start()))
            })
            .map(|task| state.assemble(task))
            .collect();
        Ok(tasks)
    }

    async fn find_machines(&self, ids: &[MachineId]) -> SchedulingRepositoryResult<Vec<Machine>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.machines.get(id).cloned())
            .collect())
    }

    async fn find_operators(
        &self,
        ids: &[OperatorId],
    ) -> SchedulingRepositoryResult<Vec<Operator>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.operators.get(id).cloned())
            .collect())
    }

    async fn find_item(&self, id: ItemId) -> SchedulingRepositoryResult<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    async fn find_item_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> SchedulingRepositoryResult<Option<Item>> {
        let state = self.read()?;
        let item = state
            .items
            .values()
            .find(|item| item.project_id() == project_id && item.name() == name)
            .cloned();
        Ok(item)
    }

    async fn find_project(&self, id: ProjectId) -> SchedulingRepositoryResult<Option<Project>> {
        Ok(self.read()?.projects.get(&id).cloned())
    }
}
