//! Task write transaction: create, replace, patch, and delete.
//!
//! Every write validates its input, resolves references, takes the advisory
//! locks of the task and of every resource it schedules, checks for
//! conflicts, and commits one [`TaskUnitOfWork`] while the locks are held.
//! The unit carries the checked schedule as a [`ScheduleClaim`], which the
//! repository re-checks inside its atomic scope.

use super::{
    ConflictDetector, ItemLink, PatchTaskRequest, ResourceLocks, ScheduleTaskRequest,
    SchedulingError, SchedulingResult,
};
use crate::scheduling::{
    domain::{
        Item, ItemId, ProjectId, Quantities, ResourceSet, ScheduleClaim, ScheduledTask, SlotSpec,
        Task, TaskDraft, TaskId, TaskTitle, TimeSlot, TimeWindow, disjoint_windows,
    },
    ports::{SchedulingRepository, TaskUnitOfWork, TaskWrite},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Name given to the item created when a task is linked to a project only.
pub const DEFAULT_ITEM_NAME: &str = "Default item";

/// Item link after resolution against storage.
#[derive(Debug, Default)]
struct ResolvedItem {
    item_id: Option<ItemId>,
    new_item: Option<Item>,
}

/// Orchestrates every task write against one repository.
pub struct TaskWriteService<R, C>
where
    R: SchedulingRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    locks: ResourceLocks,
    detector: ConflictDetector<R>,
    default_item_name: String,
}

impl<R, C> Clone for TaskWriteService<R, C>
where
    R: SchedulingRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            locks: self.locks.clone(),
            detector: ConflictDetector::new(Arc::clone(&self.repository)),
            default_item_name: self.default_item_name.clone(),
        }
    }
}

impl<R, C> TaskWriteService<R, C>
where
    R: SchedulingRepository,
    C: Clock + Send + Sync,
{
    /// Creates a write service with its own lock table.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            detector: ConflictDetector::new(Arc::clone(&repository)),
            repository,
            clock,
            locks: ResourceLocks::new(),
            default_item_name: DEFAULT_ITEM_NAME.to_owned(),
        }
    }

    /// Shares `locks` with other writers of the same repository.
    #[must_use]
    pub fn with_locks(mut self, locks: ResourceLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Sets the name of items created for project-only links.
    #[must_use]
    pub fn with_default_item_name(mut self, name: impl Into<String>) -> Self {
        self.default_item_name = name.into();
        self
    }

    /// Returns the lock table used by this service.
    #[must_use]
    pub const fn locks(&self) -> &ResourceLocks {
        &self.locks
    }

    /// Creates a task with its slots and resource assignments.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Validation`] for an empty title, a
    /// completed quantity above the planned quantity, or overlapping slots;
    /// [`SchedulingError::NotFound`] for an unknown machine, operator, item,
    /// or project; [`SchedulingError::Conflict`] when a resource is already
    /// booked; and [`SchedulingError::Repository`] when storage fails. Nothing
    /// is persisted when an error is returned.
    pub async fn create_task(
        &self,
        request: ScheduleTaskRequest,
    ) -> SchedulingResult<ScheduledTask> {
        let ValidatedRequest {
            mut draft,
            windows,
            item_link,
            resources,
            slots,
        } = validate_request(request)?;
        self.ensure_resources_exist(&resources).await?;

        let _held = self
            .locks
            .lock_resources(&resources, project_to_lock(item_link))
            .await;
        let resolved = self.resolve_item_link(item_link).await?;
        self.ensure_no_conflict(&windows, &resources, None).await?;

        draft.item_id = resolved.item_id;
        let task = Task::new(draft, &*self.clock);
        let task_id = task.id();
        let unit = TaskUnitOfWork {
            new_item: resolved.new_item,
            slots: Some(build_slots(task_id, &slots)?),
            machine_ids: Some(resources.machine_ids().to_vec()),
            operator_ids: Some(resources.operator_ids().to_vec()),
            claim: Some(ScheduleClaim {
                windows,
                resources: resources.clone(),
            }),
            task: TaskWrite::Insert(task),
        };
        self.repository.run_atomic(unit).await?;
        debug!(
            task_id = %task_id,
            slots = slots.len(),
            machines = resources.machine_ids().len(),
            operators = resources.operator_ids().len(),
            "task created"
        );
        self.get_task(task_id).await
    }

    /// Replaces every mutable field, slot, and assignment of a task.
    ///
    /// Fields absent from `request` take their defaults; in particular a
    /// request without an item link unlinks the task.
    ///
    /// # Errors
    ///
    /// As [`Self::create_task`], plus [`SchedulingError::NotFound`] when the
    /// task does not exist.
    pub async fn replace_task(
        &self,
        id: TaskId,
        request: ScheduleTaskRequest,
    ) -> SchedulingResult<ScheduledTask> {
        let ValidatedRequest {
            mut draft,
            windows,
            item_link,
            resources,
            slots,
        } = validate_request(request)?;
        let mut held = self.locks.lock_task(id).await;
        let existing = self.get_task(id).await?;
        self.ensure_resources_exist(&resources).await?;

        held.acquire_resources(&resources, project_to_lock(item_link))
            .await;
        let resolved = self.resolve_item_link(item_link).await?;
        self.ensure_no_conflict(&windows, &resources, Some(id))
            .await?;

        draft.item_id = resolved.item_id;
        let mut task = existing.task().clone();
        task.replace(draft, &*self.clock);
        let unit = TaskUnitOfWork {
            new_item: resolved.new_item,
            slots: Some(build_slots(id, &slots)?),
            machine_ids: Some(resources.machine_ids().to_vec()),
            operator_ids: Some(resources.operator_ids().to_vec()),
            claim: Some(ScheduleClaim {
                windows,
                resources,
            }),
            task: TaskWrite::Update(task),
        };
        self.repository.run_atomic(unit).await?;
        debug!(task_id = %id, slots = slots.len(), "task replaced");
        self.get_task(id).await
    }

    /// Applies a partial update; fields absent from `patch` are kept.
    ///
    /// When the patch touches slots or resource assignments, the resulting
    /// schedule (patched or existing slots against patched or existing
    /// resources) is conflict-checked, so a pure reassignment is caught too.
    ///
    /// # Errors
    ///
    /// As [`Self::replace_task`]. Quantities are validated against the
    /// merged values, so an unpatched quantity still bounds a patched
    /// completed quantity.
    pub async fn patch_task(
        &self,
        id: TaskId,
        patch: PatchTaskRequest,
    ) -> SchedulingResult<ScheduledTask> {
        let touches_schedule = patch.touches_schedule();
        let PatchTaskRequest {
            title,
            description,
            status,
            quantity,
            completed_quantity,
            item_link,
            machine_ids,
            operator_ids,
            slots,
        } = patch;

        let mut held = self.locks.lock_task(id).await;
        let existing = self.get_task(id).await?;
        let current = existing.task();

        let mut draft = current.to_draft();
        if let Some(new_title) = title {
            draft.title = TaskTitle::new(new_title)?;
        }
        if let Some(new_description) = description {
            draft.description = new_description;
        }
        if let Some(new_status) = status {
            draft.status = new_status;
        }
        draft.quantities = Quantities::new(
            quantity.unwrap_or(current.quantities().quantity()),
            completed_quantity.unwrap_or(current.quantities().completed()),
        )?;

        let specs: Vec<SlotSpec> = slots.clone().unwrap_or_else(|| {
            existing.slots().iter().map(TimeSlot::to_spec).collect()
        });
        let windows = disjoint_windows(&specs)?;
        let machines_patched = machine_ids.is_some();
        let operators_patched = operator_ids.is_some();
        let resources = ResourceSet::new(
            machine_ids.unwrap_or_else(|| {
                existing.machines().iter().map(|machine| machine.id()).collect()
            }),
            operator_ids.unwrap_or_else(|| {
                existing
                    .operators()
                    .iter()
                    .map(|operator| operator.id())
                    .collect()
            }),
        );
        self.ensure_resources_exist(&resources).await?;

        held.acquire_resources(&resources, item_link.and_then(project_to_lock))
            .await;
        let mut new_item = None;
        if let Some(link) = item_link {
            let resolved = self.resolve_item_link(link).await?;
            draft.item_id = resolved.item_id;
            new_item = resolved.new_item;
        }
        if touches_schedule {
            self.ensure_no_conflict(&windows, &resources, Some(id))
                .await?;
        }

        let mut task = current.clone();
        task.replace(draft, &*self.clock);
        let unit = TaskUnitOfWork {
            new_item,
            task: TaskWrite::Update(task),
            slots: slots
                .map(|patched| build_slots(id, &patched))
                .transpose()?,
            machine_ids: machines_patched.then(|| resources.machine_ids().to_vec()),
            operator_ids: operators_patched.then(|| resources.operator_ids().to_vec()),
            claim: touches_schedule.then_some(ScheduleClaim {
                windows,
                resources,
            }),
        };
        self.repository.run_atomic(unit).await?;
        debug!(task_id = %id, schedule_changed = touches_schedule, "task patched");
        self.get_task(id).await
    }

    /// Deletes a task together with its slots and assignments.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the task does not exist and
    /// [`SchedulingError::Repository`] when storage fails.
    pub async fn delete_task(&self, id: TaskId) -> SchedulingResult<()> {
        let _held = self.locks.lock_task(id).await;
        self.repository.delete_task(id).await?;
        debug!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Returns a task with its relation graph.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotFound`] when the task does not exist and
    /// [`SchedulingError::Repository`] when storage fails.
    pub async fn get_task(&self, id: TaskId) -> SchedulingResult<ScheduledTask> {
        self.repository
            .find_task(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found("task", id.into_inner()))
    }

    async fn ensure_resources_exist(&self, resources: &ResourceSet) -> SchedulingResult<()> {
        let machines = self
            .repository
            .find_machines(resources.machine_ids())
            .await?;
        if let Some(missing) = resources
            .machine_ids()
            .iter()
            .find(|id| !machines.iter().any(|machine| machine.id() == **id))
        {
            return Err(SchedulingError::not_found("machine", missing.into_inner()));
        }

        let operators = self
            .repository
            .find_operators(resources.operator_ids())
            .await?;
        if let Some(missing) = resources
            .operator_ids()
            .iter()
            .find(|id| !operators.iter().any(|operator| operator.id() == **id))
        {
            return Err(SchedulingError::not_found(
                "operator",
                missing.into_inner(),
            ));
        }
        Ok(())
    }

    /// Must run while the project lock of a [`ItemLink::ProjectDefault`]
    /// link is held, so the default item is created at most once.
    async fn resolve_item_link(&self, link: ItemLink) -> SchedulingResult<ResolvedItem> {
        match link {
            ItemLink::Unlinked => Ok(ResolvedItem::default()),
            ItemLink::Item(item_id) => {
                let item = self
                    .repository
                    .find_item(item_id)
                    .await?
                    .ok_or_else(|| SchedulingError::not_found("item", item_id.into_inner()))?;
                Ok(ResolvedItem {
                    item_id: Some(item.id()),
                    new_item: None,
                })
            }
            ItemLink::ProjectDefault(project_id) => {
                if self.repository.find_project(project_id).await?.is_none() {
                    return Err(SchedulingError::not_found(
                        "project",
                        project_id.into_inner(),
                    ));
                }
                let existing = self
                    .repository
                    .find_item_by_name(project_id, &self.default_item_name)
                    .await?;
                Ok(existing.map_or_else(
                    || {
                        let item = Item::new(project_id, self.default_item_name.as_str());
                        ResolvedItem {
                            item_id: Some(item.id()),
                            new_item: Some(item),
                        }
                    },
                    |item| ResolvedItem {
                        item_id: Some(item.id()),
                        new_item: None,
                    },
                ))
            }
        }
    }

    async fn ensure_no_conflict(
        &self,
        windows: &[TimeWindow],
        resources: &ResourceSet,
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingResult<()> {
        self.detector
            .first_conflict(windows, resources, exclude_task_id)
            .await?
            .map_or(Ok(()), |report| Err(report.into()))
    }
}

/// Full request after the checks that need no storage access.
struct ValidatedRequest {
    draft: TaskDraft,
    windows: Vec<TimeWindow>,
    item_link: ItemLink,
    resources: ResourceSet,
    slots: Vec<SlotSpec>,
}

fn validate_request(request: ScheduleTaskRequest) -> SchedulingResult<ValidatedRequest> {
    let ScheduleTaskRequest {
        title,
        description,
        status,
        quantity,
        completed_quantity,
        item_link,
        resources,
        slots,
    } = request;
    let windows = disjoint_windows(&slots)?;
    let draft = TaskDraft {
        title: TaskTitle::new(title)?,
        description,
        status,
        quantities: Quantities::new(quantity, completed_quantity)?,
        item_id: None,
    };
    Ok(ValidatedRequest {
        draft,
        windows,
        item_link,
        resources,
        slots,
    })
}

const fn project_to_lock(link: ItemLink) -> Option<ProjectId> {
    match link {
        ItemLink::ProjectDefault(project_id) => Some(project_id),
        ItemLink::Unlinked | ItemLink::Item(_) => None,
    }
}

fn build_slots(task_id: TaskId, specs: &[SlotSpec]) -> SchedulingResult<Vec<TimeSlot>> {
    Ok(specs
        .iter()
        .map(|spec| TimeSlot::from_spec(task_id, spec))
        .collect::<Result<Vec<_>, _>>()?)
}
