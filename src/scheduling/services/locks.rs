//! Per-resource advisory locks held across conflict check and write.
//!
//! A writer first locks its own task, then every machine, operator, and
//! project it touches in one sorted batch. Task locks are never requested
//! while resource locks are held, so two writers cannot wait on each other.

use crate::scheduling::domain::{MachineId, OperatorId, ProjectId, ResourceSet, TaskId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Key of one lockable scheduling entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    /// A task being written.
    Task(TaskId),
    /// A project whose default item may be created.
    Project(ProjectId),
    /// A machine being assigned.
    Machine(MachineId),
    /// An operator being assigned.
    Operator(OperatorId),
}

/// Table of advisory locks shared by every writer of one repository.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocks {
    table: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

impl ResourceLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task_id`.
    pub async fn lock_task(&self, task_id: TaskId) -> HeldLocks {
        let guard = self.entry(LockKey::Task(task_id)).lock_owned().await;
        HeldLocks {
            locks: self.clone(),
            guards: vec![guard],
            resources_held: false,
        }
    }

    /// Waits for exclusive access to every resource in `resources`, plus
    /// `project_id` when given, for a writer that holds no task lock.
    pub async fn lock_resources(
        &self,
        resources: &ResourceSet,
        project_id: Option<ProjectId>,
    ) -> HeldLocks {
        let mut held = HeldLocks {
            locks: self.clone(),
            guards: Vec::new(),
            resources_held: false,
        };
        held.acquire_resources(resources, project_id).await;
        held
    }

    /// Returns the number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn entry(&self, key: LockKey) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Entries referenced only by the table are idle.
        table.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(table.entry(key).or_default())
    }
}

/// Locks held by one writer; released together when dropped.
#[derive(Debug)]
#[must_use = "locks are released as soon as the guard is dropped"]
pub struct HeldLocks {
    locks: ResourceLocks,
    guards: Vec<OwnedMutexGuard<()>>,
    resources_held: bool,
}

impl HeldLocks {
    /// Acquires every resource in `resources`, plus `project_id` when given,
    /// in ascending key order.
    ///
    /// Only the first call acquires anything; later calls are no-ops so a
    /// writer can never interleave two resource batches.
    pub async fn acquire_resources(
        &mut self,
        resources: &ResourceSet,
        project_id: Option<ProjectId>,
    ) {
        if self.resources_held {
            return;
        }
        let keys: BTreeSet<LockKey> = resources
            .machine_ids()
            .iter()
            .copied()
            .map(LockKey::Machine)
            .chain(resources.operator_ids().iter().copied().map(LockKey::Operator))
            .chain(project_id.map(LockKey::Project))
            .collect();
        for key in keys {
            let guard = self.locks.entry(key).lock_owned().await;
            self.guards.push(guard);
        }
        self.resources_held = true;
    }

    /// Returns the number of locks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns whether no lock is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}
