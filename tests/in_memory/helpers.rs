//! Shared test helpers for in-memory scheduling integration tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use shopfloor::scheduling::{
    adapters::memory::InMemorySchedulingRepository,
    domain::{
        AssignmentWindow, Item, ItemId, Machine, MachineId, Operator, OperatorId, Project,
        ProjectId, ScheduledTask, SlotSpec, SlotStartFilter, TaskId,
    },
    ports::{SchedulingRepository, SchedulingRepositoryResult, TaskUnitOfWork},
    services::TaskWriteService,
};
use std::{sync::Arc, time::Duration};

/// Returns 2026-03-02 at `hour:minute` UTC.
///
/// # Panics
///
/// Panics if the fixture instant is not a valid calendar time.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0)
        .single()
        .expect("valid fixture instant")
}

/// Slot spec from `start` lasting `minutes`.
pub fn slot(start: DateTime<Utc>, minutes: u32) -> SlotSpec {
    SlotSpec::new(start, minutes)
}

/// Seeded shop floor: two machines, one operator, one project.
pub struct Floor<R> {
    pub repository: Arc<R>,
    pub mill: MachineId,
    pub lathe: MachineId,
    pub alice: OperatorId,
    pub project: ProjectId,
}

impl<R: SchedulingRepository> Floor<R> {
    /// Returns a write service over the floor's repository.
    pub fn writer(&self) -> TaskWriteService<R, DefaultClock> {
        TaskWriteService::new(Arc::clone(&self.repository), Arc::new(DefaultClock))
    }
}

/// Seeds a fresh in-memory repository and wraps it with `wrap`.
///
/// # Panics
///
/// Panics if seeding the repository fails.
pub fn seed<R>(wrap: impl FnOnce(InMemorySchedulingRepository) -> R) -> Floor<R> {
    let repository = InMemorySchedulingRepository::new();
    let mill = Machine::new("CNC Mill 2");
    let lathe = Machine::new("Lathe 1");
    let alice = Operator::new("Alice");
    let project = Project::new("Gearbox housings");
    let (mill_id, lathe_id, alice_id, project_id) =
        (mill.id(), lathe.id(), alice.id(), project.id());
    repository.insert_machine(mill).expect("seed machine");
    repository.insert_machine(lathe).expect("seed machine");
    repository.insert_operator(alice).expect("seed operator");
    repository.insert_project(project).expect("seed project");
    Floor {
        repository: Arc::new(wrap(repository)),
        mill: mill_id,
        lathe: lathe_id,
        alice: alice_id,
        project: project_id,
    }
}

/// Routes service logs to the test harness output.
///
/// Later calls are no-ops once a subscriber is installed.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Provides a floor backed by the plain in-memory repository.
#[fixture]
pub fn floor() -> Floor<InMemorySchedulingRepository> {
    seed(|repository| repository)
}

/// Provides a floor whose commits are delayed, widening the window between
/// the service's conflict check and the commit, and whose repository skips
/// the in-commit claim re-check. Only the writers' lock table keeps
/// overlapping bookings apart.
#[fixture]
pub fn slow_floor() -> Floor<SlowRepository> {
    init_tracing();
    seed(|repository| {
        SlowRepository::new(repository, Duration::from_millis(25)).without_claim_check()
    })
}

/// Provides a floor whose commits are delayed but still re-check claims.
#[fixture]
pub fn slow_checking_floor() -> Floor<SlowRepository> {
    init_tracing();
    seed(|repository| SlowRepository::new(repository, Duration::from_millis(25)))
}

/// Repository that sleeps before every commit.
pub struct SlowRepository {
    inner: InMemorySchedulingRepository,
    delay: Duration,
    check_claims: bool,
}

impl SlowRepository {
    /// Wraps `inner`, delaying commits by `delay`.
    pub const fn new(inner: InMemorySchedulingRepository, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            check_claims: true,
        }
    }

    /// Drops each unit's schedule claim before committing.
    #[must_use]
    pub const fn without_claim_check(mut self) -> Self {
        self.check_claims = false;
        self
    }
}

#[async_trait]
impl SchedulingRepository for SlowRepository {
    async fn find_assignments_for(
        &self,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingRepositoryResult<Vec<AssignmentWindow>> {
        self.inner
            .find_assignments_for(machine_ids, operator_ids, exclude_task_id)
            .await
    }

    async fn run_atomic(&self, mut unit: TaskUnitOfWork) -> SchedulingRepositoryResult<()> {
        tokio::time::sleep(self.delay).await;
        if !self.check_claims {
            unit.claim = None;
        }
        self.inner.run_atomic(unit).await
    }

    async fn delete_task(&self, id: TaskId) -> SchedulingRepositoryResult<()> {
        self.inner.delete_task(id).await
    }

    async fn find_task(&self, id: TaskId) -> SchedulingRepositoryResult<Option<ScheduledTask>> {
        self.inner.find_task(id).await
    }

    async fn list_tasks(
        &self,
        filter: SlotStartFilter,
    ) -> SchedulingRepositoryResult<Vec<ScheduledTask>> {
        self.inner.list_tasks(filter).await
    }

    async fn find_machines(&self, ids: &[MachineId]) -> SchedulingRepositoryResult<Vec<Machine>> {
        self.inner.find_machines(ids).await
    }

    async fn find_operators(
        &self,
        ids: &[OperatorId],
    ) -> SchedulingRepositoryResult<Vec<Operator>> {
        self.inner.find_operators(ids).await
    }

    async fn find_item(&self, id: ItemId) -> SchedulingRepositoryResult<Option<Item>> {
        self.inner.find_item(id).await
    }

    async fn find_item_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> SchedulingRepositoryResult<Option<Item>> {
        self.inner.find_item_by_name(project_id, name).await
    }

    async fn find_project(&self, id: ProjectId) -> SchedulingRepositoryResult<Option<Project>> {
        self.inner.find_project(id).await
    }
}
