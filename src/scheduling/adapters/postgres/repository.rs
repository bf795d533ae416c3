//! `PostgreSQL` repository implementation for scheduling storage.

use super::{
    models::{
        AssignmentWindowRow, ItemRow, MachineRow, NewTaskMachineRow, NewTaskOperatorRow,
        NewTaskRow, OperatorRow, ProjectRow, SlotRow, TaskChangeset, TaskRow,
    },
    schema::{
        items, machines, operators, projects, task_machines, task_operators, tasks, time_slots,
    },
};
use crate::config::ShopfloorConfig;
use crate::scheduling::{
    domain::{
        AssignmentWindow, Item, ItemId, Machine, MachineId, Operator, OperatorId,
        PersistedTaskData, Project, ProjectId, Quantities, ResourceKind, ResourceRef,
        ScheduledTask, ScheduledTaskParts, SlotStartFilter, Task, TaskId, TaskStatus, TaskTitle,
        TimeSlot, TimeWindow,
    },
    ports::{
        SchedulingRepository, SchedulingRepositoryError, SchedulingRepositoryResult,
        TaskUnitOfWork, TaskWrite,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by scheduling adapters.
pub type SchedulingPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema migrations bundled with the crate.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// `PostgreSQL`-backed scheduling repository.
///
/// Every unit of work first takes session advisory locks on its task,
/// resources, and project, then re-checks its schedule claim and writes in
/// one `SERIALIZABLE` transaction. Writers in different processes sharing
/// one database therefore cannot both commit overlapping bookings.
#[derive(Debug, Clone)]
pub struct PostgresSchedulingRepository {
    pool: SchedulingPgPool,
}

impl PostgresSchedulingRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchedulingPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from the configured database URL and pool
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Persistence`] when no database
    /// URL is configured or the pool cannot be established.
    pub fn connect(config: &ShopfloorConfig) -> SchedulingRepositoryResult<Self> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            SchedulingRepositoryError::persistence(std::io::Error::other(
                "database_url is not configured",
            ))
        })?;
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(ConnectionManager::<PgConnection>::new(url))
            .map_err(SchedulingRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingRepositoryError::Persistence`] when a migration
    /// fails or no connection is available.
    pub async fn run_migrations(&self) -> SchedulingRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .run_pending_migrations(MIGRATIONS)
                .map(|_| ())
                .map_err(|err| SchedulingRepositoryError::Persistence(Arc::from(err)))
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> SchedulingRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> SchedulingRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SchedulingRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(SchedulingRepositoryError::persistence)?
    }
}

impl From<DieselError> for SchedulingRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl SchedulingRepository for PostgresSchedulingRepository {
    async fn find_assignments_for(
        &self,
        machine_ids: &[MachineId],
        operator_ids: &[OperatorId],
        exclude_task_id: Option<TaskId>,
    ) -> SchedulingRepositoryResult<Vec<AssignmentWindow>> {
        let machine_uuids: Vec<Uuid> = machine_ids.iter().map(|id| id.into_inner()).collect();
        let operator_uuids: Vec<Uuid> = operator_ids.iter().map(|id| id.into_inner()).collect();
        let excluded = exclude_task_id.map(TaskId::into_inner);

        self.run_blocking(move |connection| {
            load_assignments(connection, machine_uuids, operator_uuids, excluded)
        })
        .await
    }

    async fn run_atomic(&self, unit: TaskUnitOfWork) -> SchedulingRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let keys = advisory_keys(&unit);
            let outcome = lock_keys(connection, &keys).and_then(|()| {
                connection
                    .build_transaction()
                    .serializable()
                    .run(|tx| apply_unit(tx, unit))
            });
            let released = diesel::sql_query("SELECT pg_advisory_unlock_all()")
                .execute(connection)
                .map_err(SchedulingRepositoryError::from);
            outcome.and(released.map(|_| ()))
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> SchedulingRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(tasks::table.find(id.into_inner())).execute(connection)?;
            if deleted == 0 {
                return Err(SchedulingRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> SchedulingRepositoryResult<Option<ScheduledTask>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(found) = row else {
                return Ok(None);
            };
            Ok(load_graphs(connection, vec![found])?.into_iter().next())
        })
        .await
    }

    async fn list_tasks(
        &self,
        filter: SlotStartFilter,
    ) -> SchedulingRepositoryResult<Vec<ScheduledTask>> {
        self.run_blocking(move |connection| {
            let rows = if filter.is_unbounded() {
                tasks::table
                    .order((tasks::created_at.asc(), tasks::seq.asc()))
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(connection)?
            } else {
                let task_ids = matching_task_ids(connection, filter)?;
                tasks::table
                    .filter(tasks::id.eq_any(task_ids))
                    .order((tasks::created_at.asc(), tasks::seq.asc()))
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(connection)?
            };
            load_graphs(connection, rows)
        })
        .await
    }

    async fn find_machines(&self, ids: &[MachineId]) -> SchedulingRepositoryResult<Vec<Machine>> {
        let wanted: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = machines::table
                .filter(machines::id.eq_any(&wanted))
                .select(MachineRow::as_select())
                .load::<MachineRow>(connection)?;
            let mut by_id: HashMap<Uuid, Machine> = rows
                .into_iter()
                .map(|row| (row.id, row_to_machine(row)))
                .collect();
            Ok(wanted.iter().filter_map(|id| by_id.remove(id)).collect())
        })
        .await
    }

    async fn find_operators(
        &self,
        ids: &[OperatorId],
    ) -> SchedulingRepositoryResult<Vec<Operator>> {
        let wanted: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            let rows = operators::table
                .filter(operators::id.eq_any(&wanted))
                .select(OperatorRow::as_select())
                .load::<OperatorRow>(connection)?;
            let mut by_id: HashMap<Uuid, Operator> = rows
                .into_iter()
                .map(|row| (row.id, row_to_operator(row)))
                .collect();
            Ok(wanted.iter().filter_map(|id| by_id.remove(id)).collect())
        })
        .await
    }

    async fn find_item(&self, id: ItemId) -> SchedulingRepositoryResult<Option<Item>> {
        self.run_blocking(move |connection| {
            let row = items::table
                .find(id.into_inner())
                .select(ItemRow::as_select())
                .first::<ItemRow>(connection)
                .optional()?;
            Ok(row.map(row_to_item))
        })
        .await
    }

    async fn find_item_by_name(
        &self,
        project_id: ProjectId,
        name: &str,
    ) -> SchedulingRepositoryResult<Option<Item>> {
        let lookup_name = name.to_owned();
        self.run_blocking(move |connection| {
            let row = items::table
                .filter(items::project_id.eq(project_id.into_inner()))
                .filter(items::name.eq(lookup_name))
                .select(ItemRow::as_select())
                .first::<ItemRow>(connection)
                .optional()?;
            Ok(row.map(row_to_item))
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> SchedulingRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            Ok(row.map(row_to_project))
        })
        .await
    }
}

/// Session advisory-lock keys for every row a unit claims, in ascending
/// order so concurrent writers acquire them in the same sequence.
fn advisory_keys(unit: &TaskUnitOfWork) -> BTreeSet<String> {
    let mut keys = BTreeSet::from([format!("task:{}", unit.task.task().id())]);
    if let Some(item) = &unit.new_item {
        keys.insert(format!("project:{}", item.project_id()));
    }
    let machines = unit
        .machine_ids
        .iter()
        .flatten()
        .chain(unit.claim.iter().flat_map(|claim| claim.resources.machine_ids()));
    keys.extend(machines.map(|id| format!("machine:{id}")));
    let operators = unit
        .operator_ids
        .iter()
        .flatten()
        .chain(unit.claim.iter().flat_map(|claim| claim.resources.operator_ids()));
    keys.extend(operators.map(|id| format!("operator:{id}")));
    keys
}

/// Takes a session-level advisory lock per key before the transaction
/// starts, so the transaction snapshot already sees every write committed
/// by the previous holder.
fn lock_keys(
    connection: &mut PgConnection,
    keys: &BTreeSet<String>,
) -> SchedulingRepositoryResult<()> {
    for key in keys {
        diesel::sql_query("SELECT pg_advisory_lock(hashtextextended($1, 0))")
            .bind::<diesel::sql_types::Text, _>(key)
            .execute(connection)?;
    }
    Ok(())
}

fn load_assignments(
    connection: &mut PgConnection,
    machine_uuids: Vec<Uuid>,
    operator_uuids: Vec<Uuid>,
    excluded: Option<Uuid>,
) -> SchedulingRepositoryResult<Vec<AssignmentWindow>> {
    let rows = diesel::sql_query(concat!(
        "SELECT 'machine' AS resource_type, m.id AS resource_id, ",
        "m.name AS resource_name, t.id AS task_id, t.title AS task_title, ",
        "s.starts_at, s.ends_at, t.seq AS task_seq ",
        "FROM task_machines tm ",
        "JOIN machines m ON m.id = tm.machine_id ",
        "JOIN tasks t ON t.id = tm.task_id ",
        "JOIN time_slots s ON s.task_id = t.id ",
        "WHERE tm.machine_id = ANY($1) AND ($3::uuid IS NULL OR t.id <> $3) ",
        "UNION ALL ",
        "SELECT 'operator', o.id, o.name, t.id, t.title, s.starts_at, s.ends_at, t.seq ",
        "FROM task_operators top ",
        "JOIN operators o ON o.id = top.operator_id ",
        "JOIN tasks t ON t.id = top.task_id ",
        "JOIN time_slots s ON s.task_id = t.id ",
        "WHERE top.operator_id = ANY($2) AND ($3::uuid IS NULL OR t.id <> $3) ",
        "ORDER BY starts_at, task_seq",
    ))
    .bind::<diesel::sql_types::Array<diesel::sql_types::Uuid>, _>(machine_uuids)
    .bind::<diesel::sql_types::Array<diesel::sql_types::Uuid>, _>(operator_uuids)
    .bind::<diesel::sql_types::Nullable<diesel::sql_types::Uuid>, _>(excluded)
    .load::<AssignmentWindowRow>(connection)?;

    rows.into_iter().map(row_to_assignment).collect()
}

fn apply_unit(
    connection: &mut PgConnection,
    unit: TaskUnitOfWork,
) -> SchedulingRepositoryResult<()> {
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
        let committed = load_assignments(
            connection,
            claimed.resources.machine_ids().iter().map(|id| id.into_inner()).collect(),
            claimed.resources.operator_ids().iter().map(|id| id.into_inner()).collect(),
            Some(task_id.into_inner()),
        )?;
        if let Some(report) = claimed.first_conflict(&committed) {
            return Err(SchedulingRepositoryError::Conflict(Box::new(report)));
        }
    }

    if let Some(item) = new_item {
        insert_item(connection, &item)?;
    }

    if let Some(item_id) = task.task().item_id().map(ItemId::into_inner) {
        let found = diesel::select(diesel::dsl::exists(items::table.find(item_id)))
            .get_result::<bool>(connection)?;
        require(found, "item", item_id)?;
    }
    match task {
        TaskWrite::Insert(ref inserted) => {
            diesel::insert_into(tasks::table)
                .values(to_new_row(inserted)?)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        SchedulingRepositoryError::DuplicateTask(task_id)
                    }
                    _ => SchedulingRepositoryError::persistence(err),
                })?;
        }
        TaskWrite::Update(ref updated) => {
            let changed = diesel::update(tasks::table.find(task_id.into_inner()))
                .set(to_changeset(updated)?)
                .execute(connection)?;
            if changed == 0 {
                return Err(SchedulingRepositoryError::TaskNotFound(task_id));
            }
        }
    }

    if let Some(new_slots) = slots {
        replace_slots(connection, task_id, &new_slots)?;
    }
    if let Some(ids) = machine_ids {
        replace_machines(connection, task_id, &ids)?;
    }
    if let Some(ids) = operator_ids {
        replace_operators(connection, task_id, &ids)?;
    }
    Ok(())
}

fn insert_item(connection: &mut PgConnection, item: &Item) -> SchedulingRepositoryResult<()> {
    let project_id = item.project_id().into_inner();
    let found = diesel::select(diesel::dsl::exists(projects::table.find(project_id)))
        .get_result::<bool>(connection)?;
    require(found, "project", project_id)?;
    diesel::insert_into(items::table)
        .values(ItemRow {
            id: item.id().into_inner(),
            project_id: item.project_id().into_inner(),
            name: item.name().to_owned(),
        })
        .execute(connection)?;
    Ok(())
}

/// Turns a failed existence check into
/// [`SchedulingRepositoryError::MissingReference`].
///
/// Checking before inserting reports which row is missing instead of a bare
/// foreign-key violation.
const fn require(found: bool, entity: &'static str, id: Uuid) -> SchedulingRepositoryResult<()> {
    if found {
        Ok(())
    } else {
        Err(SchedulingRepositoryError::MissingReference { entity, id })
    }
}

fn replace_slots(
    connection: &mut PgConnection,
    task_id: TaskId,
    slots: &[TimeSlot],
) -> SchedulingRepositoryResult<()> {
    diesel::delete(time_slots::table.filter(time_slots::task_id.eq(task_id.into_inner())))
        .execute(connection)?;
    if slots.is_empty() {
        return Ok(());
    }
    let rows = slots
        .iter()
        .map(slot_to_row)
        .collect::<SchedulingRepositoryResult<Vec<_>>>()?;
    diesel::insert_into(time_slots::table)
        .values(&rows)
        .execute(connection)?;
    Ok(())
}

fn replace_machines(
    connection: &mut PgConnection,
    task_id: TaskId,
    ids: &[MachineId],
) -> SchedulingRepositoryResult<()> {
    diesel::delete(task_machines::table.filter(task_machines::task_id.eq(task_id.into_inner())))
        .execute(connection)?;
    let mut rows = Vec::with_capacity(ids.len());
    for (position, machine_id) in ids.iter().enumerate() {
        let found = diesel::select(diesel::dsl::exists(
            machines::table.find(machine_id.into_inner()),
        ))
        .get_result::<bool>(connection)?;
        require(found, "machine", machine_id.into_inner())?;
        rows.push(NewTaskMachineRow {
            task_id: task_id.into_inner(),
            machine_id: machine_id.into_inner(),
            position: i32::try_from(position).map_err(SchedulingRepositoryError::persistence)?,
        });
    }
    if !rows.is_empty() {
        diesel::insert_into(task_machines::table)
            .values(&rows)
            .execute(connection)?;
    }
    Ok(())
}

fn replace_operators(
    connection: &mut PgConnection,
    task_id: TaskId,
    ids: &[OperatorId],
) -> SchedulingRepositoryResult<()> {
    diesel::delete(
        task_operators::table.filter(task_operators::task_id.eq(task_id.into_inner())),
    )
    .execute(connection)?;
    let mut rows = Vec::with_capacity(ids.len());
    for (position, operator_id) in ids.iter().enumerate() {
        let found = diesel::select(diesel::dsl::exists(
            operators::table.find(operator_id.into_inner()),
        ))
        .get_result::<bool>(connection)?;
        require(found, "operator", operator_id.into_inner())?;
        rows.push(NewTaskOperatorRow {
            task_id: task_id.into_inner(),
            operator_id: operator_id.into_inner(),
            position: i32::try_from(position).map_err(SchedulingRepositoryError::persistence)?,
        });
    }
    if !rows.is_empty() {
        diesel::insert_into(task_operators::table)
            .values(&rows)
            .execute(connection)?;
    }
    Ok(())
}

fn matching_task_ids(
    connection: &mut PgConnection,
    filter: SlotStartFilter,
) -> SchedulingRepositoryResult<Vec<Uuid>> {
    let mut query = time_slots::table
        .select(time_slots::task_id)
        .distinct()
        .into_boxed();
    query = match filter.lower() {
        Bound::Included(from) => query.filter(time_slots::starts_at.ge(from)),
        Bound::Excluded(from) => query.filter(time_slots::starts_at.gt(from)),
        Bound::Unbounded => query,
    };
    query = match filter.upper() {
        Bound::Included(to) => query.filter(time_slots::starts_at.le(to)),
        Bound::Excluded(to) => query.filter(time_slots::starts_at.lt(to)),
        Bound::Unbounded => query,
    };
    Ok(query.load::<Uuid>(connection)?)
}

/// Loads slots, resources, and item/project rows for `rows`, preserving
/// their order.
fn load_graphs(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> SchedulingRepositoryResult<Vec<ScheduledTask>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let task_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let item_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.item_id).collect();

    let mut slots_by_task: HashMap<Uuid, Vec<TimeSlot>> = HashMap::new();
    for row in time_slots::table
        .filter(time_slots::task_id.eq_any(&task_ids))
        .order(time_slots::starts_at.asc())
        .select(SlotRow::as_select())
        .load::<SlotRow>(connection)?
    {
        let owner = row.task_id;
        slots_by_task
            .entry(owner)
            .or_default()
            .push(row_to_slot(row)?);
    }

    let mut machines_by_task: HashMap<Uuid, Vec<Machine>> = HashMap::new();
    for (owner, row) in task_machines::table
        .inner_join(machines::table)
        .filter(task_machines::task_id.eq_any(&task_ids))
        .order((task_machines::task_id.asc(), task_machines::position.asc()))
        .select((task_machines::task_id, MachineRow::as_select()))
        .load::<(Uuid, MachineRow)>(connection)?
    {
        machines_by_task
            .entry(owner)
            .or_default()
            .push(row_to_machine(row));
    }

    let mut operators_by_task: HashMap<Uuid, Vec<Operator>> = HashMap::new();
    for (owner, row) in task_operators::table
        .inner_join(operators::table)
        .filter(task_operators::task_id.eq_any(&task_ids))
        .order((task_operators::task_id.asc(), task_operators::position.asc()))
        .select((task_operators::task_id, OperatorRow::as_select()))
        .load::<(Uuid, OperatorRow)>(connection)?
    {
        operators_by_task
            .entry(owner)
            .or_default()
            .push(row_to_operator(row));
    }

    let items_by_id: HashMap<Uuid, (Item, Project)> = items::table
        .inner_join(projects::table)
        .filter(items::id.eq_any(&item_ids))
        .select((ItemRow::as_select(), ProjectRow::as_select()))
        .load::<(ItemRow, ProjectRow)>(connection)?
        .into_iter()
        .map(|(item, project)| (item.id, (row_to_item(item), row_to_project(project))))
        .collect();

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            let linked = row.item_id.and_then(|item_id| items_by_id.get(&item_id)).cloned();
            let (item, project) = linked.map_or((None, None), |(item, project)| {
                (Some(item), Some(project))
            });
            Ok(ScheduledTask::new(ScheduledTaskParts {
                task: row_to_task(row)?,
                item,
                project,
                machines: machines_by_task.remove(&id).unwrap_or_default(),
                operators: operators_by_task.remove(&id).unwrap_or_default(),
                slots: slots_by_task.remove(&id).unwrap_or_default(),
            }))
        })
        .collect()
}

fn to_new_row(task: &Task) -> SchedulingRepositoryResult<NewTaskRow> {
    let (quantity, completed_quantity) = quantities_to_columns(task.quantities())?;
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        quantity,
        completed_quantity,
        item_id: task.item_id().map(ItemId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changeset(task: &Task) -> SchedulingRepositoryResult<TaskChangeset> {
    let (quantity, completed_quantity) = quantities_to_columns(task.quantities())?;
    Ok(TaskChangeset {
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        quantity,
        completed_quantity,
        item_id: task.item_id().map(ItemId::into_inner),
        updated_at: task.updated_at(),
    })
}

fn quantities_to_columns(quantities: Quantities) -> SchedulingRepositoryResult<(i32, i32)> {
    let quantity =
        i32::try_from(quantities.quantity()).map_err(SchedulingRepositoryError::persistence)?;
    let completed =
        i32::try_from(quantities.completed()).map_err(SchedulingRepositoryError::persistence)?;
    Ok((quantity, completed))
}

fn slot_to_row(slot: &TimeSlot) -> SchedulingRepositoryResult<SlotRow> {
    Ok(SlotRow {
        id: slot.id(),
        task_id: slot.task_id().into_inner(),
        starts_at: slot.window().start(),
        ends_at: slot.window().end(),
        duration_min: i32::try_from(slot.duration_min())
            .map_err(SchedulingRepositoryError::persistence)?,
    })
}

fn row_to_task(row: TaskRow) -> SchedulingRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status,
        quantity,
        completed_quantity,
        item_id,
        created_at,
        updated_at,
    } = row;

    let quantities = Quantities::new(
        u32::try_from(quantity).map_err(SchedulingRepositoryError::persistence)?,
        u32::try_from(completed_quantity).map_err(SchedulingRepositoryError::persistence)?,
    )
    .map_err(SchedulingRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title: TaskTitle::new(title).map_err(SchedulingRepositoryError::persistence)?,
        description,
        status: TaskStatus::try_from(status.as_str())
            .map_err(SchedulingRepositoryError::persistence)?,
        quantities,
        item_id: item_id.map(ItemId::from_uuid),
        created_at,
        updated_at,
    }))
}

fn row_to_slot(row: SlotRow) -> SchedulingRepositoryResult<TimeSlot> {
    let window =
        TimeWindow::new(row.starts_at, row.ends_at).map_err(SchedulingRepositoryError::persistence)?;
    let duration_min =
        u32::try_from(row.duration_min).map_err(SchedulingRepositoryError::persistence)?;
    Ok(TimeSlot::from_persisted(
        row.id,
        TaskId::from_uuid(row.task_id),
        window,
        duration_min,
    ))
}

fn row_to_machine(row: MachineRow) -> Machine {
    Machine::from_parts(MachineId::from_uuid(row.id), row.name, row.machine_type)
}

fn row_to_operator(row: OperatorRow) -> Operator {
    Operator::from_parts(OperatorId::from_uuid(row.id), row.name, row.shift)
}

fn row_to_item(row: ItemRow) -> Item {
    Item::from_parts(
        ItemId::from_uuid(row.id),
        ProjectId::from_uuid(row.project_id),
        row.name,
    )
}

fn row_to_project(row: ProjectRow) -> Project {
    Project::from_parts(ProjectId::from_uuid(row.id), row.name)
}

fn row_to_assignment(row: AssignmentWindowRow) -> SchedulingRepositoryResult<AssignmentWindow> {
    let kind = if row.resource_type == ResourceKind::Machine.as_str() {
        ResourceKind::Machine
    } else {
        ResourceKind::Operator
    };
    Ok(AssignmentWindow {
        resource: ResourceRef::new(kind, row.resource_id, row.resource_name),
        task_id: TaskId::from_uuid(row.task_id),
        task_title: row.task_title,
        window: TimeWindow::new(row.starts_at, row.ends_at)
            .map_err(SchedulingRepositoryError::persistence)?,
    })
}
