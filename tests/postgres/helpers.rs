//! Shared test helpers for `PostgreSQL` scheduling integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::MigrationHarness;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{BootstrapError, TemporaryDatabase};
use rstest::fixture;
use shopfloor::scheduling::{
    adapters::postgres::{MIGRATIONS, PostgresSchedulingRepository},
    domain::{MachineId, OperatorId, ProjectId, SlotSpec, TaskId},
    services::TaskWriteService,
};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "shopfloor_test_template";

/// Write service over a `PostgreSQL` repository.
pub type PgWriter = TaskWriteService<PostgresSchedulingRepository, DefaultClock>;

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
pub const fn slot(start: DateTime<Utc>, minutes: u32) -> SlotSpec {
    SlotSpec::new(start, minutes)
}

/// Creates a runtime for driving the async repository from sync tests.
///
/// Database setup and teardown use blocking clients, so tests stay
/// synchronous and only enter the runtime around repository calls.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with every migration applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            apply_migrations(&cluster.connection().database_url(db_name))
                .map_err(|err| BootstrapError::from(eyre::eyre!("{err}")))
        })
        .map_err(|err| Box::new(err) as BoxError)
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut connection = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

/// Seeded shop floor in its own temporary database.
///
/// The database is dropped, terminating any pooled connections, when the
/// floor goes out of scope.
pub struct PgFloor {
    pub repository: Arc<PostgresSchedulingRepository>,
    pub mill: MachineId,
    pub lathe: MachineId,
    pub alice: OperatorId,
    pub project: ProjectId,
    url: String,
    database: Option<TemporaryDatabase>,
}

impl PgFloor {
    /// Returns a write service with its own lock table.
    pub fn writer(&self) -> PgWriter {
        TaskWriteService::new(Arc::clone(&self.repository), Arc::new(DefaultClock))
    }

    /// Opens a second repository with its own pool over the same database,
    /// standing in for another process.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built.
    pub fn second_repository(&self) -> Result<Arc<PostgresSchedulingRepository>, BoxError> {
        repository_for(&self.url).map(Arc::new)
    }

    /// Counts rows of `table` that belong to `task_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or query fails.
    pub fn rows_for_task(&self, table: &str, task_id: TaskId) -> Result<i64, BoxError> {
        let mut connection = PgConnection::establish(&self.url)?;
        let row = diesel::sql_query(format!(
            "SELECT COUNT(*) AS count FROM {table} WHERE task_id = $1"
        ))
        .bind::<diesel::sql_types::Uuid, _>(task_id.into_inner())
        .get_result::<CountRow>(&mut connection)?;
        Ok(row.count)
    }

    /// Counts every row of `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or query fails.
    pub fn total_rows(&self, table: &str) -> Result<i64, BoxError> {
        let mut connection = PgConnection::establish(&self.url)?;
        let row = diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
            .get_result::<CountRow>(&mut connection)?;
        Ok(row.count)
    }
}

impl Drop for PgFloor {
    fn drop(&mut self) {
        let Some(database) = self.database.take() else {
            return;
        };
        if let Err(err) = database.force_drop() {
            tracing::warn!(error = %err, "failed to drop test database");
        }
    }
}

fn repository_for(url: &str) -> Result<PostgresSchedulingRepository, BoxError> {
    let pool = Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(PostgresSchedulingRepository::new(pool))
}

fn seed(url: &str) -> Result<(MachineId, MachineId, OperatorId, ProjectId), BoxError> {
    let (mill, lathe, alice, project) = (
        MachineId::new(),
        MachineId::new(),
        OperatorId::new(),
        ProjectId::new(),
    );
    let mut connection = PgConnection::establish(url)?;
    diesel::sql_query(concat!(
        "INSERT INTO machines (id, name, machine_type) ",
        "VALUES ($1, 'CNC Mill 2', 'mill'), ($2, 'Lathe 1', NULL)",
    ))
    .bind::<diesel::sql_types::Uuid, _>(mill.into_inner())
    .bind::<diesel::sql_types::Uuid, _>(lathe.into_inner())
    .execute(&mut connection)?;
    diesel::sql_query("INSERT INTO operators (id, name, shift) VALUES ($1, 'Alice', 'early')")
        .bind::<diesel::sql_types::Uuid, _>(alice.into_inner())
        .execute(&mut connection)?;
    diesel::sql_query("INSERT INTO projects (id, name) VALUES ($1, 'Gearbox housings')")
        .bind::<diesel::sql_types::Uuid, _>(project.into_inner())
        .execute(&mut connection)?;
    Ok((mill, lathe, alice, project))
}

/// Creates a seeded floor in a fresh database cloned from the template.
///
/// # Errors
///
/// Returns an error if template setup, database creation, seeding, or pool
/// construction fails.
pub fn prepare_floor(cluster: PostgresCluster) -> Result<PgFloor, BoxError> {
    ensure_template(cluster)?;
    let database = cluster
        .temporary_database_from_template(
            format!("shopfloor_{}", Uuid::new_v4().simple()),
            TEMPLATE_DB,
        )
        .map_err(|err| Box::new(err) as BoxError)?;
    let url = database.url().to_owned();
    let (mill, lathe, alice, project) = seed(&url)?;
    let repository = Arc::new(repository_for(&url)?);
    Ok(PgFloor {
        repository,
        mill,
        lathe,
        alice,
        project,
        url,
        database: Some(database),
    })
}

/// Provides a seeded floor, or `None` when no cluster is available.
///
/// # Errors
///
/// Returns an error if the floor cannot be prepared on a running cluster.
#[fixture]
pub fn pg_floor(postgres_cluster: Option<PostgresCluster>) -> Result<Option<PgFloor>, BoxError> {
    postgres_cluster.map(prepare_floor).transpose()
}
