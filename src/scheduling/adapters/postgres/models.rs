//! Diesel row models for scheduling persistence.

use super::schema::{
    items, machines, operators, projects, task_machines, task_operators, tasks, time_slots,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Production status.
    pub status: String,
    /// Planned quantity.
    pub quantity: i32,
    /// Completed quantity.
    pub completed_quantity: i32,
    /// Optional owning item.
    pub item_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Production status.
    pub status: String,
    /// Planned quantity.
    pub quantity: i32,
    /// Completed quantity.
    pub completed_quantity: i32,
    /// Optional owning item.
    pub item_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for task records; `None` clears nullable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Production status.
    pub status: String,
    /// Planned quantity.
    pub quantity: i32,
    /// Completed quantity.
    pub completed_quantity: i32,
    /// Optional owning item.
    pub item_id: Option<uuid::Uuid>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Slot row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = time_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SlotRow {
    /// Slot identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Inclusive start instant.
    pub starts_at: DateTime<Utc>,
    /// Exclusive end instant.
    pub ends_at: DateTime<Utc>,
    /// Recorded duration in minutes.
    pub duration_min: i32,
}

/// Machine row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = machines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MachineRow {
    /// Machine identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Optional machine type label.
    pub machine_type: Option<String>,
}

/// Operator row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = operators)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OperatorRow {
    /// Operator identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Optional shift label.
    pub shift: Option<String>,
}

/// Project row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
}

/// Item row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    /// Item identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
}

/// Insert model for machine assignments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_machines)]
pub struct NewTaskMachineRow {
    /// Assigned task.
    pub task_id: uuid::Uuid,
    /// Assigned machine.
    pub machine_id: uuid::Uuid,
    /// Position within the task's machine list.
    pub position: i32,
}

/// Insert model for operator assignments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_operators)]
pub struct NewTaskOperatorRow {
    /// Assigned task.
    pub task_id: uuid::Uuid,
    /// Assigned operator.
    pub operator_id: uuid::Uuid,
    /// Position within the task's operator list.
    pub position: i32,
}

/// Raw row returned by the resource usage query.
#[derive(Debug, Clone, QueryableByName)]
pub struct AssignmentWindowRow {
    /// `machine` or `operator`.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub resource_type: String,
    /// Resource identifier.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub resource_id: uuid::Uuid,
    /// Resource display name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub resource_name: String,
    /// Holding task.
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    pub task_id: uuid::Uuid,
    /// Holding task title.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub task_title: String,
    /// Slot start.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub starts_at: DateTime<Utc>,
    /// Slot end.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub ends_at: DateTime<Utc>,
}
