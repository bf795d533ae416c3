//! Diesel schema for scheduling persistence.

diesel::table! {
    /// Customer projects.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Items produced within a project.
    items (id) {
        /// Item identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Shop-floor machines.
    machines (id) {
        /// Machine identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional machine type label.
        #[max_length = 100]
        machine_type -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Machine operators.
    operators (id) {
        /// Operator identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional shift label.
        #[max_length = 100]
        shift -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Production tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Insertion sequence used to break creation-time ties.
        seq -> Int8,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Production status.
        #[max_length = 20]
        status -> Varchar,
        /// Planned quantity.
        quantity -> Int4,
        /// Completed quantity.
        completed_quantity -> Int4,
        /// Optional owning item.
        item_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Slots occupied by tasks.
    time_slots (id) {
        /// Slot identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Inclusive start instant.
        starts_at -> Timestamptz,
        /// Exclusive end instant.
        ends_at -> Timestamptz,
        /// Recorded duration in minutes.
        duration_min -> Int4,
    }
}

diesel::table! {
    /// Machine assignments.
    task_machines (task_id, machine_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned machine.
        machine_id -> Uuid,
        /// Position within the task's machine list.
        position -> Int4,
    }
}

diesel::table! {
    /// Operator assignments.
    task_operators (task_id, operator_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned operator.
        operator_id -> Uuid,
        /// Position within the task's operator list.
        position -> Int4,
    }
}

diesel::joinable!(items -> projects (project_id));
diesel::joinable!(tasks -> items (item_id));
diesel::joinable!(time_slots -> tasks (task_id));
diesel::joinable!(task_machines -> tasks (task_id));
diesel::joinable!(task_machines -> machines (machine_id));
diesel::joinable!(task_operators -> tasks (task_id));
diesel::joinable!(task_operators -> operators (operator_id));

diesel::allow_tables_to_appear_in_same_query!(
    projects,
    items,
    machines,
    operators,
    tasks,
    time_slots,
    task_machines,
    task_operators,
);
