//! Diesel schema for task board persistence.

diesel::table! {
    /// Board columns, ordered per project by `sort`.
    task_statuses (id) {
        /// Status identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Project-unique slug.
        #[max_length = 255]
        slug -> Varchar,
        /// Column position.
        sort -> Int4,
        /// Project default flag.
        is_default -> Bool,
        /// Entering this column completes a task.
        is_completed -> Bool,
    }
}

diesel::table! {
    /// Tasks, ordered per column by `sort`.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Current column.
        status_id -> Uuid,
        /// Task title.
        title -> Text,
        /// Position within the column.
        sort -> Int4,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Soft-deletion timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed `depends_on` edges between tasks.
    task_dependencies (id) {
        /// Edge identifier.
        id -> Uuid,
        /// Dependent task.
        task_id -> Uuid,
        /// Prerequisite task.
        depends_on_task_id -> Uuid,
        /// Scheduling relationship metadata.
        #[max_length = 50]
        dependency_type -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> task_statuses (status_id));

diesel::allow_tables_to_appear_in_same_query!(task_dependencies, task_statuses, tasks);
