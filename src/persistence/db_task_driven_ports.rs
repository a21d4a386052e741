use crate::domain;
use crate::domain::task::{DEFAULT_TASK_COLOR, NewTask, Task, TaskContent, TaskPatch, TaskStatus};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};

pub struct DbTaskReader;

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i32,
    project_id: i32,
    task_name: String,
    description: String,
    due_date: Option<NaiveDate>,
    status: String,
    priority: Option<String>,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(value: TaskRow) -> Self {
        Task {
            id: value.id,
            project_id: value.project_id,
            name: value.task_name,
            description: value.description,
            due_date: value.due_date,
            status: value.status,
            priority: value.priority,
            color: value.color,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl domain::task::driven_ports::TaskReader for DbTaskReader {
    async fn tasks_for_project(
        &self,
        project_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Task>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let tasks: Vec<Task> = sqlx::query_as::<_, TaskRow>(
            "SELECT t.id, t.project_id, t.task_name, t.description, t.due_date, t.status, \
                    t.priority, t.color, t.created_at, t.updated_at \
             FROM task t \
             WHERE t.project_id = $1 \
             ORDER BY t.due_date ASC NULLS LAST, t.created_at DESC",
        )
        .bind(project_id)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch tasks for a project")?
        .into_iter()
        .map(Task::from)
        .collect();

        Ok(tasks)
    }
}

pub struct DbTaskWriter;

impl domain::task::driven_ports::TaskWriter for DbTaskWriter {
    async fn insert(
        &self,
        project_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id: i32 = sqlx::query_scalar(
            "INSERT INTO task(project_id, task_name, description, due_date, status, priority, color) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, $8)) \
             RETURNING task.id",
        )
        .bind(project_id)
        .bind(&new_task.name)
        .bind(&new_task.description)
        .bind(new_task.due_date)
        .bind(new_task.status.as_str())
        .bind(new_task.priority.as_deref())
        .bind(new_task.color.as_deref())
        .bind(DEFAULT_TASK_COLOR)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new task into the database")?;

        Ok(new_id)
    }

    async fn apply_patch(
        &self,
        project_id: i32,
        task_id: i32,
        patch: &TaskPatch,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // Absent fields fall through to the stored value. The project scope
        // rides in the WHERE clause of the same statement, so there's no
        // window between an ownership check and the write.
        let query_result = sqlx::query(
            "UPDATE task SET \
                task_name = COALESCE($3, task_name), \
                description = COALESCE($4, description), \
                due_date = COALESCE($5, due_date), \
                status = COALESCE($6, status), \
                priority = COALESCE($7, priority), \
                color = COALESCE($8, color), \
                updated_at = now() \
             WHERE id = $1 AND project_id = $2",
        )
        .bind(task_id)
        .bind(project_id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.due_date)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.priority.as_deref())
        .bind(patch.color.as_deref())
        .execute(cxn.borrow_connection())
        .await
        .context("trying to patch a task in the database")?;

        Ok(query_result.rows_affected())
    }

    async fn overwrite(
        &self,
        project_id: i32,
        task_id: i32,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let query_result = sqlx::query(
            "UPDATE task SET \
                task_name = $3, \
                description = $4, \
                due_date = $5, \
                status = $6, \
                priority = $7, \
                color = $8, \
                updated_at = now() \
             WHERE id = $1 AND project_id = $2",
        )
        .bind(task_id)
        .bind(project_id)
        .bind(&content.name)
        .bind(&content.description)
        .bind(content.due_date)
        .bind(content.status.as_str())
        .bind(content.priority.as_deref())
        .bind(&content.color)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to replace a task in the database")?;

        Ok(query_result.rows_affected())
    }

    async fn set_status(
        &self,
        project_id: i32,
        task_id: i32,
        status: TaskStatus,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let query_result = sqlx::query(
            "UPDATE task SET status = $3, updated_at = now() \
             WHERE id = $1 AND project_id = $2",
        )
        .bind(task_id)
        .bind(project_id)
        .bind(status.as_str())
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a task's status in the database")?;

        Ok(query_result.rows_affected())
    }

    async fn delete(
        &self,
        project_id: i32,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<u64, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let query_result = sqlx::query("DELETE FROM task WHERE id = $1 AND project_id = $2")
            .bind(task_id)
            .bind(project_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a task from the database")?;

        Ok(query_result.rows_affected())
    }
}
