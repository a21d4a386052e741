use crate::domain;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::driving_ports::TaskError;
use crate::external_connections::ExternalConnectivity;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::error;

/// A task row as stored. `status` stays a plain string here because the
/// legacy data this system inherits contains values outside the canonical
/// set; writes are validated, reads are passed through untouched.
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Task {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub priority: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The canonical task statuses accepted on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Parses a stored status string. Returns [None] for anything outside
    /// the canonical set rather than failing - stored data is not trusted
    /// to be canonical.
    pub fn parse(raw: &str) -> Option<TaskStatus> {
        match raw {
            "Pending" => Some(TaskStatus::Pending),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

pub const DEFAULT_TASK_COLOR: &str = "#4285f4";

#[cfg_attr(test, derive(Debug, Clone))]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Option<String>,
    pub color: Option<String>,
}

/// Partial update. Fields left as [None] keep their stored values.
/// Clearing an optional column goes through [TaskContent] instead.
#[cfg_attr(test, derive(Debug, Clone))]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<String>,
    pub color: Option<String>,
}

/// Full overwrite of every mutable task field.
#[cfg_attr(test, derive(Debug, Clone))]
pub struct TaskContent {
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Option<String>,
    pub color: String,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        /// Tasks under a project, ordered by due date ascending with undated
        /// tasks last, ties broken by newest creation first.
        async fn tasks_for_project(
            &self,
            project_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Task>, anyhow::Error>;
    }

    /// Write operations return the number of rows touched so the service can
    /// distinguish "nothing matched the project-scoped filter" from success.
    pub trait TaskWriter {
        async fn insert(
            &self,
            project_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn apply_patch(
            &self,
            project_id: i32,
            task_id: i32,
            patch: &TaskPatch,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn overwrite(
            &self,
            project_id: i32,
            task_id: i32,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn set_status(
            &self,
            project_id: i32,
            task_id: i32,
            status: TaskStatus,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        async fn delete(
            &self,
            project_id: i32,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TaskError {
        #[error("Task names cannot be blank.")]
        BlankTaskName,
        #[error("The specified project did not exist.")]
        ProjectNotFound,
        #[error("The specified task did not exist under the given project.")]
        TaskNotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<domain::project::ProjectExistsErr> for TaskError {
        fn from(value: domain::project::ProjectExistsErr) -> Self {
            match value {
                domain::project::ProjectExistsErr::ProjectDoesNotExist(project_id) => {
                    error!("Project {project_id} didn't exist during a task operation.");
                    TaskError::ProjectNotFound
                }
                domain::project::ProjectExistsErr::PortError(err) => {
                    TaskError::from(err.context("Checking project during a task operation"))
                }
            }
        }
    }


    pub trait TaskPort {
        async fn tasks_for_project(
            &self,
            project_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            p_detect: &impl domain::project::driven_ports::DetectProject,
            task_read: &impl driven_ports::TaskReader,
        ) -> Result<Vec<Task>, TaskError>;

        async fn create_task(
            &self,
            project_id: i32,
            new_task: &NewTask,
            ext_cxn: &mut impl ExternalConnectivity,
            p_detect: &impl domain::project::driven_ports::DetectProject,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<i32, TaskError>;

        async fn patch_task(
            &self,
            project_id: i32,
            task_id: i32,
            patch: &TaskPatch,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;

        async fn replace_task(
            &self,
            project_id: i32,
            task_id: i32,
            content: &TaskContent,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;

        async fn set_task_status(
            &self,
            project_id: i32,
            task_id: i32,
            status: TaskStatus,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;

        async fn delete_task(
            &self,
            project_id: i32,
            task_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            task_write: &impl driven_ports::TaskWriter,
        ) -> Result<(), TaskError>;
    }
}

pub struct TaskService {}

fn reject_blank(name: &str) -> Result<(), TaskError> {
    if name.trim().is_empty() {
        Err(TaskError::BlankTaskName)
    } else {
        Ok(())
    }
}

/// Maps a project-scoped write that touched no rows to [TaskError::TaskNotFound].
/// The scoping happens inside a single statement at the driven port, so a
/// zero here means the task either doesn't exist or belongs to another
/// project - callers can't tell the difference, on purpose.
fn expect_row_touched(rows: u64) -> Result<(), TaskError> {
    if rows == 0 {
        Err(TaskError::TaskNotFound)
    } else {
        Ok(())
    }
}

impl driving_ports::TaskPort for TaskService {
    async fn tasks_for_project(
        &self,
        project_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        p_detect: &impl domain::project::driven_ports::DetectProject,
        task_read: &impl TaskReader,
    ) -> Result<Vec<Task>, TaskError> {
        domain::project::verify_project_exists(project_id, &mut *ext_cxn, p_detect).await?;
        let tasks = task_read.tasks_for_project(project_id, &mut *ext_cxn).await?;

        Ok(tasks)
    }

    async fn create_task(
        &self,
        project_id: i32,
        new_task: &NewTask,
        ext_cxn: &mut impl ExternalConnectivity,
        p_detect: &impl domain::project::driven_ports::DetectProject,
        task_write: &impl TaskWriter,
    ) -> Result<i32, TaskError> {
        reject_blank(&new_task.name)?;
        domain::project::verify_project_exists(project_id, &mut *ext_cxn, p_detect).await?;

        let created_task_id = task_write.insert(project_id, new_task, &mut *ext_cxn).await?;
        Ok(created_task_id)
    }

    async fn patch_task(
        &self,
        project_id: i32,
        task_id: i32,
        patch: &TaskPatch,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        if let Some(ref new_name) = patch.name {
            reject_blank(new_name)?;
        }

        let rows = task_write
            .apply_patch(project_id, task_id, patch, &mut *ext_cxn)
            .await?;
        expect_row_touched(rows)
    }

    async fn replace_task(
        &self,
        project_id: i32,
        task_id: i32,
        content: &TaskContent,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        reject_blank(&content.name)?;

        let rows = task_write
            .overwrite(project_id, task_id, content, &mut *ext_cxn)
            .await?;
        expect_row_touched(rows)
    }

    async fn set_task_status(
        &self,
        project_id: i32,
        task_id: i32,
        status: TaskStatus,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let rows = task_write
            .set_status(project_id, task_id, status, &mut *ext_cxn)
            .await?;
        expect_row_touched(rows)
    }

    async fn delete_task(
        &self,
        project_id: i32,
        task_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        task_write: &impl TaskWriter,
    ) -> Result<(), TaskError> {
        let rows = task_write.delete(project_id, task_id, &mut *ext_cxn).await?;
        expect_row_touched(rows)
    }
}
