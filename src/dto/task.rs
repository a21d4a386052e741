use crate::domain;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Canonical task statuses accepted on the wire. Stored legacy data may
/// carry other strings; those are returned as-is but never accepted on a
/// write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl From<TaskStatus> for domain::task::TaskStatus {
    fn from(value: TaskStatus) -> Self {
        match value {
            TaskStatus::Pending => domain::task::TaskStatus::Pending,
            TaskStatus::InProgress => domain::task::TaskStatus::InProgress,
            TaskStatus::Completed => domain::task::TaskStatus::Completed,
        }
    }
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let is_hex_color = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|digit| digit.is_ascii_hexdigit());

    if is_hex_color {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

/// DTO for a task returned on the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct TaskData {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "File the quarterly numbers")]
    pub task_name: String,
    pub description: String,
    /// ISO calendar date, or an empty string for tasks without a due date
    #[schema(example = "2024-06-10")]
    pub due_date: String,
    #[schema(example = "Pending")]
    pub status: String,
    pub priority: Option<String>,
    #[schema(example = "#4285f4")]
    pub color: String,
}

impl From<domain::task::Task> for TaskData {
    fn from(value: domain::task::Task) -> Self {
        TaskData {
            id: value.id,
            task_name: value.name,
            description: value.description,
            due_date: value
                .due_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            status: value.status,
            priority: value.priority,
            color: value.color,
        }
    }
}

/// DTO for creating a task via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTask {
    #[validate(length(min = 1))]
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// Defaults to Pending when omitted
    pub status: Option<TaskStatus>,
    pub priority: Option<String>,
    #[validate(custom = "validate_color")]
    pub color: Option<String>,
}

impl From<NewTask> for domain::task::NewTask {
    fn from(value: NewTask) -> Self {
        domain::task::NewTask {
            name: value.task_name,
            description: value.description,
            due_date: value.due_date,
            status: value.status.unwrap_or(TaskStatus::Pending).into(),
            priority: value.priority,
            color: value.color,
        }
    }
}

/// DTO for partially updating a task. Omitted fields keep their stored
/// values; clearing the due date or priority requires a full replace.
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct TaskPatch {
    #[validate(length(min = 1))]
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<String>,
    #[validate(custom = "validate_color")]
    pub color: Option<String>,
}

impl From<TaskPatch> for domain::task::TaskPatch {
    fn from(value: TaskPatch) -> Self {
        domain::task::TaskPatch {
            name: value.task_name,
            description: value.description,
            due_date: value.due_date,
            status: value.status.map(domain::task::TaskStatus::from),
            priority: value.priority,
            color: value.color,
        }
    }
}

fn default_color() -> String {
    domain::task::DEFAULT_TASK_COLOR.to_owned()
}

/// DTO for fully replacing a task's content. Every field lands in storage
/// exactly as supplied; omitted optional fields are cleared.
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct TaskReplace {
    #[validate(length(min = 1))]
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Option<String>,
    #[serde(default = "default_color")]
    #[validate(custom = "validate_color")]
    pub color: String,
}

impl From<TaskReplace> for domain::task::TaskContent {
    fn from(value: TaskReplace) -> Self {
        domain::task::TaskContent {
            name: value.task_name,
            description: value.description,
            due_date: value.due_date,
            status: value.status.into(),
            priority: value.priority,
            color: value.color,
        }
    }
}

/// DTO for flipping a task's status
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct StatusChange {
    pub status: TaskStatus,
}

/// DTO for the agenda view. The group names are the ones the legacy clients
/// already consume.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct Agenda {
    pub recently_assigned: Vec<TaskData>,
    pub do_today: Vec<TaskData>,
    pub do_next_week: Vec<TaskData>,
    pub do_later: Vec<TaskData>,
}

impl From<domain::schedule::Agenda> for Agenda {
    fn from(value: domain::schedule::Agenda) -> Self {
        let to_dto = |tasks: Vec<domain::task::Task>| -> Vec<TaskData> {
            tasks.into_iter().map(TaskData::from).collect()
        };

        Agenda {
            recently_assigned: to_dto(value.unscheduled),
            do_today: to_dto(value.due_today),
            do_next_week: to_dto(value.due_this_week),
            do_later: to_dto(value.later),
        }
    }
}

/// DTO for a newly created task
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedTask {
    #[schema(example = 5)]
    pub id: i32,
}
