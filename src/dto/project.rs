use crate::domain;
use crate::dto::task::TaskData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a resolved project
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct ProjectData {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "Spring launch")]
    pub project_name: String,
}

impl From<domain::project::Project> for ProjectData {
    fn from(value: domain::project::Project) -> Self {
        ProjectData {
            id: value.id,
            project_name: value.name,
        }
    }
}

/// DTO for creating a project via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewProject {
    #[validate(length(min = 1, max = 100))]
    pub project_name: String,
}

impl From<NewProject> for domain::project::NewProject {
    fn from(value: NewProject) -> Self {
        domain::project::NewProject {
            name: value.project_name,
        }
    }
}

/// DTO containing the ID of a project that was created via the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedProject {
    #[schema(example = 2)]
    pub id: i32,
}

/// One bar of the "open tasks per day" dashboard series
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct DueDateCount {
    /// ISO calendar date, or an empty string for the undated group
    #[schema(example = "2024-06-10")]
    pub due_date: String,
    pub count: u32,
}

impl From<domain::schedule::DueDateCount> for DueDateCount {
    fn from(value: domain::schedule::DueDateCount) -> Self {
        DueDateCount {
            due_date: value
                .due_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            count: value.count,
        }
    }
}

/// One slice of the priority breakdown on project details
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct PriorityCount {
    #[schema(example = "High")]
    pub priority: Option<String>,
    pub count: u32,
}

impl From<domain::schedule::PriorityCount> for PriorityCount {
    fn from(value: domain::schedule::PriorityCount) -> Self {
        PriorityCount {
            priority: value.priority,
            count: value.count,
        }
    }
}

/// DTO for the project summary consumed by the dashboard and portfolio
/// views. This is the canonical aggregate shape; older clients used a mix of
/// short and long field names, the long ones won.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct ProjectSummary {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub pending_tasks: u32,
    #[schema(example = 33.3)]
    pub completion_percentage: f64,
    pub overdue_count: u32,
    /// ISO calendar date, or an empty string when no task has a due date
    pub earliest_due_date: String,
    pub last_activity: Option<DateTime<Utc>>,
    pub recent_tasks: Vec<TaskData>,
    pub priority_distribution: Vec<PriorityCount>,
    pub tasks_per_day: Vec<DueDateCount>,
}

impl From<domain::project::ProjectSummary> for ProjectSummary {
    fn from(value: domain::project::ProjectSummary) -> Self {
        ProjectSummary {
            total_tasks: value.stats.total,
            completed_tasks: value.stats.completed,
            in_progress_tasks: value.stats.in_progress,
            pending_tasks: value.stats.pending,
            completion_percentage: value.stats.completion_percentage,
            overdue_count: value.stats.overdue,
            earliest_due_date: value
                .earliest_due_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            last_activity: value.last_activity,
            recent_tasks: value.recent_tasks.into_iter().map(TaskData::from).collect(),
            priority_distribution: value
                .priority_distribution
                .into_iter()
                .map(PriorityCount::from)
                .collect(),
            tasks_per_day: value
                .tasks_per_day
                .into_iter()
                .map(DueDateCount::from)
                .collect(),
        }
    }
}
