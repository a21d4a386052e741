use crate::domain;
use crate::domain::schedule;
use crate::domain::task::Task;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::error;

#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct Project {
    pub id: i32,
    pub owner_user_id: i32,
    pub name: String,
}

#[cfg_attr(test, derive(Debug, Clone))]
pub struct NewProject {
    pub name: String,
}

/// Everything the dashboard and portfolio views need about a project,
/// derived in one pass from its task list.
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct ProjectSummary {
    pub stats: schedule::TaskStats,
    pub earliest_due_date: Option<NaiveDate>,
    pub last_activity: Option<DateTime<Utc>>,
    pub recent_tasks: Vec<Task>,
    pub priority_distribution: Vec<schedule::PriorityCount>,
    pub tasks_per_day: Vec<schedule::DueDateCount>,
}

/// How many of the most recently created tasks a summary carries
const RECENT_TASK_LIMIT: usize = 5;

pub mod driven_ports {
    use super::*;

    pub trait ProjectReader {
        async fn project_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Project>, anyhow::Error>;
    }

    pub trait ProjectWriter {
        async fn create_project(
            &self,
            user_id: i32,
            project_name: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;
    }

    pub trait DetectProject {
        async fn project_exists(
            &self,
            project_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum ProjectError {
        #[error("The specified user did not exist.")]
        UserDoesNotExist,
        #[error("The user already has an active project.")]
        ProjectAlreadyExists,
        #[error("Project names cannot be blank.")]
        BlankProjectName,
        #[error("The specified project did not exist.")]
        ProjectNotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<domain::user::UserExistsErr> for ProjectError {
        fn from(value: domain::user::UserExistsErr) -> Self {
            match value {
                domain::user::UserExistsErr::UserDoesNotExist(user_id) => {
                    error!("User {user_id} didn't exist when resolving a project.");
                    ProjectError::UserDoesNotExist
                }
                domain::user::UserExistsErr::PortError(err) => {
                    ProjectError::from(err.context("Checking user during project resolution"))
                }
            }
        }
    }


    pub trait ProjectPort {
        /// Resolves the acting user's current project. [None] means the
        /// user exists but hasn't created a project yet.
        async fn current_project_for_user(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl domain::user::driven_ports::DetectUser,
            project_read: &impl driven_ports::ProjectReader,
        ) -> Result<Option<Project>, ProjectError>;

        async fn create_project(
            &self,
            user_id: i32,
            new_project: &NewProject,
            ext_cxn: &mut impl ExternalConnectivity,
            u_detect: &impl domain::user::driven_ports::DetectUser,
            project_read: &impl driven_ports::ProjectReader,
            project_write: &impl driven_ports::ProjectWriter,
        ) -> Result<i32, ProjectError>;

        async fn project_summary(
            &self,
            project_id: i32,
            today: NaiveDate,
            ext_cxn: &mut impl ExternalConnectivity,
            p_detect: &impl driven_ports::DetectProject,
            task_read: &impl domain::task::driven_ports::TaskReader,
        ) -> Result<ProjectSummary, ProjectError>;
    }
}

pub struct ProjectService {}

#[derive(Debug, Error)]
pub(super) enum ProjectExistsErr {
    #[error("project with ID {0} does not exist")]
    ProjectDoesNotExist(i32),

    #[error(transparent)]
    PortError(#[from] anyhow::Error),
}

pub(super) async fn verify_project_exists(
    id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    project_detect: &impl driven_ports::DetectProject,
) -> Result<(), ProjectExistsErr> {
    let does_project_exist = project_detect.project_exists(id, ext_cxn).await?;

    if does_project_exist {
        Ok(())
    } else {
        Err(ProjectExistsErr::ProjectDoesNotExist(id))
    }
}

impl driving_ports::ProjectPort for ProjectService {
    async fn current_project_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl domain::user::driven_ports::DetectUser,
        project_read: &impl driven_ports::ProjectReader,
    ) -> Result<Option<Project>, driving_ports::ProjectError> {
        domain::user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;
        let project = project_read
            .project_for_user(user_id, &mut *ext_cxn)
            .await
            .context("Resolving a user's current project")?;

        Ok(project)
    }

    async fn create_project(
        &self,
        user_id: i32,
        new_project: &NewProject,
        ext_cxn: &mut impl ExternalConnectivity,
        u_detect: &impl domain::user::driven_ports::DetectUser,
        project_read: &impl driven_ports::ProjectReader,
        project_write: &impl driven_ports::ProjectWriter,
    ) -> Result<i32, driving_ports::ProjectError> {
        if new_project.name.trim().is_empty() {
            return Err(driving_ports::ProjectError::BlankProjectName);
        }
        domain::user::verify_user_exists(user_id, &mut *ext_cxn, u_detect).await?;

        // The schema permits many projects per user, but the product model
        // is one active project per user
        let existing_project = project_read
            .project_for_user(user_id, &mut *ext_cxn)
            .await
            .context("Checking for an existing project before creation")?;
        if existing_project.is_some() {
            return Err(driving_ports::ProjectError::ProjectAlreadyExists);
        }

        Ok(project_write
            .create_project(user_id, &new_project.name, &mut *ext_cxn)
            .await
            .context("Creating a project at the service level")?)
    }

    async fn project_summary(
        &self,
        project_id: i32,
        today: NaiveDate,
        ext_cxn: &mut impl ExternalConnectivity,
        p_detect: &impl driven_ports::DetectProject,
        task_read: &impl domain::task::driven_ports::TaskReader,
    ) -> Result<ProjectSummary, driving_ports::ProjectError> {
        match verify_project_exists(project_id, &mut *ext_cxn, p_detect).await {
            Ok(()) => {}
            Err(ProjectExistsErr::ProjectDoesNotExist(_)) => {
                return Err(driving_ports::ProjectError::ProjectNotFound);
            }
            Err(ProjectExistsErr::PortError(err)) => {
                return Err(err.context("Checking project before summarizing").into());
            }
        }

        let tasks = task_read
            .tasks_for_project(project_id, &mut *ext_cxn)
            .await
            .context("Fetching tasks for a project summary")?;

        let stats = schedule::aggregate(&tasks, today);
        let earliest_due_date = tasks.iter().filter_map(|task| task.due_date).min();
        let last_activity = tasks.iter().map(|task| task.created_at).max();
        let priority_distribution = schedule::priority_distribution(&tasks);
        let tasks_per_day = schedule::tasks_per_day(&tasks);

        let mut recent_tasks = tasks;
        recent_tasks.sort_by(|task_a, task_b| task_b.created_at.cmp(&task_a.created_at));
        recent_tasks.truncate(RECENT_TASK_LIMIT);

        Ok(ProjectSummary {
            stats,
            earliest_due_date,
            last_activity,
            recent_tasks,
            priority_distribution,
            tasks_per_day,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::driving_ports::{ProjectError, ProjectPort};
    use super::test_util::*;
    use super::*;
    use crate::domain::task::TaskStatus;
    use crate::domain::task::test_util::{
        InMemoryTaskPersistence, NewTaskWithProject, new_task_named,
    };
    use crate::domain::test_util::Connectivity;
    use crate::domain::user::test_util::{InMemoryUserPersistence, user_create_default};
    use crate::external_connections;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    fn single_user_persist() -> RwLock<InMemoryUserPersistence> {
        RwLock::new(InMemoryUserPersistence::new_with_users(&[
            user_create_default(),
        ]))
    }

    mod current_project_for_user {
        use super::*;

        #[tokio::test]
        async fn resolves_the_users_project() {
            let user_persist = single_user_persist();
            let project_persist = RwLock::new(InMemoryProjectPersistence::new_with_projects(&[
                project_create_default(1),
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let resolve_result = ProjectService {}
                .current_project_for_user(1, &mut ext_cxn, &user_persist, &project_persist)
                .await;
            assert_that!(resolve_result)
                .is_ok()
                .is_some()
                .matches(|project| {
                    matches!(project, Project {
                        id: 1,
                        owner_user_id: 1,
                        name,
                    } if name == "Spring launch")
                });
        }

        #[tokio::test]
        async fn signals_no_project_without_failing() {
            let user_persist = single_user_persist();
            let project_persist = InMemoryProjectPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let resolve_result = ProjectService {}
                .current_project_for_user(1, &mut ext_cxn, &user_persist, &project_persist)
                .await;
            assert_that!(resolve_result).is_ok().is_none();
        }

        #[tokio::test]
        async fn fails_if_user_doesnt_exist() {
            let user_persist = InMemoryUserPersistence::new_locked();
            let project_persist = InMemoryProjectPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let resolve_result = ProjectService {}
                .current_project_for_user(1, &mut ext_cxn, &user_persist, &project_persist)
                .await;
            let Err(ProjectError::UserDoesNotExist) = resolve_result else {
                panic!("Expected missing-user failure, got: {resolve_result:#?}");
            };
        }
    }

    mod create_project {
        use super::*;

        #[tokio::test]
        async fn happy_path() {
            let user_persist = single_user_persist();
            let project_persist = InMemoryProjectPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = ProjectService {}
                .create_project(
                    1,
                    &NewProject {
                        name: "Spring launch".to_owned(),
                    },
                    &mut ext_cxn,
                    &user_persist,
                    &project_persist,
                    &project_persist,
                )
                .await;
            assert_that!(create_result).is_ok_containing(1);
        }

        #[tokio::test]
        async fn rejects_blank_name() {
            let user_persist = single_user_persist();
            let project_persist = InMemoryProjectPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = ProjectService {}
                .create_project(
                    1,
                    &NewProject {
                        name: "  ".to_owned(),
                    },
                    &mut ext_cxn,
                    &user_persist,
                    &project_persist,
                    &project_persist,
                )
                .await;
            assert_that!(create_result)
                .is_err()
                .matches(|err| matches!(err, ProjectError::BlankProjectName));
        }

        #[tokio::test]
        async fn enforces_one_project_per_user() {
            let user_persist = single_user_persist();
            let project_persist = RwLock::new(InMemoryProjectPersistence::new_with_projects(&[
                project_create_default(1),
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = ProjectService {}
                .create_project(
                    1,
                    &NewProject {
                        name: "Second project".to_owned(),
                    },
                    &mut ext_cxn,
                    &user_persist,
                    &project_persist,
                    &project_persist,
                )
                .await;
            let Err(ProjectError::ProjectAlreadyExists) = create_result else {
                panic!("Expected one-project rule to fire, got: {create_result:#?}");
            };
        }

        #[tokio::test]
        async fn fails_if_user_doesnt_exist() {
            let user_persist = InMemoryUserPersistence::new_locked();
            let project_persist = InMemoryProjectPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = ProjectService {}
                .create_project(
                    7,
                    &NewProject {
                        name: "Orphan".to_owned(),
                    },
                    &mut ext_cxn,
                    &user_persist,
                    &project_persist,
                    &project_persist,
                )
                .await;
            assert_that!(create_result)
                .is_err()
                .matches(|err| matches!(err, ProjectError::UserDoesNotExist));
        }
    }

    mod project_summary {
        use super::*;
        use chrono::NaiveDate;

        fn seeded_task_persist() -> RwLock<InMemoryTaskPersistence> {
            let mut completed_task = new_task_named("Already done");
            completed_task.status = TaskStatus::Completed;
            completed_task.due_date = NaiveDate::from_ymd_opt(2024, 6, 5);
            completed_task.priority = Some("Low".to_owned());

            let mut due_soon = new_task_named("Due soon");
            due_soon.due_date = NaiveDate::from_ymd_opt(2024, 6, 12);
            due_soon.priority = Some("High".to_owned());

            let mut late_task = new_task_named("Late");
            late_task.due_date = NaiveDate::from_ymd_opt(2024, 6, 1);

            RwLock::new(InMemoryTaskPersistence::new_with_tasks(&[
                NewTaskWithProject {
                    project_id: 1,
                    task: completed_task,
                },
                NewTaskWithProject {
                    project_id: 1,
                    task: due_soon,
                },
                NewTaskWithProject {
                    project_id: 1,
                    task: late_task,
                },
                NewTaskWithProject {
                    project_id: 1,
                    task: new_task_named("Unscheduled"),
                },
            ]))
        }

        #[tokio::test]
        async fn summarizes_a_projects_tasks() {
            let project_persist = RwLock::new(InMemoryProjectPersistence::new_with_projects(&[
                project_create_default(1),
            ]));
            let task_persist = seeded_task_persist();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

            let summary_result = ProjectService {}
                .project_summary(1, today, &mut ext_cxn, &project_persist, &task_persist)
                .await;
            let summary = match summary_result {
                Ok(summary) => summary,
                Err(err) => panic!("Summary should have succeeded: {err:#?}"),
            };

            assert_eq!(4, summary.stats.total);
            assert_eq!(1, summary.stats.completed);
            assert_eq!(3, summary.stats.pending);
            assert_eq!(0, summary.stats.in_progress);
            assert_eq!(1, summary.stats.overdue);
            assert_eq!(25.0, summary.stats.completion_percentage);
            assert_eq!(NaiveDate::from_ymd_opt(2024, 6, 1), summary.earliest_due_date);
            assert_that!(summary.last_activity).is_some();
            assert_that!(summary.recent_tasks).has_length(4);

            // Non-completed tasks grouped by date, undated last
            let series_dates: Vec<Option<NaiveDate>> = summary
                .tasks_per_day
                .iter()
                .map(|entry| entry.due_date)
                .collect();
            assert_eq!(
                vec![
                    NaiveDate::from_ymd_opt(2024, 6, 1),
                    NaiveDate::from_ymd_opt(2024, 6, 12),
                    None,
                ],
                series_dates
            );
        }

        #[tokio::test]
        async fn caps_recent_tasks_at_five() {
            let project_persist = RwLock::new(InMemoryProjectPersistence::new_with_projects(&[
                project_create_default(1),
            ]));
            let seeded: Vec<NewTaskWithProject> = (0..7)
                .map(|task_num| NewTaskWithProject {
                    project_id: 1,
                    task: new_task_named(&format!("Task {task_num}")),
                })
                .collect();
            let task_persist = RwLock::new(InMemoryTaskPersistence::new_with_tasks(&seeded));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

            let summary_result = ProjectService {}
                .project_summary(1, today, &mut ext_cxn, &project_persist, &task_persist)
                .await;
            let summary = summary_result.expect("summary should succeed");
            assert_that!(summary.recent_tasks).has_length(5);
        }

        #[tokio::test]
        async fn empty_project_reports_zeroes() {
            let project_persist = RwLock::new(InMemoryProjectPersistence::new_with_projects(&[
                project_create_default(1),
            ]));
            let task_persist = InMemoryTaskPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

            let summary_result = ProjectService {}
                .project_summary(1, today, &mut ext_cxn, &project_persist, &task_persist)
                .await;
            let summary = summary_result.expect("summary of an empty project should succeed");

            assert_eq!(0, summary.stats.total);
            assert_eq!(0.0, summary.stats.completion_percentage);
            assert_that!(summary.earliest_due_date).is_none();
            assert_that!(summary.last_activity).is_none();
            assert_that!(summary.recent_tasks).is_empty();
            assert_that!(summary.tasks_per_day).is_empty();
        }

        #[tokio::test]
        async fn fails_for_missing_project() {
            let project_persist = InMemoryProjectPersistence::new_locked();
            let task_persist = InMemoryTaskPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

            let summary_result = ProjectService {}
                .project_summary(3, today, &mut ext_cxn, &project_persist, &task_persist)
                .await;
            assert_that!(summary_result)
                .is_err()
                .matches(|err| matches!(err, ProjectError::ProjectNotFound));
        }
    }

    #[tokio::test]
    async fn port_errors_propagate_from_project_reader() {
        let user_persist = single_user_persist();
        let mut project_persist_raw = InMemoryProjectPersistence::new();
        project_persist_raw.connectivity = Connectivity::Disconnected;
        let project_persist = RwLock::new(project_persist_raw);
        let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

        let resolve_result = ProjectService {}
            .current_project_for_user(1, &mut ext_cxn, &user_persist, &project_persist)
            .await;
        assert_that!(resolve_result)
            .is_err()
            .matches(|err| matches!(err, ProjectError::PortError(_)));
    }
}
