use super::test_util::prepare_db_and_test;
use crate::domain;
use crate::domain::project::driving_ports::ProjectPort;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::domain::task::{DEFAULT_TASK_COLOR, NewTask, TaskStatus};
use crate::domain::user::driving_ports::UserPort;
use crate::persistence;
use chrono::NaiveDate;

fn plain_task(name: &str, due_date: Option<NaiveDate>) -> NewTask {
    NewTask {
        name: name.to_owned(),
        description: String::new(),
        due_date,
        status: TaskStatus::Pending,
        priority: None,
        color: None,
    }
}

#[test]
fn task_round_trip_through_the_real_store() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_service = domain::user::UserService {};
        let project_service = domain::project::ProjectService {};
        let task_service = domain::task::TaskService {};

        let user_writer = persistence::db_user_driven_ports::DbUserWriter {};
        let user_detect = persistence::db_user_driven_ports::DbDetectUser {};
        let project_read = persistence::db_project_driven_ports::DbProjectReader {};
        let project_write = persistence::db_project_driven_ports::DbProjectWriter {};
        let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
        let task_read = persistence::db_task_driven_ports::DbTaskReader {};
        let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

        let user_id = user_service
            .create_user(
                &domain::user::CreateUser {
                    name: "Integration Tester".to_owned(),
                    email: "integration@example.com".to_owned(),
                    password: "hunter2hunter2".to_owned(),
                },
                &mut ext_cxn,
                &user_writer,
                &user_detect,
            )
            .await
            .expect("user creation failed");

        let project_id = project_service
            .create_project(
                user_id,
                &domain::project::NewProject {
                    name: "Integration project".to_owned(),
                },
                &mut ext_cxn,
                &user_detect,
                &project_read,
                &project_write,
            )
            .await
            .expect("project creation failed");

        let created_task = NewTask {
            description: "Persist me".to_owned(),
            priority: Some("High".to_owned()),
            ..plain_task("Round trip", NaiveDate::from_ymd_opt(2024, 6, 10))
        };
        let task_id = task_service
            .create_task(
                project_id,
                &created_task,
                &mut ext_cxn,
                &project_detect,
                &task_write,
            )
            .await
            .expect("task creation failed");

        let tasks = task_service
            .tasks_for_project(project_id, &mut ext_cxn, &project_detect, &task_read)
            .await
            .expect("task listing failed");
        assert_eq!(1, tasks.len());
        let task = &tasks[0];
        assert_eq!(task_id, task.id);
        assert_eq!("Round trip", task.name);
        assert_eq!("Persist me", task.description);
        assert_eq!(NaiveDate::from_ymd_opt(2024, 6, 10), task.due_date);
        assert_eq!("Pending", task.status);
        assert_eq!(Some("High"), task.priority.as_deref());
        assert_eq!(DEFAULT_TASK_COLOR, task.color);

        task_service
            .set_task_status(
                project_id,
                task_id,
                TaskStatus::Completed,
                &mut ext_cxn,
                &task_write,
            )
            .await
            .expect("status change failed");
        let tasks = task_service
            .tasks_for_project(project_id, &mut ext_cxn, &project_detect, &task_read)
            .await
            .expect("task listing failed");
        assert_eq!("Completed", tasks[0].status);

        task_service
            .delete_task(project_id, task_id, &mut ext_cxn, &task_write)
            .await
            .expect("task deletion failed");
        let repeat_delete = task_service
            .delete_task(project_id, task_id, &mut ext_cxn, &task_write)
            .await;
        assert!(matches!(repeat_delete, Err(TaskError::TaskNotFound)));
    });
}

#[test]
fn task_listing_puts_undated_tasks_last() {
    prepare_db_and_test(|pool| async move {
        let mut ext_cxn = persistence::ExternalConnectivity::new(pool);
        let user_service = domain::user::UserService {};
        let project_service = domain::project::ProjectService {};
        let task_service = domain::task::TaskService {};

        let user_writer = persistence::db_user_driven_ports::DbUserWriter {};
        let user_detect = persistence::db_user_driven_ports::DbDetectUser {};
        let project_read = persistence::db_project_driven_ports::DbProjectReader {};
        let project_write = persistence::db_project_driven_ports::DbProjectWriter {};
        let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
        let task_read = persistence::db_task_driven_ports::DbTaskReader {};
        let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

        let user_id = user_service
            .create_user(
                &domain::user::CreateUser {
                    name: "Ordering Tester".to_owned(),
                    email: "ordering@example.com".to_owned(),
                    password: "hunter2hunter2".to_owned(),
                },
                &mut ext_cxn,
                &user_writer,
                &user_detect,
            )
            .await
            .expect("user creation failed");
        let project_id = project_service
            .create_project(
                user_id,
                &domain::project::NewProject {
                    name: "Ordering project".to_owned(),
                },
                &mut ext_cxn,
                &user_detect,
                &project_read,
                &project_write,
            )
            .await
            .expect("project creation failed");

        for new_task in [
            plain_task("Undated", None),
            plain_task("Later", NaiveDate::from_ymd_opt(2024, 6, 20)),
            plain_task("Sooner", NaiveDate::from_ymd_opt(2024, 6, 5)),
        ] {
            task_service
                .create_task(
                    project_id,
                    &new_task,
                    &mut ext_cxn,
                    &project_detect,
                    &task_write,
                )
                .await
                .expect("task creation failed");
        }

        let tasks = task_service
            .tasks_for_project(project_id, &mut ext_cxn, &project_detect, &task_read)
            .await
            .expect("task listing failed");
        let names: Vec<&str> = tasks.iter().map(|task| task.name.as_str()).collect();
        assert_eq!(vec!["Sooner", "Later", "Undated"], names);
    });
}
