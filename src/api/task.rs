use super::project;
use crate::domain::schedule;
use crate::domain::task::driving_ports::{TaskError, TaskPort};
use crate::dto::task::{
    Agenda, InsertedTask, NewTask, StatusChange, TaskData, TaskPatch, TaskReplace,
};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse, error_response,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, patch};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI documentation for the task endpoints
#[derive(OpenApi)]
#[openapi(paths(
    list_tasks,
    get_agenda,
    create_task,
    patch_task,
    replace_task,
    change_task_status,
    delete_task
))]
pub struct TasksApi;

/// Constant used to group task endpoints in OpenAPI documentation
pub const TASK_API_GROUP: &str = "Tasks";

/// Builds a router for task routes, mounted under "/users". Every route
/// resolves the acting user's project first and hands the task handlers an
/// explicit project ID.
pub fn task_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/:user_id/project/tasks",
            get(|State(app_state): AppState, Path(user_id): Path<i32>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let project_service = domain::project::ProjectService {};
                let task_service = domain::task::TaskService {};

                let current_project =
                    project::require_current_project(user_id, &mut ext_cxn, &project_service)
                        .await?;
                list_tasks(current_project.id, &mut ext_cxn, &task_service).await
            })
            .post(
                |State(app_state): AppState,
                 Path(user_id): Path<i32>,
                 Json(new_task): Json<dto::task::NewTask>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};
                    let task_service = domain::task::TaskService {};

                    let current_project =
                        project::require_current_project(user_id, &mut ext_cxn, &project_service)
                            .await?;
                    create_task(current_project.id, new_task, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:user_id/project/agenda",
            get(|State(app_state): AppState, Path(user_id): Path<i32>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let project_service = domain::project::ProjectService {};
                let task_service = domain::task::TaskService {};
                let today = Local::now().date_naive();

                let current_project =
                    project::require_current_project(user_id, &mut ext_cxn, &project_service)
                        .await?;
                get_agenda(current_project.id, today, &mut ext_cxn, &task_service).await
            }),
        )
        .route(
            "/:user_id/project/tasks/:task_id",
            patch(
                |State(app_state): AppState,
                 Path((user_id, task_id)): Path<(i32, i32)>,
                 Json(task_patch): Json<dto::task::TaskPatch>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};
                    let task_service = domain::task::TaskService {};

                    let current_project =
                        project::require_current_project(user_id, &mut ext_cxn, &project_service)
                            .await?;
                    patch_task(
                        current_project.id,
                        task_id,
                        task_patch,
                        &mut ext_cxn,
                        &task_service,
                    )
                    .await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path((user_id, task_id)): Path<(i32, i32)>,
                 Json(replacement): Json<dto::task::TaskReplace>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};
                    let task_service = domain::task::TaskService {};

                    let current_project =
                        project::require_current_project(user_id, &mut ext_cxn, &project_service)
                            .await?;
                    replace_task(
                        current_project.id,
                        task_id,
                        replacement,
                        &mut ext_cxn,
                        &task_service,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState,
                 Path((user_id, task_id)): Path<(i32, i32)>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};
                    let task_service = domain::task::TaskService {};

                    let current_project =
                        project::require_current_project(user_id, &mut ext_cxn, &project_service)
                            .await?;
                    delete_task(current_project.id, task_id, &mut ext_cxn, &task_service).await
                },
            ),
        )
        .route(
            "/:user_id/project/tasks/:task_id/status",
            patch(
                |State(app_state): AppState,
                 Path((user_id, task_id)): Path<(i32, i32)>,
                 Json(status_change): Json<dto::task::StatusChange>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};
                    let task_service = domain::task::TaskService {};

                    let current_project =
                        project::require_current_project(user_id, &mut ext_cxn, &project_service)
                            .await?;
                    change_task_status(
                        current_project.id,
                        task_id,
                        status_change,
                        &mut ext_cxn,
                        &task_service,
                    )
                    .await
                },
            ),
        )
}

/// Turns a task domain error into the matching API response
fn task_error_to_response(err: TaskError) -> ErrorResponse {
    match err {
        TaskError::BlankTaskName => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Task names cannot be blank.",
        )
        .into(),
        TaskError::ProjectNotFound => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested project could not be found.",
        )
        .into(),
        TaskError::TaskNotFound => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested task could not be found under the user's project.",
        )
        .into(),
        TaskError::PortError(cause) => GenericErrorResponse(cause).into(),
    }
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/project/tasks",
    tag = TASK_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    responses(
        (status = 200, description = "Tasks in the user's project, due date ascending with undated tasks last", body = Vec<TaskData>),
        (status = 404, description = "User unknown or has no project yet", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Lists the tasks in the user's project
async fn list_tasks(
    project_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Vec<TaskData>>, ErrorResponse> {
    info!("Listing tasks for project {project_id}");
    let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
    let task_read = persistence::db_task_driven_ports::DbTaskReader {};

    let tasks_result = task_service
        .tasks_for_project(project_id, &mut *ext_cxn, &project_detect, &task_read)
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Json(tasks.into_iter().map(TaskData::from).collect())),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/project/agenda",
    tag = TASK_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    responses(
        (status = 200, description = "The project's tasks grouped into agenda sections", body = Agenda),
        (status = 404, description = "User unknown or has no project yet", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Groups the project's tasks into the agenda view
async fn get_agenda(
    project_id: i32,
    today: NaiveDate,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<Json<Agenda>, ErrorResponse> {
    info!("Building the agenda for project {project_id}");
    let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
    let task_read = persistence::db_task_driven_ports::DbTaskReader {};

    let tasks_result = task_service
        .tasks_for_project(project_id, &mut *ext_cxn, &project_detect, &task_read)
        .await;
    match tasks_result {
        Ok(tasks) => Ok(Json(Agenda::from(schedule::partition(tasks, today)))),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    post,
    path = "/users/{user_id}/project/tasks",
    tag = TASK_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    request_body = NewTask,
    responses(
        (status = 201, description = "Task successfully created", body = InsertedTask),
        (status = 400, description = "Invalid task payload", body = BasicErrorResponse),
        (status = 404, description = "User unknown or has no project yet", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Creates a task in the user's project
async fn create_task(
    project_id: i32,
    new_task: dto::task::NewTask,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<(StatusCode, Json<InsertedTask>), ErrorResponse> {
    info!("Creating a task under project {project_id}");
    new_task.validate().map_err(ValidationErrorResponse::from)?;

    let domain_task = domain::task::NewTask::from(new_task);
    let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
    let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

    let creation_result = task_service
        .create_task(
            project_id,
            &domain_task,
            &mut *ext_cxn,
            &project_detect,
            &task_write,
        )
        .await;
    match creation_result {
        Ok(new_id) => Ok((StatusCode::CREATED, Json(InsertedTask { id: new_id }))),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{user_id}/project/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the acting user"),
        ("task_id" = i32, Path, description = "ID of the task to update"),
    ),
    request_body = TaskPatch,
    responses(
        (status = 200, description = "Task successfully updated"),
        (status = 400, description = "Invalid task payload", body = BasicErrorResponse),
        (status = 404, description = "Task not found under the user's project", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Partially updates a task; omitted fields keep their stored values
async fn patch_task(
    project_id: i32,
    task_id: i32,
    task_patch: dto::task::TaskPatch,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Patching task {task_id} under project {project_id}");
    task_patch.validate().map_err(ValidationErrorResponse::from)?;

    let domain_patch = domain::task::TaskPatch::from(task_patch);
    let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

    let patch_result = task_service
        .patch_task(project_id, task_id, &domain_patch, &mut *ext_cxn, &task_write)
        .await;
    match patch_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    put,
    path = "/users/{user_id}/project/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the acting user"),
        ("task_id" = i32, Path, description = "ID of the task to replace"),
    ),
    request_body = TaskReplace,
    responses(
        (status = 200, description = "Task successfully replaced"),
        (status = 400, description = "Invalid task payload", body = BasicErrorResponse),
        (status = 404, description = "Task not found under the user's project", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Fully replaces a task's content, clearing omitted optional fields
async fn replace_task(
    project_id: i32,
    task_id: i32,
    replacement: dto::task::TaskReplace,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Replacing task {task_id} under project {project_id}");
    replacement
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let domain_content = domain::task::TaskContent::from(replacement);
    let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

    let replace_result = task_service
        .replace_task(
            project_id,
            task_id,
            &domain_content,
            &mut *ext_cxn,
            &task_write,
        )
        .await;
    match replace_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    patch,
    path = "/users/{user_id}/project/tasks/{task_id}/status",
    tag = TASK_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the acting user"),
        ("task_id" = i32, Path, description = "ID of the task to update"),
    ),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status successfully changed"),
        (status = 404, description = "Task not found under the user's project", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Flips a task's status
async fn change_task_status(
    project_id: i32,
    task_id: i32,
    status_change: dto::task::StatusChange,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Changing status of task {task_id} under project {project_id}");
    let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

    let status_result = task_service
        .set_task_status(
            project_id,
            task_id,
            status_change.status.into(),
            &mut *ext_cxn,
            &task_write,
        )
        .await;
    match status_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(task_error_to_response(err)),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}/project/tasks/{task_id}",
    tag = TASK_API_GROUP,
    params(
        ("user_id" = i32, Path, description = "ID of the acting user"),
        ("task_id" = i32, Path, description = "ID of the task to delete"),
    ),
    responses(
        (status = 200, description = "Task successfully deleted"),
        (status = 404, description = "Task not found under the user's project", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Deletes a task. Deleting a task that's already gone is an error, not a
/// no-op, so double submissions surface to the client.
async fn delete_task(
    project_id: i32,
    task_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    task_service: &impl TaskPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting task {task_id} under project {project_id}");
    let task_write = persistence::db_task_driven_ports::DbTaskWriter {};

    let delete_result = task_service
        .delete_task(project_id, task_id, &mut *ext_cxn, &task_write)
        .await;
    match delete_result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => Err(task_error_to_response(err)),
    }
}
