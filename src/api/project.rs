use crate::domain::project::driving_ports::{ProjectError, ProjectPort};
use crate::dto::project::{InsertedProject, NewProject, ProjectData, ProjectSummary};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse, error_response,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::get;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI documentation for the project endpoints
#[derive(OpenApi)]
#[openapi(paths(get_current_project, create_project, get_project_summary))]
pub struct ProjectsApi;

/// Constant used to group project endpoints in OpenAPI documentation
pub const PROJECT_API_GROUP: &str = "Projects";

/// Builds a router for the project routes, mounted under "/users"
pub fn project_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/:user_id/project",
            get(|State(app_state): AppState, Path(user_id): Path<i32>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let project_service = domain::project::ProjectService {};

                get_current_project(user_id, &mut ext_cxn, &project_service).await
            })
            .post(
                |State(app_state): AppState,
                 Path(user_id): Path<i32>,
                 Json(new_project): Json<dto::project::NewProject>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let project_service = domain::project::ProjectService {};

                    create_project(user_id, new_project, &mut ext_cxn, &project_service).await
                },
            ),
        )
        .route(
            "/:user_id/project/summary",
            get(|State(app_state): AppState, Path(user_id): Path<i32>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let project_service = domain::project::ProjectService {};
                let today = Local::now().date_naive();

                get_project_summary(user_id, today, &mut ext_cxn, &project_service).await
            }),
        )
}

/// Turns a project domain error into the matching API response
pub(super) fn project_error_to_response(err: ProjectError) -> ErrorResponse {
    match err {
        ProjectError::UserDoesNotExist => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested user could not be found.",
        )
        .into(),
        ProjectError::ProjectAlreadyExists => error_response(
            StatusCode::CONFLICT,
            "already_exists",
            "The user already has an active project.",
        )
        .into(),
        ProjectError::BlankProjectName => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Project names cannot be blank.",
        )
        .into(),
        ProjectError::ProjectNotFound => error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested project could not be found.",
        )
        .into(),
        ProjectError::PortError(cause) => GenericErrorResponse(cause).into(),
    }
}

/// Resolves the acting user's current project, translating "no project" into
/// the 404 the task routes rely on. Every task operation resolves the
/// project through here once per request; nothing reads it from ambient
/// state.
pub(super) async fn require_current_project(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    project_service: &impl ProjectPort,
) -> Result<domain::project::Project, ErrorResponse> {
    let user_detect = persistence::db_user_driven_ports::DbDetectUser {};
    let project_read = persistence::db_project_driven_ports::DbProjectReader {};

    let resolve_result = project_service
        .current_project_for_user(user_id, &mut *ext_cxn, &user_detect, &project_read)
        .await;
    match resolve_result {
        Ok(Some(project)) => Ok(project),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            "no_current_project",
            "The user has not created a project yet.",
        )
        .into()),
        Err(err) => Err(project_error_to_response(err)),
    }
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/project",
    tag = PROJECT_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    responses(
        (status = 200, description = "The user's active project", body = ProjectData),
        (status = 404, description = "User unknown or has no project yet", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Resolves the acting user's current project
async fn get_current_project(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    project_service: &impl ProjectPort,
) -> Result<Json<ProjectData>, ErrorResponse> {
    info!("Resolving current project for user {user_id}");
    let project = require_current_project(user_id, &mut *ext_cxn, project_service).await?;

    Ok(Json(ProjectData::from(project)))
}

#[utoipa::path(
    post,
    path = "/users/{user_id}/project",
    tag = PROJECT_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    request_body = NewProject,
    responses(
        (status = 201, description = "Project successfully created", body = InsertedProject),
        (status = 400, description = "Invalid project payload", body = BasicErrorResponse),
        (status = 404, description = "User unknown", body = BasicErrorResponse),
        (status = 409, description = "User already has a project", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Creates the acting user's project
async fn create_project(
    user_id: i32,
    new_project: dto::project::NewProject,
    ext_cxn: &mut impl ExternalConnectivity,
    project_service: &impl ProjectPort,
) -> Result<(StatusCode, Json<InsertedProject>), ErrorResponse> {
    info!("Creating project for user {user_id}");
    new_project
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let domain_project = domain::project::NewProject::from(new_project);
    let user_detect = persistence::db_user_driven_ports::DbDetectUser {};
    let project_read = persistence::db_project_driven_ports::DbProjectReader {};
    let project_write = persistence::db_project_driven_ports::DbProjectWriter {};

    let creation_result = project_service
        .create_project(
            user_id,
            &domain_project,
            &mut *ext_cxn,
            &user_detect,
            &project_read,
            &project_write,
        )
        .await;
    match creation_result {
        Ok(new_id) => Ok((StatusCode::CREATED, Json(InsertedProject { id: new_id }))),
        Err(err) => Err(project_error_to_response(err)),
    }
}

#[utoipa::path(
    get,
    path = "/users/{user_id}/project/summary",
    tag = PROJECT_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the acting user")),
    responses(
        (status = 200, description = "Aggregate statistics for the user's project", body = ProjectSummary),
        (status = 404, description = "User unknown or has no project yet", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Summarizes the user's project for the dashboard and portfolio views
async fn get_project_summary(
    user_id: i32,
    today: NaiveDate,
    ext_cxn: &mut impl ExternalConnectivity,
    project_service: &impl ProjectPort,
) -> Result<Json<ProjectSummary>, ErrorResponse> {
    info!("Summarizing project for user {user_id}");
    let project = require_current_project(user_id, &mut *ext_cxn, project_service).await?;

    let project_detect = persistence::db_project_driven_ports::DbDetectProject {};
    let task_read = persistence::db_task_driven_ports::DbTaskReader {};

    let summary_result = project_service
        .project_summary(project.id, today, &mut *ext_cxn, &project_detect, &task_read)
        .await;
    match summary_result {
        Ok(summary) => Ok(Json(ProjectSummary::from(summary))),
        Err(err) => Err(project_error_to_response(err)),
    }
}
