use crate::domain::user::driving_ports::CreateUserError;
use crate::dto::user::{InsertedUser, NewUser, UserData};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    BasicErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse, error_response,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;
use validator::Validate;

/// OpenAPI documentation for the user endpoints
#[derive(OpenApi)]
#[openapi(paths(get_user, create_user))]
pub struct UsersApi;

/// Constant used to group user endpoints in OpenAPI documentation
pub const USER_API_GROUP: &str = "Users";

/// Builds a router for the user routes
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            post(
                |State(app_state): AppState, Json(new_user): Json<dto::user::NewUser>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    create_user(new_user, &mut ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/:user_id",
            get(|State(app_state): AppState, Path(user_id): Path<i32>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let user_service = domain::user::UserService {};

                get_user(user_id, &mut ext_cxn, &user_service).await
            }),
        )
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = USER_API_GROUP,
    params(("user_id" = i32, Path, description = "ID of the user to look up")),
    responses(
        (status = 200, description = "The requested user", body = UserData),
        (status = 404, description = "User unknown", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Looks up a user, e.g. for the dashboard greeting
async fn get_user(
    user_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<Json<UserData>, ErrorResponse> {
    info!("Looking up user {user_id}");
    let user_reader = persistence::db_user_driven_ports::DbUserReader {};

    let fetch_result = user_service
        .get_user(user_id, &mut *ext_cxn, &user_reader)
        .await;
    match fetch_result {
        Ok(Some(user)) => Ok(Json(UserData::from(user))),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested user could not be found.",
        )
        .into()),
        Err(err) => {
            error!("User lookup failure: {err}");
            Err(GenericErrorResponse(err).into())
        }
    }
}

#[utoipa::path(
    post,
    path = "/users",
    tag = USER_API_GROUP,
    request_body = NewUser,
    responses(
        (status = 201, description = "User successfully created", body = InsertedUser),
        (status = 400, description = "Invalid signup payload", body = BasicErrorResponse),
        (status = 409, description = "Email already registered", body = BasicErrorResponse),
        (status = 500, description = "Something went wrong internally", body = BasicErrorResponse),
    ),
)]
/// Signs up a user
async fn create_user(
    new_user: dto::user::NewUser,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl domain::user::driving_ports::UserPort,
) -> Result<(StatusCode, Json<InsertedUser>), ErrorResponse> {
    info!("Signup attempt for {new_user}");
    new_user.validate().map_err(ValidationErrorResponse::from)?;

    let domain_user = domain::user::CreateUser::from(new_user);
    let user_writer = persistence::db_user_driven_ports::DbUserWriter {};
    let user_detect = persistence::db_user_driven_ports::DbDetectUser {};

    let creation_result = user_service
        .create_user(&domain_user, &mut *ext_cxn, &user_writer, &user_detect)
        .await;
    match creation_result {
        Ok(new_id) => Ok((StatusCode::CREATED, Json(InsertedUser { id: new_id }))),
        Err(CreateUserError::EmailAlreadyRegistered) => Err(error_response(
            StatusCode::CONFLICT,
            "already_exists",
            "A user with that email address is already registered.",
        )
        .into()),
        Err(CreateUserError::PortError(err)) => {
            error!("User create failure: {err}");
            Err(GenericErrorResponse(err).into())
        }
    }
}
