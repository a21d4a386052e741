use utoipa::OpenApi;

pub mod project;
pub mod task;
pub mod user;

/// Registers shared DTO schemas (and the error envelope) with the generated
/// OpenAPI document.
#[derive(OpenApi)]
#[openapi(components(schemas(
    crate::routing_utils::BasicErrorResponse,
    crate::routing_utils::ExtraInfo,
    project::InsertedProject,
    project::NewProject,
    project::ProjectData,
    project::ProjectSummary,
    project::DueDateCount,
    project::PriorityCount,
    task::Agenda,
    task::InsertedTask,
    task::NewTask,
    task::TaskData,
    task::TaskPatch,
    task::TaskReplace,
    task::StatusChange,
    task::TaskStatus,
    user::InsertedUser,
    user::NewUser,
    user::UserData,
)))]
pub struct OpenApiSchemas;
