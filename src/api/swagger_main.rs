use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Task Tracker API",
    description = "REST backend for the single-project task tracker"
))]
struct TrackerApi;

/// Constructs the route on the API that renders the swagger UI and returns
/// the OpenAPI schema. Merges in OpenAPI definitions from the [dto] package
/// and the submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    let mut api_docs = TrackerApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::user::UsersApi::openapi());
    api_docs.merge(super::project::ProjectsApi::openapi());
    api_docs.merge(super::task::TasksApi::openapi());

    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_docs)
}
