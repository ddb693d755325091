use std::sync::Arc;

use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

use crate::repository::Repository;

pub mod v1;

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        v1::get_view_handler,
        v1::get_counts_handler,
        v1::get_projects_handler,
        v1::create_project_handler,
        v1::create_task_handler,
        v1::update_task_handler,
        v1::toggle_task_handler,
        v1::delete_task_handler,
    ),
    tags(
        (name = "Views", description = "Filtered task lists and sidebar counts"),
        (name = "Tasks", description = "Task creation and editing"),
        (name = "Projects", description = "Project listing and creation")
    )
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(repository: Arc<Repository>) -> Router {
    Router::new()
        .nest("/api/v1", v1::create_api_router(repository))
        .route("/api-docs/openapi.json", get(openapi_handler))
}

#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
