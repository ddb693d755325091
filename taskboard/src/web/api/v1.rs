use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::project::{Project, ProjectInput};
use crate::repository::{self, Repository};
use crate::task::{Priority, Task, TaskInput};
use crate::timestamp;
use crate::view::{DueStatus, TaskCounts, View, ViewModel, describe_due};

/// JSON body returned when a request fails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerErrorResponse {
    /// Notice to show the user
    error: String,
}

impl ServerErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

type ApiError = (StatusCode, Json<ServerErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ServerErrorResponse::new(message.into())))
}

/// Maps a repository failure to a response, using `notice` when the data store was at fault.
fn repository_error(err: repository::Error, notice: &str) -> ApiError {
    match err {
        repository::Error::EmptyTitle
        | repository::Error::EmptyName
        | repository::Error::UnknownColor(_) => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        repository::Error::Unauthenticated => api_error(StatusCode::UNAUTHORIZED, err.to_string()),
        repository::Error::Malformed(_) | repository::Error::Store(_) => {
            tracing::error!("{}: {}", notice, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, notice)
        }
    }
}

fn task_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Task '{id}' not found"))
}

/// Short rendering of a due date.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DueJson {
    /// "Today", "Tomorrow" or a short date such as "Jun 20"
    label: String,
    /// One of `overdue`, `today` or `later`
    status: String,
}

/// JSON representation of a task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    /// One of `low`, `medium`, `high` or `urgent`
    priority: String,
    /// RFC 3339 timestamp
    due_date: Option<String>,
    /// Project id, `inbox` for unassigned tasks
    project_id: String,
    user_id: String,
    created_at: String,
    updated_at: String,
    due: Option<DueJson>,
}

impl TaskJson {
    fn new<Tz: TimeZone>(task: Task, now: &DateTime<Tz>) -> Self {
        let due = describe_due(&task, now).map(|summary| DueJson {
            label: summary.label,
            status: match summary.status {
                DueStatus::Overdue => "overdue",
                DueStatus::Today => "today",
                DueStatus::Later => "later",
            }
            .to_string(),
        });
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority.as_str().to_string(),
            due_date: task.due_date.as_ref().map(timestamp::format),
            project_id: task.project_id,
            user_id: task.user_id,
            created_at: timestamp::format(&task.created_at),
            updated_at: timestamp::format(&task.updated_at),
            due,
        }
    }
}

/// JSON representation of a project.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectJson {
    id: String,
    name: String,
    color: String,
    user_id: String,
    created_at: String,
}

impl From<Project> for ProjectJson {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            color: project.color,
            user_id: project.user_id,
            created_at: timestamp::format(&project.created_at),
        }
    }
}

fn counts_json(counts: &TaskCounts) -> BTreeMap<String, usize> {
    counts
        .iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect()
}

/// A rendered view: its tasks plus everything the sidebar shows.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ViewJson {
    view: String,
    title: String,
    description: Option<String>,
    tasks: Vec<TaskJson>,
    projects: Vec<ProjectJson>,
    /// Number of tasks per view id
    task_counts: BTreeMap<String, usize>,
}

impl ViewJson {
    fn new<Tz: TimeZone>(model: ViewModel, now: &DateTime<Tz>) -> Self {
        Self {
            view: model.view,
            title: model.title,
            description: model.description.map(str::to_string),
            tasks: model
                .tasks
                .into_iter()
                .map(|task| TaskJson::new(task, now))
                .collect(),
            projects: model.projects.into_iter().map(ProjectJson::from).collect(),
            task_counts: counts_json(&model.task_counts),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountsResponse {
    task_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectsResponse {
    projects: Vec<ProjectJson>,
    count: usize,
}

/// Fields submitted by the task dialog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskInputJson {
    title: String,
    #[serde(default)]
    description: Option<String>,
    /// One of `low`, `medium`, `high` or `urgent`; defaults to `medium`
    #[serde(default)]
    priority: Option<String>,
    /// Date or timestamp; empty means no due date
    #[serde(default)]
    due_date: Option<String>,
    /// Project id; empty means the inbox
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    completed: Option<bool>,
}

impl TryFrom<TaskInputJson> for TaskInput {
    type Error = String;

    fn try_from(json: TaskInputJson) -> Result<Self, Self::Error> {
        let priority = match json.priority.as_deref().map(str::trim) {
            None | Some("") => Priority::default(),
            Some(priority) => priority.parse()?,
        };
        let due_date = match json.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(due_date) => Some(
                timestamp::parse(due_date)
                    .ok_or_else(|| format!("invalid due date '{due_date}'"))?,
            ),
        };
        Ok(TaskInput {
            title: json.title,
            description: json.description,
            priority,
            due_date,
            project_id: json.project_id,
            completed: json.completed,
        })
    }
}

/// Fields submitted by the project dialog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectInputJson {
    name: String,
    /// One of the palette colors; defaults to blue
    #[serde(default)]
    color: Option<String>,
}

impl From<ProjectInputJson> for ProjectInput {
    fn from(json: ProjectInputJson) -> Self {
        ProjectInput {
            name: json.name,
            color: json.color,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    /// Notice to show the user
    message: String,
    task: TaskJson,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    /// Notice to show the user
    message: String,
    project: ProjectJson,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Notice to show the user
    message: String,
}

/// Handler for GET /api/v1/views/{view} - Returns the tasks of one view.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    get,
    path = "/api/v1/views/{view}",
    params(
        ("view" = String, Path, description = "inbox, today, upcoming, completed or a project id")
    ),
    responses(
        (status = 200, description = "Successfully rendered view", body = ViewJson)
    ),
    tag = "Views"
)]
pub async fn get_view_handler(
    State(repository): State<Arc<Repository>>,
    Path(view): Path<String>,
) -> Json<ViewJson> {
    let now = Local::now();
    let model = repository.view(&View::from(view), &now).await;
    Json(ViewJson::new(model, &now))
}

/// Handler for GET /api/v1/counts - Returns the sidebar counts.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    get,
    path = "/api/v1/counts",
    responses(
        (status = 200, description = "Successfully computed counts", body = CountsResponse)
    ),
    tag = "Views"
)]
pub async fn get_counts_handler(
    State(repository): State<Arc<Repository>>,
) -> Json<CountsResponse> {
    let counts = repository.counts(&Local::now()).await;
    Json(CountsResponse {
        task_counts: counts_json(&counts),
    })
}

/// Handler for GET /api/v1/projects - Returns all projects, oldest first.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Successfully retrieved projects", body = ProjectsResponse)
    ),
    tag = "Projects"
)]
pub async fn get_projects_handler(
    State(repository): State<Arc<Repository>>,
) -> Json<ProjectsResponse> {
    let projects: Vec<ProjectJson> = repository
        .projects()
        .await
        .into_iter()
        .map(ProjectJson::from)
        .collect();
    let count = projects.len();
    Json(ProjectsResponse { projects, count })
}

/// Handler for POST /api/v1/projects - Creates a project.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectInputJson,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 401, description = "Nobody is signed in", body = ServerErrorResponse),
        (status = 422, description = "Invalid project", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Projects"
)]
pub async fn create_project_handler(
    State(repository): State<Arc<Repository>>,
    Json(payload): Json<ProjectInputJson>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let project = repository
        .create_project(payload.into())
        .await
        .map_err(|err| repository_error(err, "Failed to create project"))?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created!".to_string(),
            project: project.into(),
        }),
    ))
}

/// Handler for POST /api/v1/tasks - Creates a task.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = TaskInputJson,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 401, description = "Nobody is signed in", body = ServerErrorResponse),
        (status = 422, description = "Invalid task", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(repository): State<Arc<Repository>>,
    Json(payload): Json<TaskInputJson>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let input = TaskInput::try_from(payload)
        .map_err(|err| api_error(StatusCode::UNPROCESSABLE_ENTITY, err))?;
    let task = repository
        .create_task(input)
        .await
        .map_err(|err| repository_error(err, "Failed to save task"))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task added!".to_string(),
            task: TaskJson::new(task, &Local::now()),
        }),
    ))
}

/// Handler for PUT /api/v1/tasks/{id} - Replaces the editable fields of a task.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    request_body = TaskInputJson,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 404, description = "No such task", body = ServerErrorResponse),
        (status = 422, description = "Invalid task", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(repository): State<Arc<Repository>>,
    Path(id): Path<String>,
    Json(payload): Json<TaskInputJson>,
) -> Result<Json<TaskResponse>, ApiError> {
    let patch = TaskInput::try_from(payload)
        .map_err(|err| api_error(StatusCode::UNPROCESSABLE_ENTITY, err))?;
    let task = repository
        .update_task(&id, patch)
        .await
        .map_err(|err| repository_error(err, "Failed to update task"))?
        .ok_or_else(|| task_not_found(&id))?;

    Ok(Json(TaskResponse {
        message: "Task updated!".to_string(),
        task: TaskJson::new(task, &Local::now()),
    }))
}

/// Handler for POST /api/v1/tasks/{id}/toggle - Flips the completion state of a task.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/toggle",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    responses(
        (status = 200, description = "Task toggled", body = TaskResponse),
        (status = 404, description = "No such task", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn toggle_task_handler(
    State(repository): State<Arc<Repository>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = repository
        .toggle_task(&id)
        .await
        .map_err(|err| repository_error(err, "Failed to update task"))?
        .ok_or_else(|| task_not_found(&id))?;

    let message = if task.completed {
        "Task completed!"
    } else {
        "Task reopened!"
    };
    Ok(Json(TaskResponse {
        message: message.to_string(),
        task: TaskJson::new(task, &Local::now()),
    }))
}

/// Handler for DELETE /api/v1/tasks/{id} - Deletes a task.
#[tracing::instrument(skip(repository))]
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(
        ("id" = String, Path, description = "Task id")
    ),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "No such task", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(repository): State<Arc<Repository>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repository
        .delete_task(&id)
        .await
        .map_err(|err| repository_error(err, "Failed to delete task"))?;
    if !deleted {
        return Err(task_not_found(&id));
    }

    Ok(Json(MessageResponse {
        message: "Task deleted!".to_string(),
    }))
}

/// Creates and returns the task board API router.
pub fn create_api_router(repository: Arc<Repository>) -> Router {
    Router::new()
        .route("/views/{view}", get(get_view_handler))
        .route("/counts", get(get_counts_handler))
        .route(
            "/projects",
            get(get_projects_handler).post(create_project_handler),
        )
        .route("/tasks", post(create_task_handler))
        .route(
            "/tasks/{id}",
            put(update_task_handler).delete(delete_task_handler),
        )
        .route("/tasks/{id}/toggle", post(toggle_task_handler))
        .with_state(repository)
}
