//! HTTP server implementation for the taskboard UI.
//!
//! This module provides the axum-based server that renders the project and
//! board pages and handles the create/delete/complete form submissions.

use axum::{
    Router,
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::templates;
use crate::db::Database;
use crate::error::AppError;
use crate::types::ProjectBoard;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct BoardServer {
    /// Reference to the task database.
    db: Arc<Database>,
}

impl BoardServer {
    /// Create a new server instance.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Single-field form body shared by all create pages.
#[derive(Debug, serde::Deserialize)]
struct NameForm {
    name: Option<String>,
}

impl NameForm {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("").trim()
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the `?msg=success:...` / `?msg=error:...` flash parameter into a
/// message div, or nothing when absent.
fn render_flash(params: &HashMap<String, String>) -> String {
    params
        .get("msg")
        .map(|m| {
            let (class, text) = if let Some(stripped) = m.strip_prefix("success:") {
                ("message-success", stripped)
            } else if let Some(stripped) = m.strip_prefix("error:") {
                ("message-error", stripped)
            } else {
                ("message-success", m.as_str())
            };
            format!(
                r#"<div class="message {}">{}</div>"#,
                class,
                html_escape(text)
            )
        })
        .unwrap_or_default()
}

/// Redirect to a project page carrying a flash message.
fn redirect_with_flash(project_id: i64, kind: &str, text: &str) -> Redirect {
    Redirect::to(&format!(
        "/project/{}?msg={}:{}",
        project_id,
        kind,
        urlencoding::encode(text)
    ))
}

/// Render the shared single-field create form.
fn render_form(
    heading: &str,
    action: &str,
    back: &str,
    label: &str,
    value: &str,
    error: Option<&str>,
) -> Html<String> {
    let error_html = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    let html = templates::FORM_TEMPLATE
        .replace("{{title}}", heading)
        .replace("{{heading}}", heading)
        .replace("{{back}}", back)
        .replace("{{action}}", action)
        .replace("{{label}}", label)
        .replace("{{value}}", &html_escape(value))
        .replace("{{error}}", &error_html);

    Html(html)
}

/// Render an error page with the given status.
fn render_error_page(status: StatusCode, heading: &str, message: &str) -> Response {
    let html = templates::ERROR_TEMPLATE
        .replace("{{heading}}", &html_escape(heading))
        .replace("{{message}}", &html_escape(message));
    (status, Html(html)).into_response()
}

/// 404 page for an unresolved identifier.
fn not_found_page(message: &str) -> Response {
    render_error_page(StatusCode::NOT_FOUND, "Not Found", message)
}

/// 500 page; the underlying failure is logged, not shown.
fn internal_error_page(err: AppError) -> Response {
    warn!(error_code = ?err.code, error_message = %err.message, "Request failed");
    render_error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong",
        "The operation could not be completed.",
    )
}

/// Render a project board page: one column per stage, tasks within.
///
/// The Complete button is omitted on the project's last stage.
fn render_board(board: &ProjectBoard, message: &str) -> Html<String> {
    let last_stage_id = board.last_stage().map(|s| s.id);
    let project_id = board.project.id;

    let mut columns = String::new();
    if board.stages.is_empty() {
        columns.push_str(
            r#"<div class="empty-state">No stages yet. Add a stage to get started.</div>"#,
        );
    }

    for col in &board.stages {
        columns.push_str(&format!(
            r#"<div class="column"><h2>{}</h2>"#,
            html_escape(&col.stage.name)
        ));

        if col.tasks.is_empty() {
            columns.push_str(r#"<div class="empty-state">No tasks</div>"#);
        }

        for task in &col.tasks {
            let complete_html = if Some(col.stage.id) != last_stage_id {
                format!(
                    r#"<form method="post" action="/complete_task/{}/{}/{}"><button type="submit" class="btn btn-sm btn-done">Complete</button></form>"#,
                    project_id, col.stage.id, task.id
                )
            } else {
                String::new()
            };

            columns.push_str(&format!(
                r#"<div class="task"><span class="task-name">{name}</span><div class="task-actions">{complete}<form method="post" action="/delete_task/{project_id}/{task_id}"><button type="submit" class="btn btn-sm">Delete</button></form></div></div>"#,
                name = html_escape(&task.name),
                complete = complete_html,
                project_id = project_id,
                task_id = task.id,
            ));
        }

        columns.push_str("</div>");
    }

    let html = templates::PROJECT_TEMPLATE
        .replace("{{project_name}}", &html_escape(&board.project.name))
        .replace("{{project_id}}", &project_id.to_string())
        .replace("{{message}}", message)
        .replace("{{columns}}", &columns);

    Html(html)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Home page - lists all projects.
async fn home(State(state): State<BoardServer>) -> Response {
    let projects = match state.db().list_projects() {
        Ok(projects) => projects,
        Err(e) => return internal_error_page(AppError::from(e)),
    };

    let list_html = if projects.is_empty() {
        r#"<div class="empty-state">No projects yet</div>"#.to_string()
    } else {
        let mut html = String::from(r#"<ul class="project-list">"#);
        for project in &projects {
            html.push_str(&format!(
                r#"<li><a href="/project/{}">{}</a></li>"#,
                project.id,
                html_escape(&project.name)
            ));
        }
        html.push_str("</ul>");
        html
    };

    Html(templates::INDEX_TEMPLATE.replace("{{projects}}", &list_html)).into_response()
}

/// Project board page.
async fn project_page(
    State(state): State<BoardServer>,
    Path(project_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match state.db().get_project_board(project_id) {
        Ok(Some(board)) => render_board(&board, &render_flash(&params)).into_response(),
        Ok(None) => not_found_page(&format!("Project {} does not exist.", project_id)),
        Err(e) => internal_error_page(AppError::from(e)),
    }
}

/// Show the project create form.
async fn create_project_form() -> Html<String> {
    render_form("New Project", "/create_project", "/", "Project Name", "", None)
}

/// Handle the project create submission.
async fn create_project_submit(
    State(state): State<BoardServer>,
    Form(form): Form<NameForm>,
) -> Response {
    match state.db().create_project(form.name()) {
        Ok(project) => Redirect::to(&format!("/project/{}", project.id)).into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.code.is_validation() {
                render_form(
                    "New Project",
                    "/create_project",
                    "/",
                    "Project Name",
                    form.name(),
                    Some(&err.message),
                )
                .into_response()
            } else {
                internal_error_page(err)
            }
        }
    }
}

/// Show the stage create form for a project.
async fn create_stage_form(
    State(state): State<BoardServer>,
    Path(project_id): Path<i64>,
) -> Response {
    match state.db().get_project(project_id) {
        Ok(Some(_)) => render_form(
            "New Stage",
            &format!("/create_stage/{}", project_id),
            &format!("/project/{}", project_id),
            "Stage Name",
            "",
            None,
        )
        .into_response(),
        Ok(None) => not_found_page(&format!("Project {} does not exist.", project_id)),
        Err(e) => internal_error_page(AppError::from(e)),
    }
}

/// Handle the stage create submission; the stage is appended to the end of
/// the project's pipeline.
async fn create_stage_submit(
    State(state): State<BoardServer>,
    Path(project_id): Path<i64>,
    Form(form): Form<NameForm>,
) -> Response {
    match state.db().create_stage(project_id, form.name()) {
        Ok(_) => redirect_with_flash(project_id, "success", "Stage added").into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.code.is_validation() {
                render_form(
                    "New Stage",
                    &format!("/create_stage/{}", project_id),
                    &format!("/project/{}", project_id),
                    "Stage Name",
                    form.name(),
                    Some(&err.message),
                )
                .into_response()
            } else if err.code.is_not_found() {
                not_found_page(&err.message)
            } else {
                internal_error_page(err)
            }
        }
    }
}

/// Show the task create form for a project.
async fn create_task_form(
    State(state): State<BoardServer>,
    Path(project_id): Path<i64>,
) -> Response {
    match state.db().get_project(project_id) {
        Ok(Some(_)) => render_form(
            "New Task",
            &format!("/create_task/{}", project_id),
            &format!("/project/{}", project_id),
            "Task Name",
            "",
            None,
        )
        .into_response(),
        Ok(None) => not_found_page(&format!("Project {} does not exist.", project_id)),
        Err(e) => internal_error_page(AppError::from(e)),
    }
}

/// Handle the task create submission; the task lands in the project's first
/// stage.
async fn create_task_submit(
    State(state): State<BoardServer>,
    Path(project_id): Path<i64>,
    Form(form): Form<NameForm>,
) -> Response {
    match state.db().create_task(project_id, form.name()) {
        Ok(_) => redirect_with_flash(project_id, "success", "Task added").into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.code.is_validation() || err.code == crate::error::ErrorCode::NoStageAvailable {
                render_form(
                    "New Task",
                    &format!("/create_task/{}", project_id),
                    &format!("/project/{}", project_id),
                    "Task Name",
                    form.name(),
                    Some(&err.message),
                )
                .into_response()
            } else if err.code.is_not_found() {
                not_found_page(&err.message)
            } else {
                internal_error_page(err)
            }
        }
    }
}

/// Handle task deletion, then return to the project page.
async fn delete_task_handler(
    State(state): State<BoardServer>,
    Path((project_id, task_id)): Path<(i64, i64)>,
) -> Response {
    match state.db().delete_task(task_id) {
        Ok(()) => redirect_with_flash(project_id, "success", "Task deleted").into_response(),
        Err(e) => {
            let err = AppError::from(e);
            if err.code.is_not_found() {
                redirect_with_flash(project_id, "error", &err.message).into_response()
            } else {
                internal_error_page(err)
            }
        }
    }
}

/// Handle task completion: advance the task out of the given stage, then
/// return to the project page. A terminal-stage advance is a silent no-op.
async fn complete_task_handler(
    State(state): State<BoardServer>,
    Path((project_id, stage_id, task_id)): Path<(i64, i64, i64)>,
) -> Response {
    match state.db().advance_task(task_id, stage_id) {
        Ok(advance) => {
            if let crate::types::Advance::Moved { ref to, .. } = advance {
                let text = format!("Task moved to {}", to.name);
                redirect_with_flash(project_id, "success", &text).into_response()
            } else {
                Redirect::to(&format!("/project/{}", project_id)).into_response()
            }
        }
        Err(e) => {
            let err = AppError::from(e);
            if err.code.is_not_found() {
                redirect_with_flash(project_id, "error", &err.message).into_response()
            } else {
                internal_error_page(err)
            }
        }
    }
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Router and server
// ---------------------------------------------------------------------------

/// Build the application router.
pub fn build_router(state: BoardServer) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/project/{project_id}", get(project_page))
        .route(
            "/create_project",
            get(create_project_form).post(create_project_submit),
        )
        .route(
            "/create_stage/{project_id}",
            get(create_stage_form).post(create_stage_submit),
        )
        .route(
            "/create_task/{project_id}",
            get(create_task_form).post(create_task_submit),
        )
        .route("/delete_task/{project_id}/{task_id}", post(delete_task_handler))
        .route(
            "/complete_task/{project_id}/{stage_id}/{task_id}",
            post(complete_task_handler),
        )
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for ctrl-c.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

/// Bind and serve until interrupted.
pub async fn start_server(db: Arc<Database>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = BoardServer::new(db);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    let bound_addr = listener.local_addr()?;

    info!("Taskboard listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
