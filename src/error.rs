//! Structured error types for domain operations.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    MissingRequiredField,
    DuplicateName,

    // Not found errors
    ProjectNotFound,
    StageNotFound,
    TaskNotFound,

    // Conflict errors
    NoStageAvailable,

    // Internal errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// Whether this code represents a validation failure that should be
    /// surfaced by re-rendering the input form rather than failing the page.
    pub fn is_validation(self) -> bool {
        matches!(self, ErrorCode::MissingRequiredField | ErrorCode::DuplicateName)
    }

    /// Whether this code represents an unresolved identifier.
    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            ErrorCode::ProjectNotFound | ErrorCode::StageNotFound | ErrorCode::TaskNotFound
        )
    }
}

/// Structured error carried through the domain layer.
#[derive(Debug, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateName,
            format!("A project named '{}' already exists", name),
        )
        .with_field("name")
    }

    pub fn project_not_found(project_id: i64) -> Self {
        Self::new(
            ErrorCode::ProjectNotFound,
            format!("Project not found: {}", project_id),
        )
    }

    pub fn stage_not_found(stage_id: i64) -> Self {
        Self::new(
            ErrorCode::StageNotFound,
            format!("Stage not found: {}", stage_id),
        )
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn no_stage_available(project_id: i64) -> Self {
        Self::new(
            ErrorCode::NoStageAvailable,
            format!(
                "Project {} has no stages; create a stage before adding tasks",
                project_id
            ),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Try to downcast to AppError first
        match err.downcast::<AppError>() {
            Ok(app_err) => app_err,
            Err(err) => AppError::internal(err),
        }
    }
}

/// Result type for domain operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
