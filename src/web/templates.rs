//! HTML templates for the web UI.
//!
//! Templates are embedded at compile time using `include_str!` and rendered
//! by placeholder substitution.

/// The index/home page template listing all projects.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// The project board template: stage columns with their tasks.
pub const PROJECT_TEMPLATE: &str = include_str!("templates/project.html");

/// The shared single-field create form (project, stage, task).
pub const FORM_TEMPLATE: &str = include_str!("templates/form.html");

/// The error page template (not found, internal failure).
pub const ERROR_TEMPLATE: &str = include_str!("templates/error.html");
