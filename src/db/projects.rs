//! Project CRUD and board assembly.

use super::stages::list_project_stages_internal;
use super::tasks::list_stage_tasks_internal;
use super::{now_ms, Database};
use crate::error::AppError;
use crate::types::{Project, ProjectBoard, StageColumn};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(crate) fn parse_project_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a project using an existing connection.
pub(crate) fn get_project_internal(conn: &Connection, project_id: i64) -> Result<Option<Project>> {
    let mut stmt = conn.prepare("SELECT id, name, created_at FROM projects WHERE id = ?1")?;

    let result = stmt.query_row(params![project_id], parse_project_row);

    match result {
        Ok(project) => Ok(Some(project)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a new project with a unique, non-empty name.
    pub fn create_project(&self, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::missing_field("name").into());
        }

        self.with_conn(|conn| {
            let taken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM projects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if taken > 0 {
                return Err(AppError::duplicate_name(name).into());
            }

            let now = now_ms();
            conn.execute(
                "INSERT INTO projects (name, created_at) VALUES (?1, ?2)",
                params![name, now],
            )?;

            Ok(Project {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                created_at: now,
            })
        })
    }

    /// List every project in insertion order.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, created_at FROM projects ORDER BY id")?;
            let projects = stmt
                .query_map([], parse_project_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(projects)
        })
    }

    /// Fetch a single project by id.
    pub fn get_project(&self, project_id: i64) -> Result<Option<Project>> {
        self.with_conn(|conn| get_project_internal(conn, project_id))
    }

    /// Assemble the full board view for a project: its stages in pipeline
    /// order, each with its tasks in insertion order.
    pub fn get_project_board(&self, project_id: i64) -> Result<Option<ProjectBoard>> {
        self.with_conn(|conn| {
            let Some(project) = get_project_internal(conn, project_id)? else {
                return Ok(None);
            };

            let mut columns = Vec::new();
            for stage in list_project_stages_internal(conn, project.id)? {
                let tasks = list_stage_tasks_internal(conn, stage.id)?;
                columns.push(StageColumn { stage, tasks });
            }

            Ok(Some(ProjectBoard {
                project,
                stages: columns,
            }))
        })
    }
}
