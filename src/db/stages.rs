//! Stage CRUD and pipeline enumeration.

use super::projects::get_project_internal;
use super::{now_ms, Database};
use crate::error::AppError;
use crate::types::Stage;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(crate) fn parse_stage_row(row: &Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get("id")?,
        name: row.get("name")?,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a stage using an existing connection.
pub(crate) fn get_stage_internal(conn: &Connection, stage_id: i64) -> Result<Option<Stage>> {
    let mut stmt =
        conn.prepare("SELECT id, name, project_id, created_at FROM stages WHERE id = ?1")?;

    let result = stmt.query_row(params![stage_id], parse_stage_row);

    match result {
        Ok(stage) => Ok(Some(stage)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// One project's stages in pipeline order (insertion order by id).
pub(crate) fn list_project_stages_internal(
    conn: &Connection,
    project_id: i64,
) -> Result<Vec<Stage>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, project_id, created_at FROM stages
         WHERE project_id = ?1 ORDER BY id",
    )?;
    let stages = stmt
        .query_map(params![project_id], parse_stage_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stages)
}

/// EVERY stage in the store, ordered by primary key. The task-advance rule
/// walks this global enumeration, not a per-project one.
pub(crate) fn list_all_stages_internal(conn: &Connection) -> Result<Vec<Stage>> {
    let mut stmt =
        conn.prepare("SELECT id, name, project_id, created_at FROM stages ORDER BY id")?;
    let stages = stmt
        .query_map([], parse_stage_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stages)
}

impl Database {
    /// Append a stage to the end of a project's pipeline.
    pub fn create_stage(&self, project_id: i64, name: &str) -> Result<Stage> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::missing_field("name").into());
        }

        self.with_conn(|conn| {
            if get_project_internal(conn, project_id)?.is_none() {
                return Err(AppError::project_not_found(project_id).into());
            }

            let now = now_ms();
            conn.execute(
                "INSERT INTO stages (name, project_id, created_at) VALUES (?1, ?2, ?3)",
                params![name, project_id, now],
            )?;

            Ok(Stage {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                project_id,
                created_at: now,
            })
        })
    }

    /// Fetch a single stage by id.
    pub fn get_stage(&self, stage_id: i64) -> Result<Option<Stage>> {
        self.with_conn(|conn| get_stage_internal(conn, stage_id))
    }

    /// Stages of one project in pipeline order.
    pub fn list_project_stages(&self, project_id: i64) -> Result<Vec<Stage>> {
        self.with_conn(|conn| list_project_stages_internal(conn, project_id))
    }

    /// All stages across all projects, ordered by primary key.
    pub fn list_all_stages(&self) -> Result<Vec<Stage>> {
        self.with_conn(list_all_stages_internal)
    }
}
