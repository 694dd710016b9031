//! Task CRUD and the stage-advance operation.

use super::projects::get_project_internal;
use super::stages::{get_stage_internal, list_all_stages_internal, list_project_stages_internal};
use super::{now_ms, Database};
use crate::error::AppError;
use crate::types::{Advance, Task};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        stage_id: row.get("stage_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a task using an existing connection.
pub(crate) fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let mut stmt =
        conn.prepare("SELECT id, name, stage_id, created_at FROM tasks WHERE id = ?1")?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// One stage's tasks in insertion order.
pub(crate) fn list_stage_tasks_internal(conn: &Connection, stage_id: i64) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, stage_id, created_at FROM tasks
         WHERE stage_id = ?1 ORDER BY id",
    )?;
    let tasks = stmt
        .query_map(params![stage_id], parse_task_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

impl Database {
    /// Create a task in the given project.
    ///
    /// New tasks always enter at the project's first stage (lowest id);
    /// there is no stage selector. A project with no stages cannot hold
    /// tasks.
    pub fn create_task(&self, project_id: i64, name: &str) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::missing_field("name").into());
        }

        self.with_conn(|conn| {
            if get_project_internal(conn, project_id)?.is_none() {
                return Err(AppError::project_not_found(project_id).into());
            }

            let first_stage = list_project_stages_internal(conn, project_id)?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::no_stage_available(project_id))?;

            let now = now_ms();
            conn.execute(
                "INSERT INTO tasks (name, stage_id, created_at) VALUES (?1, ?2, ?3)",
                params![name, first_stage.id, now],
            )?;

            Ok(Task {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                stage_id: first_stage.id,
                created_at: now,
            })
        })
    }

    /// Fetch a single task by id.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Tasks of one stage in insertion order.
    pub fn list_stage_tasks(&self, stage_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| list_stage_tasks_internal(conn, stage_id))
    }

    /// Delete a task. A repeat call reports the task as missing.
    pub fn delete_task(&self, task_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            if deleted == 0 {
                return Err(AppError::task_not_found(task_id).into());
            }
            Ok(())
        })
    }

    /// Advance a task out of the given stage into the stage that follows it
    /// in the global enumeration (all stages, ordered by primary key).
    ///
    /// The move is delete-and-recreate: a new task with the same name is
    /// inserted under the successor stage and the original row is removed,
    /// both inside one transaction. When the stage has no global successor
    /// the task is left untouched and `Advance::Unchanged` is returned;
    /// that silence is the contract, not an error.
    ///
    /// Stage enumeration is NOT scoped to the task's project: when stage
    /// creation interleaves projects, the successor can belong to a
    /// different project and the task follows it there.
    pub fn advance_task(&self, task_id: i64, stage_id: i64) -> Result<Advance> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| AppError::task_not_found(task_id))?;
            let stage = get_stage_internal(&tx, stage_id)?
                .ok_or_else(|| AppError::stage_not_found(stage_id))?;

            let stages = list_all_stages_internal(&tx)?;
            let successor = stages
                .iter()
                .position(|s| s.id == stage.id)
                .and_then(|idx| stages.get(idx + 1))
                .cloned();

            let Some(next_stage) = successor else {
                return Ok(Advance::Unchanged);
            };

            let now = now_ms();
            tx.execute(
                "INSERT INTO tasks (name, stage_id, created_at) VALUES (?1, ?2, ?3)",
                params![task.name, next_stage.id, now],
            )?;
            let new_id = tx.last_insert_rowid();
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![task.id])?;

            tx.commit()?;

            Ok(Advance::Moved {
                task: Task {
                    id: new_id,
                    name: task.name,
                    stage_id: next_stage.id,
                    created_at: now,
                },
                to: next_stage,
            })
        })
    }
}
