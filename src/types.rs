//! Core types for the taskboard.

use serde::{Deserialize, Serialize};

/// A project - the top-level container for a pipeline of stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// A stage - one ordered step within a project's pipeline.
///
/// A stage's position within its project is its insertion order; ids are
/// monotonic, so ORDER BY id is the pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub name: String,
    pub project_id: i64,
    pub created_at: i64,
}

/// A task - a unit of work sitting at exactly one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub stage_id: i64,
    pub created_at: i64,
}

/// One stage column of a project board, with its tasks in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageColumn {
    pub stage: Stage,
    pub tasks: Vec<Task>,
}

/// A fully assembled project view: the project plus its stage columns in
/// pipeline order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBoard {
    pub project: Project,
    pub stages: Vec<StageColumn>,
}

impl ProjectBoard {
    /// The project's last stage, or `None` when it has no stages.
    pub fn last_stage(&self) -> Option<&Stage> {
        self.stages.last().map(|col| &col.stage)
    }
}

/// Outcome of advancing a task out of a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Advance {
    /// The task was recreated under the next stage; the original is gone.
    Moved { task: Task, to: Stage },
    /// The stage had no successor (or was not part of the enumeration);
    /// the task was left untouched.
    Unchanged,
}

impl Advance {
    pub fn moved(&self) -> bool {
        matches!(self, Advance::Moved { .. })
    }
}
