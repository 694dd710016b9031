//! Integration tests for the database layer.
//!
//! These tests verify the domain operations using an in-memory SQLite
//! database. Tests are organized by entity and by the advance rule.

use taskboard::db::Database;
use taskboard::error::{AppError, ErrorCode};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

/// Extract the structured error code from a failed operation.
fn error_code(err: anyhow::Error) -> ErrorCode {
    AppError::from(err).code
}

mod project_tests {
    use super::*;

    #[test]
    fn create_project_returns_new_project() {
        let db = setup_db();

        let project = db.create_project("Launch").expect("Failed to create project");

        assert!(project.id > 0);
        assert_eq!(project.name, "Launch");
        assert!(project.created_at > 0);
    }

    #[test]
    fn create_project_trims_name() {
        let db = setup_db();

        let project = db.create_project("  Launch  ").unwrap();

        assert_eq!(project.name, "Launch");
    }

    #[test]
    fn create_project_rejects_empty_name() {
        let db = setup_db();

        let err = db.create_project("").unwrap_err();
        assert_eq!(error_code(err), ErrorCode::MissingRequiredField);

        let err = db.create_project("   ").unwrap_err();
        assert_eq!(error_code(err), ErrorCode::MissingRequiredField);
    }

    #[test]
    fn create_project_rejects_duplicate_name() {
        let db = setup_db();
        db.create_project("Launch").unwrap();

        let err = db.create_project("Launch").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::DuplicateName);
    }

    #[test]
    fn list_projects_in_insertion_order() {
        let db = setup_db();
        db.create_project("first").unwrap();
        db.create_project("second").unwrap();
        db.create_project("third").unwrap();

        let names: Vec<String> = db
            .list_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn get_project_returns_none_for_unknown_id() {
        let db = setup_db();

        assert!(db.get_project(999).unwrap().is_none());
    }

    #[test]
    fn board_stages_in_creation_order() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        db.create_stage(project.id, "Todo").unwrap();
        db.create_stage(project.id, "Doing").unwrap();
        db.create_stage(project.id, "Done").unwrap();

        let board = db.get_project_board(project.id).unwrap().unwrap();
        let names: Vec<&str> = board
            .stages
            .iter()
            .map(|col| col.stage.name.as_str())
            .collect();

        assert_eq!(names, vec!["Todo", "Doing", "Done"]);
    }

    #[test]
    fn board_last_stage_tracks_latest_created() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();

        let board = db.get_project_board(project.id).unwrap().unwrap();
        assert!(board.last_stage().is_none());

        db.create_stage(project.id, "Todo").unwrap();
        db.create_stage(project.id, "Done").unwrap();

        let board = db.get_project_board(project.id).unwrap().unwrap();
        assert_eq!(board.last_stage().unwrap().name, "Done");
    }

    #[test]
    fn board_is_none_for_unknown_project() {
        let db = setup_db();

        assert!(db.get_project_board(42).unwrap().is_none());
    }
}

mod stage_tests {
    use super::*;

    #[test]
    fn create_stage_belongs_to_project() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();

        let stage = db.create_stage(project.id, "Todo").unwrap();

        assert_eq!(stage.project_id, project.id);
        assert_eq!(stage.name, "Todo");
    }

    #[test]
    fn create_stage_rejects_empty_name() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();

        let err = db.create_stage(project.id, "  ").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::MissingRequiredField);
    }

    #[test]
    fn create_stage_fails_for_unknown_project() {
        let db = setup_db();

        let err = db.create_stage(999, "Todo").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::ProjectNotFound);
    }

    #[test]
    fn stage_names_need_not_be_unique() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();

        db.create_stage(project.id, "Review").unwrap();
        db.create_stage(project.id, "Review").unwrap();

        assert_eq!(db.list_project_stages(project.id).unwrap().len(), 2);
    }

    #[test]
    fn list_all_stages_spans_projects_in_id_order() {
        let db = setup_db();
        let alpha = db.create_project("alpha").unwrap();
        let beta = db.create_project("beta").unwrap();
        let s1 = db.create_stage(alpha.id, "a1").unwrap();
        let s2 = db.create_stage(beta.id, "b1").unwrap();
        let s3 = db.create_stage(alpha.id, "a2").unwrap();

        let ids: Vec<i64> = db.list_all_stages().unwrap().iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![s1.id, s2.id, s3.id]);
    }
}

mod task_tests {
    use super::*;

    #[test]
    fn create_task_lands_in_first_stage() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let first = db.create_stage(project.id, "Todo").unwrap();
        let second = db.create_stage(project.id, "Done").unwrap();

        let task = db.create_task(project.id, "Write docs").unwrap();

        assert_eq!(task.stage_id, first.id);
        assert!(db.list_stage_tasks(second.id).unwrap().is_empty());
    }

    #[test]
    fn create_task_always_picks_first_stage_regardless_of_call_order() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let first = db.create_stage(project.id, "Todo").unwrap();

        let before = db.create_task(project.id, "early").unwrap();
        db.create_stage(project.id, "Done").unwrap();
        let after = db.create_task(project.id, "late").unwrap();

        assert_eq!(before.stage_id, first.id);
        assert_eq!(after.stage_id, first.id);
    }

    #[test]
    fn create_task_rejects_empty_name() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        db.create_stage(project.id, "Todo").unwrap();

        let err = db.create_task(project.id, "").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::MissingRequiredField);
    }

    #[test]
    fn create_task_fails_for_unknown_project() {
        let db = setup_db();

        let err = db.create_task(999, "orphan").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::ProjectNotFound);
    }

    #[test]
    fn create_task_fails_when_project_has_no_stages() {
        let db = setup_db();
        let project = db.create_project("Solo").unwrap();

        let err = db.create_task(project.id, "floating").unwrap_err();

        assert_eq!(error_code(err), ErrorCode::NoStageAvailable);
    }

    #[test]
    fn delete_task_removes_then_reports_missing() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        db.create_stage(project.id, "Todo").unwrap();
        let task = db.create_task(project.id, "ephemeral").unwrap();

        db.delete_task(task.id).expect("first delete should succeed");
        assert!(db.get_task(task.id).unwrap().is_none());

        let err = db.delete_task(task.id).unwrap_err();
        assert_eq!(error_code(err), ErrorCode::TaskNotFound);
    }

    #[test]
    fn delete_task_leaves_stage_and_project_intact() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let stage = db.create_stage(project.id, "Todo").unwrap();
        let task = db.create_task(project.id, "gone soon").unwrap();

        db.delete_task(task.id).unwrap();

        assert!(db.get_stage(stage.id).unwrap().is_some());
        assert!(db.get_project(project.id).unwrap().is_some());
    }

    #[test]
    fn get_task_returns_none_for_unknown_id() {
        let db = setup_db();

        assert!(db.get_task(12345).unwrap().is_none());
    }
}

mod advance_tests {
    use super::*;

    #[test]
    fn advance_moves_task_to_next_stage_with_new_id() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let todo = db.create_stage(project.id, "Todo").unwrap();
        let done = db.create_stage(project.id, "Done").unwrap();
        let task = db.create_task(project.id, "Write spec").unwrap();

        let advance = db.advance_task(task.id, todo.id).unwrap();

        assert!(advance.moved());
        // The original id is gone.
        assert!(db.get_task(task.id).unwrap().is_none());
        // Exactly one task with the same name now sits under the successor.
        let moved = db.list_stage_tasks(done.id).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].name, "Write spec");
        assert_ne!(moved[0].id, task.id);
        assert!(db.list_stage_tasks(todo.id).unwrap().is_empty());
    }

    #[test]
    fn advance_on_last_global_stage_is_noop() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        db.create_stage(project.id, "Todo").unwrap();
        let done = db.create_stage(project.id, "Done").unwrap();
        let task = db.create_task(project.id, "Write spec").unwrap();
        let moved = match db.advance_task(task.id, task.stage_id).unwrap() {
            taskboard::types::Advance::Moved { task, .. } => task,
            taskboard::types::Advance::Unchanged => panic!("expected move"),
        };
        assert_eq!(moved.stage_id, done.id);

        // "Done" is the last stage in the store; advancing out of it changes
        // nothing.
        let advance = db.advance_task(moved.id, done.id).unwrap();

        assert!(!advance.moved());
        let still = db.get_task(moved.id).unwrap().unwrap();
        assert_eq!(still.id, moved.id);
        assert_eq!(still.name, "Write spec");
        assert_eq!(still.stage_id, done.id);
    }

    #[test]
    fn advance_fails_for_unknown_task() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let todo = db.create_stage(project.id, "Todo").unwrap();

        let err = db.advance_task(999, todo.id).unwrap_err();

        assert_eq!(error_code(err), ErrorCode::TaskNotFound);
    }

    #[test]
    fn advance_fails_for_unknown_stage() {
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        db.create_stage(project.id, "Todo").unwrap();
        let task = db.create_task(project.id, "stray").unwrap();

        let err = db.advance_task(task.id, 999).unwrap_err();

        assert_eq!(error_code(err), ErrorCode::StageNotFound);
    }

    #[test]
    fn advance_follows_global_stage_order_across_projects() {
        // Stage creation interleaves two projects, so the stage that
        // globally follows alpha's "a-only" belongs to beta. The advance
        // rule walks the global order and moves the task there.
        let db = setup_db();
        let alpha = db.create_project("alpha").unwrap();
        let beta = db.create_project("beta").unwrap();
        let a_only = db.create_stage(alpha.id, "a-only").unwrap();
        let b_inbox = db.create_stage(beta.id, "b-inbox").unwrap();

        let task = db.create_task(alpha.id, "wanderer").unwrap();
        let advance = db.advance_task(task.id, a_only.id).unwrap();

        assert!(advance.moved());
        let landed = db.list_stage_tasks(b_inbox.id).unwrap();
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].name, "wanderer");
        // The task now lives under a stage owned by a different project.
        let stage = db.get_stage(landed[0].stage_id).unwrap().unwrap();
        assert_eq!(stage.project_id, beta.id);
    }

    #[test]
    fn advance_scenario_todo_to_done() {
        let db = setup_db();
        let launch = db.create_project("Launch").unwrap();
        let todo = db.create_stage(launch.id, "Todo").unwrap();
        let done = db.create_stage(launch.id, "Done").unwrap();

        let task = db.create_task(launch.id, "Write spec").unwrap();
        assert_eq!(task.stage_id, todo.id);

        db.advance_task(task.id, todo.id).unwrap();

        let board = db.get_project_board(launch.id).unwrap().unwrap();
        let todo_col = &board.stages[0];
        let done_col = &board.stages[1];
        assert!(todo_col.tasks.is_empty());
        assert_eq!(done_col.tasks.len(), 1);
        assert_eq!(done_col.tasks[0].name, "Write spec");
        assert_ne!(done_col.tasks[0].id, task.id);
        assert_eq!(done_col.stage.id, done.id);
    }

    #[test]
    fn advance_preserves_task_count() {
        // Delete-and-recreate must be atomic: never zero, never two.
        let db = setup_db();
        let project = db.create_project("Launch").unwrap();
        let todo = db.create_stage(project.id, "Todo").unwrap();
        let done = db.create_stage(project.id, "Done").unwrap();
        let task = db.create_task(project.id, "only one").unwrap();

        db.advance_task(task.id, todo.id).unwrap();

        let total = db.list_stage_tasks(todo.id).unwrap().len()
            + db.list_stage_tasks(done.id).unwrap().len();
        assert_eq!(total, 1);
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("board.db");

        let project_id = {
            let db = Database::open(&db_path).expect("Failed to open database");
            let project = db.create_project("Durable").unwrap();
            db.create_stage(project.id, "Todo").unwrap();
            db.create_task(project.id, "survive restart").unwrap();
            project.id
        };

        let db = Database::open(&db_path).expect("Failed to reopen database");
        let board = db.get_project_board(project_id).unwrap().unwrap();
        assert_eq!(board.project.name, "Durable");
        assert_eq!(board.stages.len(), 1);
        assert_eq!(board.stages[0].tasks[0].name, "survive restart");
    }
}
