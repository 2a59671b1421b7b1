use pretty_assertions::assert_eq;
use serde_json::json;
use tasksync_core::{
    notifications_between, update, ConnectionId, Effect, Msg, Notification, SyncState, TaskId,
    TaskStatus, TaskView, CONNECTION_LOST,
};

fn running(message: &str) -> TaskView {
    TaskView {
        status: TaskStatus::Running,
        message: message.to_string(),
        ..TaskView::default()
    }
}

#[test]
fn entering_running_with_message_reports_progress() {
    let notes = notifications_between(&TaskView::default(), &running("Extracting text"));
    assert_eq!(
        notes,
        vec![Notification::Progress {
            message: "Extracting text".to_string()
        }]
    );
}

#[test]
fn unchanged_running_message_is_not_repeated() {
    assert!(notifications_between(&running("a"), &running("a")).is_empty());
    assert_eq!(notifications_between(&running("a"), &running("b")).len(), 1);
    assert!(notifications_between(&TaskView::default(), &running("")).is_empty());
}

#[test]
fn completion_reports_extracted_payload_and_issue_count() {
    let after = TaskView {
        status: TaskStatus::Finished,
        result: Some(json!({"extracted": {"name": "Ada"}, "errors": ["missing date"]})),
        ..running("done")
    };
    assert_eq!(
        notifications_between(&running("done"), &after),
        vec![Notification::Completed {
            extracted: json!({"name": "Ada"}),
            issue_count: 1,
        }]
    );
    assert!(notifications_between(&after, &after).is_empty());
}

#[test]
fn completion_waits_for_result() {
    let finished = TaskView {
        status: TaskStatus::Finished,
        ..TaskView::default()
    };
    assert!(notifications_between(&running("x"), &finished).is_empty());

    let with_result = TaskView {
        result: Some(json!({"total": 3})),
        ..finished.clone()
    };
    assert_eq!(
        notifications_between(&finished, &with_result),
        vec![Notification::Completed {
            extracted: json!({"total": 3}),
            issue_count: 0,
        }]
    );
}

#[test]
fn failure_prefers_error_then_message() {
    let failed = TaskView {
        status: TaskStatus::Failed,
        error: Some("boom".to_string()),
        ..running("Page 2")
    };
    assert_eq!(
        notifications_between(&running("Page 2"), &failed),
        vec![Notification::Failed {
            message: "boom".to_string()
        }]
    );

    let bare = TaskView {
        status: TaskStatus::Failed,
        ..TaskView::default()
    };
    assert_eq!(
        notifications_between(&TaskView::default(), &bare),
        vec![Notification::Failed {
            message: "Processing failed".to_string()
        }]
    );
}

#[test]
fn update_emits_notify_effects_for_frames_and_forced_failure() {
    let (state, effects) = update(
        SyncState::new(),
        Msg::Watch {
            task_id: Some(TaskId::from("42")),
            token: Some("t".to_string()),
        },
    );
    let conn = match effects[0] {
        Effect::Open { conn, .. } => conn,
        ref other => panic!("unexpected effect {other:?}"),
    };
    let (state, _) = update(state, Msg::Opened { conn });
    let (state, effects) = update(
        state,
        Msg::FrameReceived {
            conn,
            text: r#"{"status":"running","message":"OCR"}"#.to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::Progress {
            message: "OCR".to_string()
        })]
    );

    let (_, effects) = update(state, Msg::Closed { conn, clean: true });
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::Failed {
            message: CONNECTION_LOST.to_string()
        })]
    );
}

#[test]
fn switching_tasks_does_not_notify() {
    let (state, effects) = update(
        SyncState::new(),
        Msg::Watch {
            task_id: Some(TaskId::from("1")),
            token: Some("t".to_string()),
        },
    );
    assert!(!effects.iter().any(|e| matches!(e, Effect::Notify(_))));
    let (state, _) = update(state, Msg::Opened { conn: ConnectionId(1) });
    let (state, _) = update(
        state,
        Msg::FrameReceived {
            conn: ConnectionId(1),
            text: r#"{"status":"failed"}"#.to_string(),
        },
    );
    let (_, effects) = update(
        state,
        Msg::Watch {
            task_id: Some(TaskId::from("2")),
            token: Some("t".to_string()),
        },
    );
    assert!(!effects.iter().any(|e| matches!(e, Effect::Notify(_))));
}
