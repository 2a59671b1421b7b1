use pretty_assertions::assert_eq;
use serde_json::json;
use tasksync_core::{parse_frame, ClientFrame, Frame, FrameError, TaskStatus, TaskView};

fn apply(view: &mut TaskView, text: &str) -> bool {
    view.merge(parse_frame(text).expect("valid frame"))
}

#[test]
fn partial_frames_accumulate_into_view() {
    let mut view = TaskView::default();
    assert!(apply(&mut view, r#"{"status":"running","message":"Page 2/5"}"#));
    assert!(apply(
        &mut view,
        r#"{"result":{"extracted":{"a":1},"errors":[]}}"#
    ));

    assert_eq!(
        view,
        TaskView {
            status: TaskStatus::Running,
            message: "Page 2/5".to_string(),
            result: Some(json!({"extracted": {"a": 1}, "errors": []})),
            error: None,
        }
    );
}

#[test]
fn omitted_and_null_fields_leave_view_unchanged() {
    let mut view = TaskView::default();
    apply(
        &mut view,
        r#"{"status":"running","message":"OCR","result":{"x":1},"error":"warn"}"#,
    );
    let before = view.clone();

    assert!(!apply(&mut view, "{}"));
    assert!(!apply(
        &mut view,
        r#"{"status":null,"message":null,"result":null,"error":null}"#
    ));
    assert_eq!(view, before);

    assert!(apply(&mut view, r#"{"message":"Gemini"}"#));
    assert_eq!(view.status, TaskStatus::Running);
    assert_eq!(view.message, "Gemini");
    assert_eq!(view.result, Some(json!({"x": 1})));
    assert_eq!(view.error.as_deref(), Some("warn"));
}

#[test]
fn message_is_overwritten_not_appended() {
    let mut view = TaskView::default();
    apply(&mut view, r#"{"message":"one"}"#);
    apply(&mut view, r#"{"message":"two"}"#);
    assert_eq!(view.message, "two");
}

#[test]
fn server_error_does_not_touch_status() {
    let mut view = TaskView::default();
    apply(&mut view, r#"{"status":"running"}"#);
    apply(&mut view, r#"{"error":"No text could be extracted"}"#);
    assert_eq!(view.status, TaskStatus::Running);
    assert_eq!(view.error.as_deref(), Some("No text could be extracted"));
}

#[test]
fn identical_frame_reports_no_change() {
    let mut view = TaskView::default();
    assert!(apply(&mut view, r#"{"status":"running","message":"x"}"#));
    assert!(!apply(&mut view, r#"{"status":"running","message":"x"}"#));
}

#[test]
fn malformed_frames_are_rejected() {
    assert!(matches!(parse_frame("not json"), Err(FrameError::Json(_))));
    assert!(matches!(parse_frame("[1,2]"), Err(FrameError::NotAnObject)));
    assert!(matches!(parse_frame("\"running\""), Err(FrameError::NotAnObject)));
}

#[test]
fn mistyped_keys_are_skipped_individually() {
    let frame = parse_frame(r#"{"status":"paused","message":42,"error":["x"],"result":{"k":true}}"#)
        .expect("object frame");
    assert_eq!(
        frame,
        Frame {
            status: None,
            message: None,
            result: Some(json!({"k": true})),
            error: None,
        }
    );
}

#[test]
fn unknown_keys_are_ignored() {
    let frame = parse_frame(r#"{"status":"finished","progress":0.5}"#).expect("object frame");
    assert_eq!(frame.status, Some(TaskStatus::Finished));
    assert!(!frame.is_empty());
    assert!(parse_frame(r#"{"progress":0.5}"#).unwrap().is_empty());
}

#[test]
fn auth_frame_wire_shape() {
    let text = ClientFrame::Auth {
        token: "abc".to_string(),
    }
    .to_text()
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, json!({"type": "auth", "token": "abc"}));
}
