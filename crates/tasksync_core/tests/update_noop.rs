use tasksync_core::{update, Msg, SyncState};

#[test]
fn update_is_noop() {
    let state = SyncState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn dispose_without_session_is_noop() {
    let state = SyncState::new();
    let (mut next, effects) = update(state.clone(), Msg::Dispose);

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
