use std::sync::Arc;

use anyhow::{bail, Result};
use sync_logging::{sync_debug, sync_info, sync_warn};
use tasksync_core::{ConnectionPhase, Notification, SyncViewModel, TaskId, TaskStatus};
use tasksync_engine::{TaskWatcher, WsConnector};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::cli::WatchArgs;
use crate::commands::Context;
use crate::exit_codes;
use crate::render::print_notification;

pub async fn execute(ctx: &Context, args: WatchArgs) -> Result<i32> {
    let task_id = match args.task_id {
        Some(id) => TaskId::new(id),
        None => match ctx.store.load()?.active_task {
            Some(id) => id,
            None => bail!("no task id given and no active task in {:?}", ctx.store.path()),
        },
    };
    follow(ctx, task_id).await
}

/// Stream notifications for `task_id` until the task settles or Ctrl-C.
pub async fn follow(ctx: &Context, task_id: TaskId) -> Result<i32> {
    let watcher = TaskWatcher::spawn(
        ctx.settings.clone(),
        Arc::new(WsConnector),
        ctx.credentials.clone(),
    );
    let mut views = watcher.subscribe();
    let mut notifications = watcher.notifications();

    println!("Following task {task_id}");
    print_notification(&Notification::initial_progress());
    watcher.watch(Some(task_id.clone()));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let code = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                sync_info!("Interrupted; closing connection");
                watcher.dispose();
                break exit_codes::INTERRUPTED;
            }
            received = notifications.recv() => match received {
                Ok(notification) => print_notification(&notification),
                Err(RecvError::Lagged(skipped)) => {
                    sync_warn!("Skipped {skipped} notifications");
                }
                Err(RecvError::Closed) => break exit_codes::FAILURE,
            },
            changed = views.changed() => {
                if changed.is_err() {
                    break exit_codes::FAILURE;
                }
                let view = views.borrow_and_update().clone();
                sync_debug!("View: {:?} {:?}", view.phase, view.task.status);
                if let Some(code) = outcome(&view) {
                    // Notifications are broadcast before the view changes.
                    drain(&mut notifications);
                    if view.is_terminal() {
                        ctx.store.finish_task(&task_id)?;
                    } else {
                        eprintln!("{}", view.task.error.as_deref().unwrap_or_default());
                    }
                    break code;
                }
            }
        }
    };

    watcher.dispose();
    Ok(code)
}

/// Exit code once the view has settled, `None` while still in progress.
pub fn outcome(view: &SyncViewModel) -> Option<i32> {
    match view.task.status {
        TaskStatus::Finished => Some(exit_codes::SUCCESS),
        TaskStatus::Failed => Some(exit_codes::FAILURE),
        _ if view.phase == ConnectionPhase::Unauthenticated => Some(exit_codes::AUTH_REQUIRED),
        _ => None,
    }
}

fn drain(notifications: &mut tokio::sync::broadcast::Receiver<Notification>) {
    loop {
        match notifications.try_recv() {
            Ok(notification) => print_notification(&notification),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}
