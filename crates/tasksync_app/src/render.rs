use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use tasksync_core::Notification;

const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// One stdout line per notification, prefixed with a local timestamp.
pub fn notification_line<Tz: TimeZone>(notification: &Notification, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = at.format(TIMESTAMP_FORMAT);
    match notification {
        Notification::Progress { message } => format!("[{stamp}] {message}"),
        Notification::Completed {
            extracted,
            issue_count,
        } => {
            let mut line = format!("[{stamp}] Processing completed");
            if *issue_count > 0 {
                line.push_str(&format!(" with {issue_count} issue(s)"));
            }
            line.push('\n');
            line.push_str(&pretty(extracted));
            line
        }
        Notification::Failed { message } => format!("[{stamp}] Processing failed: {message}"),
    }
}

pub fn print_notification(notification: &Notification) {
    println!("{}", notification_line(notification, &Local::now()));
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
