use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_STATE_FILE: &str = ".tasksync_session.ron";

#[derive(Parser)]
#[command(
    name = "tasksync",
    version,
    about = "Follow server-side processing tasks",
    long_about = "Upload documents and follow the processing task the backend issues for them.\n\
                  Status updates stream over a WebSocket; dropped connections are retried with \
                  exponential backoff."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Session file holding the token and the active task
    #[arg(long, global = true, env = "TASKSYNC_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// WebSocket base url (defaults to the api url with a ws scheme)
    #[arg(long, global = true, env = "TASKSYNC_WS_URL")]
    pub ws_url: Option<String>,

    /// HTTP api base url
    #[arg(long, global = true, env = "TASKSYNC_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token; overrides $TASKSYNC_TOKEN and the stored session
    #[arg(long, global = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a bearer token in the session file
    Login(LoginArgs),
    /// Forget the stored token
    Logout,
    /// Upload a PDF and follow the task it creates
    Upload(UploadArgs),
    /// Follow a task until it finishes or fails
    Watch(WatchArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    /// Token to store
    #[arg(value_name = "TOKEN")]
    pub value: String,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Job the document belongs to
    #[arg(long)]
    pub job_id: u64,

    /// PDF file to upload
    pub file: PathBuf,

    /// Print the task id and exit without following it
    #[arg(long, default_value_t = false)]
    pub no_watch: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Task to follow; defaults to the active task of the session
    pub task_id: Option<String>,
}
