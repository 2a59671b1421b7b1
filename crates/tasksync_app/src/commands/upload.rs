use anyhow::{Context as _, Result};
use sync_logging::sync_error;
use tasksync_core::AUTH_REQUIRED;
use tasksync_engine::{ReqwestTaskIssuer, TaskIssuer};

use crate::cli::UploadArgs;
use crate::commands::{watch, Context};
use crate::exit_codes;

pub async fn execute(ctx: &Context, args: UploadArgs) -> Result<i32> {
    let Some(token) = ctx.credentials.current_token() else {
        sync_error!("Upload refused: no token");
        eprintln!("{AUTH_REQUIRED}");
        return Ok(exit_codes::AUTH_REQUIRED);
    };

    let issuer = ReqwestTaskIssuer::new(&ctx.settings)?;
    let issued = issuer
        .issue(args.job_id, &args.file, &token)
        .await
        .with_context(|| format!("upload of {} failed", args.file.display()))?;

    println!("Task {} created", issued.task_id);
    ctx.store.set_active_task(Some(issued.task_id.clone()))?;

    if args.no_watch {
        return Ok(exit_codes::SUCCESS);
    }
    watch::follow(ctx, issued.task_id).await
}
