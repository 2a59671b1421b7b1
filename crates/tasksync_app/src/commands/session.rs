use anyhow::{bail, Result};
use sync_logging::sync_info;

use crate::cli::LoginArgs;
use crate::commands::Context;
use crate::exit_codes;

pub fn login(ctx: &Context, args: LoginArgs) -> Result<i32> {
    let token = args.value.trim();
    if token.is_empty() {
        bail!("token must not be empty");
    }
    ctx.store.set_token(Some(token.to_string()))?;
    sync_info!("Stored token in {:?}", ctx.store.path());
    println!("Logged in.");
    Ok(exit_codes::SUCCESS)
}

pub fn logout(ctx: &Context) -> Result<i32> {
    ctx.store.set_token(None)?;
    println!("Logged out.");
    Ok(exit_codes::SUCCESS)
}
