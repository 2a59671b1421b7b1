pub const SUCCESS: i32 = 0;
/// Task failed, or the command itself errored.
pub const FAILURE: i32 = 1;
pub const AUTH_REQUIRED: i32 = 2;
/// Conventional 128 + SIGINT.
pub const INTERRUPTED: i32 = 130;
