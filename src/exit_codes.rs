//! Process exit codes.
//!
//! - `SUCCESS` (0): the command completed and every check passed.
//! - `FAILURE` (1): a validation or git operation failed.
//! - `ERROR` (2): the tool could not run (not a git repository, a missing
//!   required argument, or a fatal error). clap reports usage errors with
//!   the same code.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const ERROR: i32 = 2;
