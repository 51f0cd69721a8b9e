//! exit codes for polcfg commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// expression could not be compiled
pub const COMPILE_ERROR: i32 = 2;

/// policy document does not exist or cannot be read
pub const CONFIG_NOT_FOUND: i32 = 3;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 4;

/// policy document contains errors
pub const CONFIG_ERROR: i32 = 5;
