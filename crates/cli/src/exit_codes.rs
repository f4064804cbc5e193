//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `pgrid` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad settings) |
//! | 3       | Universal        | I/O error reading or writing a file      |
//! | 4       | state            | State file is not a valid grid           |
//! | 10-19   | submit           | Submission outcomes                      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, bad cell reference, unusable settings file.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// State (4)
// =============================================================================

/// State file is not JSON, or its shape is ragged.
pub const EXIT_STATE_PARSE: u8 = 4;

// =============================================================================
// Submit (10-19)
// =============================================================================

/// Submission rejected; errors were printed.
pub const EXIT_SUBMIT_INVALID: u8 = 10;
