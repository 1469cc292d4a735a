//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 2    | Usage error (bad or missing arguments)         |
//! | 3    | I/O error (unreadable input, unwritable output)|
//! | 4    | Parse error (malformed data, profile or index) |
//! | 5    | Matching error (missing field, bad index)      |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// A file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Input data, profile or index file is malformed.
pub const EXIT_PARSE: u8 = 4;

/// Matching failed (e.g. a profile column missing from the data).
pub const EXIT_MATCH: u8 = 5;
