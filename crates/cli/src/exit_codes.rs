//! CLI Exit Code Registry
//!
//! Single source of truth for `geoq` exit codes. Scripts rely on them.
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success (including apology answers to bad queries)   |
//! | 1    | General error (output could not be written)          |
//! | 2    | Usage error (bad arguments, no dataset configured)   |
//! | 3    | Dataset could not be loaded                          |
//! | 4    | Assistant config could not be parsed or validated    |
//!
//! A query the assistant cannot answer is not a CLI failure: it still
//! prints a `text` response and exits 0.

/// Success - command completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Dataset load failure: missing file, missing column, bad coordinate.
pub const EXIT_LOAD: u8 = 3;

/// Assistant config failure: malformed TOML or out-of-range value.
pub const EXIT_CONFIG: u8 = 4;
