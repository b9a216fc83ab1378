//! Generic utility primitives.
//!
//! - `io` - File I/O with consistent error handling
//! - `validation` - Input validation helpers

pub mod io;
pub mod validation;
