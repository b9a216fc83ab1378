// Public modules
pub mod config;
pub mod corpus;
pub mod error;
pub mod notice;
pub mod rename;
pub mod tags;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use rename::{CollisionPolicy, RenameOptions, RenameOutcome, RenamePlan, Renamer};
