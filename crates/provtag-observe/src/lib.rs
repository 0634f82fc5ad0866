//! Logging setup shared by provtag binaries.
mod logger;
pub use logger::*;
