#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod core;
pub mod error;
pub mod git;
pub mod mirror;
pub mod plan;
pub mod reconcile;
pub mod remote;
pub mod replay;
pub mod scan;
pub mod telemetry;

pub use error::{Error, Transience};
pub type Result<T> = std::result::Result<T, Error>;

// Re-export core types at crate root for convenience
pub use crate::core::{Author, History, PageId, PageTree, Parent, TitleMap, VersionEvent};
