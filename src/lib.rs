//! Core library for the sales-sync command line application.
//!
//! The library exposes the single-shot pipeline that powers the command-line
//! interface as well as the tests. The modules are structured to keep
//! responsibilities narrow and composable: the pure cores live in
//! [`normalize`], [`incremental`], [`merge`], and [`position`]; IO adapters
//! under [`io`]; persisted state in [`watermark`]; and the run orchestration
//! in [`sync`].

pub mod config;
pub mod error;
pub mod incremental;
pub mod io;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod position;
pub mod sync;
pub mod watermark;

pub use error::{Result, SkipReason, SyncError};
