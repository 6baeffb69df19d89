//! Maintenance actions over the per scope/env databases.
//!
//! An [`Action`] is run by [`actions::run`] against a shared
//! [`RunContext`]. The generic loops in [`sync`] do the per-document work
//! and are driven by the store traits of `opsync-core`, so they can be
//! tested without a server. Failed documents are collected in the context
//! and written out by [`report::write_report`].

pub mod action;
pub mod actions;
pub mod context;
pub mod error;
pub mod report;
pub mod schema;
pub mod sync;

pub use action::{Action, UnknownAction};
pub use context::{ActionSummary, Connections, RunContext};
pub use error::PipelineError;
pub use schema::SchemaRegistry;
