//! Ad hoc computed columns for tabular data views.
//!
//! Column definitions are scoped per (view, table) pairing, persisted as a
//! user-settings blob, and reconciled onto the live table whenever they
//! change; each cell renders through a pluggable expression engine with
//! failures contained to the single cell.

pub mod action;
pub mod codec;
pub mod config;
pub mod error;
pub mod eval;
pub mod generator;
pub mod manager;
pub mod model;
pub mod settings;

pub use action::{attach_dynamic_columns, AttachOptions, EditColumnsAction};
pub use error::{ColumnsError, ColumnsResult};
pub use manager::DynamicColumnsManager;
pub use model::DynamicColumn;
