//! Per-column generator: the runtime object the table widget calls to render
//! one cell. Evaluation failures are contained here and rendered inline; they
//! never reach the table's rendering pipeline as errors.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::eval::ExpressionEvaluator;
use crate::manager::TableTarget;
use crate::model::DynamicColumn;

/// Style class marking inline failure cells.
pub const FAILURE_STYLE: &str = "failure";

/// Rendered cell payload handed back to the table widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    /// Plain text cell; empty when the expression produced no value.
    Text { value: String },
    /// Inline failure presentation carrying the evaluation message.
    Failure { message: String },
}

impl CellContent {
    pub fn text<S: Into<String>>(value: S) -> Self {
        CellContent::Text { value: value.into() }
    }
    pub fn failure<S: Into<String>>(message: S) -> Self {
        CellContent::Failure { message: message.into() }
    }

    /// Style class for visually distinguishing the cell, if any.
    pub fn style_name(&self) -> Option<&'static str> {
        match self {
            CellContent::Failure { .. } => Some(FAILURE_STYLE),
            CellContent::Text { .. } => None,
        }
    }
}

/// What the table widget invokes when rendering a generated column's cell.
pub trait CellRenderer {
    fn render_cell(&self, record: &JsonValue) -> CellContent;
}

/// Binds one column definition to an expression engine.
pub struct DynamicColumnGenerator {
    column: DynamicColumn,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl DynamicColumnGenerator {
    pub fn new(column: DynamicColumn, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { column, evaluator }
    }

    pub fn column(&self) -> &DynamicColumn {
        &self.column
    }

    /// Attach (or re-attach) this generator's column to the table, keyed by
    /// the definition id and captioned with the definition name. Attaching
    /// under an existing id replaces the previous column. Consumes an owning
    /// handle; the table keeps it as the column's renderer.
    pub fn install(self: Arc<Self>, table: &dyn TableTarget) {
        let id = self.column.id.to_string();
        let caption = self.column.name.clone();
        table.attach_column(&id, &caption, self);
    }
}

impl CellRenderer for DynamicColumnGenerator {
    fn render_cell(&self, record: &JsonValue) -> CellContent {
        match self.evaluator.evaluate(self.column.expression_text(), record) {
            Ok(Some(text)) => CellContent::text(text),
            Ok(None) => CellContent::text(""),
            Err(e) => CellContent::failure(e.message),
        }
    }
}
