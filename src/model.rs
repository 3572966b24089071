//! Column definition data contract.
//! Keep this module purely about types/serde and light helpers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-authored dynamic column: identity, display caption and the
/// expression evaluated against each row record. The reconciliation diff
/// compares whole values, so `PartialEq` covers every field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DynamicColumn {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub expression: Option<String>,
}

impl DynamicColumn {
    /// Fresh definition with a newly minted id (editor "create" path).
    pub fn new(name: &str, expression: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            expression: expression.map(|s| s.to_string()),
        }
    }

    /// Rehydrate a definition loaded from persistent storage.
    pub fn with_id(id: Uuid, name: &str, expression: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            expression: expression.map(|s| s.to_string()),
        }
    }

    /// Expression text, treating an absent script as empty.
    pub fn expression_text(&self) -> &str {
        self.expression.as_deref().unwrap_or("")
    }
}
