//! Configuration parameters for the dynamic-columns component.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DynamicColumnsConfig {
    /// Keyboard shortcut bound to the edit action.
    pub edit_action_shortcut: String,
}

impl Default for DynamicColumnsConfig {
    fn default() -> Self {
        Self { edit_action_shortcut: "CTRL-ALT-D".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shortcut() {
        assert_eq!(DynamicColumnsConfig::default().edit_action_shortcut, "CTRL-ALT-D");
    }

    #[test]
    fn serde_round_trip() {
        let config = DynamicColumnsConfig { edit_action_shortcut: "CTRL-D".to_string() };
        let text = serde_json::to_string(&config).expect("serialize");
        let back: DynamicColumnsConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, config);
    }
}
