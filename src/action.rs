//! Edit-columns action surface and explicit wiring factory.
//!
//! The editor itself (dialog UI, form validation) is a host concern behind
//! the `ColumnsEditor` trait; this module only consumes its committed output.
//! Capabilities are expressed as small traits on one concrete action type
//! rather than through an inheritance hierarchy, and all collaborators are
//! passed in explicitly.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DynamicColumnsConfig;
use crate::error::ColumnsResult;
use crate::eval::ExpressionEvaluator;
use crate::manager::{DynamicColumnsManager, TableTarget};
use crate::model::DynamicColumn;
use crate::settings::SettingsStore;

pub const ACTION_ID: &str = "editDynamicColumns";
pub const ACTION_CAPTION: &str = "Dynamic columns";

/// How the editor should be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    #[default]
    Dialog,
    NewTab,
}

pub trait HasOpenMode {
    fn open_mode(&self) -> OpenMode;
    fn set_open_mode(&mut self, mode: OpenMode);
}

pub trait HasPreActionHook {
    /// Hook run before the editor opens; returning false aborts the action.
    fn set_pre_action_hook(&mut self, hook: Box<dyn Fn() -> bool>);
}

/// Editor boundary: receives the current definitions and yields the committed
/// ordered list, or `None` when the user cancels.
pub trait ColumnsEditor {
    fn edit_columns(&self, current: &[DynamicColumn], mode: OpenMode) -> Option<Vec<DynamicColumn>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Committed,
    Cancelled,
}

pub struct EditColumnsAction {
    manager: Arc<Mutex<DynamicColumnsManager>>,
    id: String,
    open_mode: OpenMode,
    shortcut: String,
    caption_dynamic: bool,
    pre_action: Option<Box<dyn Fn() -> bool>>,
    after_close: Option<Box<dyn Fn(ActionOutcome)>>,
}

impl EditColumnsAction {
    pub fn new(manager: Arc<Mutex<DynamicColumnsManager>>, config: &DynamicColumnsConfig) -> Self {
        Self {
            manager,
            id: ACTION_ID.to_string(),
            open_mode: OpenMode::default(),
            shortcut: config.edit_action_shortcut.clone(),
            caption_dynamic: false,
            pre_action: None,
            after_close: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shortcut(&self) -> &str {
        &self.shortcut
    }

    pub fn manager(&self) -> Arc<Mutex<DynamicColumnsManager>> {
        Arc::clone(&self.manager)
    }

    pub fn is_caption_dynamic(&self) -> bool {
        self.caption_dynamic
    }

    pub fn set_caption_dynamic(&mut self, dynamic: bool) {
        self.caption_dynamic = dynamic;
    }

    /// Hook invoked after the editor closes, with the outcome.
    pub fn set_after_close_hook(&mut self, hook: Box<dyn Fn(ActionOutcome)>) {
        self.after_close = Some(hook);
    }

    /// Action caption: the column count when dynamic captioning is enabled,
    /// the fixed label otherwise.
    pub fn caption(&self) -> String {
        if self.caption_dynamic {
            let mut manager = self.manager.lock();
            match manager.columns() {
                Ok(columns) => return columns.len().to_string(),
                Err(_) => return ACTION_CAPTION.to_string(),
            }
        }
        ACTION_CAPTION.to_string()
    }

    /// Run the action: pre-action hook, editor, then commit of the edited
    /// set through the manager (persist + reconcile).
    pub fn perform(&self, editor: &dyn ColumnsEditor) -> ColumnsResult<ActionOutcome> {
        if let Some(hook) = &self.pre_action {
            if !hook() {
                return Ok(ActionOutcome::Cancelled);
            }
        }
        let current = {
            let mut manager = self.manager.lock();
            manager.columns()?.to_vec()
        };
        let outcome = match editor.edit_columns(&current, self.open_mode) {
            Some(edited) => {
                self.manager.lock().set_columns(Some(edited))?;
                ActionOutcome::Committed
            }
            None => ActionOutcome::Cancelled,
        };
        if let Some(hook) = &self.after_close {
            hook(outcome);
        }
        Ok(outcome)
    }
}

impl HasOpenMode for EditColumnsAction {
    fn open_mode(&self) -> OpenMode {
        self.open_mode
    }
    fn set_open_mode(&mut self, mode: OpenMode) {
        self.open_mode = mode;
    }
}

impl HasPreActionHook for EditColumnsAction {
    fn set_pre_action_hook(&mut self, hook: Box<dyn Fn() -> bool>) {
        self.pre_action = Some(hook);
    }
}

/// Composition options for `attach_dynamic_columns`.
#[derive(Debug, Clone, Default)]
pub struct AttachOptions {
    pub open_mode: OpenMode,
    pub dynamic_caption: bool,
    pub config: DynamicColumnsConfig,
}

/// Wire a manager and its edit action onto a table in one explicit call.
///
/// Builds the manager bound to `target`, runs the initial reconciliation so
/// previously persisted columns appear immediately, and returns the shared
/// manager handle together with the configured action.
pub fn attach_dynamic_columns(
    target: Arc<dyn TableTarget>,
    settings: Arc<dyn SettingsStore>,
    evaluator: Arc<dyn ExpressionEvaluator>,
    options: AttachOptions,
) -> ColumnsResult<(Arc<Mutex<DynamicColumnsManager>>, EditColumnsAction)> {
    let mut manager = DynamicColumnsManager::for_target(target, settings, evaluator);
    manager.reconcile()?;
    let manager = Arc::new(Mutex::new(manager));
    let mut action = EditColumnsAction::new(Arc::clone(&manager), &options.config);
    action.set_open_mode(options.open_mode);
    action.set_caption_dynamic(options.dynamic_caption);
    Ok((manager, action))
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod action_tests;
