//! Dynamic-column lifecycle manager: owns the cached definition list for one
//! (view, table) pairing, persists updates through the codec, and reconciles
//! the table's attached generated columns against the previous snapshot.
//!
//! Single-threaded, call-and-return. One manager instance per pairing; the
//! bound target is set exactly once and owns the table side-effects channel.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::codec::{scope_key as build_scope_key, ColumnConfigStore};
use crate::error::{ColumnsError, ColumnsResult};
use crate::eval::ExpressionEvaluator;
use crate::generator::{CellRenderer, DynamicColumnGenerator};
use crate::model::DynamicColumn;
use crate::settings::SettingsStore;

/// Table-widget boundary. The manager drives attach/detach of generated
/// columns; it never renders the table itself.
pub trait TableTarget {
    /// Identifier of the enclosing view (screen) of this table.
    fn view_id(&self) -> String;
    /// Identifier of the table component itself.
    fn table_id(&self) -> String;
    /// Attach a generated column under `id`, replacing any column already
    /// attached under the same id.
    fn attach_column(&self, id: &str, caption: &str, renderer: Arc<dyn CellRenderer>);
    /// Detach a generated column by id; an absent id is a no-op.
    fn detach_column(&self, id: &str);
}

pub struct DynamicColumnsManager {
    /// Cached column set; `None` until first load (or after `reset`).
    columns: Option<Vec<DynamicColumn>>,
    /// Independent snapshot of the set as of the last reconciliation,
    /// cleared when that set was empty.
    previous: Option<Vec<DynamicColumn>>,
    target: Option<Arc<dyn TableTarget>>,
    /// Live generator per column id; private to this manager.
    generators: HashMap<Uuid, Arc<DynamicColumnGenerator>>,
    store: ColumnConfigStore,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl DynamicColumnsManager {
    /// Build an unbound manager. All collaborators are passed in explicitly.
    pub fn new(settings: Arc<dyn SettingsStore>, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self {
            columns: None,
            previous: None,
            target: None,
            generators: HashMap::new(),
            store: ColumnConfigStore::new(settings),
            evaluator,
        }
    }

    /// Build a manager already bound to `target`.
    pub fn for_target(
        target: Arc<dyn TableTarget>,
        settings: Arc<dyn SettingsStore>,
        evaluator: Arc<dyn ExpressionEvaluator>,
    ) -> Self {
        let mut manager = Self::new(settings, evaluator);
        manager.target = Some(target);
        manager
    }

    pub fn target(&self) -> Option<&Arc<dyn TableTarget>> {
        self.target.as_ref()
    }

    /// Bind the table this manager affects. Set-once: rebinding the same
    /// reference is a no-op, a different reference fails and leaves the
    /// manager unchanged, an absent target fails.
    pub fn set_target(&mut self, target: Option<Arc<dyn TableTarget>>) -> ColumnsResult<()> {
        let target = target.ok_or_else(|| ColumnsError::null_target("target must be present"))?;
        if let Some(bound) = &self.target {
            if Arc::ptr_eq(bound, &target) {
                return Ok(());
            }
            return Err(ColumnsError::already_bound("target is already set"));
        }
        self.target = Some(target);
        Ok(())
    }

    /// Persistence key for this manager's (view, table) pairing. Stable for
    /// the lifetime of the binding.
    pub fn scope_key(&self) -> ColumnsResult<String> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| ColumnsError::not_bound("target has not been set"))?;
        Ok(build_scope_key(&target.view_id(), &target.table_id()))
    }

    /// Current column set, as a read-only view. Lazy: the first call loads
    /// from the config store under the scope key and caches the result
    /// (possibly empty); later calls never re-read storage until `reset`.
    pub fn columns(&mut self) -> ColumnsResult<&[DynamicColumn]> {
        if self.columns.is_none() {
            let key = self.scope_key()?;
            let loaded = self.store.load(&key)?;
            debug!("[columns] loaded {} definition(s) under '{}'", loaded.len(), key);
            self.columns = Some(loaded);
        }
        Ok(self.columns.as_deref().unwrap_or_default())
    }

    /// Replace the column set. `None` normalizes to an empty set. Always
    /// persists and always reconciles the table, even when the new set is
    /// value-identical to the old one.
    pub fn set_columns(&mut self, columns: Option<Vec<DynamicColumn>>) -> ColumnsResult<()> {
        self.columns = Some(columns.unwrap_or_default());
        let key = self.scope_key()?;
        self.store.save(&key, self.columns.as_deref().unwrap_or_default())?;
        self.reconcile()
    }

    /// Synchronize the table's attached generated columns with the current
    /// set.
    ///
    /// Two passes, in this order:
    /// 1. removal: every snapshot entry no longer present in the current set
    ///    *by whole value* is detached and its generator dropped. An entry
    ///    edited in place (same id, changed value) is not caught here; the
    ///    reinstall pass below replaces it anyway, so this pass only matters
    ///    for true id deletions.
    /// 2. reinstall: every current column gets a fresh evaluator-backed
    ///    generator, registered under its id and attached with the column
    ///    name as caption, unconditionally.
    /// Finally the snapshot becomes an independent copy of the current set,
    /// or is cleared when the set is empty.
    pub fn reconcile(&mut self) -> ColumnsResult<()> {
        let target = match &self.target {
            Some(t) => Arc::clone(t),
            None => return Err(ColumnsError::not_bound("target has not been set")),
        };
        let current: Vec<DynamicColumn> = self.columns()?.to_vec();

        if let Some(previous) = self.previous.take() {
            for stale in previous.iter().filter(|p| !current.contains(p)) {
                debug!("[columns] detaching column {} ('{}')", stale.id, stale.name);
                target.detach_column(&stale.id.to_string());
                self.generators.remove(&stale.id);
            }
        }

        for column in &current {
            let generator = Arc::new(DynamicColumnGenerator::new(
                column.clone(),
                Arc::clone(&self.evaluator),
            ));
            self.generators.insert(column.id, Arc::clone(&generator));
            generator.install(target.as_ref());
        }

        self.previous = if current.is_empty() { None } else { Some(current) };
        Ok(())
    }

    /// Drop the cached set, forcing a reload from storage on the next
    /// `columns` call. Does not touch the table or the reconciliation
    /// snapshot.
    pub fn reset(&mut self) {
        self.columns = None;
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
