//! Persistence codec for the column-definition list.
//! Document shape: root `nxdcol`, child `columns`, one `column` entry per
//! definition carrying `id`, `name`, `expression` attributes. There is no
//! schema version field; loading is lenient at entry level (entries without a
//! usable id are dropped) and strict at document level (root tag must match).

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ColumnsError, ColumnsResult};
use crate::model::DynamicColumn;
use crate::settings::SettingsStore;

/// Fixed namespace for both the document root tag and persistence keys.
pub const SETTING_NAMESPACE: &str = "nxdcol";

const COLUMNS_TAG: &str = "columns";
const COLUMN_TAG: &str = "column";

/// Persistence key for a (view, table) pairing. The underlying settings store
/// is already partitioned per user identity, so the key carries only the view
/// and table identifiers under the fixed namespace prefix.
pub fn scope_key(view_id: &str, table_id: &str) -> String {
    format!("{}_{}_{}", SETTING_NAMESPACE, view_id, table_id)
}

/// Serialize an ordered column list into the persisted document text.
pub fn serialize_columns(columns: &[DynamicColumn]) -> ColumnsResult<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| ColumnsError::internal(format!("write column document: {}", e)))?;
    writer
        .write_event(Event::Start(BytesStart::new(SETTING_NAMESPACE)))
        .map_err(|e| ColumnsError::internal(format!("write column document: {}", e)))?;
    writer
        .write_event(Event::Start(BytesStart::new(COLUMNS_TAG)))
        .map_err(|e| ColumnsError::internal(format!("write column document: {}", e)))?;
    for column in columns {
        let id = column.id.to_string();
        let mut entry = BytesStart::new(COLUMN_TAG);
        entry.push_attribute(("id", id.as_str()));
        entry.push_attribute(("name", column.name.as_str()));
        if let Some(expression) = &column.expression {
            entry.push_attribute(("expression", expression.as_str()));
        }
        writer
            .write_event(Event::Empty(entry))
            .map_err(|e| ColumnsError::internal(format!("write column entry: {}", e)))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(COLUMNS_TAG)))
        .map_err(|e| ColumnsError::internal(format!("write column document: {}", e)))?;
    writer
        .write_event(Event::End(BytesEnd::new(SETTING_NAMESPACE)))
        .map_err(|e| ColumnsError::internal(format!("write column document: {}", e)))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| ColumnsError::internal(format!("column document is not utf-8: {}", e)))
}

/// Parse a persisted document back into an ordered column list.
///
/// Fails with `InvalidPersistedState` when the root tag is not `nxdcol` or
/// the document is not well-formed; a missing `columns` container yields an
/// empty list; `column` entries without a usable `id` attribute are skipped.
pub fn deserialize_columns(document: &str) -> ColumnsResult<Vec<DynamicColumn>> {
    let mut reader = Reader::from_str(document);
    let mut columns: Vec<DynamicColumn> = Vec::new();
    let mut saw_root = false;
    let mut container_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ColumnsError::invalid_persisted_state(format!("malformed column document: {}", e)))?;
        match event {
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                if !saw_root {
                    check_root(&tag)?;
                    saw_root = true;
                } else if tag == COLUMNS_TAG.as_bytes() {
                    container_depth += 1;
                } else if container_depth > 0 && tag == COLUMN_TAG.as_bytes() {
                    if let Some(column) = read_column_entry(&e)? {
                        columns.push(column);
                    }
                }
            }
            Event::Empty(e) => {
                let tag = e.name().as_ref().to_vec();
                if !saw_root {
                    // an empty root element carries no columns; keep scanning to EOF
                    check_root(&tag)?;
                    saw_root = true;
                } else if container_depth > 0 && tag == COLUMN_TAG.as_bytes() {
                    if let Some(column) = read_column_entry(&e)? {
                        columns.push(column);
                    }
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == COLUMNS_TAG.as_bytes() {
                    container_depth = container_depth.saturating_sub(1);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ColumnsError::invalid_persisted_state("column document has no root element"));
    }
    Ok(columns)
}

fn check_root(tag: &[u8]) -> ColumnsResult<()> {
    if tag != SETTING_NAMESPACE.as_bytes() {
        return Err(ColumnsError::invalid_persisted_state(format!(
            "unexpected root element '{}' (expected '{}')",
            String::from_utf8_lossy(tag),
            SETTING_NAMESPACE
        )));
    }
    Ok(())
}

// Entry-level leniency: a missing, blank or unparseable id drops the entry,
// not the whole document.
fn read_column_entry(entry: &BytesStart<'_>) -> ColumnsResult<Option<DynamicColumn>> {
    let mut id_text: Option<String> = None;
    let mut name: Option<String> = None;
    let mut expression: Option<String> = None;

    for attr in entry.attributes() {
        let attr = attr
            .map_err(|e| ColumnsError::invalid_persisted_state(format!("malformed column attribute: {}", e)))?;
        let value = attr
            .unescape_value()
            .map_err(|e| ColumnsError::invalid_persisted_state(format!("malformed column attribute: {}", e)))?
            .into_owned();
        match attr.key.as_ref() {
            b"id" => id_text = Some(value),
            b"name" => name = Some(value),
            b"expression" => expression = Some(value),
            _ => {}
        }
    }

    let id_text = match id_text {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            debug!("[codec] skipping column entry without id");
            return Ok(None);
        }
    };
    let id = match Uuid::parse_str(id_text.trim()) {
        Ok(id) => id,
        Err(e) => {
            debug!("[codec] skipping column entry with unparseable id '{}': {}", id_text, e);
            return Ok(None);
        }
    };

    Ok(Some(DynamicColumn {
        id,
        name: name.unwrap_or_default(),
        expression,
    }))
}

/// Serializes/deserializes the ordered column list to/from the persisted
/// settings blob keyed by a scope key.
pub struct ColumnConfigStore {
    settings: Arc<dyn SettingsStore>,
}

impl ColumnConfigStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub fn save(&self, scope_key: &str, columns: &[DynamicColumn]) -> ColumnsResult<()> {
        let document = serialize_columns(columns)?;
        self.settings.save_setting(scope_key, &document);
        Ok(())
    }

    /// Load the column list for a scope key. An absent or blank blob is an
    /// empty list, not an error.
    pub fn load(&self, scope_key: &str) -> ColumnsResult<Vec<DynamicColumn>> {
        let blob = match self.settings.load_setting(scope_key) {
            Some(blob) => blob,
            None => return Ok(Vec::new()),
        };
        if blob.trim().is_empty() {
            return Ok(Vec::new());
        }
        deserialize_columns(&blob)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod codec_tests;
