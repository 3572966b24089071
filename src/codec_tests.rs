use super::*;
use crate::settings::MemorySettingsStore;

fn sample_columns() -> Vec<DynamicColumn> {
    vec![
        DynamicColumn::new("Total", Some("{E}.amount")),
        DynamicColumn::new("Customer", Some("{E}.customer.name")),
        DynamicColumn::new("Empty", None),
    ]
}

#[test]
fn round_trip_preserves_values_and_order() {
    let columns = sample_columns();
    let document = serialize_columns(&columns).expect("serialize");
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert_eq!(loaded, columns);
}

#[test]
fn round_trip_escapes_markup_metacharacters() {
    let columns = vec![DynamicColumn::new(
        "Flag <&>",
        Some(r#"{E}.amount > 10 and {E}.note == "a < b & c""#),
    )];
    let document = serialize_columns(&columns).expect("serialize");
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert_eq!(loaded, columns);
}

#[test]
fn round_trip_empty_set() {
    let document = serialize_columns(&[]).expect("serialize");
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert!(loaded.is_empty());
}

#[test]
fn absent_expression_attribute_stays_absent() {
    let columns = vec![DynamicColumn::new("NoScript", None)];
    let document = serialize_columns(&columns).expect("serialize");
    assert!(!document.contains("expression"));
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert_eq!(loaded[0].expression, None);
}

#[test]
fn wrong_root_tag_is_invalid_persisted_state() {
    let err = deserialize_columns("<wrong><columns/></wrong>").unwrap_err();
    assert!(matches!(err, ColumnsError::InvalidPersistedState { .. }), "got {err}");
}

#[test]
fn empty_document_is_invalid_persisted_state() {
    let err = deserialize_columns("   ").unwrap_err();
    assert!(matches!(err, ColumnsError::InvalidPersistedState { .. }));
}

#[test]
fn missing_columns_container_yields_empty_set() {
    let loaded = deserialize_columns("<nxdcol/>").expect("deserialize");
    assert!(loaded.is_empty());
    let loaded = deserialize_columns("<nxdcol></nxdcol>").expect("deserialize");
    assert!(loaded.is_empty());
}

#[test]
fn entry_without_id_is_skipped() {
    let id = uuid::Uuid::new_v4();
    let document = format!(
        r#"<nxdcol><columns>
            <column name="orphan" expression="{{E}}.x"/>
            <column id="" name="blank"/>
            <column id="not-a-uuid" name="bad"/>
            <column id="{}" name="kept" expression="{{E}}.y"/>
        </columns></nxdcol>"#,
        id
    );
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, id);
    assert_eq!(loaded[0].name, "kept");
}

#[test]
fn entry_outside_columns_container_is_ignored() {
    let id = uuid::Uuid::new_v4();
    let document = format!(
        r#"<nxdcol><column id="{}" name="stray"/><columns/></nxdcol>"#,
        id
    );
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert!(loaded.is_empty());
}

#[test]
fn missing_name_defaults_to_empty() {
    let id = uuid::Uuid::new_v4();
    let document = format!(r#"<nxdcol><columns><column id="{}"/></columns></nxdcol>"#, id);
    let loaded = deserialize_columns(&document).expect("deserialize");
    assert_eq!(loaded[0].name, "");
}

#[test]
fn store_round_trip_through_settings() {
    let settings = std::sync::Arc::new(MemorySettingsStore::new());
    let store = ColumnConfigStore::new(settings.clone());
    let key = scope_key("orders", "ordersTable");

    let columns = sample_columns();
    store.save(&key, &columns).expect("save");
    let loaded = store.load(&key).expect("load");
    assert_eq!(loaded, columns);
}

#[test]
fn store_load_absent_or_blank_is_empty() {
    let settings = std::sync::Arc::new(MemorySettingsStore::new());
    let store = ColumnConfigStore::new(settings.clone());
    assert!(store.load("nxdcol_a_b").expect("load").is_empty());

    settings.save_setting("nxdcol_a_b", "   \n ");
    assert!(store.load("nxdcol_a_b").expect("load").is_empty());
}

#[test]
fn scope_key_shape() {
    assert_eq!(scope_key("orders", "ordersTable"), "nxdcol_orders_ordersTable");
}
