//! Behaviour every storage gateway must share, run against each backend.

#![allow(dead_code)]

use pretty_assertions::assert_eq;
use settingstore_model::{ColumnDescriptor, ColumnType, ColumnValue, StoredValue};
use settingstore_storage::{StorageError, StorageGateway};

pub fn general_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("Count", ColumnType::Integer),
        ColumnDescriptor::new("Name", ColumnType::Text),
    ]
}

pub fn general_values(count: i64, name: &str) -> Vec<ColumnValue> {
    vec![
        ColumnValue::new("Count", StoredValue::Integer(count)),
        ColumnValue::new("Name", StoredValue::Text(name.into())),
    ]
}

fn column_names(store: &dyn StorageGateway, table: &str) -> Vec<String> {
    store
        .get_row(table)
        .unwrap()
        .unwrap()
        .columns()
        .map(|c| c.name.clone())
        .collect()
}

pub fn missing_table_has_no_row(store: &dyn StorageGateway) {
    assert!(store.get_row("Nope").unwrap().is_none());
}

pub fn create_insert_and_read(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    store.insert_row("General", &general_values(0, "Default")).unwrap();

    let row = store.get_row("General").unwrap().unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row.get("Count"), Some(&StoredValue::Integer(0)));
    assert_eq!(row.get("Name"), Some(&StoredValue::Text("Default".into())));
    let types: Vec<ColumnType> = row.columns().map(|c| c.column_type).collect();
    assert_eq!(types, vec![ColumnType::Integer, ColumnType::Text]);
}

pub fn empty_table_reports_null_row(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    let row = store.get_row("General").unwrap().unwrap();
    assert_eq!(row.get("Count"), Some(&StoredValue::Null));
    assert_eq!(row.get("Name"), Some(&StoredValue::Null));
}

pub fn delete_then_reinsert(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    store.insert_row("General", &general_values(0, "Default")).unwrap();
    store.delete_all_rows("General").unwrap();
    store.insert_row("General", &general_values(5, "X")).unwrap();

    let row = store.get_row("General").unwrap().unwrap();
    assert_eq!(row.get("Count"), Some(&StoredValue::Integer(5)));
    assert_eq!(row.get("Name"), Some(&StoredValue::Text("X".into())));
}

pub fn second_insert_rejected(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    store.insert_row("General", &general_values(1, "a")).unwrap();
    let err = store.insert_row("General", &general_values(2, "b")).unwrap_err();
    assert!(matches!(err, StorageError::RowExists(_)), "{err}");
}

pub fn create_existing_table_rejected(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    let err = store.create_table("General", &general_columns()).unwrap_err();
    assert!(matches!(err, StorageError::TableExists(_)), "{err}");
}

pub fn add_column_keeps_row(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    store.insert_row("General", &general_values(3, "kept")).unwrap();
    store
        .add_column("General", &ColumnDescriptor::new("Flag", ColumnType::Boolean))
        .unwrap();

    let row = store.get_row("General").unwrap().unwrap();
    assert_eq!(row.get("Name"), Some(&StoredValue::Text("kept".into())));
    assert_eq!(row.get("Flag"), Some(&StoredValue::Null));
    assert_eq!(column_names(store, "General"), vec!["Count", "Name", "Flag"]);
}

pub fn boolean_and_decimal_roundtrip(store: &dyn StorageGateway) {
    store
        .create_table(
            "Typed",
            &[
                ColumnDescriptor::new("Flag", ColumnType::Boolean),
                ColumnDescriptor::new("Ratio", ColumnType::Decimal),
            ],
        )
        .unwrap();
    store
        .insert_row(
            "Typed",
            &[
                ColumnValue::new("Flag", StoredValue::Boolean(true)),
                ColumnValue::new("Ratio", StoredValue::Decimal(0.25)),
            ],
        )
        .unwrap();
    let row = store.get_row("Typed").unwrap().unwrap();
    assert!(
        matches!(
            row.get("Flag"),
            Some(StoredValue::Boolean(true) | StoredValue::Integer(1))
        ),
        "{:?}",
        row.get("Flag")
    );
    assert_eq!(row.get("Ratio"), Some(&StoredValue::Decimal(0.25)));
}

pub fn non_ascii_column_names_ignore_case(store: &dyn StorageGateway) {
    store
        .create_table("Mail", &[ColumnDescriptor::new("émail", ColumnType::Text)])
        .unwrap();
    store
        .insert_row("Mail", &[ColumnValue::new("Émail", StoredValue::Text("a@b".into()))])
        .unwrap();

    let row = store.get_row("Mail").unwrap().unwrap();
    assert_eq!(row.get("émail"), Some(&StoredValue::Text("a@b".into())));
    assert_eq!(row.get("Émail"), None);

    let err = store
        .add_column("Mail", &ColumnDescriptor::new("ÉMAIL", ColumnType::Text))
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateColumn { .. }), "{err}");

    store
        .add_column("Mail", &ColumnDescriptor::new("Straße", ColumnType::Text))
        .unwrap();
    store
        .add_column("Mail", &ColumnDescriptor::new("Strasse", ColumnType::Text))
        .unwrap();
    store.drop_column("Mail", "ÉMAIL").unwrap();
    assert_eq!(column_names(store, "Mail"), vec!["Straße", "Strasse"]);
}

pub fn duplicate_column_rejected_ignoring_case(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    let err = store
        .add_column("General", &ColumnDescriptor::new("NAME", ColumnType::Text))
        .unwrap_err();
    assert!(matches!(err, StorageError::DuplicateColumn { .. }), "{err}");
}

pub fn drop_column_removes_value(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    store.insert_row("General", &general_values(3, "x")).unwrap();
    store.drop_column("General", "count").unwrap();

    let row = store.get_row("General").unwrap().unwrap();
    assert_eq!(row.get("Count"), None);
    assert_eq!(column_names(store, "General"), vec!["Name"]);
}

pub fn drop_unknown_column_rejected(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    let err = store.drop_column("General", "Missing").unwrap_err();
    assert!(matches!(err, StorageError::UnknownColumn { .. }), "{err}");
}

pub fn insert_unknown_column_rejected(store: &dyn StorageGateway) {
    store.create_table("General", &general_columns()).unwrap();
    let err = store
        .insert_row("General", &[ColumnValue::new("Missing", StoredValue::Integer(1))])
        .unwrap_err();
    assert!(matches!(err, StorageError::UnknownColumn { .. }), "{err}");
}

pub fn operations_on_missing_table_fail(store: &dyn StorageGateway) {
    let column = ColumnDescriptor::new("A", ColumnType::Text);
    assert!(store.add_column("Nope", &column).is_err());
    assert!(store.drop_column("Nope", "A").is_err());
    assert!(store.insert_row("Nope", &[]).is_err());
    assert!(store.delete_all_rows("Nope").is_err());
}

pub fn tables_are_independent(store: &dyn StorageGateway) {
    store.create_table("First", &general_columns()).unwrap();
    store.create_table("Second", &general_columns()).unwrap();
    store.insert_row("First", &general_values(1, "one")).unwrap();

    assert_eq!(
        store.get_row("Second").unwrap().unwrap().get("Count"),
        Some(&StoredValue::Null)
    );
}

pub fn run_contract(make: impl Fn() -> Box<dyn StorageGateway>) {
    missing_table_has_no_row(make().as_ref());
    create_insert_and_read(make().as_ref());
    empty_table_reports_null_row(make().as_ref());
    delete_then_reinsert(make().as_ref());
    second_insert_rejected(make().as_ref());
    create_existing_table_rejected(make().as_ref());
    add_column_keeps_row(make().as_ref());
    boolean_and_decimal_roundtrip(make().as_ref());
    duplicate_column_rejected_ignoring_case(make().as_ref());
    non_ascii_column_names_ignore_case(make().as_ref());
    drop_column_removes_value(make().as_ref());
    drop_unknown_column_rejected(make().as_ref());
    insert_unknown_column_rejected(make().as_ref());
    operations_on_missing_table_fail(make().as_ref());
    tables_are_independent(make().as_ref());
}
