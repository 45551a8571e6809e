//! Shared entities and test doubles.

#![allow(dead_code)]

use settingstore::{
    EntityDescriptor, FieldDescriptor, FieldValue, ModelError, ModelResult, SettingsEntity,
    SettingsEnum, StorageError, StorageGateway,
};
use settingstore_crypto::{CipherProvider, EncryptionProvider, EncryptorResult};
use settingstore_model::{ColumnDescriptor, ColumnValue, StoredRow, StoredValue};
use settingstore_storage::{MemoryStore, StorageResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const GENERAL: &str = "GeneralSettings";

fn unknown(entity: &str, field: &str) -> ModelError {
    ModelError::UnknownField {
        entity: entity.into(),
        field: field.into(),
    }
}

// ── Entities ─────────────────────────────────────────────────────

/// `{ Name = "Default", Count = 0 }`
#[derive(Debug, Clone, PartialEq)]
pub struct General {
    pub name: String,
    pub count: i64,
}

impl Default for General {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            count: 0,
        }
    }
}

impl SettingsEntity for General {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: GENERAL.into(),
            fields: vec![
                FieldDescriptor::text("Name").described("Display name"),
                FieldDescriptor::integer("Count"),
            ],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "Name" => Some(FieldValue::Text(self.name.clone())),
            "Count" => Some(FieldValue::Integer(self.count)),
            _ => None,
        }
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "Name" => self.name = value.into_text(name)?,
            "Count" => self.count = value.into_integer(name)?,
            _ => return Err(unknown(GENERAL, name)),
        }
        Ok(())
    }
}

/// The same table one release later: `Flag` added with default `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralWithFlag {
    pub name: String,
    pub count: i64,
    pub flag: bool,
}

impl Default for GeneralWithFlag {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            count: 0,
            flag: true,
        }
    }
}

impl SettingsEntity for GeneralWithFlag {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: GENERAL.into(),
            fields: vec![
                FieldDescriptor::text("Name"),
                FieldDescriptor::integer("Count"),
                FieldDescriptor::boolean("Flag"),
            ],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "Name" => Some(FieldValue::Text(self.name.clone())),
            "Count" => Some(FieldValue::Integer(self.count)),
            "Flag" => Some(FieldValue::Boolean(self.flag)),
            _ => None,
        }
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "Name" => self.name = value.into_text(name)?,
            "Count" => self.count = value.into_integer(name)?,
            "Flag" => self.flag = value.into_bool(name)?,
            _ => return Err(unknown(GENERAL, name)),
        }
        Ok(())
    }
}

/// The same table with `Count` removed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralNameOnly {
    pub name: String,
}

impl Default for GeneralNameOnly {
    fn default() -> Self {
        Self {
            name: "Default".into(),
        }
    }
}

impl SettingsEntity for GeneralNameOnly {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: GENERAL.into(),
            fields: vec![FieldDescriptor::text("Name")],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        (name == "Name").then(|| FieldValue::Text(self.name.clone()))
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "Name" => self.name = value.into_text(name)?,
            _ => return Err(unknown(GENERAL, name)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Age {
    Child,
    #[default]
    Adult,
    Senior,
}

impl SettingsEnum for Age {
    const MEMBERS: &'static [&'static str] = &["Child", "Adult", "Senior"];

    fn name(&self) -> &'static str {
        match self {
            Age::Child => "Child",
            Age::Adult => "Adult",
            Age::Senior => "Senior",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Child" => Some(Age::Child),
            "Adult" => Some(Age::Adult),
            "Senior" => Some(Age::Senior),
            _ => None,
        }
    }
}

/// One field of every type.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub age: Age,
    pub ratio: f64,
    pub retries: i64,
    pub enabled: bool,
    pub label: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            age: Age::Adult,
            ratio: 0.5,
            retries: 3,
            enabled: false,
            label: "none".into(),
        }
    }
}

impl SettingsEntity for Profile {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: "ProfileSettings".into(),
            fields: vec![
                FieldDescriptor::for_enum::<Age>("Age"),
                FieldDescriptor::decimal("Ratio"),
                FieldDescriptor::integer("Retries"),
                FieldDescriptor::boolean("Enabled"),
                FieldDescriptor::text("Label"),
            ],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "Age" => Some(FieldValue::from_enum(&self.age)),
            "Ratio" => Some(FieldValue::Decimal(self.ratio)),
            "Retries" => Some(FieldValue::Integer(self.retries)),
            "Enabled" => Some(FieldValue::Boolean(self.enabled)),
            "Label" => Some(FieldValue::Text(self.label.clone())),
            _ => None,
        }
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "Age" => self.age = value.into_enum(name)?,
            "Ratio" => self.ratio = value.into_decimal(name)?,
            "Retries" => self.retries = value.into_integer(name)?,
            "Enabled" => self.enabled = value.into_bool(name)?,
            "Label" => self.label = value.into_text(name)?,
            _ => return Err(unknown("ProfileSettings", name)),
        }
        Ok(())
    }
}

/// Sensitive text and enumeration fields next to a plain one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub clearance: Age,
}

impl SettingsEntity for Credentials {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: "CredentialSettings".into(),
            fields: vec![
                FieldDescriptor::text("User"),
                FieldDescriptor::text("Password").sensitive(),
                FieldDescriptor::for_enum::<Age>("Clearance").sensitive(),
            ],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "User" => Some(FieldValue::Text(self.user.clone())),
            "Password" => Some(FieldValue::Text(self.password.clone())),
            "Clearance" => Some(FieldValue::from_enum(&self.clearance)),
            _ => None,
        }
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "User" => self.user = value.into_text(name)?,
            "Password" => self.password = value.into_text(name)?,
            "Clearance" => self.clearance = value.into_enum(name)?,
            _ => return Err(unknown("CredentialSettings", name)),
        }
        Ok(())
    }
}

/// Declares an integer as sensitive, which cannot be persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretNumber {
    pub pin: i64,
}

impl SettingsEntity for SecretNumber {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            entity_type: "SecretNumber".into(),
            fields: vec![FieldDescriptor::integer("Pin").sensitive()],
        }
    }

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        (name == "Pin").then_some(FieldValue::Integer(self.pin))
    }

    fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        match name {
            "Pin" => self.pin = value.into_integer(name)?,
            _ => return Err(unknown("SecretNumber", name)),
        }
        Ok(())
    }
}

// ── Single-field entities ────────────────────────────────────────

/// Declares an entity with one field stored in `value`. Several of these
/// share a table to model a field whose type or name changes between
/// releases.
macro_rules! single_field_entity {
    ($(#[$doc:meta])* $name:ident, $table:expr, $field:expr, $ty:ty, $descriptor:ident, $variant:ident, $into:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub value: $ty,
        }

        impl SettingsEntity for $name {
            fn descriptor() -> EntityDescriptor {
                EntityDescriptor {
                    entity_type: $table.into(),
                    fields: vec![FieldDescriptor::$descriptor($field)],
                }
            }

            fn field_value(&self, name: &str) -> Option<FieldValue> {
                (name == $field).then(|| FieldValue::$variant(self.value.clone()))
            }

            fn set_field_value(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
                if name != $field {
                    return Err(unknown($table, name));
                }
                self.value = value.$into(name)?;
                Ok(())
            }
        }
    };
}

pub const FLAG: &str = "FlagSettings";

single_field_entity!(FlagAsBool, FLAG, "Flag", bool, boolean, Boolean, into_bool);
single_field_entity!(FlagAsInteger, FLAG, "Flag", i64, integer, Integer, into_integer);
single_field_entity!(FlagAsDecimal, FLAG, "Flag", f64, decimal, Decimal, into_decimal);
single_field_entity!(FlagAsText, FLAG, "Flag", String, text, Text, into_text);

pub const ADDRESS: &str = "AddressSettings";

single_field_entity!(
    /// `Straße`: its uppercase expands, so it never matches `Strasse`.
    StreetSharpS, ADDRESS, "Straße", String, text, Text, into_text
);
single_field_entity!(StreetDoubleS, ADDRESS, "Strasse", String, text, Text, into_text);

pub const MAIL: &str = "MailSettings";

single_field_entity!(MailLower, MAIL, "émail", String, text, Text, into_text);
single_field_entity!(MailUpper, MAIL, "Émail", String, text, Text, into_text);

// ── Recording gateway ────────────────────────────────────────────

/// One call made against a [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetRow(String),
    CreateTable(String, Vec<String>),
    AddColumn(String, String),
    DropColumn(String, String),
    InsertRow(String, Vec<(String, StoredValue)>),
    DeleteAllRows(String),
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::GetRow(_))
    }
}

/// Which operation a [`RecordingGateway`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    GetRow,
    AddColumn,
    DropColumn,
    InsertRow,
}

/// In-memory gateway that records every call in order and can be told to
/// fail one kind of operation.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    store: MemoryStore,
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<FailOn>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_on(&self, op: Option<FailOn>) {
        *self.fail_on.lock().unwrap() = op;
    }

    /// The stored row without recording a call.
    pub fn peek(&self, table: &str) -> Option<StoredRow> {
        self.store.get_row(table).unwrap()
    }

    pub fn column_names(&self, table: &str) -> Vec<String> {
        self.peek(table)
            .map(|row| row.columns().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Direct access to the backing store, bypassing the recording.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: FailOn) -> StorageResult<()> {
        if *self.fail_on.lock().unwrap() == Some(op) {
            return Err(StorageError::InvalidData(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl StorageGateway for RecordingGateway {
    fn data_source(&self) -> String {
        "recording".into()
    }

    fn get_row(&self, table: &str) -> StorageResult<Option<StoredRow>> {
        self.record(Call::GetRow(table.into()));
        self.check(FailOn::GetRow)?;
        self.store.get_row(table)
    }

    fn create_table(&self, table: &str, columns: &[ColumnDescriptor]) -> StorageResult<()> {
        self.record(Call::CreateTable(
            table.into(),
            columns.iter().map(|c| c.name.clone()).collect(),
        ));
        self.store.create_table(table, columns)
    }

    fn add_column(&self, table: &str, column: &ColumnDescriptor) -> StorageResult<()> {
        self.record(Call::AddColumn(table.into(), column.name.clone()));
        self.check(FailOn::AddColumn)?;
        self.store.add_column(table, column)
    }

    fn drop_column(&self, table: &str, column: &str) -> StorageResult<()> {
        self.record(Call::DropColumn(table.into(), column.into()));
        self.check(FailOn::DropColumn)?;
        self.store.drop_column(table, column)
    }

    fn insert_row(&self, table: &str, values: &[ColumnValue]) -> StorageResult<()> {
        self.record(Call::InsertRow(
            table.into(),
            values
                .iter()
                .map(|v| (v.column.clone(), v.value.clone()))
                .collect(),
        ));
        self.check(FailOn::InsertRow)?;
        self.store.insert_row(table, values)
    }

    fn delete_all_rows(&self, table: &str) -> StorageResult<()> {
        self.record(Call::DeleteAllRows(table.into()));
        self.store.delete_all_rows(table)
    }
}

// ── Counting provider ────────────────────────────────────────────

/// Real cipher that counts its calls.
#[derive(Debug)]
pub struct CountingProvider {
    cipher: CipherProvider,
    encrypts: AtomicUsize,
    decrypts: AtomicUsize,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self {
            cipher: CipherProvider::random(),
            encrypts: AtomicUsize::new(0),
            decrypts: AtomicUsize::new(0),
        }
    }

    pub fn encrypts(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn decrypts(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.encrypts.store(0, Ordering::SeqCst);
        self.decrypts.store(0, Ordering::SeqCst);
    }
}

impl EncryptionProvider for CountingProvider {
    fn encrypt(&self, plaintext: &str) -> EncryptorResult<String> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        self.cipher.encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> EncryptorResult<String> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        self.cipher.decrypt(ciphertext)
    }
}
