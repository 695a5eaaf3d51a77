//! Entity descriptors: the declarative field table each record type provides in place of runtime reflection.

mod value;

pub use value::{SqlType, SqlValue};

use crate::error::EntityError;
use serde::{de::DeserializeOwned, Serialize};

/// Runtime type of a record field. Only the first six map to a storage column; `Other` names anything else
/// (nested records, lists) and must be ignored for persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    BigInt,
    Boolean,
    Double,
    Uuid,
    Other(&'static str),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "String",
            FieldType::Integer => "i32",
            FieldType::BigInt => "i64",
            FieldType::Boolean => "bool",
            FieldType::Double => "f64",
            FieldType::Uuid => "Uuid",
            FieldType::Other(name) => *name,
        }
    }
}

/// Target of a foreign-key directive: `REFERENCES table (column)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

/// One field of a record type with its wire name and storage directives.
#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    /// Field identifier on the Rust struct; the column name is derived from it.
    pub name: &'static str,
    /// Name used in JSON bodies and in `expand`.
    pub wire_name: &'static str,
    pub ty: FieldType,
    pub expandable: bool,
    /// Present on the record for in-memory composition only; never read from or written to storage.
    pub ignored: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
    /// Persisted but never rendered in a response.
    pub sensitive: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, wire_name: &'static str, ty: FieldType) -> Self {
        FieldDef {
            name,
            wire_name,
            ty,
            expandable: false,
            ignored: false,
            primary_key: false,
            foreign_key: None,
            sensitive: false,
        }
    }

    pub const fn expandable(mut self) -> Self {
        self.expandable = true;
        self
    }

    pub const fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.foreign_key = Some(ForeignKey { table, column });
        self
    }

    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// A record type served as a REST resource.
///
/// `fields()` must list every field in declaration order, and the serde names of the struct must equal the
/// declared wire names. `get`/`set` give the repository positional access to persisted fields without
/// reflection; they are only called with names of non-ignored fields.
///
/// ```ignore
/// impl Entity for Project {
///     const TYPE_NAME: &'static str = "Project";
///     fn fields() -> &'static [FieldDef] { PROJECT_FIELDS }
///     fn get(&self, field: &str) -> Option<SqlValue> { ... }
///     fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> { ... }
/// }
/// ```
pub trait Entity: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Type name the table name is derived from (e.g. "TaskType" -> "task_types").
    const TYPE_NAME: &'static str;

    fn fields() -> &'static [FieldDef];

    fn get(&self, field: &str) -> Option<SqlValue>;

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError>;
}

/// Error for a `set` call naming a field the entity does not persist.
pub fn unknown_field<T: Entity>(field: &str) -> EntityError {
    EntityError::UnknownField {
        entity: T::TYPE_NAME,
        field: field.to_string(),
    }
}
