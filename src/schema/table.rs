//! Table schema derived from an entity's field table, plus its CREATE TABLE statement.

use crate::entity::{Entity, FieldType, ForeignKey, SqlType};
use crate::error::SchemaError;
use crate::schema::naming::{column_name, is_valid_identifier, table_name};
use crate::sql::quoted;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    ForeignKey(ForeignKey),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub sql_type: SqlType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.constraints.iter().any(|c| matches!(c, ColumnConstraint::ForeignKey(_)))
    }

    fn ddl(&self) -> String {
        let mut def = format!("{} {}", quoted(&self.name), self.sql_type.ddl());
        for c in &self.constraints {
            match c {
                ColumnConstraint::PrimaryKey => def.push_str(" PRIMARY KEY"),
                ColumnConstraint::ForeignKey(fk) => {
                    def.push_str(&format!(" REFERENCES {} ({})", quoted(fk.table), quoted(fk.column)))
                }
            }
        }
        def
    }
}

/// Columns are in field declaration order, ignored fields excluded. Always has a primary key column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pk: usize,
}

/// Closed mapping from field types to storage types.
pub fn sql_type_of(ty: FieldType) -> Option<SqlType> {
    Some(match ty {
        FieldType::Text => SqlType::Text,
        FieldType::Integer => SqlType::Integer,
        FieldType::BigInt => SqlType::BigInt,
        FieldType::Boolean => SqlType::Boolean,
        FieldType::Double => SqlType::DoublePrecision,
        FieldType::Uuid => SqlType::Uuid,
        FieldType::Other(_) => return None,
    })
}

impl TableSchema {
    pub fn derive<T: Entity>() -> Result<Self, SchemaError> {
        let entity = T::TYPE_NAME;
        let name = table_name(entity);
        check_identifier(entity, &name)?;

        let mut columns = Vec::new();
        for def in T::fields().iter().filter(|f| !f.ignored) {
            let sql_type = sql_type_of(def.ty).ok_or(SchemaError::UnsupportedType {
                entity,
                field: def.name,
                type_name: def.ty.name(),
            })?;
            let col = column_name(def.name);
            check_identifier(entity, &col)?;

            let mut constraints = Vec::new();
            if def.primary_key {
                constraints.push(ColumnConstraint::PrimaryKey);
            }
            if let Some(fk) = def.foreign_key {
                check_identifier(entity, fk.table)?;
                check_identifier(entity, fk.column)?;
                constraints.push(ColumnConstraint::ForeignKey(fk));
            }
            columns.push(ColumnDefinition {
                name: col,
                sql_type,
                constraints,
            });
        }
        let pk = columns
            .iter()
            .position(ColumnDefinition::is_primary_key)
            .ok_or(SchemaError::MissingPrimaryKey { entity })?;
        Ok(TableSchema { name, columns, pk })
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> &ColumnDefinition {
        &self.columns[self.pk]
    }

    /// Idempotent DDL. An existing table is left as-is even if its columns differ.
    pub fn create_table_sql(&self) -> String {
        let defs: Vec<String> = self.columns.iter().map(ColumnDefinition::ddl).collect();
        format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted(&self.name), defs.join(", "))
    }
}

fn check_identifier(entity: &'static str, name: &str) -> Result<(), SchemaError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            entity,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldDef, SqlValue};
    use crate::error::EntityError;
    use crate::models::{Project, Task, TaskType};
    use crate::schema::EntityModel;
    use serde::{Deserialize, Serialize};

    macro_rules! shape {
        ($name:ident, $fields:expr) => {
            #[derive(Clone, Default, Serialize, Deserialize)]
            struct $name;

            impl Entity for $name {
                const TYPE_NAME: &'static str = stringify!($name);

                fn fields() -> &'static [FieldDef] {
                    static FIELDS: &[FieldDef] = $fields;
                    FIELDS
                }

                fn get(&self, _field: &str) -> Option<SqlValue> {
                    None
                }

                fn set(&mut self, field: &str, _value: SqlValue) -> Result<(), EntityError> {
                    Err(crate::entity::unknown_field::<Self>(field))
                }
            }
        };
    }

    shape!(
        Tagged,
        &[
            FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
            FieldDef::new("tags", "tags", FieldType::Other("Vec<String>")),
        ]
    );
    shape!(
        TaggedInMemory,
        &[
            FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
            FieldDef::new("tags", "tags", FieldType::Other("Vec<String>")).ignore(),
        ]
    );
    shape!(Keyless, &[FieldDef::new("name", "name", FieldType::Text)]);

    #[test]
    fn project_schema() {
        let s = TableSchema::derive::<Project>().unwrap();
        assert_eq!(s.name, "projects");
        let names: Vec<_> = s.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["uuid", "name", "key"]);
        assert_eq!(s.columns[0].sql_type, SqlType::Uuid);
        assert!(s.columns[0].is_primary_key());
        assert_eq!(s.columns[1].sql_type, SqlType::Text);
        assert!(s.columns[1].constraints.is_empty());
    }

    #[test]
    fn task_schema_skips_ignored_and_references_projects() {
        let s = TableSchema::derive::<Task>().unwrap();
        assert_eq!(s.name, "tasks");
        assert_eq!(s.columns.len(), 4);
        let fk = s.column("project_id").unwrap();
        assert!(fk.is_foreign_key());
        assert!(!s.primary_key().is_foreign_key());
        assert_eq!(
            fk.constraints,
            vec![ColumnConstraint::ForeignKey(ForeignKey {
                table: "projects",
                column: "uuid"
            })]
        );
        assert_eq!(s.primary_key().name, "uuid");
    }

    #[test]
    fn create_table_statement() {
        assert_eq!(
            TableSchema::derive::<Task>().unwrap().create_table_sql(),
            "CREATE TABLE IF NOT EXISTS \"tasks\" (\"uuid\" UUID PRIMARY KEY, \"summary\" TEXT, \
             \"description\" TEXT, \"project_id\" UUID REFERENCES \"projects\" (\"uuid\"))"
        );
        assert_eq!(TableSchema::derive::<TaskType>().unwrap().name, "task_types");
    }

    #[test]
    fn unsupported_types_fail_unless_ignored() {
        assert_eq!(sql_type_of(FieldType::Other("Vec<Uuid>")), None);
        assert_eq!(sql_type_of(FieldType::Double), Some(SqlType::DoublePrecision));

        let expected = SchemaError::UnsupportedType {
            entity: "Tagged",
            field: "tags",
            type_name: "Vec<String>",
        };
        assert_eq!(TableSchema::derive::<Tagged>().unwrap_err(), expected);
        assert_eq!(EntityModel::derive::<Tagged>().unwrap_err(), expected);

        let s = TableSchema::derive::<TaggedInMemory>().unwrap();
        assert_eq!(s.columns.len(), 1);
        assert!(EntityModel::derive::<TaggedInMemory>().is_ok());
    }

    #[test]
    fn table_without_primary_key_is_rejected() {
        assert_eq!(
            TableSchema::derive::<Keyless>().unwrap_err(),
            SchemaError::MissingPrimaryKey { entity: "Keyless" }
        );
    }
}
