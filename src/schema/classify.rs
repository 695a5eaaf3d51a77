//! Field classification: splits an entity's persisted fields into always-returned and expandable.

use crate::entity::{Entity, FieldType};
use crate::error::SchemaError;
use crate::schema::naming::column_name;
use std::collections::HashSet;

/// Prefix reserved for envelope metadata keys (`@links`, `@query`, `@expandable`).
pub const RESERVED_PREFIX: char = '@';

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedField {
    /// Field identifier used with `Entity::get` / `Entity::set`.
    pub name: &'static str,
    pub wire_name: &'static str,
    pub column: String,
    pub ty: FieldType,
    pub expandable: bool,
    pub primary_key: bool,
    pub sensitive: bool,
}

/// Persisted fields in declaration order. Ignored fields are absent.
#[derive(Clone, Debug)]
pub struct Classification {
    pub entity: &'static str,
    pub fields: Vec<ClassifiedField>,
}

impl Classification {
    pub fn fixed(&self) -> Vec<&ClassifiedField> {
        self.fields.iter().filter(|f| !f.expandable).collect()
    }

    pub fn expandable(&self) -> Vec<&ClassifiedField> {
        self.fields.iter().filter(|f| f.expandable).collect()
    }

    pub fn primary_key(&self) -> Option<&ClassifiedField> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Wire names never rendered in responses.
    pub fn sensitive_wire_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.sensitive).map(|f| f.wire_name)
    }
}

pub fn classify<T: Entity>() -> Result<Classification, SchemaError> {
    let entity = T::TYPE_NAME;
    let mut wire_names = HashSet::new();
    let mut columns = HashSet::new();
    let mut fields = Vec::new();

    for def in T::fields() {
        if def.wire_name.is_empty() {
            return Err(SchemaError::MissingWireName {
                entity,
                field: def.name,
            });
        }
        if def.wire_name.starts_with(RESERVED_PREFIX) {
            return Err(SchemaError::ReservedWireName {
                entity,
                wire_name: def.wire_name,
            });
        }
        if !wire_names.insert(def.wire_name) {
            return Err(SchemaError::DuplicateWireName {
                entity,
                wire_name: def.wire_name,
            });
        }
        if def.ignored {
            if def.primary_key {
                return Err(SchemaError::InvalidPrimaryKey {
                    entity,
                    field: def.name,
                });
            }
            continue;
        }
        let column = column_name(def.name);
        if !columns.insert(column.clone()) {
            return Err(SchemaError::DuplicateColumn { entity, column });
        }
        fields.push(ClassifiedField {
            name: def.name,
            wire_name: def.wire_name,
            column,
            ty: def.ty,
            expandable: def.expandable,
            primary_key: def.primary_key,
            sensitive: def.sensitive,
        });
    }

    let mut keys = fields.iter().filter(|f| f.primary_key);
    let pk = keys.next().ok_or(SchemaError::MissingPrimaryKey { entity })?;
    if keys.next().is_some() {
        return Err(SchemaError::MultiplePrimaryKeys { entity });
    }
    if pk.ty != FieldType::Uuid || pk.expandable {
        return Err(SchemaError::InvalidPrimaryKey {
            entity,
            field: pk.name,
        });
    }

    Ok(Classification { entity, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldDef, SqlValue};
    use crate::error::EntityError;
    use crate::models::Task;
    use serde::{Deserialize, Serialize};

    #[test]
    fn task_fields_split_by_expandability() {
        let c = classify::<Task>().unwrap();
        let fixed: Vec<_> = c.fixed().iter().map(|f| f.wire_name).collect();
        let expandable: Vec<_> = c.expandable().iter().map(|f| f.wire_name).collect();
        assert_eq!(fixed, vec!["uuid"]);
        assert_eq!(expandable, vec!["summary", "description", "project_id"]);
        // nested project/status are ignored for persistence
        assert!(c.fields.iter().all(|f| f.wire_name != "project" && f.wire_name != "status"));
        assert_eq!(c.primary_key().unwrap().column, "uuid");
    }

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

    shape!(NoKey, &[FieldDef::new("name", "name", FieldType::Text)]);
    shape!(
        TwoKeys,
        &[
            FieldDef::new("a", "a", FieldType::Uuid).primary_key(),
            FieldDef::new("b", "b", FieldType::Uuid).primary_key(),
        ]
    );
    shape!(TextKey, &[FieldDef::new("code", "code", FieldType::Text).primary_key()]);
    shape!(
        NoWire,
        &[
            FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
            FieldDef::new("summary", "", FieldType::Text).expandable(),
        ]
    );
    shape!(
        SameWire,
        &[
            FieldDef::new("uuid", "id", FieldType::Uuid).primary_key(),
            FieldDef::new("other_id", "id", FieldType::Uuid),
        ]
    );
    shape!(
        Reserved,
        &[
            FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
            FieldDef::new("links", "@links", FieldType::Text),
        ]
    );
    shape!(
        SameColumn,
        &[
            FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
            FieldDef::new("projectId", "a", FieldType::Uuid),
            FieldDef::new("project_id", "b", FieldType::Uuid),
        ]
    );

    #[test]
    fn rejects_invalid_shapes() {
        assert_eq!(
            classify::<NoKey>().unwrap_err(),
            SchemaError::MissingPrimaryKey { entity: "NoKey" }
        );
        assert_eq!(
            classify::<TwoKeys>().unwrap_err(),
            SchemaError::MultiplePrimaryKeys { entity: "TwoKeys" }
        );
        assert!(matches!(
            classify::<TextKey>().unwrap_err(),
            SchemaError::InvalidPrimaryKey { field: "code", .. }
        ));
        assert!(matches!(
            classify::<NoWire>().unwrap_err(),
            SchemaError::MissingWireName { field: "summary", .. }
        ));
        assert!(matches!(
            classify::<SameWire>().unwrap_err(),
            SchemaError::DuplicateWireName { wire_name: "id", .. }
        ));
        assert!(matches!(
            classify::<Reserved>().unwrap_err(),
            SchemaError::ReservedWireName { wire_name: "@links", .. }
        ));
        assert!(matches!(
            classify::<SameColumn>().unwrap_err(),
            SchemaError::DuplicateColumn { .. }
        ));
    }
}
