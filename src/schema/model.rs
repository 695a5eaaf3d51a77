//! Resolved entity model: classification and table schema derived once per record type.

use crate::entity::{Entity, SqlType};
use crate::error::SchemaError;
use crate::schema::classify::{classify, Classification, ClassifiedField};
use crate::schema::table::TableSchema;

/// A field selected for a read, paired with its column. Field-set order is select-list order.
#[derive(Clone, Copy, Debug)]
pub struct SelectedField<'a> {
    pub field: &'a ClassifiedField,
    pub sql_type: SqlType,
}

impl SelectedField<'_> {
    pub fn column(&self) -> &str {
        &self.field.column
    }
}

#[derive(Clone, Debug)]
pub struct EntityModel {
    pub classification: Classification,
    pub schema: TableSchema,
    pk: usize,
}

impl EntityModel {
    pub fn derive<T: Entity>() -> Result<Self, SchemaError> {
        let classification = classify::<T>()?;
        let schema = TableSchema::derive::<T>()?;
        let pk = classification
            .fields
            .iter()
            .position(|f| f.primary_key)
            .ok_or(SchemaError::MissingPrimaryKey { entity: T::TYPE_NAME })?;
        Ok(EntityModel {
            classification,
            schema,
            pk,
        })
    }

    pub fn entity(&self) -> &'static str {
        self.classification.entity
    }

    pub fn primary_key(&self) -> &ClassifiedField {
        &self.classification.fields[self.pk]
    }

    /// Every persisted field, in column order.
    pub fn all_fields(&self) -> Vec<SelectedField<'_>> {
        self.select(|_| true)
    }

    /// Fields for a read: all non-expandable fields plus the expandable ones named in `expand`.
    pub fn field_set(&self, expand: &[String]) -> Result<Vec<SelectedField<'_>>, SchemaError> {
        let fields = self.select(|f| !f.expandable || expand.iter().any(|e| e == f.wire_name));
        if fields.is_empty() {
            return Err(SchemaError::EmptyFieldSet {
                entity: self.entity(),
            });
        }
        Ok(fields)
    }

    /// Expandable wire names not present in `expand`.
    pub fn unexpanded(&self, expand: &[String]) -> Vec<&'static str> {
        self.classification
            .expandable()
            .into_iter()
            .filter(|f| !f.sensitive && !expand.iter().any(|e| e == f.wire_name))
            .map(|f| f.wire_name)
            .collect()
    }

    pub fn expandable_wire_names(&self) -> Vec<String> {
        self.classification
            .expandable()
            .into_iter()
            .map(|f| f.wire_name.to_string())
            .collect()
    }

    fn select(&self, keep: impl Fn(&ClassifiedField) -> bool) -> Vec<SelectedField<'_>> {
        // classification.fields and schema.columns are both persisted fields in declaration order
        self.classification
            .fields
            .iter()
            .zip(&self.schema.columns)
            .filter(|(f, _)| keep(f))
            .map(|(field, col)| SelectedField {
                field,
                sql_type: col.sql_type,
            })
            .collect()
    }
}
