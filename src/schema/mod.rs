//! Schema derivation: field classification, naming, table schema and the per-type model.

pub mod classify;
pub mod model;
pub mod naming;
pub mod table;

pub use classify::{classify, Classification, ClassifiedField};
pub use model::{EntityModel, SelectedField};
pub use table::{ColumnConstraint, ColumnDefinition, TableSchema};
