//! Domain records served by the bundled server: projects, tasks, users, statuses and task types.

use crate::entity::{unknown_field, Entity, FieldDef, FieldType, SqlValue};
use crate::error::EntityError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub uuid: Uuid,
    pub name: String,
    /// Short human-readable key. Not guaranteed to be unique.
    pub key: String,
}

static PROJECT_FIELDS: &[FieldDef] = &[
    FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
    FieldDef::new("name", "name", FieldType::Text),
    FieldDef::new("key", "key", FieldType::Text),
];

impl Entity for Project {
    const TYPE_NAME: &'static str = "Project";

    fn fields() -> &'static [FieldDef] {
        PROJECT_FIELDS
    }

    fn get(&self, field: &str) -> Option<SqlValue> {
        Some(match field {
            "uuid" => self.uuid.into(),
            "name" => self.name.clone().into(),
            "key" => self.key.clone().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> {
        match field {
            "uuid" => self.uuid = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "key" => self.key = value.try_into()?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
}

static STATUS_FIELDS: &[FieldDef] = &[
    FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
    FieldDef::new("name", "name", FieldType::Text),
    FieldDef::new("description", "description", FieldType::Text),
];

impl Entity for Status {
    const TYPE_NAME: &'static str = "Status";

    fn fields() -> &'static [FieldDef] {
        STATUS_FIELDS
    }

    fn get(&self, field: &str) -> Option<SqlValue> {
        Some(match field {
            "uuid" => self.uuid.into(),
            "name" => self.name.clone().into(),
            "description" => self.description.clone().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> {
        match field {
            "uuid" => self.uuid = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "description" => self.description = value.try_into()?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }
}

/// Defines how a family of tasks is handled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskType {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
}

static TASK_TYPE_FIELDS: &[FieldDef] = &[
    FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
    FieldDef::new("name", "name", FieldType::Text),
    FieldDef::new("description", "description", FieldType::Text),
];

impl Entity for TaskType {
    const TYPE_NAME: &'static str = "TaskType";

    fn fields() -> &'static [FieldDef] {
        TASK_TYPE_FIELDS
    }

    fn get(&self, field: &str) -> Option<SqlValue> {
        Some(match field {
            "uuid" => self.uuid.into(),
            "name" => self.name.clone().into(),
            "description" => self.description.clone().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> {
        match field {
            "uuid" => self.uuid = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "description" => self.description = value.try_into()?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }
}

/// A task: everything but the id is returned only on `expand`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub uuid: Uuid,
    pub summary: String,
    pub description: String,
    pub project_id: Uuid,
    /// Populated by callers composing responses; never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Box<Status>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
}

static TASK_FIELDS: &[FieldDef] = &[
    FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
    FieldDef::new("summary", "summary", FieldType::Text).expandable(),
    FieldDef::new("description", "description", FieldType::Text).expandable(),
    FieldDef::new("project_id", "project_id", FieldType::Uuid)
        .expandable()
        .references("projects", "uuid"),
    FieldDef::new("status", "status", FieldType::Other("Status"))
        .expandable()
        .ignore(),
    FieldDef::new("project", "project", FieldType::Other("Project"))
        .expandable()
        .ignore(),
];

impl Entity for Task {
    const TYPE_NAME: &'static str = "Task";

    fn fields() -> &'static [FieldDef] {
        TASK_FIELDS
    }

    fn get(&self, field: &str) -> Option<SqlValue> {
        Some(match field {
            "uuid" => self.uuid.into(),
            "summary" => self.summary.clone().into(),
            "description" => self.description.clone().into(),
            "project_id" => self.project_id.into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> {
        match field {
            "uuid" => self.uuid = value.try_into()?,
            "summary" => self.summary = value.try_into()?,
            "description" => self.description = value.try_into()?,
            "project_id" => self.project_id = value.try_into()?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
}

static USER_FIELDS: &[FieldDef] = &[
    FieldDef::new("uuid", "uuid", FieldType::Uuid).primary_key(),
    FieldDef::new("name", "name", FieldType::Text),
    FieldDef::new("email", "email", FieldType::Text),
    FieldDef::new("password", "password", FieldType::Text).sensitive(),
];

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn fields() -> &'static [FieldDef] {
        USER_FIELDS
    }

    fn get(&self, field: &str) -> Option<SqlValue> {
        Some(match field {
            "uuid" => self.uuid.into(),
            "name" => self.name.clone().into(),
            "email" => self.email.clone().into(),
            "password" => self.password.clone().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: SqlValue) -> Result<(), EntityError> {
        match field {
            "uuid" => self.uuid = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "email" => self.email = value.try_into()?,
            "password" => self.password = value.try_into()?,
            _ => return Err(unknown_field::<Self>(field)),
        }
        Ok(())
    }
}
