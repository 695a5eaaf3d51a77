//! Response envelopes: resource and collection wire formats with `@links`, `@query` and `@expandable`.
//!
//! Record fields are flattened into the envelope object. Entity wire names may not start with `@`
//! (enforced at classification), so metadata keys never collide with record fields.

use crate::entity::{Entity, SqlValue};
use crate::error::AppError;
use crate::repository::{CollectionQuery, Page, ResourceQuery};
use crate::schema::EntityModel;
use serde::ser::Error as _;
use serde_json::{json, Map, Value};

/// Envelope sections selectable with `?meta=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaSection {
    None,
    All,
    Links,
    Query,
    Expandable,
}

impl MetaSection {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "none" => MetaSection::None,
            "all" => MetaSection::All,
            "links" => MetaSection::Links,
            "query" => MetaSection::Query,
            "expandable" => MetaSection::Expandable,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaQuery {
    pub meta: Vec<MetaSection>,
}

impl Default for MetaQuery {
    fn default() -> Self {
        MetaQuery {
            meta: vec![MetaSection::All],
        }
    }
}

impl MetaQuery {
    /// Comma-separated section names. Unknown names are dropped; nothing recognized means `all`.
    pub fn parse(raw: Option<&str>) -> Self {
        let meta: Vec<MetaSection> = raw
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| MetaSection::parse(s.trim()))
            .collect();
        if meta.is_empty() {
            MetaQuery::default()
        } else {
            MetaQuery { meta }
        }
    }

    /// Whether `section` is emitted: never under `none`, always under `all`, otherwise when named.
    pub fn emits(&self, section: MetaSection) -> bool {
        if self.meta.contains(&MetaSection::None) {
            return false;
        }
        self.meta.contains(&MetaSection::All) || self.meta.contains(&section)
    }
}

/// Renders envelopes for one entity mounted at `base_path` (e.g. "/v1/projects").
pub struct EnvelopeWriter<'a> {
    pub model: &'a EntityModel,
    pub base_path: &'a str,
}

impl<'a> EnvelopeWriter<'a> {
    pub fn new(model: &'a EntityModel, base_path: &'a str) -> Self {
        EnvelopeWriter { model, base_path }
    }

    pub fn write_resource<T: Entity>(
        &self,
        data: &T,
        query: &ResourceQuery,
        meta: &MetaQuery,
    ) -> Result<Value, AppError> {
        let mut out = Map::new();
        if meta.emits(MetaSection::Links) {
            out.insert("@links".into(), json!({ "self": self.item_link(data) }));
        }
        if meta.emits(MetaSection::Query) {
            out.insert("@query".into(), serde_json::to_value(query)?);
        }
        if meta.emits(MetaSection::Expandable) {
            out.insert("@expandable".into(), self.expandable(&query.expand));
        }
        out.extend(self.record_fields(data, &query.expand)?);
        Ok(Value::Object(out))
    }

    pub fn write_collection<T: Entity>(
        &self,
        page: &Page<T>,
        query: &CollectionQuery,
        meta: &MetaQuery,
    ) -> Result<Value, AppError> {
        let count = page.items.len() as i64;
        let mut out = Map::new();
        if meta.emits(MetaSection::Links) {
            let mut links = Map::new();
            links.insert("self".into(), Value::String(self.base_path.to_string()));
            if count < page.total {
                links.insert(
                    "next".into(),
                    Value::String(format!("{}?offset={}&limit={}", self.base_path, count, query.limit)),
                );
            }
            out.insert("@links".into(), Value::Object(links));
        }
        if meta.emits(MetaSection::Query) {
            out.insert("@query".into(), serde_json::to_value(query)?);
        }
        out.insert("count".into(), json!(count));
        out.insert("total".into(), json!(page.total));

        let mut results = Vec::with_capacity(page.items.len());
        for item in &page.items {
            let mut entry = Map::new();
            if meta.emits(MetaSection::Links) {
                entry.insert("@links".into(), json!({ "self": self.item_link(item) }));
            }
            if meta.emits(MetaSection::Expandable) {
                entry.insert("@expandable".into(), self.expandable(&query.expand));
            }
            entry.extend(self.record_fields(item, &query.expand)?);
            results.push(Value::Object(entry));
        }
        out.insert("results".into(), Value::Array(results));
        Ok(Value::Object(out))
    }

    fn item_link<T: Entity>(&self, data: &T) -> String {
        match data.get(self.model.primary_key().name) {
            Some(SqlValue::Uuid(id)) => format!("{}/{}", self.base_path, id),
            _ => self.base_path.to_string(),
        }
    }

    fn expandable(&self, expand: &[String]) -> Value {
        let map: Map<String, Value> = self
            .model
            .unexpanded(expand)
            .into_iter()
            .map(|w| (w.to_string(), Value::String(String::new())))
            .collect();
        Value::Object(map)
    }

    /// Serialized record minus unexpanded and sensitive fields.
    fn record_fields<T: Entity>(&self, data: &T, expand: &[String]) -> Result<Map<String, Value>, AppError> {
        let Value::Object(mut map) = serde_json::to_value(data)? else {
            return Err(AppError::Serialization(serde_json::Error::custom(format!(
                "{} did not serialize to an object",
                T::TYPE_NAME
            ))));
        };
        for wire in self.model.unexpanded(expand) {
            map.remove(wire);
        }
        for wire in self.model.classification.sensitive_wire_names() {
            map.remove(wire);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Task, User};
    use uuid::Uuid;

    fn task() -> Task {
        Task {
            uuid: Uuid::new_v4(),
            summary: "s".into(),
            description: "d".into(),
            project_id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    #[test]
    fn meta_parsing() {
        assert_eq!(MetaQuery::parse(None), MetaQuery::default());
        assert_eq!(MetaQuery::parse(Some("")), MetaQuery::default());
        assert_eq!(MetaQuery::parse(Some("bogus,,")), MetaQuery::default());
        let m = MetaQuery::parse(Some("links, query"));
        assert!(m.emits(MetaSection::Links));
        assert!(m.emits(MetaSection::Query));
        assert!(!m.emits(MetaSection::Expandable));
        let m = MetaQuery::parse(Some("all,none"));
        assert!(!m.emits(MetaSection::Links));
    }

    #[test]
    fn resource_with_all_meta() {
        let model = EntityModel::derive::<Task>().unwrap();
        let w = EnvelopeWriter::new(&model, "/v1/tasks");
        let t = task();
        let query = ResourceQuery {
            expand: vec!["summary".into()],
        };
        let body = w.write_resource(&t, &query, &MetaQuery::default()).unwrap();
        assert_eq!(body["@links"]["self"], format!("/v1/tasks/{}", t.uuid));
        assert_eq!(body["@query"], json!({ "expand": ["summary"] }));
        assert_eq!(body["@expandable"], json!({ "description": "", "project_id": "" }));
        assert_eq!(body["uuid"], t.uuid.to_string());
        assert_eq!(body["summary"], "s");
        assert!(body.get("description").is_none());
    }

    #[test]
    fn meta_none_leaves_only_record_fields() {
        let model = EntityModel::derive::<Project>().unwrap();
        let w = EnvelopeWriter::new(&model, "/v1/projects");
        let p = Project {
            uuid: Uuid::new_v4(),
            name: "n".into(),
            key: "K".into(),
        };
        let body = w
            .write_resource(&p, &ResourceQuery::default(), &MetaQuery::parse(Some("none")))
            .unwrap();
        let obj = body.as_object().unwrap();
        assert!(obj.keys().all(|k| !k.starts_with('@')));
        assert_eq!(obj.len(), 3);
    }

    #[test]
    fn sensitive_fields_are_never_rendered() {
        let model = EntityModel::derive::<User>().unwrap();
        let w = EnvelopeWriter::new(&model, "/v1/users");
        let u = User {
            uuid: Uuid::new_v4(),
            name: "a".into(),
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        let body = w.write_resource(&u, &ResourceQuery::default(), &MetaQuery::default()).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["email"], "a@b.c");
    }

    fn page_of(n: usize, total: i64) -> Page<Project> {
        Page {
            items: (0..n)
                .map(|i| Project {
                    uuid: Uuid::new_v4(),
                    name: format!("p{}", i),
                    key: String::new(),
                })
                .collect(),
            total,
        }
    }

    #[test]
    fn next_link_only_when_more_remain() {
        let model = EntityModel::derive::<Project>().unwrap();
        let w = EnvelopeWriter::new(&model, "/v1/projects");
        let query = CollectionQuery {
            limit: 2,
            offset: 0,
            expand: vec![],
        };

        let body = w.write_collection(&page_of(2, 5), &query, &MetaQuery::default()).unwrap();
        assert_eq!(body["@links"]["next"], "/v1/projects?offset=2&limit=2");
        assert_eq!(body["@query"], json!({ "limit": 2, "offset": 0 }));
        assert_eq!(body["count"], 2);
        assert_eq!(body["total"], 5);
        let first = &body["results"][0];
        assert!(first["@links"]["self"].as_str().unwrap().starts_with("/v1/projects/"));
        assert!(first.get("@query").is_none());

        let body = w.write_collection(&page_of(2, 2), &query, &MetaQuery::default()).unwrap();
        assert!(body["@links"].get("next").is_none());
    }

    #[test]
    fn collection_without_meta_keeps_counts() {
        let model = EntityModel::derive::<Project>().unwrap();
        let w = EnvelopeWriter::new(&model, "/v1/projects");
        let body = w
            .write_collection(&page_of(0, 0), &CollectionQuery::default(), &MetaQuery::parse(Some("none")))
            .unwrap();
        assert_eq!(body, json!({ "count": 0, "total": 0, "results": [] }));
    }
}
