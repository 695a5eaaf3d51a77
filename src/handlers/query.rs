//! Query-string parsing for resource and collection requests.

use crate::error::AppError;
use crate::repository::{CollectionQuery, ResourceQuery};
use crate::response::MetaQuery;
use std::collections::HashMap;

/// Comma-separated wire names; blanks are dropped, never an error.
pub fn parse_expand(raw: Option<&String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_bound(params: &HashMap<String, String>, name: &str, default: i64) -> Result<i64, AppError> {
    let Some(raw) = params.get(name) else {
        return Ok(default);
    };
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be an integer, got '{}'", name, raw)))?;
    if n < 0 {
        return Err(AppError::BadRequest(format!("{} must not be negative", name)));
    }
    Ok(n)
}

pub fn resource_query(params: &HashMap<String, String>) -> ResourceQuery {
    ResourceQuery {
        expand: parse_expand(params.get("expand")),
    }
}

pub fn collection_query(params: &HashMap<String, String>) -> Result<CollectionQuery, AppError> {
    Ok(CollectionQuery {
        limit: parse_bound(params, "limit", CollectionQuery::DEFAULT_LIMIT)?,
        offset: parse_bound(params, "offset", 0)?,
        expand: parse_expand(params.get("expand")),
    })
}

pub fn meta_query(params: &HashMap<String, String>) -> MetaQuery {
    MetaQuery::parse(params.get("meta").map(String::as_str))
}
