//! Scopus search records and the derived report rows.
//!
//! Scopus serializes repeated elements loosely: a field such as `author` or
//! `afid` is absent, a single object, or an array depending on the document.
//! [`OneOrMany`] captures that shape and [`normalize_to_sequence`] flattens it.

use crate::error::{HarvestError, Result};
use serde::{Deserialize, Serialize};

/// A field that Scopus returns either as one object or as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Absent becomes empty, a scalar becomes a one-element list, a list is kept as is.
pub fn normalize_to_sequence<T>(value: Option<&OneOrMany<T>>) -> Vec<&T> {
    match value {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items.iter().collect(),
    }
}

/// Render a JSON scalar the way it appears in reports (`"12"` and `12` both give `12`).
pub fn value_to_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => None,
        _ => Some(val.to_string()),
    }
}

/// Search parameters for one harvesting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
    start_year: i32,
    end_year: i32,
    max_items: usize,
}

impl SearchQuery {
    /// Build a query, rejecting an empty query string, an inverted year range
    /// or a zero item limit. Year values are otherwise passed through to Scopus.
    pub fn new(
        query: impl Into<String>,
        start_year: i32,
        end_year: i32,
        max_items: usize,
    ) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(HarvestError::Validation("query must not be empty".to_string()));
        }
        if start_year > end_year {
            return Err(HarvestError::Validation(format!(
                "start year {} is after end year {}",
                start_year, end_year
            )));
        }
        if max_items == 0 {
            return Err(HarvestError::Validation(
                "max items must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            query,
            start_year,
            end_year,
            max_items,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Value of the Scopus `date` parameter, e.g. `"2024-2025"`.
    pub fn date_range(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }
}

// === Scopus API Response Types ===

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "search-results", default)]
    pub(crate) search_results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(rename = "opensearch:totalResults", default)]
    pub(crate) total_results: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) entry: Vec<DocumentRecord>,
}

/// One document entry from a Scopus search page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "dc:title", default)]
    pub title: Option<String>,
    #[serde(rename = "prism:coverDate", default)]
    pub cover_date: Option<String>,
    #[serde(rename = "prism:publicationName", default)]
    pub publication_name: Option<String>,
    /// Scopus sends this as a string; numbers are accepted too.
    #[serde(rename = "citedby-count", default)]
    pub cited_by_count: Option<serde_json::Value>,
    #[serde(rename = "prism:doi", default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub link: Option<OneOrMany<Link>>,
    #[serde(default)]
    pub author: Option<OneOrMany<AuthorEntry>>,
    /// In-band marker on the placeholder entry of an empty result set.
    #[serde(default)]
    pub error: Option<String>,
}

impl DocumentRecord {
    /// True for the `{"error": "Result set was empty"}` placeholder entry.
    pub fn is_error_marker(&self) -> bool {
        self.error.is_some() && self.title.is_none()
    }

    /// `@href` of the first link whose `@ref` is `scopus`.
    pub fn scopus_link(&self) -> Option<&str> {
        normalize_to_sequence(self.link.as_ref())
            .into_iter()
            .find(|l| l.rel.as_deref() == Some("scopus"))
            .and_then(|l| l.href.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(rename = "@ref", default)]
    pub rel: Option<String>,
    #[serde(rename = "@href", default)]
    pub href: Option<String>,
}

/// Author entry as returned with view=COMPLETE.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorEntry {
    #[serde(default)]
    pub authname: Option<String>,
    #[serde(default)]
    pub authid: Option<String>,
    #[serde(default)]
    pub afid: Option<OneOrMany<AffiliationRef>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffiliationRef {
    #[serde(rename = "$", default)]
    pub id: Option<serde_json::Value>,
}

/// Report row derived from a [`DocumentRecord`].
///
/// Serialized column names follow the existing UnB/SciVal spreadsheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedRecord {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "ano")]
    pub year: String,
    /// `"Name [id]"` for each author affiliated with the institution
    #[serde(rename = "autores_unb_detalhado")]
    pub affiliated_authors: String,
    /// Bare author ids of the institutional authors
    #[serde(rename = "autores_unb_ids")]
    pub affiliated_author_ids: String,
    #[serde(rename = "todos_autores")]
    pub all_authors: String,
    #[serde(rename = "revista")]
    pub journal: String,
    #[serde(rename = "citacoes")]
    pub citations: String,
    pub doi: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_to_sequence() {
        let absent: Option<&OneOrMany<u32>> = None;
        assert!(normalize_to_sequence(absent).is_empty());

        let one = OneOrMany::One(7);
        assert_eq!(normalize_to_sequence(Some(&one)), vec![&7]);

        let many = OneOrMany::Many(vec![1, 2, 3]);
        assert_eq!(normalize_to_sequence(Some(&many)), vec![&1, &2, &3]);
    }

    #[test]
    fn test_single_author_object_deserializes() -> Result<()> {
        let doc: DocumentRecord = serde_json::from_value(json!({
            "dc:title": "Solo",
            "author": {"authname": "A", "authid": "1", "afid": {"$": "60024989"}}
        }))?;

        let authors = normalize_to_sequence(doc.author.as_ref());
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].authname.as_deref(), Some("A"));
        assert_eq!(normalize_to_sequence(authors[0].afid.as_ref()).len(), 1);
        Ok(())
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("12")), Some("12".to_string()));
        assert_eq!(value_to_string(&json!(12)), Some("12".to_string()));
        assert_eq!(value_to_string(&json!(null)), None);
    }

    #[test]
    fn test_error_marker_and_link() -> Result<()> {
        let marker: DocumentRecord = serde_json::from_value(json!({
            "@_fa": "true",
            "error": "Result set was empty"
        }))?;
        assert!(marker.is_error_marker());

        let doc: DocumentRecord = serde_json::from_value(json!({
            "dc:title": "X",
            "link": [
                {"@ref": "self", "@href": "https://api/self"},
                {"@ref": "scopus", "@href": "https://scopus/1"},
                {"@ref": "scopus", "@href": "https://scopus/2"}
            ]
        }))?;
        assert!(!doc.is_error_marker());
        assert_eq!(doc.scopus_link(), Some("https://scopus/1"));
        Ok(())
    }

    #[test]
    fn test_search_query_validation() -> Result<()> {
        let query = SearchQuery::new("AF-ID(60024989)", 2024, 2025, 5000)?;
        assert_eq!(query.date_range(), "2024-2025");
        assert_eq!(query.max_items(), 5000);

        assert!(SearchQuery::new("", 2024, 2025, 10).is_err());
        assert!(SearchQuery::new("q", 2025, 2024, 10).is_err());
        assert!(SearchQuery::new("q", 2024, 2024, 0).is_err());
        Ok(())
    }
}
