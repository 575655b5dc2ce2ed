//! Author and affiliation extraction.
//!
//! Picks out the authors of a document who list the target institution among
//! their affiliation ids. Their Scopus author ids are what SciVal expects when
//! building researcher groups.

use crate::models::{normalize_to_sequence, value_to_string, AuthorEntry, DocumentRecord};

/// Display name used when an author entry has no `authname`.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const SEPARATOR: &str = "; ";

/// Author strings derived from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorSummary {
    /// Every author name, in document order
    pub all_authors: String,
    /// Institutional authors as `"Name [id]"`
    pub affiliated_detailed: String,
    /// Institutional author ids, empty ids omitted
    pub affiliated_ids: String,
}

/// Split the authors of `doc` into all names and those affiliated with `institution_id`.
///
/// A document without authors yields three empty strings.
pub fn summarize_authors(doc: &DocumentRecord, institution_id: &str) -> AuthorSummary {
    let mut all_names = Vec::new();
    let mut detailed = Vec::new();
    let mut ids = Vec::new();

    for author in normalize_to_sequence(doc.author.as_ref()) {
        let name = author.authname.as_deref().unwrap_or(UNKNOWN_AUTHOR);
        let auth_id = author.authid.as_deref().unwrap_or_default();

        all_names.push(name);

        if is_affiliated(author, institution_id) {
            detailed.push(format!("{} [{}]", name, auth_id));
            if !auth_id.is_empty() {
                ids.push(auth_id);
            }
        }
    }

    AuthorSummary {
        all_authors: all_names.join(SEPARATOR),
        affiliated_detailed: detailed.join(SEPARATOR),
        affiliated_ids: ids.join(SEPARATOR),
    }
}

/// Affiliation ids listed on an author entry. Entries without a `$` value are skipped.
pub fn affiliation_ids(author: &AuthorEntry) -> Vec<String> {
    normalize_to_sequence(author.afid.as_ref())
        .into_iter()
        .filter_map(|af| af.id.as_ref().and_then(value_to_string))
        .collect()
}

fn is_affiliated(author: &AuthorEntry, institution_id: &str) -> bool {
    affiliation_ids(author).iter().any(|id| id == institution_id)
}
