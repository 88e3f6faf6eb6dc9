//! Cross-reference extraction
//!
//! After parsing, every function and event signature is scanned for
//! capitalized identifiers. Each one becomes a reference unless it names the
//! script itself or one of its functions or events.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Script;

static TYPE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][A-Za-z0-9_]+\b").expect("type name pattern is valid"));

/// Fill the reference sets of every function and event in `script`.
///
/// Running this more than once leaves the sets unchanged.
pub fn extract_references(script: &mut Script) {
    let excluded: HashSet<String> = std::iter::once(script.name.clone())
        .chain(script.member_names().map(str::to_string))
        .collect();

    for function in &mut script.functions {
        let signature = format!("{} {}", function.params, function.return_type);
        function.references.extend(type_names(&signature, &excluded));
    }
    for event in &mut script.events {
        event.references.extend(type_names(&event.params, &excluded));
    }
}

/// Capitalized identifiers in `text` that are not in `excluded`
pub fn type_names<'a>(
    text: &'a str,
    excluded: &'a HashSet<String>,
) -> impl Iterator<Item = String> + 'a {
    TYPE_NAME
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| !excluded.contains(*word))
        .map(str::to_string)
}
