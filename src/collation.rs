//! Syntactic consistency checks for collated select queries.
//!
//! Collation groups rendered items by subclass, which only works when the
//! select query both selects the subclass variable and orders first by it.
//! These are substring/regex checks against the query text, not a full parse.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ConfigurationError;

/// The variable a collated query must select and order by.
pub const SUBCLASS_VARIABLE: &str = "?subclass";

static SELECT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bSELECT\b(.*?)\bWHERE\b").expect("select clause pattern")
});

static ORDER_FIRST_BY_SUBCLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bORDER\s+BY\s+(?:DESC\s*\(\s*)?\?subclass\b")
        .expect("order by pattern")
});

/// Check that a select query is usable for collated rendering.
///
/// Both failures are fatal for a collating model: rendering would silently
/// produce incorrect grouping, so the caller must abort construction.
pub fn check_query(query: &str) -> Result<(), ConfigurationError> {
    let selects_subclass = SELECT_CLAUSE
        .captures(query)
        .is_some_and(|caps| caps[1].contains(SUBCLASS_VARIABLE));
    if !selects_subclass {
        return Err(ConfigurationError::NoSubclassSelect {
            query: query.to_string(),
        });
    }

    if !ORDER_FIRST_BY_SUBCLASS.is_match(query) {
        return Err(ConfigurationError::NoSubclassOrder {
            query: query.to_string(),
        });
    }

    Ok(())
}
