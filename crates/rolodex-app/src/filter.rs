// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FieldPath, User};

/// Fields a search query is matched against.
pub const SEARCHABLE_FIELDS: [FieldPath; 5] = [
    FieldPath::Name,
    FieldPath::Username,
    FieldPath::Email,
    FieldPath::AddressCity,
    FieldPath::CompanyName,
];

/// Keeps the rows where any searchable field contains `query`, ignoring case.
///
/// An empty query keeps every row. Surviving rows stay in input order.
pub fn filter_rows<'a>(rows: &'a [User], query: &str) -> Vec<&'a User> {
    if query.is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|user| row_matches(user, &needle))
        .collect()
}

/// `needle` must already be lower-cased.
pub fn row_matches(user: &User, needle: &str) -> bool {
    SEARCHABLE_FIELDS
        .iter()
        .any(|field| field.text(user).to_lowercase().contains(needle))
}
