// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use icu_collator::{Collator, CollatorBorrowed};
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::{FieldPath, SortDirection, User};

/// Orders `rows` by the text at `key`, using root-locale Unicode collation.
///
/// The input is left untouched. The sort is stable and has no secondary key,
/// so rows whose keys collate equal keep their relative input order.
pub fn sort_rows<'a>(rows: &[&'a User], key: FieldPath, direction: SortDirection) -> Vec<&'a User> {
    let mut sorted = rows.to_vec();
    match root_collator() {
        Some(collator) => sorted.sort_by(|left, right| {
            directed(collator.compare(key.text(left), key.text(right)), direction)
        }),
        None => sorted.sort_by(|left, right| {
            directed(fallback_compare(key.text(left), key.text(right)), direction)
        }),
    }
    sorted
}

/// Built on first use and shared for the life of the process.
fn root_collator() -> Option<&'static CollatorBorrowed<'static>> {
    static COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();
    COLLATOR
        .get_or_init(|| match Collator::try_new(Default::default(), Default::default()) {
            Ok(collator) => Some(collator),
            Err(error) => {
                log::warn!("collation data unavailable ({error}); sorting by lower-cased text");
                None
            }
        })
        .as_ref()
}

fn directed(order: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => order,
        SortDirection::Desc => order.reverse(),
    }
}

fn fallback_compare(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}
