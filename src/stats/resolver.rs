//! Find a location's record in a freshly fetched collection.
//!
//! Records are matched on the name field the source reports (country or state), never on
//! their position in the payload: the upstream APIs reorder and insert entries freely.

use super::{
    StatsCollection, StatsError, StatsRecord,
    registry::{self, LocationKey},
};

/// Resolve `key` against `collection`.
///
/// The match is a case-insensitive, whitespace-trimmed, exact comparison with the location's
/// canonical name. A key from another source, a missing record, or more than one record with
/// the same name all yield [`StatsError::NotFound`].
pub fn resolve(collection: &StatsCollection, key: LocationKey) -> Result<&StatsRecord, StatsError> {
    let not_found = || StatsError::NotFound(key.to_string(), collection.source);

    let location = registry::get(key).filter(|l| l.source == collection.source).ok_or_else(not_found)?;

    let mut matches = collection.records.iter().filter(|r| names_match(&r.location_name, location.name));

    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record),
        _ => Err(not_found()),
    }
}

fn names_match(reported: &str, canonical: &str) -> bool {
    reported.trim().eq_ignore_ascii_case(canonical)
}

// Tests.
