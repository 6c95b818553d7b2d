//! Static table of every location the bot can report on.
//!
//! Each entry ties a recognizer intent to a stable [`LocationKey`], the name the location
//! carries in its source collection, and that source. Supporting a new location means adding
//! a row here and nothing else.

use std::{collections::HashMap, fmt, sync::OnceLock};

use super::StatsSource;

// Types.

/// Stable identifier for a country (ISO 3166-1 alpha-2), a US state or territory (`US-xx`),
/// or the worldwide aggregate (`Global`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey(&'static str);

impl LocationKey {
    pub const fn new(key: &'static str) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A supported location.
#[derive(Debug, PartialEq, Eq)]
pub struct Location {
    /// Intent name the recognizer emits for this location.
    pub intent: &'static str,
    /// Stable key.
    pub key: LocationKey,
    /// Name the location carries in its source collection.
    pub name: &'static str,
    /// Collection the location's record lives in.
    pub source: StatsSource,
}

const fn country(intent: &'static str, key: &'static str, name: &'static str) -> Location {
    Location {
        intent,
        key: LocationKey::new(key),
        name,
        source: StatsSource::GlobalSummary,
    }
}

const fn state(intent: &'static str, key: &'static str, name: &'static str) -> Location {
    Location {
        intent,
        key: LocationKey::new(key),
        name,
        source: StatsSource::UsStates,
    }
}

/// Key of the worldwide aggregate.
pub const GLOBAL: LocationKey = LocationKey::new("Global");

/// Record name under which the worldwide aggregate is stored in the global summary.
pub const GLOBAL_RECORD_NAME: &str = "Global";

static LOCATIONS: &[Location] = &[
    // Worldwide.
    country("WorldCovid19", "Global", GLOBAL_RECORD_NAME),
    // Countries.
    country("Covid19US", "US", "United States of America"),
    country("Covid19India", "IN", "India"),
    country("Covid19China", "CN", "China"),
    country("Covid19Russia", "RU", "Russian Federation"),
    country("Covid19UK", "GB", "United Kingdom"),
    country("Covid19France", "FR", "France"),
    country("Covid19Spain", "ES", "Spain"),
    country("Covid19Germany", "DE", "Germany"),
    country("Covid19Japan", "JP", "Japan"),
    country("Covid19Italy", "IT", "Italy"),
    country("Covid19Iran", "IR", "Iran, Islamic Republic of"),
    country("Covid19Turkey", "TR", "Turkey"),
    country("Covid19Brazil", "BR", "Brazil"),
    country("Covid19Egypt", "EG", "Egypt"),
    country("Covid19Portugal", "PT", "Portugal"),
    country("Covid19Afghanistan", "AF", "Afghanistan"),
    country("Covid19Canada", "CA", "Canada"),
    country("Covid19Korea", "KR", "Korea (South)"),
    country("Covid19Argentina", "AR", "Argentina"),
    country("Covid19Israel", "IL", "Israel"),
    country("Covid19Mexico", "MX", "Mexico"),
    // US states and territories.
    state("Covid19California", "US-CA", "California"),
    state("Texas", "US-TX", "Texas"),
    state("Florida", "US-FL", "Florida"),
    state("New York", "US-NY", "New York"),
    state("Georgia", "US-GA", "Georgia"),
    state("Illinois", "US-IL", "Illinois"),
    state("Arizona", "US-AZ", "Arizona"),
    state("New Jersey", "US-NJ", "New Jersey"),
    state("North Carolina", "US-NC", "North Carolina"),
    state("Tennessee", "US-TN", "Tennessee"),
    state("Louisiana", "US-LA", "Louisiana"),
    state("Pennsylvania", "US-PA", "Pennsylvania"),
    state("Massachusetts", "US-MA", "Massachusetts"),
    state("Alabama", "US-AL", "Alabama"),
    state("Ohio", "US-OH", "Ohio"),
    state("Virginia", "US-VA", "Virginia"),
    state("South Carolina", "US-SC", "South Carolina"),
    state("Michigan", "US-MI", "Michigan"),
    state("Maryland", "US-MD", "Maryland"),
    state("Indiana", "US-IN", "Indiana"),
    state("Mississippi", "US-MS", "Mississippi"),
    state("Missouri", "US-MO", "Missouri"),
    state("Washington", "US-WA", "Washington"),
    state("Wisconsin", "US-WI", "Wisconsin"),
    state("Minnesota", "US-MN", "Minnesota"),
    state("Nevada", "US-NV", "Nevada"),
    state("Iowa", "US-IA", "Iowa"),
    state("Arkansas", "US-AR", "Arkansas"),
    state("Colorado", "US-CO", "Colorado"),
    state("Oklahoma", "US-OK", "Oklahoma"),
    state("Connecticut", "US-CT", "Connecticut"),
    state("Utah", "US-UT", "Utah"),
    state("Kentucky", "US-KY", "Kentucky"),
    state("Kansas", "US-KS", "Kansas"),
    state("Nebraska", "US-NE", "Nebraska"),
    state("Idaho", "US-ID", "Idaho"),
    state("Oregon", "US-OR", "Oregon"),
    state("New Mexico", "US-NM", "New Mexico"),
    state("Rhode Island", "US-RI", "Rhode Island"),
    state("Delaware", "US-DE", "Delaware"),
    state("District Of Columbia", "US-DC", "District Of Columbia"),
    state("South Dakota", "US-SD", "South Dakota"),
    state("North Dakota", "US-ND", "North Dakota"),
    state("West Virginia", "US-WV", "West Virginia"),
    state("Hawaii", "US-HI", "Hawaii"),
    state("New Hampshire", "US-NH", "New Hampshire"),
    state("Montana", "US-MT", "Montana"),
    state("Alaska", "US-AK", "Alaska"),
    state("Maine", "US-ME", "Maine"),
    state("Wyoming", "US-WY", "Wyoming"),
    state("Vermont", "US-VT", "Vermont"),
    state("Guam", "US-GU", "Guam"),
];

static BY_INTENT: OnceLock<HashMap<&'static str, &'static Location>> = OnceLock::new();
static BY_KEY: OnceLock<HashMap<LocationKey, &'static Location>> = OnceLock::new();

// Lookups.

/// Every supported location, in table order.
pub fn locations() -> &'static [Location] {
    LOCATIONS
}

/// Find the location the recognizer intent refers to.
///
/// Intent names are opaque, so the match is exact.
pub fn lookup(intent: &str) -> Option<&'static Location> {
    BY_INTENT.get_or_init(|| LOCATIONS.iter().map(|l| (l.intent, l)).collect()).get(intent).copied()
}

/// Find a location by its key.
pub fn get(key: LocationKey) -> Option<&'static Location> {
    BY_KEY.get_or_init(|| LOCATIONS.iter().map(|l| (l.key, l)).collect()).get(&key).copied()
}

// Tests.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_intent_maps_to_its_own_entry() {
        for location in locations() {
            assert_eq!(lookup(location.intent), Some(location));
            assert_eq!(get(location.key), Some(location));
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        let intents = locations().iter().map(|l| l.intent).collect::<HashSet<_>>();
        let keys = locations().iter().map(|l| l.key).collect::<HashSet<_>>();
        let names = locations().iter().map(|l| (l.source, l.name.to_lowercase())).collect::<HashSet<_>>();

        assert_eq!(intents.len(), locations().len());
        assert_eq!(keys.len(), locations().len());
        assert_eq!(names.len(), locations().len());
    }

    #[test]
    fn test_covers_the_supported_locations() {
        let countries = locations().iter().filter(|l| l.source == StatsSource::GlobalSummary).count();
        let states = locations().iter().filter(|l| l.source == StatsSource::UsStates).count();

        // 21 countries plus the worldwide aggregate; 50 states plus DC and Guam.
        assert_eq!(countries, 22);
        assert_eq!(states, 52);
    }

    #[test]
    fn test_lookup_known_intents() {
        let texas = lookup("Texas").unwrap();
        assert_eq!(texas.key.as_str(), "US-TX");
        assert_eq!(texas.source, StatsSource::UsStates);

        let india = lookup("Covid19India").unwrap();
        assert_eq!(india.key.as_str(), "IN");
        assert_eq!(india.name, "India");

        let world = lookup("WorldCovid19").unwrap();
        assert_eq!(world.key, GLOBAL);
        assert_eq!(world.source, StatsSource::GlobalSummary);
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(lookup("texas").is_none());
        assert!(lookup("Covid19Atlantis").is_none());
        assert!(lookup("").is_none());
        assert!(get(LocationKey::new("US-ZZ")).is_none());
    }

    #[test]
    fn test_kansas_and_nebraska_are_distinct() {
        let kansas = lookup("Kansas").unwrap();
        let nebraska = lookup("Nebraska").unwrap();

        assert_ne!(kansas.key, nebraska.key);
        assert_ne!(kansas.name, nebraska.name);
    }
}
