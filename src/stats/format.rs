//! Reply rendering for statistics.

use super::StatsRecord;

/// Render the three standard counts of `record`.
///
/// Numbers are written without separators or locale-specific formatting.
pub fn format(record: &StatsRecord) -> String {
    format!(
        "Total Confirmed: {}, Total Deaths: {}, Total Recovered: {}",
        record.confirmed, record.deaths, record.recovered
    )
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_standard_fields() {
        let record = StatsRecord::new("Anywhere", 100, 5, 50);

        assert_eq!(format(&record), "Total Confirmed: 100, Total Deaths: 5, Total Recovered: 50");
    }

    #[test]
    fn test_format_large_numbers_without_separators() {
        let record = StatsRecord::new("Global", 123_456_789, 2_700_000, 0);

        assert_eq!(format(&record), "Total Confirmed: 123456789, Total Deaths: 2700000, Total Recovered: 0");
    }
}
