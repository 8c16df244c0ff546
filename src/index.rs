use crate::constants::SEARCH_LIMIT;
use crate::types::{Collector, CollectorKey, ErrorRecord};
use std::collections::HashSet;
use tracing::debug;

/// Build the deduplicated collector index from the loaded record set.
///
/// One entry per distinct ID-or-name key; the first record seen for a key
/// supplies the display fields and later records never overwrite them.
/// Records with neither an ID nor a name cannot be indexed and are skipped.
/// The output is sorted by enumerator name, case-insensitively, so empty
/// names sort first.
pub fn build_index(records: &[ErrorRecord]) -> Vec<Collector> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut collectors = Vec::new();

    for record in records {
        let Some(key) = CollectorKey::for_record(record) else {
            continue;
        };
        if !seen.insert(key.as_str().to_string()) {
            continue;
        }
        collectors.push(Collector {
            key,
            enumerator_id: record.enumerator_id.clone(),
            enumerator_name: record.enumerator_name.clone(),
            district: record.district.clone(),
        });
    }

    collectors.sort_by_key(|c| c.enumerator_name.to_lowercase());
    debug!("indexed {} collectors from {} records", collectors.len(), records.len());
    collectors
}

/// Case-insensitive substring search over collector IDs and names,
/// capped at `SEARCH_LIMIT` hits. An empty query matches nothing.
pub fn search<'a>(collectors: &'a [Collector], query: &str) -> Vec<&'a Collector> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    collectors
        .iter()
        .filter(|c| {
            c.enumerator_id.to_lowercase().contains(&q)
                || c.enumerator_name.to_lowercase().contains(&q)
        })
        .take(SEARCH_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, district: &str) -> ErrorRecord {
        ErrorRecord {
            record_key: String::new(),
            submission_date: String::new(),
            survey: String::new(),
            severity: String::new(),
            rule_id: String::new(),
            title: String::new(),
            message: String::new(),
            value: String::new(),
            enumerator_name: name.to_string(),
            enumerator_id: id.to_string(),
            district: district.to_string(),
        }
    }

    #[test]
    fn deduplicates_on_id_or_name_key() {
        let records = vec![
            record("E1", "Jane", "North"),
            record("E1", "Jane", "North"),
            record("", "Bob", "South"),
            record("", "Bob", "South"),
        ];
        let index = build_index(&records);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn first_seen_record_wins_display_fields() {
        let records = vec![
            record("E1", "Jane", "North"),
            record("E1", "Janet (renamed)", "South"),
        ];
        let index = build_index(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].enumerator_name, "Jane");
        assert_eq!(index[0].district, "North");
    }

    #[test]
    fn records_without_id_or_name_are_skipped() {
        let records = vec![record("", "", "Nowhere"), record("E1", "Jane", "North")];
        let index = build_index(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].enumerator_id, "E1");
    }

    #[test]
    fn index_is_sorted_by_name_case_insensitively() {
        let records = vec![
            record("E3", "charlie", ""),
            record("E1", "Alice", ""),
            record("E2", "Bob", ""),
            record("E4", "", ""),
        ];
        let index = build_index(&records);
        let names: Vec<&str> = index.iter().map(|c| c.enumerator_name.as_str()).collect();
        assert_eq!(names, vec!["", "Alice", "Bob", "charlie"]);
    }

    #[test]
    fn keys_fall_back_to_name_when_id_is_empty() {
        let records = vec![record("", "Bob", "")];
        let index = build_index(&records);
        assert_eq!(index[0].key, CollectorKey::ByName("Bob".to_string()));
    }

    #[test]
    fn search_matches_id_and_name_substrings() {
        let records = vec![
            record("EN-042", "Jane Doe", ""),
            record("EN-043", "John Roe", ""),
        ];
        let index = build_index(&records);

        let hits = search(&index, "doe");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].enumerator_name, "Jane Doe");

        let hits = search(&index, "EN-04");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn search_is_capped_and_empty_query_matches_nothing() {
        let records: Vec<ErrorRecord> =
            (0..20).map(|i| record(&format!("E{:02}", i), "Same Name", "")).collect();
        let index = build_index(&records);
        assert_eq!(index.len(), 20);

        assert_eq!(search(&index, "same").len(), SEARCH_LIMIT);
        assert!(search(&index, "  ").is_empty());
    }
}
