use crate::types::{Collector, ErrorRecord, SeverityClass, SeverityConfig};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// How many issue groups the ranking keeps.
const TOP_ISSUE_COUNT: usize = 3;

/// Optional exact-match narrowing applied on top of collector ownership.
/// `None` and an empty string both mean "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub survey: Option<String>,
    pub severity: Option<String>,
}

impl Filters {
    fn survey_filter(&self) -> Option<&str> {
        self.survey.as_deref().filter(|s| !s.is_empty())
    }

    fn severity_filter(&self) -> Option<&str> {
        self.severity.as_deref().filter(|s| !s.is_empty())
    }
}

/// Summary counts over the filtered record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub critical: usize,
    pub quality_flags: usize,
    /// Distinct non-empty survey values present.
    pub surveys: usize,
}

/// One (rule, title) group in the most-frequent-issue ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCount {
    pub rule_id: String,
    pub title: String,
    pub count: usize,
}

/// Derived view for one collector under the active filters. Recomputed on
/// every call; the engine holds no state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub records: Vec<ErrorRecord>,
    pub summary: Summary,
    pub top_issues: Vec<IssueCount>,
}

/// Distinct filter values available for a collector, always derived from
/// the collector's full unfiltered record set so one active filter never
/// narrows the other's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub surveys: Vec<String>,
    pub severities: Vec<String>,
}

/// Produce the filtered record set, summary counts and top-issue ranking
/// for a collector. Pure over its inputs and callable repeatedly.
pub fn report(
    records: &[ErrorRecord],
    collector: &Collector,
    filters: &Filters,
    severity_config: &SeverityConfig,
) -> ErrorReport {
    let survey_filter = filters.survey_filter();
    let severity_filter = filters.severity_filter();

    let mut matching: Vec<ErrorRecord> = records
        .iter()
        .filter(|r| collector.key.matches(r))
        .filter(|r| survey_filter.map_or(true, |s| r.survey == s))
        .filter(|r| severity_filter.map_or(true, |s| r.severity == s))
        .cloned()
        .collect();

    // Plain string comparison; correct chronology relies on ISO-ordered
    // date strings in the source.
    matching.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));

    let summary = summarize(&matching, severity_config);
    let top_issues = top_issues(&matching);

    ErrorReport { records: matching, summary, top_issues }
}

/// Filter option lists for a collector, sorted ascending. Presentation
/// prepends the implicit "All" choice.
pub fn filter_options(records: &[ErrorRecord], collector: &Collector) -> FilterOptions {
    let owned: Vec<&ErrorRecord> = records.iter().filter(|r| collector.key.matches(r)).collect();

    FilterOptions {
        surveys: distinct_sorted(owned.iter().map(|r| r.survey.as_str())),
        severities: distinct_sorted(owned.iter().map(|r| r.severity.as_str())),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> =
        values.filter(|v| !v.is_empty()).map(|v| v.to_string()).collect();
    out.sort();
    out.dedup();
    out
}

fn summarize(matching: &[ErrorRecord], severity_config: &SeverityConfig) -> Summary {
    let mut critical = 0;
    let mut quality_flags = 0;
    let mut surveys = HashSet::new();

    for record in matching {
        match severity_config.classify(&record.severity) {
            SeverityClass::Critical => critical += 1,
            SeverityClass::QualityFlag => quality_flags += 1,
            SeverityClass::Other => {}
        }
        if !record.survey.is_empty() {
            surveys.insert(record.survey.as_str());
        }
    }

    Summary { total: matching.len(), critical, quality_flags, surveys: surveys.len() }
}

/// Group by (rule id, title), count, sort descending by count and keep the
/// top three. Grouping preserves first-seen order, so equal counts tie in
/// insertion order under the stable sort.
fn top_issues(matching: &[ErrorRecord]) -> Vec<IssueCount> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut counts: HashMap<(String, String), usize> = HashMap::new();

    for record in matching {
        let key = (record.rule_id.clone(), record.title.clone());
        match counts.entry(key) {
            Entry::Occupied(mut occupied) => *occupied.get_mut() += 1,
            Entry::Vacant(vacant) => {
                order.push(vacant.key().clone());
                vacant.insert(1);
            }
        }
    }

    let mut items: Vec<IssueCount> = order
        .into_iter()
        .map(|(rule_id, title)| {
            let count = counts[&(rule_id.clone(), title.clone())];
            IssueCount { rule_id, title, count }
        })
        .collect();

    items.sort_by(|a, b| b.count.cmp(&a.count));
    items.truncate(TOP_ISSUE_COUNT);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectorKey;

    fn record(
        id: &str,
        name: &str,
        date: &str,
        survey: &str,
        severity: &str,
        rule_id: &str,
        title: &str,
    ) -> ErrorRecord {
        ErrorRecord {
            record_key: format!("RK-{}-{}", rule_id, date),
            submission_date: date.to_string(),
            survey: survey.to_string(),
            severity: severity.to_string(),
            rule_id: rule_id.to_string(),
            title: title.to_string(),
            message: String::new(),
            value: String::new(),
            enumerator_name: name.to_string(),
            enumerator_id: id.to_string(),
            district: String::new(),
        }
    }

    fn collector_by_id(id: &str) -> Collector {
        Collector {
            key: CollectorKey::ById(id.to_string()),
            enumerator_id: id.to_string(),
            enumerator_name: "Jane".to_string(),
            district: String::new(),
        }
    }

    fn sample_records() -> Vec<ErrorRecord> {
        vec![
            record("E1", "Jane", "2024-01-03", "HH", "Critical", "R01", "Bad age"),
            record("E1", "Jane", "2024-01-01", "HH", "Flag", "R02", "Odd income"),
            record("E1", "Jane", "2024-01-05", "AG", "Critical", "R01", "Bad age"),
            record("E2", "Bob", "2024-01-02", "HH", "Critical", "R01", "Bad age"),
        ]
    }

    #[test]
    fn matching_records_are_the_collectors_sorted_descending() {
        let records = sample_records();
        let report = report(
            &records,
            &collector_by_id("E1"),
            &Filters::default(),
            &SeverityConfig::default(),
        );

        let dates: Vec<&str> =
            report.records.iter().map(|r| r.submission_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-03", "2024-01-01"]);
        assert!(report.records.iter().all(|r| r.enumerator_id == "E1"));
    }

    #[test]
    fn name_keyed_collector_matches_by_name_alone() {
        let records = vec![
            record("", "Jane", "2024-01-01", "HH", "Flag", "R02", "Odd income"),
            record("E9", "Jane", "2024-01-02", "HH", "Flag", "R02", "Odd income"),
            record("", "Bob", "2024-01-03", "HH", "Flag", "R02", "Odd income"),
        ];
        let collector = Collector {
            key: CollectorKey::ByName("Jane".to_string()),
            enumerator_id: String::new(),
            enumerator_name: "Jane".to_string(),
            district: String::new(),
        };

        let report =
            report(&records, &collector, &Filters::default(), &SeverityConfig::default());
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn survey_and_severity_filters_are_exact_and_independent() {
        let records = sample_records();
        let collector = collector_by_id("E1");
        let config = SeverityConfig::default();

        let by_survey = report(
            &records,
            &collector,
            &Filters { survey: Some("HH".to_string()), severity: None },
            &config,
        );
        assert_eq!(by_survey.summary.total, 2);

        let by_both = report(
            &records,
            &collector,
            &Filters { survey: Some("HH".to_string()), severity: Some("Flag".to_string()) },
            &config,
        );
        assert_eq!(by_both.summary.total, 1);
        assert_eq!(by_both.records[0].rule_id, "R02");

        // An empty filter string means "all", same as None.
        let empty = report(
            &records,
            &collector,
            &Filters { survey: Some(String::new()), severity: None },
            &config,
        );
        assert_eq!(empty.summary.total, 3);
    }

    #[test]
    fn summary_counts_follow_the_configured_label_sets() {
        let records = vec![
            record("E1", "Jane", "2024-01-01", "HH", "Critical", "R01", "Bad age"),
            record("E1", "Jane", "2024-01-02", "HH", "Flag", "R02", "Odd income"),
        ];
        let report = report(
            &records,
            &collector_by_id("E1"),
            &Filters::default(),
            &SeverityConfig::default(),
        );

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.quality_flags, 1);
        assert_eq!(report.summary.surveys, 1);
        assert_eq!(report.top_issues.len(), 2);
    }

    #[test]
    fn unknown_severities_count_toward_total_only() {
        let records =
            vec![record("E1", "Jane", "2024-01-01", "HH", "Weird", "R01", "Bad age")];
        let report = report(
            &records,
            &collector_by_id("E1"),
            &Filters::default(),
            &SeverityConfig::default(),
        );

        assert_eq!(report.summary.total, 1);
        assert_eq!(report.summary.critical, 0);
        assert_eq!(report.summary.quality_flags, 0);
    }

    #[test]
    fn top_issues_ranks_by_count_and_keeps_three() {
        let mut records = Vec::new();
        for (rule, title, n) in
            [("R01", "A", 4), ("R02", "B", 3), ("R03", "C", 2), ("R04", "D", 1)]
        {
            for i in 0..n {
                records.push(record(
                    "E1",
                    "Jane",
                    &format!("2024-01-{:02}", i + 1),
                    "HH",
                    "Flag",
                    rule,
                    title,
                ));
            }
        }

        let report = report(
            &records,
            &collector_by_id("E1"),
            &Filters::default(),
            &SeverityConfig::default(),
        );

        assert_eq!(report.top_issues.len(), 3);
        let counts: Vec<usize> = report.top_issues.iter().map(|i| i.count).collect();
        assert_eq!(counts, vec![4, 3, 2]);
        let summed: usize = counts.iter().sum();
        assert!(summed <= report.summary.total);
    }

    #[test]
    fn same_rule_with_different_titles_groups_separately() {
        let records = vec![
            record("E1", "Jane", "2024-01-01", "HH", "Flag", "R01", "Title A"),
            record("E1", "Jane", "2024-01-02", "HH", "Flag", "R01", "Title B"),
        ];
        let report = report(
            &records,
            &collector_by_id("E1"),
            &Filters::default(),
            &SeverityConfig::default(),
        );
        assert_eq!(report.top_issues.len(), 2);
    }

    #[test]
    fn engine_is_idempotent_for_identical_inputs() {
        let records = sample_records();
        let collector = collector_by_id("E1");
        let filters = Filters { survey: Some("HH".to_string()), severity: None };
        let config = SeverityConfig::default();

        let first = report(&records, &collector, &filters, &config);
        let second = report(&records, &collector, &filters, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn filter_options_come_from_the_unfiltered_set_sorted() {
        let records = sample_records();
        let options = filter_options(&records, &collector_by_id("E1"));

        assert_eq!(options.surveys, vec!["AG", "HH"]);
        assert_eq!(options.severities, vec!["Critical", "Flag"]);
    }

    #[test]
    fn filter_options_drop_empty_values() {
        let records = vec![
            record("E1", "Jane", "2024-01-01", "", "", "R01", "A"),
            record("E1", "Jane", "2024-01-02", "HH", "Flag", "R02", "B"),
        ];
        let options = filter_options(&records, &collector_by_id("E1"));
        assert_eq!(options.surveys, vec!["HH"]);
        assert_eq!(options.severities, vec!["Flag"]);
    }
}
