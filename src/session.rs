use crate::engine::{self, ErrorReport, FilterOptions, Filters};
use crate::index;
use crate::loader::LoadReport;
use crate::types::{Collector, ErrorRecord, SeverityConfig};
use tracing::debug;

/// Explicit session context: one loaded snapshot plus the ephemeral
/// selection state. Records and index are written once at construction and
/// only read afterwards; a fresh load means a fresh session.
#[derive(Debug)]
pub struct Session {
    records: Vec<ErrorRecord>,
    collectors: Vec<Collector>,
    severity_config: SeverityConfig,
    selected: Option<usize>,
    filters: Filters,
}

impl Session {
    pub fn new(load: LoadReport, severity_config: SeverityConfig) -> Self {
        let collectors = index::build_index(&load.records);
        debug!("session opened with {} records, {} collectors", load.records.len(), collectors.len());
        Self {
            records: load.records,
            collectors,
            severity_config,
            selected: None,
            filters: Filters::default(),
        }
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }

    pub fn search(&self, query: &str) -> Vec<&Collector> {
        index::search(&self.collectors, query)
    }

    /// Select the collector with this exact key string. Selecting resets
    /// both filters; a miss leaves the previous selection in place.
    pub fn select(&mut self, key: &str) -> Option<&Collector> {
        let position = self.collectors.iter().position(|c| c.key.as_str() == key)?;
        self.selected = Some(position);
        self.filters = Filters::default();
        Some(&self.collectors[position])
    }

    pub fn selected(&self) -> Option<&Collector> {
        self.selected.map(|i| &self.collectors[i])
    }

    pub fn set_survey_filter(&mut self, survey: Option<String>) {
        self.filters.survey = survey;
    }

    pub fn set_severity_filter(&mut self, severity: Option<String>) {
        self.filters.severity = severity;
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// The derived view for the current selection, or `None` when nothing
    /// is selected. Recomputed on every call.
    pub fn report(&self) -> Option<ErrorReport> {
        let collector = self.selected()?;
        Some(engine::report(&self.records, collector, &self.filters, &self.severity_config))
    }

    /// Filter choices for the current selection, from its unfiltered set.
    pub fn filter_options(&self) -> Option<FilterOptions> {
        let collector = self.selected()?;
        Some(engine::filter_options(&self.records, collector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, name: &str, date: &str, survey: &str, severity: &str) -> ErrorRecord {
        ErrorRecord {
            record_key: format!("RK-{}", date),
            submission_date: date.to_string(),
            survey: survey.to_string(),
            severity: severity.to_string(),
            rule_id: "R01".to_string(),
            title: "Bad age".to_string(),
            message: String::new(),
            value: String::new(),
            enumerator_name: name.to_string(),
            enumerator_id: id.to_string(),
            district: String::new(),
        }
    }

    fn session() -> Session {
        let load = LoadReport {
            records: vec![
                record("E1", "Jane", "2024-01-01", "HH", "Critical"),
                record("E1", "Jane", "2024-01-02", "AG", "Flag"),
                record("E2", "Bob", "2024-01-03", "HH", "Critical"),
            ],
            url: "https://example.com/export.csv".to_string(),
            fetched_at: Utc::now(),
        };
        Session::new(load, SeverityConfig::default())
    }

    #[test]
    fn no_selection_means_no_report() {
        let s = session();
        assert!(s.report().is_none());
        assert!(s.filter_options().is_none());
    }

    #[test]
    fn select_by_key_and_report() {
        let mut s = session();
        assert!(s.select("E1").is_some());

        let report = s.report().unwrap();
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.records[0].submission_date, "2024-01-02");
    }

    #[test]
    fn selecting_a_collector_resets_filters() {
        let mut s = session();
        assert!(s.select("E1").is_some());
        s.set_survey_filter(Some("HH".to_string()));
        assert_eq!(s.report().unwrap().summary.total, 1);

        assert!(s.select("E2").is_some());
        assert_eq!(s.filters(), &Filters::default());
        assert_eq!(s.report().unwrap().summary.total, 1);
    }

    #[test]
    fn unknown_key_keeps_the_previous_selection() {
        let mut s = session();
        assert!(s.select("E1").is_some());
        assert!(s.select("nope").is_none());
        assert_eq!(s.selected().unwrap().enumerator_id, "E1");
    }
}
