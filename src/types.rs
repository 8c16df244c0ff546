use serde::{Deserialize, Serialize};

/// One reported data-quality issue against a survey submission.
///
/// Every field is a trimmed string; a column absent from the source sheet
/// yields an empty string. Records are built in bulk at load time and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub record_key: String,
    pub submission_date: String,
    pub survey: String,
    pub severity: String,
    pub rule_id: String,
    pub title: String,
    pub message: String,
    pub value: String,
    pub enumerator_name: String,
    pub enumerator_id: String,
    pub district: String,
}

/// How a collector is identified: by stable ID when the sheet carries one,
/// by display name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectorKey {
    ById(String),
    ByName(String),
}

impl CollectorKey {
    /// Derive the key for a record. Records with neither an ID nor a name
    /// cannot be keyed at all.
    pub fn for_record(record: &ErrorRecord) -> Option<Self> {
        if !record.enumerator_id.is_empty() {
            Some(CollectorKey::ById(record.enumerator_id.clone()))
        } else if !record.enumerator_name.is_empty() {
            Some(CollectorKey::ByName(record.enumerator_name.clone()))
        } else {
            None
        }
    }

    /// Match rule: a collector keyed by ID owns exactly the records with
    /// that ID; a collector without a stable ID matches by name alone.
    pub fn matches(&self, record: &ErrorRecord) -> bool {
        match self {
            CollectorKey::ById(id) => record.enumerator_id == *id,
            CollectorKey::ByName(name) => record.enumerator_name == *name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CollectorKey::ById(id) => id,
            CollectorKey::ByName(name) => name,
        }
    }
}

/// A deduplicated collector identity derived from the record set.
/// Display fields come from the first record seen for the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    pub key: CollectorKey,
    pub enumerator_id: String,
    pub enumerator_name: String,
    pub district: String,
}

/// Classification of a severity label under a `SeverityConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityClass {
    Critical,
    QualityFlag,
    Other,
}

/// Configurable severity vocabularies. The label sets are input data to the
/// aggregation engine, never compiled into it; tests can supply arbitrary
/// vocabularies.
#[derive(Debug, Clone)]
pub struct SeverityConfig {
    critical: Vec<String>,
    quality_flags: Vec<String>,
}

impl SeverityConfig {
    pub fn new(critical: Vec<String>, quality_flags: Vec<String>) -> Self {
        Self { critical, quality_flags }
    }

    /// Exact-match classification; anything outside both sets is `Other`.
    pub fn classify(&self, severity: &str) -> SeverityClass {
        if self.critical.iter().any(|label| label == severity) {
            SeverityClass::Critical
        } else if self.quality_flags.iter().any(|label| label == severity) {
            SeverityClass::QualityFlag
        } else {
            SeverityClass::Other
        }
    }
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self::new(
            crate::constants::DEFAULT_CRITICAL_LABELS.iter().map(|s| s.to_string()).collect(),
            crate::constants::DEFAULT_QUALITY_FLAG_LABELS.iter().map(|s| s.to_string()).collect(),
        )
    }
}
