/// Column name constants for the published error-log sheet.
/// Lookups are case-insensitive, but these are the canonical spellings.

pub const COL_RECORD_KEY: &str = "Record Key";
pub const COL_SUBMISSION_DATE: &str = "Submission Date";
pub const COL_SURVEY: &str = "Survey";
pub const COL_SEVERITY: &str = "Severity";
pub const COL_RULE_ID: &str = "Rule ID";
pub const COL_TITLE: &str = "Title";
pub const COL_MESSAGE: &str = "Message";
pub const COL_VALUE: &str = "Value";
pub const COL_ENUMERATOR_NAME: &str = "Enumerator Name";
pub const COL_ENUMERATOR_ID: &str = "Enumerator ID";
pub const COL_DISTRICT: &str = "District";

/// Header row of the exported CSV, enumerator identity first.
pub const EXPORT_HEADERS: [&str; 11] = [
    "Enumerator ID",
    "Enumerator Name",
    "District",
    "Record Key",
    "Submission Date",
    "Survey",
    "Severity",
    "Rule ID",
    "Title",
    "Message",
    "Value",
];

// Default severity vocabularies; override in config.toml to match the sheet.
pub const DEFAULT_CRITICAL_LABELS: [&str; 3] = ["Critical", "CRITICAL", "Crit"];
pub const DEFAULT_QUALITY_FLAG_LABELS: [&str; 5] =
    ["FLAG", "Flag", "Quality Flag", "QualityFlag", "QF"];

/// How much of a failed response body is kept for diagnostics.
pub const SNIPPET_LEN: usize = 200;

/// Environment variable that overrides the configured source URL.
pub const ENV_CSV_URL: &str = "ERRLOG_CSV_URL";

/// Maximum number of hits returned by a collector search.
pub const SEARCH_LIMIT: usize = 12;
