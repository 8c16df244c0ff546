use crate::constants::EXPORT_HEADERS;
use crate::error::Result;
use crate::types::{Collector, ErrorRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__+").unwrap());

/// Render the filtered record set as a CSV document, identity columns
/// first. A value containing a comma, double quote or newline is wrapped
/// in double quotes with internal quotes doubled, so the output parses
/// back losslessly.
pub fn to_csv(collector: &Collector, records: &[ErrorRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));

    for record in records {
        let fields = [
            collector.enumerator_id.as_str(),
            collector.enumerator_name.as_str(),
            collector.district.as_str(),
            record.record_key.as_str(),
            record.submission_date.as_str(),
            record.survey.as_str(),
            record.severity.as_str(),
            record.rule_id.as_str(),
            record.title.as_str(),
            record.message.as_str(),
            record.value.as_str(),
        ];
        lines.push(fields.iter().map(|f| escape(f)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Suggested export filename: sanitized collector name, collector ID and
/// the active filter values. Runs of non-alphanumerics in the name become
/// one underscore; leftover underscore runs collapse the same way.
pub fn suggested_filename(
    collector: &Collector,
    survey: Option<&str>,
    severity: Option<&str>,
) -> String {
    let name = if collector.enumerator_name.is_empty() {
        "Enumerator"
    } else {
        collector.enumerator_name.as_str()
    };
    let safe_name = NON_ALNUM_RE.replace_all(name, "_");

    let filename = format!(
        "ErrorLog_{}_{}_Survey-{}_Severity-{}.csv",
        safe_name,
        collector.enumerator_id,
        survey.filter(|s| !s.is_empty()).unwrap_or("All"),
        severity.filter(|s| !s.is_empty()).unwrap_or("All"),
    );

    UNDERSCORE_RUN_RE.replace_all(&filename, "_").to_string()
}

/// Write an export document under `dir` (created on demand).
pub fn write_csv(dir: &Path, filename: &str, csv: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, csv)?;
    info!("exported {} bytes to {}", csv.len(), path.display());
    Ok(path)
}
