use crate::constants::{
    COL_DISTRICT, COL_ENUMERATOR_ID, COL_ENUMERATOR_NAME, COL_MESSAGE, COL_RECORD_KEY,
    COL_RULE_ID, COL_SEVERITY, COL_SUBMISSION_DATE, COL_SURVEY, COL_TITLE, COL_VALUE,
    SNIPPET_LEN,
};
use crate::error::{ErrlogError, Result};
use crate::http::HttpClientPort;
use crate::parser::{self, RawRow};
use crate::sheets;
use crate::types::ErrorRecord;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Result of one load: the typed records plus provenance for the session.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub records: Vec<ErrorRecord>,
    /// The normalized URL the data was actually fetched from.
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch the published error log and map it into typed records.
///
/// The URL is normalized first (any accepted sharing shape resolves to a
/// CSV export). A non-success status is a fetch error carrying the status
/// and a body snippet; a success response that looks like an HTML document
/// is a format error, since the host serves an HTML login/error page when
/// the sheet is not properly published. Column presence is never required:
/// missing columns degrade to empty fields.
pub async fn load(http: &dyn HttpClientPort, url: &str) -> Result<LoadReport> {
    let normalized = sheets::normalize(url);
    info!("fetching error log from {}", normalized);

    let resp = http.get_text(&normalized).await?;
    if !(200..300).contains(&resp.status) {
        let snippet: String = resp.body.chars().take(SNIPPET_LEN).collect();
        return Err(ErrlogError::Fetch { status: resp.status, snippet });
    }

    if looks_like_html(&resp.body) {
        return Err(ErrlogError::Format(
            "re-check that the sheet is published to the web and that the link \
             opens as CSV text, not a sign-in or error page"
                .to_string(),
        ));
    }

    let rows = parser::parse(&resp.body);
    let records: Vec<ErrorRecord> = rows.iter().map(to_record).collect();

    if records.is_empty() {
        warn!("source CSV contained no data rows");
    } else {
        info!("loaded {} error records", records.len());
    }

    Ok(LoadReport { records, url: normalized, fetched_at: Utc::now() })
}

/// Heuristic for "the host returned a web page instead of CSV".
fn looks_like_html(body: &str) -> bool {
    let t = body.trim().to_lowercase();
    t.starts_with("<!doctype html")
        || t.starts_with("<html")
        || t.contains("<head")
        || t.contains("googleusercontent")
}

/// Case-insensitive column lookup; absent columns read as empty.
fn column<'a>(row: &'a RawRow, name: &str) -> &'a str {
    row.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

fn to_record(row: &RawRow) -> ErrorRecord {
    ErrorRecord {
        record_key: column(row, COL_RECORD_KEY).trim().to_string(),
        submission_date: column(row, COL_SUBMISSION_DATE).trim().to_string(),
        survey: column(row, COL_SURVEY).trim().to_string(),
        severity: column(row, COL_SEVERITY).trim().to_string(),
        rule_id: column(row, COL_RULE_ID).trim().to_string(),
        title: column(row, COL_TITLE).trim().to_string(),
        message: column(row, COL_MESSAGE).trim().to_string(),
        value: column(row, COL_VALUE).trim().to_string(),
        enumerator_name: column(row, COL_ENUMERATOR_NAME).trim().to_string(),
        enumerator_id: column(row, COL_ENUMERATOR_ID).trim().to_string(),
        district: column(row, COL_DISTRICT).trim().to_string(),
    }
}
