use once_cell::sync::Lazy;
use regex::Regex;

static PUBLISHED_SHEET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://docs\.google\.com/spreadsheets/d/e/([a-zA-Z0-9-_]+)").unwrap()
});
static DIRECT_SHEET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://docs\.google\.com/spreadsheets/d/([a-zA-Z0-9-_]+)").unwrap()
});
static GID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"gid=([0-9]+)").unwrap());

/// Rewrite the accepted spreadsheet sharing link shapes into a canonical
/// CSV-export URL.
///
/// Total function: a URL that already carries a CSV output marker, or that
/// matches none of the known shapes, passes through unchanged. The sheet
/// tab id (`gid`) is carried over when present and defaults to `0`.
pub fn normalize(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return url.to_string();
    }

    if url.contains("output=csv") || url.contains("tqx=out:csv") {
        return url.to_string();
    }

    let gid = GID_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "0".to_string());

    // The publish-to-web /d/e/ shape also matches the direct pattern (the
    // path segment "e" is a valid id capture), so it is checked first.
    if let Some(caps) = PUBLISHED_SHEET_RE.captures(url) {
        return format!(
            "https://docs.google.com/spreadsheets/d/e/{}/pub?gid={}&single=true&output=csv",
            &caps[1], gid
        );
    }

    if let Some(caps) = DIRECT_SHEET_RE.captures(url) {
        return format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&gid={}",
            &caps[1], gid
        );
    }

    url.to_string()
}
