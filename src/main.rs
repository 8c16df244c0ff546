use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{error, info};

use errlog::config::Config;
use errlog::http::ReqwestHttp;
use errlog::session::Session;
use errlog::types::Collector;
use errlog::{export, loader, logging};

#[derive(Parser)]
#[command(name = "errlog")]
#[command(about = "Enumerator error-log lookup over published spreadsheet CSV exports")]
#[command(version = "0.1.0")]
struct Cli {
    /// Override the configured source URL
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collectors found in the error log
    Collectors {
        /// Case-insensitive search over IDs and names (best 12 hits)
        #[arg(long)]
        query: Option<String>,
    },
    /// Show one collector's errors with summary stats and top issues
    Report {
        /// Collector ID or name (exact key, or a unique search hit)
        collector: String,
        /// Only errors from this survey
        #[arg(long)]
        survey: Option<String>,
        /// Only errors with this severity label
        #[arg(long)]
        severity: Option<String>,
        /// Print the report as one JSON document
        #[arg(long)]
        json: bool,
        /// Write the filtered records as CSV into the output directory
        #[arg(long)]
        export: bool,
        /// Directory for CSV exports
        #[arg(long, default_value = "output")]
        output_dir: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let quiet = matches!(&cli.command, Commands::Report { json: true, .. });

    let config = Config::load_or_default()?;
    let url = config.resolve_url(cli.url.as_deref())?;

    if !quiet {
        println!("🔄 Loading error log...");
    }
    let load = match loader::load(&ReqwestHttp, &url).await {
        Ok(load) => load,
        Err(e) => {
            error!("load failed: {}", e);
            println!("❌ Data load failed: {}", e);
            println!("   Verify the sheet is published to the web and the link opens as CSV text.");
            std::process::exit(1);
        }
    };
    if !quiet {
        println!("✅ Loaded {} record(s) from {}", load.records.len(), load.url);
    }

    let mut session = Session::new(load, config.severity_config());

    match cli.command {
        Commands::Collectors { query } => {
            let list: Vec<&Collector> = match &query {
                Some(q) => session.search(q),
                None => session.collectors().iter().collect(),
            };
            if list.is_empty() {
                println!("No match found");
            } else {
                println!("👥 {} collector(s):", list.len());
                for c in list {
                    println!(
                        "   {:<28} ID: {:<12} District: {}",
                        display_or(&c.enumerator_name, "(No Name)"),
                        display_or(&c.enumerator_id, "-"),
                        display_or(&c.district, "-"),
                    );
                }
            }
        }
        Commands::Report { collector, survey, severity, json, export: do_export, output_dir } => {
            let key = resolve_collector(&session, &collector)?;
            let selected = session
                .select(&key)
                .cloned()
                .context("selected collector vanished from the index")?;
            session.set_survey_filter(survey.clone());
            session.set_severity_filter(severity.clone());

            info!("reporting on collector key '{}'", key);
            let report = session.report().context("no collector selected")?;
            let options = session.filter_options().context("no collector selected")?;

            if json {
                let doc = serde_json::json!({
                    "collector": &selected,
                    "filters": { "survey": &survey, "severity": &severity },
                    "summary": &report.summary,
                    "top_issues": &report.top_issues,
                    "available_filters": &options,
                    "records": &report.records,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!();
                println!(
                    "👤 {} (ID: {}, District: {})",
                    display_or(&selected.enumerator_name, "(No Name)"),
                    display_or(&selected.enumerator_id, "-"),
                    display_or(&selected.district, "-"),
                );
                println!(
                    "   Filters: Survey={}, Severity={}",
                    survey.as_deref().filter(|s| !s.is_empty()).unwrap_or("All"),
                    severity.as_deref().filter(|s| !s.is_empty()).unwrap_or("All"),
                );
                println!("   Available surveys: {}", options_line(&options.surveys));
                println!("   Available severities: {}", options_line(&options.severities));
                println!();
                println!(
                    "📊 Total errors: {} | Critical: {} | Quality flags: {} | Surveys: {}",
                    report.summary.total,
                    report.summary.critical,
                    report.summary.quality_flags,
                    report.summary.surveys,
                );

                if !report.top_issues.is_empty() {
                    println!("\n🏆 Top issues:");
                    for (rank, issue) in report.top_issues.iter().enumerate() {
                        println!(
                            "   {}. {} (Rule ID: {}): {} time(s)",
                            rank + 1,
                            display_or(&issue.title, "Untitled"),
                            display_or(&issue.rule_id, "-"),
                            issue.count,
                        );
                    }
                }

                println!();
                if report.records.is_empty() {
                    println!("No errors match the current filters.");
                } else {
                    println!(
                        "   {:<12} {:<16} {:<12} {:<8} {}",
                        "Date", "Survey", "Severity", "Rule", "Title"
                    );
                    for r in &report.records {
                        println!(
                            "   {:<12} {:<16} {:<12} {:<8} {}",
                            r.submission_date, r.survey, r.severity, r.rule_id, r.title
                        );
                    }
                }
                println!("   {} record(s) shown", report.summary.total);
            }

            if do_export {
                if report.records.is_empty() {
                    println!("⚠️  No records to export");
                } else {
                    let csv = export::to_csv(&selected, &report.records);
                    let filename = export::suggested_filename(
                        &selected,
                        survey.as_deref(),
                        severity.as_deref(),
                    );
                    let path = export::write_csv(Path::new(&output_dir), &filename, &csv)?;
                    println!(
                        "💾 Exported {} record(s) to {}",
                        report.records.len(),
                        path.display()
                    );
                }
            }
        }
    }

    Ok(())
}

/// Resolve a CLI argument to a collector key: exact key match first, then a
/// unique search hit. Ambiguity lists the candidates and fails.
fn resolve_collector(session: &Session, wanted: &str) -> anyhow::Result<String> {
    if let Some(c) = session.collectors().iter().find(|c| c.key.as_str() == wanted) {
        return Ok(c.key.as_str().to_string());
    }

    let hits = session.search(wanted);
    match hits.len() {
        0 => anyhow::bail!("No match found for '{}'", wanted),
        1 => Ok(hits[0].key.as_str().to_string()),
        n => {
            println!("⚠️  '{}' matches {} collectors:", wanted, n);
            for c in &hits {
                println!(
                    "   {} (ID: {})",
                    display_or(&c.enumerator_name, "(No Name)"),
                    display_or(&c.enumerator_id, "-"),
                );
            }
            anyhow::bail!("refine the query or pass an exact collector ID")
        }
    }
}

/// Render a filter option list with the implicit "All" choice first.
fn options_line(values: &[String]) -> String {
    if values.is_empty() {
        "All".to_string()
    } else {
        format!("All, {}", values.join(", "))
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
