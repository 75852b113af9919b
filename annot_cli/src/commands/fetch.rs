use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use annot_client::AnnotationRecord;
use annot_export::{analysis, table, CsvExporter, JsonExporter, MarkdownExporter};

use crate::{prompt, session, ui};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    config_flag: Option<PathBuf>,
    context_flag: Option<String>,
    since: Option<String>,
    from: Option<String>,
    to: Option<String>,
    day: Option<String>,
    format: Option<String>,
    output_dir: PathBuf,
) -> Result<()> {
    ui::print_header("Nobl9 Annotations");

    let session = session::authenticate(config_flag, context_flag).await?;

    let (window_start, window_end) = resolve_window(since, from, to, day)?;
    if window_start > window_end {
        bail!("start time is after end time");
    }
    println!(
        "Time range: {} to {}",
        window_start.to_rfc3339_opts(SecondsFormat::Secs, true),
        window_end.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Fetching annotations...");
    spinner.enable_steady_tick(StdDuration::from_millis(120));
    let records = session.client.list_annotations(window_start, window_end).await;
    spinner.finish_and_clear();
    let records = records?;

    if records.is_empty() {
        ui::print_warning("No annotations found in the specified time range.");
        return Ok(());
    }
    ui::print_success(&format!("Found {} annotations", records.len()));

    let counts = analysis::category_counts(&records);
    ui::print_header("Annotation categories");
    for (category, count) in &counts {
        println!("  - {category}: {count} annotations");
    }

    // A format flag means non-interactive use: export everything and leave.
    if let Some(format) = format {
        let path = export(&records, &format, &output_dir, &session.context.name).await?;
        ui::print_success(&format!("Exported to {}", path.display()));
        return Ok(());
    }

    loop {
        let selected = select_categories(&counts)?;
        let filtered = analysis::filter_by_categories(&records, &selected);
        if filtered.is_empty() {
            ui::print_warning("No annotations found for the selected categories.");
            continue;
        }

        println!(
            "\nAnnotation table ({} annotations):",
            filtered.len()
        );
        println!("{}", table::render(&filtered));

        println!("\nExport options:");
        println!("  [1] CSV");
        println!("  [2] JSON (full details)");
        println!("  [3] Markdown");
        println!("  [Enter] Skip export");

        let choice = prompt::read_line("Select export format:")?;
        let format = match choice.as_str() {
            "1" => Some("csv"),
            "2" => Some("json"),
            "3" => Some("markdown"),
            _ => None,
        };
        if let Some(format) = format {
            match export(&filtered, format, &output_dir, &session.context.name).await {
                Ok(path) => ui::print_success(&format!("Exported to {}", path.display())),
                Err(e) => ui::print_error(&format!("Export failed: {e}")),
            }
        }

        println!("\nOptions:");
        println!("  [1] Select different categories");
        println!("  [2] Exit");
        if prompt::read_line("Enter choice:")? == "2" {
            return Ok(());
        }
    }
}

/// Flags first; anything unspecified falls back to the interactive menu.
fn resolve_window(
    since: Option<String>,
    from: Option<String>,
    to: Option<String>,
    day: Option<String>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let now = Utc::now();

    if let Some(since) = since {
        let window = humantime::parse_duration(&since).context("invalid --since duration")?;
        let window = Duration::from_std(window).context("--since window too large")?;
        return Ok((now - window, now));
    }

    if let Some(day) = day {
        return day_window(&day);
    }

    if let (Some(from), Some(to)) = (from, to) {
        return Ok((prompt::parse_timestamp(&from)?, prompt::parse_timestamp(&to)?));
    }

    select_window_interactive()
}

/// Expands YYYY-MM-DD to the whole day in UTC.
fn day_window(day: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .context("invalid date; use the form YYYY-MM-DD")?;
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let end = start + Duration::days(1) - Duration::seconds(1);
    Ok((start, end))
}

fn select_window_interactive() -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    loop {
        ui::print_header("Select time period");
        println!("  [1] Past 24 hours");
        println!("  [2] Past 7 days");
        println!("  [3] Past 14 days");
        println!("  [4] Past 30 days");
        println!("  [5] Specific day");
        println!("  [6] Custom range");

        let now = Utc::now();
        match prompt::read_line("Enter choice:")?.as_str() {
            "1" => return Ok((now - Duration::hours(24), now)),
            "2" => return Ok((now - Duration::days(7), now)),
            "3" => return Ok((now - Duration::days(14), now)),
            "4" => return Ok((now - Duration::days(30), now)),
            "5" => loop {
                let day = prompt::read_line("Enter date (YYYY-MM-DD):")?;
                match day_window(&day) {
                    Ok(window) => return Ok(window),
                    Err(e) => ui::print_error(&e.to_string()),
                }
            },
            "6" => {
                let start = prompt::read_timestamp("Enter start time (YYYY-MM-DDThh:mm:ssZ):")?;
                let end = prompt::read_timestamp("Enter end time (YYYY-MM-DDThh:mm:ssZ):")?;
                return Ok((start, end));
            }
            _ => ui::print_error("Invalid choice. Please enter a number between 1 and 6."),
        }
    }
}

fn select_categories(counts: &BTreeMap<String, usize>) -> Result<BTreeSet<String>> {
    let names: Vec<&String> = counts.keys().collect();
    loop {
        ui::print_header("Select annotation categories");
        println!("  [0] All categories");
        for (i, name) in names.iter().enumerate() {
            println!("  [{}] {} ({} annotations)", i + 1, name, counts[*name]);
        }
        println!("  (comma-separated numbers accepted, e.g. 1,3)");

        let raw = prompt::read_line("Enter choice:")?;
        match prompt::parse_selection(&raw, names.len()) {
            Some(indices) => {
                return Ok(indices.into_iter().map(|i| names[i].clone()).collect());
            }
            None => ui::print_error("Invalid selection."),
        }
    }
}

async fn export(
    records: &[AnnotationRecord],
    format: &str,
    dir: &Path,
    context: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .context("creating export directory")?;

    let stamp = Utc::now().format("%Y%m%d_%H%M");
    let base = dir.join(format!("annotations_{context}_{stamp}"));

    let path = match format {
        "csv" => {
            let path = base.with_extension("csv");
            CsvExporter::export(records, &path).await?;
            path
        }
        "json" => {
            let path = base.with_extension("json");
            JsonExporter::export(records, &path).await?;
            path
        }
        "markdown" | "md" => {
            let path = base.with_extension("md");
            MarkdownExporter::export(records, &path).await?;
            path
        }
        other => bail!("unknown export format '{other}' (expected csv, json, or markdown)"),
    };
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_flag_expands_to_the_whole_day() {
        let (start, end) = day_window("2025-01-27").unwrap();
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2025, 1, 27, 0, 0, 0).unwrap()
        );
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2025, 1, 27, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn day_flag_rejects_malformed_dates() {
        assert!(day_window("01-27-2025").is_err());
        assert!(day_window("2025-13-01").is_err());
        assert!(day_window("someday").is_err());
    }

    #[test]
    fn since_flag_produces_a_window_ending_now() {
        let (start, end) = resolve_window(Some("24h".to_string()), None, None, None).unwrap();
        let width = end - start;
        assert_eq!(width, Duration::hours(24));
    }

    #[test]
    fn explicit_range_is_parsed_as_rfc3339() {
        let (start, end) = resolve_window(
            None,
            Some("2025-01-27T00:00:00Z".to_string()),
            Some("2025-01-28T00:00:00Z".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(end - start, Duration::days(1));
    }
}
