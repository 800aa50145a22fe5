//! `analyze` command: run the pipeline once and print the report.

use cooper_core::{AppConfig, Query};
use cooper_pipeline::{AnalysisReport, Pipeline, VideoSummary};

/// Run one analysis and print it as a table (or JSON).
///
/// # Errors
///
/// Returns an error if neither a query nor a URL is given, the query is
/// invalid, or the search provider is unavailable.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    query: Option<&str>,
    limit: usize,
    url: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let (query, url) = Query::with_direct_url(query, url, limit)?;

    let pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run(&query, url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    if report.videos.is_empty() && report.skipped.is_empty() {
        println!("no videos found for '{}'", report.query);
        return;
    }

    println!(
        "{:<24}{:<12}{:<12}{:<11}TITLE",
        "VIDEO", "EMOTION", "ENGAGEMENT", "MAGNITUDE"
    );
    for video in &report.videos {
        let rate = format!("{:.2}%", video.engagement_rate * 100.0);
        println!(
            "{:<24}{:<12}{:<12}{:<11.4}{}",
            truncate(&video.id, 22),
            video.dominant_emotion,
            rate,
            video.magnitude,
            video.title
        );
    }

    let correlated: Vec<(&str, Vec<String>)> = report
        .videos
        .iter()
        .map(|video| (video.id.as_str(), dominant_metrics(video)))
        .filter(|(_, metrics)| !metrics.is_empty())
        .collect();
    if !correlated.is_empty() {
        println!("\nCORRELATIONS (dominant emotion)");
        for (id, metrics) in correlated {
            println!("  {:<22}{}", truncate(id, 20), metrics.join("  "));
        }
    }

    if !report.insights.is_empty() {
        println!("\nINSIGHTS");
        for (rank, insight) in report.insights.iter().enumerate() {
            println!("{:>3}. {}", rank + 1, insight.text);
        }
    }

    if !report.trends.is_empty() {
        println!("\nTRENDS (emotion vs engagement rate)");
        for trend in &report.trends {
            println!(
                "  {:<10}{:>+.3}  ({} videos)",
                trend.emotion, trend.coefficient, trend.video_count
            );
        }
    }

    if !report.pr_hooks.is_empty() {
        println!("\nPR HOOKS");
        for hook in &report.pr_hooks {
            println!("  - {hook}");
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSKIPPED");
        for skip in &report.skipped {
            println!("  {} ({:?}): {}", skip.video_id, skip.stage, skip.reason);
        }
    }
}

/// Non-zero ratio metrics for the video's dominant emotion, as `name=value`.
fn dominant_metrics(video: &VideoSummary) -> Vec<String> {
    let prefix = format!("{}_", video.dominant_emotion);
    video
        .metrics
        .iter()
        .filter(|(name, value)| name.starts_with(&prefix) && value.abs() > f64::EPSILON)
        .map(|(name, value)| format!("{}={value}", &name[prefix.len()..]))
        .collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let cut: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}…")
}
