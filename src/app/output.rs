use serde::Serialize;

use crate::args::OutputFormat;
use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::AppResult;

pub(crate) fn print_outcome(outcome: &ProbeOutcome, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(outcome),
        OutputFormat::Text => {
            print_outcome_text(outcome);
            Ok(())
        }
    }
}

pub(crate) fn print_outcomes(outcomes: &[ProbeOutcome], format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(outcomes),
        OutputFormat::Text => {
            if outcomes.is_empty() {
                println!("No results recorded.");
            }
            for outcome in outcomes {
                println!(
                    "{} {} {} status={} {}ms {} bytes{}",
                    outcome.timestamp.to_rfc3339(),
                    if outcome.success { "OK  " } else { "FAIL" },
                    outcome.url,
                    outcome.status,
                    outcome.duration_ms,
                    outcome.response_size,
                    if outcome.error.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", outcome.error)
                    }
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn print_summary(summary: &LoadTestSummary, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Text => {
            print_summary_text(summary);
            Ok(())
        }
    }
}

/// Text output shows one line per summary; JSON keeps the full records.
pub(crate) fn print_summaries(
    summaries: &[LoadTestSummary],
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => print_json(summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("No load tests recorded.");
            }
            for summary in summaries {
                let rate = summary.success_rate_x100();
                println!(
                    "{} {} {} requests={} concurrency={} ok={}.{:02}% avg={:.2}ms",
                    summary.timestamp.to_rfc3339(),
                    summary.id,
                    summary.url,
                    summary.total_requests,
                    summary.concurrency,
                    rate / 100,
                    rate % 100,
                    summary.avg_response_time_ms
                );
            }
            Ok(())
        }
    }
}

fn print_outcome_text(outcome: &ProbeOutcome) {
    println!("URL: {}", outcome.url);
    println!("Status: {}", outcome.status);
    println!("Success: {}", outcome.success);
    println!("Response Time: {}ms", outcome.duration_ms);
    println!("Response Size: {} bytes", outcome.response_size);
    if !outcome.error.is_empty() {
        println!("Error: {}", outcome.error);
    }
}

fn print_summary_text(summary: &LoadTestSummary) {
    let rate = summary.success_rate_x100();
    println!("Load Test: {}", summary.id);
    println!("URL: {}", summary.url);
    println!("Total Requests: {}", summary.total_requests);
    println!("Concurrency: {}", summary.concurrency);
    println!("Successful: {}", summary.success_count);
    println!("Errors: {}", summary.error_count);
    println!("Success Rate: {}.{:02}%", rate / 100, rate % 100);
    println!("Avg Response Time: {:.2}ms", summary.avg_response_time_ms);
    println!(
        "Min/Max Response Time: {}ms / {}ms",
        summary.min_response_time_ms, summary.max_response_time_ms
    );
    println!("Total Duration: {}ms", summary.duration_ms);
    println!("Status Codes:");
    for (status, count) in &summary.status_codes {
        println!("  {}: {}", status, count);
    }
}

fn print_json<T>(value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
