use ferrous_recon_application::use_cases::RunSummary;
use ferrous_recon_domain::ResolutionResult;
use std::io::Write;
use tracing::info;

/// `[CNAME, A]              www.example.com cdn.example.net, 10.0.0.2`
///
/// The type column is padded to 24 characters.
pub fn format_result(result: &ResolutionResult) -> String {
    let types: Vec<&str> = result.record_types().iter().map(|t| t.as_str()).collect();
    let mut data: Vec<&str> = Vec::with_capacity(result.answers.len());
    for answer in &result.answers {
        if !data.contains(&&*answer.data) {
            data.push(&answer.data);
        }
    }
    format!(
        "{:<24}{} {}",
        format!("[{}] ", types.join(", ")),
        result.name,
        data.join(", ")
    )
}

/// Writes one line per resolved name; a closed stdout is ignored.
pub fn print_result(out: &mut impl Write, result: &ResolutionResult) {
    let _ = writeln!(out, "{}", format_result(result));
}

pub fn log_summary(summary: &RunSummary) {
    info!(
        reason = %summary.reason,
        admitted = summary.admitted,
        resolved = summary.resolved,
        suppressed = summary.suppressed,
        rejected = summary.rejected,
        duplicates = summary.duplicates,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "Enumeration finished"
    );
}
