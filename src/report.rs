//! Console output for generation runs.

use crate::generator::{GenerationSummary, PartitionSource};

/// Formats seconds as `1h 02m 03s`, dropping leading zero units.
pub fn format_runtime(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Prints a summary of a plan or generate run.
///
/// Fallback runs are called out in yellow since their suites carry no
/// runtime information.
pub fn print_summary(summary: &GenerationSummary) {
    println!();
    println!(
        "Suites for {} on {}:",
        console::style(&summary.task).bold(),
        summary.variant
    );

    match &summary.source {
        PartitionSource::History => {
            println!("  Source:  {}", console::style("test history").green());
        }
        PartitionSource::Fallback(reason) => {
            println!(
                "  Source:  {} ({})",
                console::style("fallback").yellow(),
                reason
            );
        }
    }

    println!("  Suites:  {}", summary.suites.len());
    if summary.empty_suites_dropped > 0 {
        println!(
            "  Skipped: {} empty fallback suites",
            console::style(summary.empty_suites_dropped).yellow()
        );
    }
    println!("  Tests:   {}", summary.total_tests());
    println!();

    for suite in &summary.suites {
        let timeouts = match suite.timeouts {
            Some(t) => format!(
                "timeout {} / exec {}",
                t.timeout_secs.map_or("-".to_string(), |v| v.to_string()),
                t.exec_timeout_secs.map_or("-".to_string(), |v| v.to_string())
            ),
            None => "default timeouts".to_string(),
        };
        println!(
            "  {:<40} {:>4} tests  {:>12}  {}",
            suite.task_name,
            suite.test_count,
            format_runtime(suite.runtime),
            console::style(timeouts).dim()
        );
    }
    println!("  {:<40} {}", summary.misc_suite, console::style("misc").dim());

    if let Some(files) = &summary.files {
        println!();
        println!(
            "Wrote {} suite files and {}",
            files.suite_files.len(),
            console::style(files.task_config.display()).cyan()
        );
    } else {
        println!();
        println!("{}", console::style("Plan only, nothing written.").dim());
    }
}
