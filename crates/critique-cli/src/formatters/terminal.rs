use colored::Colorize;

use critique_core::response::{Finding, Response, Severity};

pub fn print(resp: &Response) {
    if resp.findings.is_empty() {
        println!("\n{}", "No findings.".dimmed());
    } else {
        let mut findings: Vec<&Finding> = resp.findings.iter().collect();
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));

        println!(
            "\n{} {} findings",
            "critique".bold().cyan(),
            findings.len()
        );

        for finding in findings {
            let badge = severity_badge(finding.severity);

            let location = match (&finding.file_path, finding.line) {
                (Some(file), Some(line)) => format!("{}:{}", file, line),
                (Some(file), None) => file.clone(),
                (None, Some(line)) => format!("line {}", line),
                (None, None) => String::new(),
            };

            println!(
                "\n  {} {} {}",
                badge,
                format!("[{}]", finding.category).bold(),
                location.dimmed(),
            );
            println!("    {}", finding.description);

            if !finding.suggestion.is_empty() {
                println!("    {} {}", "fix:".green().bold(), finding.suggestion);
            }

            if let Some(snippet) = &finding.code_snippet {
                for line in snippet.lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }

    println!("\n{}", "summary".bold().underline());
    println!("  {}", resp.summary);

    let model = resp
        .metadata
        .as_ref()
        .and_then(|m| m.model.as_deref())
        .unwrap_or("unknown");
    println!(
        "\n{}  {} ({})  {}ms",
        "backend".dimmed(),
        resp.backend,
        model,
        resp.duration_ms,
    );

    if let Some(meta) = &resp.metadata {
        if let (Some(files), Some(lines)) = (meta.file_count, meta.line_count) {
            println!(
                "{}  {} files, {} lines (+{} -{})",
                "diff".dimmed(),
                files,
                lines,
                meta.lines_added.unwrap_or(0),
                meta.lines_removed.unwrap_or(0),
            );
        }
    }

    println!();
}

fn severity_badge(severity: Severity) -> String {
    match severity {
        Severity::Critical => " CRITICAL ".on_red().white().bold().to_string(),
        Severity::High => " HIGH ".on_yellow().black().bold().to_string(),
        Severity::Medium => " MEDIUM ".on_blue().white().to_string(),
        Severity::Low => " LOW ".dimmed().to_string(),
        Severity::Info => " INFO ".dimmed().to_string(),
    }
}
