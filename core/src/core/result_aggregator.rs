use std::io::Write;

use anyhow::Context;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::mpsc;

/// Outcome of probing one target. Created once by the engine after
/// classification, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub param: String,
    pub variant: String,
    /// `None` when the request failed before a response was obtained.
    pub status: Option<u16>,
    pub vulnerable: bool,
    pub waf_detected: bool,
    pub timing_ms: u128,
}

/// One row of the final 4-column report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub url: String,
    pub status: String,
    pub vulnerable: String,
    pub waf_detected: String,
}

fn safe_println(text: &str) {
    print!("{}\r\n", text);
    std::io::stdout().flush().ok();
}

fn status_label(status: Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes".to_string() } else { "No".to_string() }
}

/// Collects probe results from the engine channel and turns them into the
/// report the CLI renders and persists.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Drains the result channel until the engine drops its sender, driving
    /// the progress bar and announcing LFI hits as they land.
    ///
    /// Results come back in completion order, not dispatch order, and the
    /// report keeps that order on purpose — the table fills in the same way
    /// the probes finish.
    pub async fn run(
        mut receiver: mpsc::Receiver<ProbeResult>,
        total: usize,
        verbose: bool,
    ) -> Vec<ProbeResult> {
        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} Probing {pos}/{len} [{bar:40.cyan/blue}] {elapsed_precise}",
            )
            .expect("progress template is valid")
            .progress_chars("=>-"),
        );

        let mut results = Vec::with_capacity(total);

        while let Some(result) = receiver.recv().await {
            progress.inc(1);

            if result.vulnerable {
                progress.suspend(|| {
                    safe_println(&format!(
                        "\n{} LFI indicator matched!",
                        "[+]".green().bold()
                    ));
                    safe_println(&format!("    Target:  {}", result.url.white()));
                    safe_println(&format!("    Param:   {}", result.param.cyan()));
                    safe_println(&format!("    Variant: {}", result.variant.bright_yellow()));
                    safe_println(&format!(
                        "    Info:    Status [{}] | Time [{}ms]",
                        status_label(result.status).cyan(),
                        result.timing_ms.to_string().dimmed()
                    ));
                });
            } else if verbose {
                progress.suspend(|| {
                    let waf = if result.waf_detected { " (WAF)" } else { "" };
                    safe_println(&format!(
                        "[*] {} → {}{}",
                        result.url,
                        status_label(result.status),
                        waf
                    ));
                });
            }

            results.push(result);
        }

        progress.finish_and_clear();
        results
    }

    /// Pure transform into the 4-column display records, in the order the
    /// results were received.
    pub fn to_records(results: &[ProbeResult]) -> Vec<ScanRecord> {
        results
            .iter()
            .map(|r| ScanRecord {
                url: r.url.clone(),
                status: status_label(r.status),
                vulnerable: yes_no(r.vulnerable),
                waf_detected: yes_no(r.waf_detected),
            })
            .collect()
    }

    /// Renders the aligned console table.
    pub fn print_table(records: &[ScanRecord]) {
        let url_width = records
            .iter()
            .map(|r| r.url.len())
            .chain(std::iter::once("URL".len()))
            .max()
            .unwrap_or(3);

        safe_println(&format!("\n{}", "LFI SCAN RESULTS".yellow().bold()));
        let header = format!(
            "  {:<width$}  {:>6}  {:>10}  {:>12}",
            "URL",
            "Status",
            "Vulnerable",
            "WAF Detected",
            width = url_width,
        );
        safe_println(&header.bold().to_string());

        for r in records {
            // Pad before coloring: escape codes would break column widths.
            let vuln = format!("{:>10}", r.vulnerable);
            let vuln = if r.vulnerable == "Yes" {
                vuln.red().bold().to_string()
            } else {
                vuln.green().to_string()
            };
            let waf = format!("{:>12}", r.waf_detected);
            let waf = if r.waf_detected == "Yes" {
                waf.red().to_string()
            } else {
                waf.green().to_string()
            };
            safe_println(&format!(
                "  {:<width$}  {:>6}  {}  {}",
                r.url,
                r.status,
                vuln,
                waf,
                width = url_width,
            ));
        }
    }

    /// Prints the closing counts after the table.
    pub fn print_summary(results: &[ProbeResult]) {
        let vulnerable = results.iter().filter(|r| r.vulnerable).count();
        let blocked = results.iter().filter(|r| r.waf_detected).count();
        let failed = results.iter().filter(|r| r.status.is_none()).count();

        safe_println(&format!("\n{}", "SCAN SUMMARY :".yellow().bold()));
        safe_println(&format!(
            "  {} probe(s) sent, {} vulnerable, {} WAF-blocked, {} failed",
            results.len().to_string().white().bold(),
            vulnerable.to_string().red().bold(),
            blocked.to_string().yellow(),
            failed.to_string().dimmed(),
        ));
        if vulnerable == 0 {
            safe_println(&"  No LFI indicators matched.".green().to_string());
        }
    }

    /// Persists the records as tab-separated text with a header row.
    pub fn write_tsv(path: &str, records: &[ScanRecord]) -> anyhow::Result<()> {
        let mut out = String::from("URL\tStatus\tVulnerable\tWAF Detected\n");
        for r in records {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                r.url, r.status, r.vulnerable, r.waf_detected
            ));
        }
        std::fs::write(path, out).with_context(|| format!("failed to write results to '{}'", path))
    }

    /// Persists the raw results as JSON lines, one object per probe.
    pub fn write_jsonl(path: &str, results: &[ProbeResult]) -> anyhow::Result<()> {
        let mut out = String::new();
        for r in results {
            out.push_str(&serde_json::to_string(r)?);
            out.push('\n');
        }
        std::fs::write(path, out).with_context(|| format!("failed to write results to '{}'", path))
    }
}
