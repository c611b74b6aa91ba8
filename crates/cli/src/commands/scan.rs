//! Vulnerability scanning command.

use anyhow::{bail, Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use solaudit_engine::engine::{ScanConfig, ScanEngine};
use solaudit_engine::report::{Report, ReportAssembler};
use solaudit_engine::rules::Category;
use solaudit_engine::SeverityBand;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

#[derive(Subcommand, Clone)]
pub enum ScanCommand {
    Run {
        /// A Solidity file, or a directory scanned recursively for `.sol`.
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,

        /// Comma-separated category names; defaults to the full catalogue.
        #[arg(long)]
        rules: Option<String>,

        /// Findings below this confidence are dropped from the report.
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,

        /// Line window for merging same-category findings.
        #[arg(long, default_value_t = 3)]
        window: usize,

        /// Per-file wall-clock budget in milliseconds; overruns yield
        /// partial results, not errors.
        #[arg(long)]
        deadline_ms: Option<u64>,

        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl ScanCommand {
    pub fn execute(&self) -> Result<()> {
        match self {
            ScanCommand::Run {
                input,
                format,
                rules,
                min_confidence,
                window,
                deadline_ms,
                verbose,
            } => {
                let config = build_config(rules.as_deref(), *window, *deadline_ms)?;
                let engine = ScanEngine::new(config);

                if input.is_file() {
                    scan_single_file(&engine, input, *format, *min_confidence, *verbose)
                } else if input.is_dir() {
                    scan_directory(&engine, input, *format, *min_confidence, *verbose)
                } else {
                    bail!("Input path does not exist: {}", input.display())
                }
            }
        }
    }
}

fn build_config(
    rules: Option<&str>,
    window: usize,
    deadline_ms: Option<u64>,
) -> Result<ScanConfig> {
    let enabled: BTreeSet<Category> = match rules {
        None => Category::ALL.iter().copied().collect(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                Category::from_name(name)
                    .with_context(|| format!("Unknown rule category: {name}"))
            })
            .collect::<Result<_>>()?,
    };
    if enabled.is_empty() {
        bail!("No rule categories selected");
    }
    Ok(ScanConfig {
        enabled,
        dedup_line_window: window,
        deadline: deadline_ms.map(Duration::from_millis),
        ..ScanConfig::default()
    })
}

fn scan_single_file(
    engine: &ScanEngine,
    path: &Path,
    format: OutputFormat,
    min_confidence: f64,
    verbose: bool,
) -> Result<()> {
    let report = scan_file(engine, path, min_confidence)?;
    output_report(&report, format, verbose, Some(path))
}

fn scan_directory(
    engine: &ScanEngine,
    dir: &Path,
    format: OutputFormat,
    min_confidence: f64,
    verbose: bool,
) -> Result<()> {
    let files = find_solidity_files(dir)?;
    if files.is_empty() {
        println!("⚠️  No Solidity files found in {}", dir.display());
        return Ok(());
    }
    if verbose {
        println!("📁 Found {} Solidity files", files.len());
    }

    let mut had_findings = false;
    for path in files {
        let report = match scan_file(engine, &path, min_confidence) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Warning: failed to scan {}: {e:#}", path.display());
                continue;
            }
        };
        if report.findings.is_empty() && format == OutputFormat::Console {
            continue;
        }
        had_findings = had_findings || !report.findings.is_empty();
        output_report(&report, format, verbose, Some(&path))?;
    }

    if !had_findings && format == OutputFormat::Console {
        println!("{}", "✅ No vulnerabilities found in any files".green());
    }
    Ok(())
}

fn scan_file(engine: &ScanEngine, path: &Path, min_confidence: f64) -> Result<Report> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut outcome = engine
        .scan_bytes(&bytes)
        .with_context(|| format!("Scan failed: {}", path.display()))?;
    outcome
        .findings
        .retain(|f| f.confidence >= min_confidence);
    // Keep IDs dense after filtering; their order is already final.
    for (i, finding) in outcome.findings.iter_mut().enumerate() {
        finding.id = i + 1;
    }
    Ok(ReportAssembler::new().assemble(outcome))
}

fn find_solidity_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sol") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn output_report(
    report: &Report,
    format: OutputFormat,
    verbose: bool,
    file_path: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Console => print_console(report, verbose, file_path),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Markdown => print!("{}", report.to_markdown()),
    }
    Ok(())
}

fn print_console(report: &Report, verbose: bool, file_path: Option<&Path>) {
    if let Some(path) = file_path {
        println!("\n📄 Scan results for: {}", path.display());
    }
    if verbose && !report.summary.contracts.is_empty() {
        println!("   Contracts: {}", report.summary.contracts.join(", "));
        if let Some(version) = &report.summary.solidity_version {
            println!("   Solidity version: {}", version);
        }
    }
    if report.truncated {
        println!(
            "{}",
            "⚠️  Scan was truncated; findings may be incomplete".yellow()
        );
    }
    for warning in &report.warnings {
        println!("{}", format!("⚠️  {warning}").yellow());
    }

    if report.findings.is_empty() {
        println!("{}", "✅ No vulnerabilities found".green());
        return;
    }

    println!(
        "⚠️  Found {} potential vulnerabilities:",
        report.findings.len()
    );
    for f in &report.findings {
        let severity = f.cvss.severity.to_string();
        let severity = match f.cvss.severity {
            SeverityBand::Critical => severity.bright_red().bold(),
            SeverityBand::High => severity.red(),
            SeverityBand::Medium => severity.yellow(),
            _ => severity.normal(),
        };
        println!(
            "\n{}. {} [{} {:.1}] at {}",
            f.finding.id,
            f.finding.category.to_string().bold(),
            severity,
            f.cvss.overall_score,
            f.finding.location()
        );
        println!("   {}", f.finding.message);
        if verbose {
            println!("   Confidence: {:.2}", f.finding.confidence);
            println!("   Vector: {}", f.cvss.vector_string.dimmed());
            println!("   Evidence: {}", f.finding.evidence.trim().dimmed());
        }
    }
}
