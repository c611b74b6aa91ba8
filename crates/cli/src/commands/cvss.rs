//! Standalone CVSS v3.1 vector scoring.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use solaudit_engine::cvss::CvssVector;
use solaudit_engine::SeverityBand;

#[derive(Args, Clone)]
pub struct CvssArgs {
    /// Vector string, e.g. CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H
    pub vector: String,

    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &CvssArgs) -> Result<()> {
    let vector = CvssVector::parse(&args.vector)
        .with_context(|| format!("Invalid CVSS vector: {}", args.vector))?;
    let score = vector.score();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let severity = score.severity.to_string();
    let severity = match score.severity {
        SeverityBand::Critical => severity.bright_red().bold(),
        SeverityBand::High => severity.red(),
        SeverityBand::Medium => severity.yellow(),
        _ => severity.normal(),
    };
    println!("Vector:        {}", score.vector_string);
    println!("Base score:    {:.1}", score.base_score);
    if let Some(temporal) = score.temporal_score {
        println!("Temporal:      {temporal:.1}");
    }
    if let Some(environmental) = score.environmental_score {
        println!("Environmental: {environmental:.1}");
    }
    println!("Overall:       {:.1} ({severity})", score.overall_score);
    Ok(())
}
