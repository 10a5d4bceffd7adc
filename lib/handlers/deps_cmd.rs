//! Dependency listing command handler.

use super::common::configure;
use crate::commands::Overrides;
use crate::error::ModuleResult;
use crate::output::DepsOutput;
use colored::Colorize;
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Show bucket members, the classpath and where each archive resolves.
pub async fn show_deps(project_dir: PathBuf, json: bool) -> ModuleResult<()> {
    let config = configure(&project_dir, &Overrides::default())?;
    let output = DepsOutput::new(&config.project.name, &config.buckets, &config.resolver);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (bucket, members) in &output.buckets {
        println!("  {}", bucket.bold());
        if members.is_empty() {
            println!("    {}", "(empty)".dimmed());
        }
        for member in members {
            match &member.path {
                Some(path) => println!(
                    "    {} {} {}",
                    "✓".bright_green(),
                    member.coordinate,
                    format!("→ {}", path).dimmed()
                ),
                None => println!(
                    "    {} {} {}",
                    "✗".bright_red(),
                    member.coordinate,
                    "(not found)".dimmed()
                ),
            }
        }
        println!();
    }

    println!(
        "  {} {}",
        "Classpath:".bold(),
        if output.classpath.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            output.classpath.join(", ")
        }
    );
    println!(
        "  {} {}",
        "Merged:".bold(),
        if output.merged.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            output.merged.join(", ")
        }
    );

    println!("\n  {}", "Repositories:".bold());
    for dir in &output.repositories {
        println!("    {} {}", "-".dimmed(), dir);
    }

    let unresolved = output.unresolved();
    if !unresolved.is_empty() {
        println!(
            "\n  {} {} unresolved: {}",
            "!".bright_yellow(),
            unresolved.len(),
            unresolved.join(", ")
        );
    }
    println!();

    Ok(())
}
