//! Task listing command handler.

use super::common::{configure, display_relative};
use crate::commands::Overrides;
use crate::error::ModuleResult;
use crate::tasks::TaskName;
use colored::Colorize;
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// List tasks, their dependencies and the descriptor's inputs.
pub async fn list_tasks(project_dir: PathBuf) -> ModuleResult<()> {
    let config = configure(&project_dir, &Overrides::default())?;

    println!(
        "  {} {}\n",
        "Tasks for".dimmed(),
        config.project.name.bold()
    );

    let width = TaskName::ALL
        .iter()
        .map(|t| t.as_str().len())
        .max()
        .unwrap_or(0);

    for task in TaskName::ALL {
        let deps: Vec<&str> = task
            .dependencies(&config.settings)
            .iter()
            .map(|d| d.as_str())
            .collect();

        let line = format!("{:<width$}", task.as_str(), width = width);
        if deps.is_empty() {
            println!("    {}  {}", line.bright_cyan(), task.description());
        } else {
            println!(
                "    {}  {} {}",
                line.bright_cyan(),
                task.description(),
                format!("(after {})", deps.join(", ")).dimmed()
            );
        }
    }

    println!("\n  {}", "Descriptor inputs:".bold());
    for input in &config.descriptor.inputs {
        println!(
            "    {} {}",
            "-".dimmed(),
            display_relative(input, &config.project.dir)
        );
    }
    println!();

    Ok(())
}
