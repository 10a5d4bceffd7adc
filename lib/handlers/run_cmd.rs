//! Task execution command handler.

use super::common::{configure, display_relative, format_size};
use crate::commands::Overrides;
use crate::error::{ModuleError, ModuleResult};
use crate::tasks::{self, TaskName, TaskOutcome, TaskOutput, TaskReport};
use colored::Colorize;
use std::path::{Path, PathBuf};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Run the requested tasks and their dependencies.
pub async fn run_tasks(
    project_dir: PathBuf,
    requested: Vec<String>,
    overrides: Overrides,
) -> ModuleResult<()> {
    let requested = requested
        .iter()
        .map(|name| name.parse::<TaskName>())
        .collect::<ModuleResult<Vec<_>>>()?;

    let config = configure(&project_dir, &overrides)?;
    let plan = tasks::plan(&requested, &config.settings);
    tracing::debug!(
        "plan: {}",
        plan.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(" → ")
    );

    println!(
        "  {} {} {}\n",
        "Building".dimmed(),
        config.project.name.bold(),
        config.project.version.dimmed()
    );

    let base = config.project.dir.clone();
    let report = tasks::execute_with(&plan, &config, |r| print_report(r, &base));

    let failed = report.failed();
    if !failed.is_empty() {
        return Err(ModuleError::TasksFailed {
            failed: failed.iter().map(|t| t.to_string()).collect(),
        });
    }

    println!(
        "\n  {} {} task{} completed",
        "✓".bright_green(),
        report.tasks.len(),
        if report.tasks.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn print_report(report: &TaskReport, base: &Path) {
    let name = report.task.as_str();
    match &report.outcome {
        TaskOutcome::Succeeded(output) => {
            let detail = match output {
                TaskOutput::Cleaned(dirs) if dirs.is_empty() => "nothing to remove".to_string(),
                TaskOutput::Cleaned(dirs) => format!(
                    "removed {}",
                    dirs.iter()
                        .map(|d| display_relative(d, base))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                TaskOutput::ResourcesProcessed { file_count, .. } => {
                    format!("{} file{}", file_count, if *file_count == 1 { "" } else { "s" })
                }
                TaskOutput::Classes(dir) => display_relative(dir, base),
                TaskOutput::Descriptor(path) => display_relative(path, base),
                TaskOutput::Archive(result) => format!(
                    "{} ({} files, {})",
                    display_relative(&result.output_path, base),
                    result.file_count,
                    format_size(result.compressed_size)
                ),
                TaskOutput::Installed(paths) => paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            println!("  {} {} {}", "✓".bright_green(), name, detail.dimmed());

            if let TaskOutput::Archive(result) = output {
                for collision in &result.collisions {
                    println!(
                        "    {} duplicate {} {}",
                        "!".bright_yellow(),
                        collision.path,
                        format!(
                            "(kept {}, ignored {})",
                            collision.kept_from, collision.ignored_from
                        )
                        .dimmed()
                    );
                }
            }
        }
        TaskOutcome::Failed(e) => {
            println!("  {} {}", "✗".bright_red(), name.bright_red());
            println!("    {} {}", "└─".dimmed(), e);
        }
        TaskOutcome::Skipped { failed_dependency } => {
            println!(
                "  {} {} {}",
                "-".dimmed(),
                name.dimmed(),
                format!("(skipped: {} did not succeed)", failed_dependency).dimmed()
            );
        }
    }
}
