//! `nmodule` is the primary CLI binary.

use clap::Parser;
use colored::Colorize;
use nmodule_cli::handlers;
use nmodule_cli::{Cli, Command, ModuleError, ModuleResult};
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print an error with appropriate formatting based on error type.
fn print_error(e: &ModuleError) {
    println!();
    match e {
        ModuleError::ProjectNotFound(path) => {
            println!("  {} nmodule.toml not found", "error".bright_red().bold());
            println!();
            println!("    {}: {}", "Searched".dimmed(), path.display());
            println!();
            println!(
                "    {}: Run {} to create one",
                "hint".bright_blue().bold(),
                "nmodule init".bright_white()
            );
        }
        ModuleError::MissingDestination { reason } => {
            println!(
                "  {} Missing install destination",
                "error".bright_red().bold()
            );
            println!();
            println!("    {}", reason);
            println!();
            println!(
                "    {}: Set {} to the framework installation directory",
                "hint".bright_blue().bold(),
                "niagara_home".bright_white()
            );
        }
        ModuleError::DependencyResolution {
            coordinate,
            searched,
        } => {
            println!(
                "  {} Could not resolve {}",
                "error".bright_red().bold(),
                coordinate.bright_white()
            );
            println!();
            println!("    {}:", "Searched".dimmed());
            for dir in searched {
                println!("      {}", dir.display());
            }
        }
        ModuleError::UnknownTask(name) => {
            println!(
                "  {} Task not found: {}",
                "error".bright_red().bold(),
                name.bright_white()
            );
            println!();
            println!(
                "    {}: Run {} to list tasks",
                "hint".bright_blue().bold(),
                "nmodule tasks".bright_white()
            );
        }
        ModuleError::TasksFailed { failed } => {
            println!(
                "  {} Build failed: {}",
                "✗".bright_red(),
                failed.join(", ").bright_white()
            );
        }
        _ => {
            let msg = e.to_string();
            if let Some((prefix, rest)) = msg.split_once(": ")
                && prefix.ends_with("error")
            {
                println!(
                    "  {} {}",
                    format!("error[{}]", prefix.to_lowercase().replace(" error", ""))
                        .bright_red()
                        .bold(),
                    rest.dimmed()
                );
            } else {
                println!("  {} {}", "error".bright_red().bold(), msg);
            }
        }
    }
    println!();
}

/// Initialize tracing. `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> ModuleResult<()> {
    let project_dir = cli.project_dir;

    match cli.command {
        Command::Init {
            path,
            name,
            group,
            module_version,
            force,
        } => handlers::init_project(project_dir, path, name, group, module_version, force).await,

        Command::Tasks => handlers::list_tasks(project_dir).await,

        Command::Deps { json } => handlers::show_deps(project_dir, json).await,

        Command::Run { tasks, overrides } => {
            handlers::run_tasks(project_dir, tasks, overrides).await
        }

        Command::Install { overrides } => {
            handlers::run_tasks(project_dir, vec!["install".into()], overrides).await
        }

        Command::Clean => {
            handlers::run_tasks(project_dir, vec!["clean".into()], Default::default()).await
        }
    }
}
