//! Command handlers.

mod common;
mod deps_cmd;
mod init_cmd;
mod run_cmd;
mod tasks_cmd;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use common::{configure, configure_with};
pub use deps_cmd::show_deps;
pub use init_cmd::{init_project, scaffold_project};
pub use run_cmd::run_tasks;
pub use tasks_cmd::list_tasks;
