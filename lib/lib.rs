//! `nmodule-cli` library.

pub mod archive;
pub mod buckets;
pub mod commands;
pub mod configure;
pub mod constants;
pub mod descriptor;
pub mod env;
pub mod error;
pub mod handlers;
pub mod installer;
pub mod macros;
pub mod output;
pub mod project;
pub mod resolver;
pub mod scaffold;
pub mod settings;
pub mod styles;
pub mod tasks;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

pub use archive::*;
pub use buckets::*;
pub use commands::*;
pub use configure::*;
pub use constants::*;
pub use descriptor::*;
pub use env::*;
pub use error::*;
pub use installer::*;
pub use output::*;
pub use project::*;
pub use resolver::*;
pub use settings::*;
pub use tasks::*;
