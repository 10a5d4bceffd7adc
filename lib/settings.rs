//! Module extension settings.

use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Per-project options consumers may set in the `[module]` section.
///
/// Only mutable through a `Configuration`; a finalized `ModuleConfig` holds a
/// read-only copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSettings {
    /// Also install the sources archive.
    #[serde(default)]
    pub install_sources: bool,

    /// Runtime profile written to the descriptor (e.g. `rt`, `ux`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_profile: Option<String>,
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
