//! Help text macros.

/// Build an `Examples:` help section at compile time.
///
/// ```
/// const HELP: &str = nmodule_cli::examples![
///     "nmodule run jar " # "Build the module jar",
/// ];
/// assert!(HELP.contains("nmodule run jar"));
/// ```
#[macro_export]
macro_rules! examples {
    ($($cmd:literal # $desc:literal),* $(,)?) => {
        $crate::examples_section!["Examples:"; $($cmd # $desc),*]
    };
}

/// Build a titled help section of command/description pairs.
#[macro_export]
macro_rules! examples_section {
    ($title:literal; $($cmd:literal # $desc:literal),* $(,)?) => {
        concat!(
            "\x1b[1;34m", $title, "\x1b[0m\n",
            $("  \x1b[32m", $cmd, "\x1b[0m  ", $desc, "\n",)*
        )
    };
}
