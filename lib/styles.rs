//! CLI styles for clap.

use clap::builder::styling::{AnsiColor, Color, Style, Styles};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

pub fn styles() -> Styles {
    let bold = |color| Style::new().bold().fg_color(Some(Color::Ansi(color)));

    Styles::styled()
        .header(bold(AnsiColor::Blue))
        .usage(bold(AnsiColor::Blue))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
        .error(bold(AnsiColor::Red))
        .invalid(bold(AnsiColor::Yellow))
        .valid(bold(AnsiColor::Green))
}
