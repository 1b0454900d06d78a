use std::io::IsTerminal;

use clap::builder::styling::{AnsiColor, Effects, Style, Styles};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Whether stdout is an interactive terminal that renders ANSI colors.
static IS_ANSI_TERMINAL: std::sync::LazyLock<bool> = std::sync::LazyLock::new(|| {
    std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").map_or(true, |term| term != "dumb")
});

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Applies the [`styles`] palette to text printed by the binary.
pub trait AnsiStyles {
    /// Apply literal style to text
    fn literal(&self) -> String;

    /// Apply placeholder style to text
    fn placeholder(&self) -> String;

    /// Apply valid style to text
    fn valid(&self) -> String;

    /// Apply invalid style to text
    fn invalid(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns a `Styles` object with the default styles for the CLI.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default() | Effects::BOLD)
        .invalid(AnsiColor::Red.on_default() | Effects::BOLD)
}

fn paint(text: &str, style: &Style, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    format!("{}{text}{}", style.render(), style.render_reset())
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl AnsiStyles for str {
    fn literal(&self) -> String {
        paint(self, styles().get_literal(), *IS_ANSI_TERMINAL)
    }

    fn placeholder(&self) -> String {
        paint(self, styles().get_placeholder(), *IS_ANSI_TERMINAL)
    }

    fn valid(&self) -> String {
        paint(self, styles().get_valid(), *IS_ANSI_TERMINAL)
    }

    fn invalid(&self) -> String {
        paint(self, styles().get_invalid(), *IS_ANSI_TERMINAL)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
