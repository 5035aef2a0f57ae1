//! Output formatting and rendering

pub mod console;
pub mod formatter;
pub mod render;

/// Turn off ANSI colors for all subsequent output.
///
/// When left enabled, `colored` decides from the terminal and the
/// `NO_COLOR` / `CLICOLOR` environment variables.
pub fn set_color_enabled(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}
