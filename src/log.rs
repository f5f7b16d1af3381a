//! Status lines for the terminal
//!
//! Stdout carries the report or the JSON dump and nothing else, so these
//! all go to stderr.

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Whether escape codes should be emitted; off for pipes and under `NO_COLOR`
fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stderr)
}

fn tag(marker: &str, color: &str) -> String {
    if use_color() {
        format!("{}{}{}", color, marker, colors::RESET)
    } else {
        marker.to_string()
    }
}

pub fn info(message: &str) {
    eprintln!("{} {}", tag("[*]", colors::CYAN), message);
}

/// A completed config change
pub fn success(message: &str) {
    eprintln!("{} {}", tag("[+]", colors::GREEN), message);
}

/// Something the user should act on; the command itself still succeeded
pub fn warn(message: &str) {
    eprintln!("{} {}", tag("[!]", colors::YELLOW), message);
}
