//! Logging setup and color roles for run output.
//!
//! Quiet by default: warnings only from dependencies, info from featmill
//! itself; `--verbose` raises featmill to debug. WARN/ERROR lines carry the
//! level and target so failed inputs stand out in long extraction runs.

use colored::{Color, ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

pub fn setup_logging(verbose: bool) {
    let own_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), own_level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            match record.level() {
                Level::Warn => writeln!(
                    buf,
                    "[{name} {} {}] {}",
                    "WARN".yellow(),
                    record.target().to_string().white(),
                    record.args()
                ),
                Level::Error => writeln!(
                    buf,
                    "[{name} {} {}] {}",
                    "ERROR".red(),
                    record.target().to_string().white(),
                    record.args()
                ),
                _ => writeln!(buf, "[{name}] {}", record.args()),
            }
        })
        .init();
}

/// Color roles for summary output.
pub struct Colors;

impl Colors {
    pub const OK: Color = Color::Green;
    pub const SKIPPED: Color = Color::Yellow;
    pub const FAILED: Color = Color::Red;

    pub fn colorize(color: Color, text: &str) -> ColoredString {
        text.color(color)
    }
}
