//! Status lines for the CLI.
//!
//! Everything here writes to stderr.  Stdout carries nothing but secret
//! values, so `keystash get alice | pbcopy` stays clean.

use std::fmt::Display;

use console::style;

fn line(marker: impl Display, msg: &str) {
    eprintln!("{marker} {msg}");
}

pub fn success(msg: &str) {
    line(style("ok").green().bold(), msg);
}

pub fn error(msg: &str) {
    line(style("error:").red().bold(), msg);
}

pub fn warning(msg: &str) {
    line(style("warning:").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    line(style("note:").cyan(), msg);
}

/// Indented follow-up suggestion printed under an error.
pub fn hint(msg: &str) {
    eprintln!("  {}", style(msg).dim());
}
