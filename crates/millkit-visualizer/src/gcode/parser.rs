//! Line-local G-code parser
//!
//! Recognises a leading `G`/`M` word (optionally after an `N` block number)
//! and independent `X`, `Y`, `Z` and `F` words. Everything after `;` is a
//! comment, as is each `( ... )` group; words after a closed group still
//! count. An unclosed `(` comments out the rest of the line. Parsing never
//! fails; unrecognised content is skipped.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::{CommandType, ParsedCommand};

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*\)|\(.*|;.*").expect("invalid regex pattern"))
}

fn command_regex() -> &'static Regex {
    static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMAND_REGEX
        .get_or_init(|| Regex::new(r"^(?:N\d+\s*)?([GM])(\d+)").expect("invalid regex pattern"))
}

fn parameter_regex() -> &'static Regex {
    static PARAMETER_REGEX: OnceLock<Regex> = OnceLock::new();
    PARAMETER_REGEX.get_or_init(|| {
        Regex::new(r"([XYZF])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

/// Parse one line
///
/// Returns `None` for blank lines, comment-only lines and lines with no
/// recognised word. When an axis letter repeats, the last value wins.
pub fn parse_line(line: &str, line_number: usize) -> Option<ParsedCommand> {
    let upper = line.trim().to_uppercase();
    let code = comment_regex().replace_all(&upper, " ");
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    let mut command = ParsedCommand {
        line_number,
        ..Default::default()
    };

    if let Some(caps) = command_regex().captures(code) {
        command.command_type = match &caps[1] {
            "G" => Some(CommandType::G),
            _ => Some(CommandType::M),
        };
        command.number = caps[2].parse().ok();
        if command.number.is_none() {
            command.command_type = None;
        }
    }

    for caps in parameter_regex().captures_iter(code) {
        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        match &caps[1] {
            "X" => command.x = Some(value),
            "Y" => command.y = Some(value),
            "Z" => command.z = Some(value),
            _ => command.f = Some(value),
        }
    }

    if command.is_empty() {
        trace!("Line {}: no recognised words in {:?}", line_number, code);
        return None;
    }
    Some(command)
}

/// Parse a whole program
///
/// Line numbers are physical: blank and comment lines consume a number but
/// produce no command.
pub fn parse_program(text: &str) -> Vec<ParsedCommand> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(line, i + 1))
        .collect()
}
