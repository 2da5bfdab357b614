//! Parsed G-code commands

use serde::{Deserialize, Serialize};

/// Command letter class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandType {
    /// Preparatory (motion and mode) command
    G,
    /// Miscellaneous (machine) command
    M,
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::G => write!(f, "G"),
            Self::M => write!(f, "M"),
        }
    }
}

/// One decoded G-code line
///
/// Lines without a recognised `G`/`M` word keep their axis words but carry
/// no command type or number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// `G` or `M`, if the line starts with one
    pub command_type: Option<CommandType>,
    /// Command number (`1` for `G1` and `G01`)
    pub number: Option<u32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Feed rate word (mm/min)
    pub f: Option<f64>,
    /// 1-based line number in the source program
    pub line_number: usize,
}

impl ParsedCommand {
    /// Whether this is exactly `<command_type><number>`
    pub fn is(&self, command_type: CommandType, number: u32) -> bool {
        self.command_type == Some(command_type) && self.number == Some(number)
    }

    /// Whether any of X, Y or Z is present
    pub fn has_axis_words(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }

    /// Whether the line carried no recognised word at all
    pub fn is_empty(&self) -> bool {
        self.command_type.is_none() && !self.has_axis_words() && self.f.is_none()
    }
}

impl std::fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut words = Vec::new();
        if let (Some(kind), Some(number)) = (self.command_type, self.number) {
            words.push(format!("{}{}", kind, number));
        }
        for (letter, value) in [('X', self.x), ('Y', self.y), ('Z', self.z), ('F', self.f)] {
            if let Some(value) = value {
                words.push(format!("{}{}", letter, value));
            }
        }
        write!(f, "{}", words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_words() {
        let cmd = ParsedCommand {
            command_type: Some(CommandType::G),
            number: Some(1),
            x: Some(10.0),
            z: Some(-1.5),
            f: Some(300.0),
            line_number: 4,
            ..Default::default()
        };
        assert_eq!(cmd.to_string(), "G1 X10 Z-1.5 F300");
        assert!(cmd.is(CommandType::G, 1));
        assert!(!cmd.is(CommandType::M, 1));
        assert!(cmd.has_axis_words());
    }

    #[test]
    fn test_empty_command() {
        assert!(ParsedCommand::default().is_empty());
    }
}
