//! # Motion Interpreter
//!
//! Executes parsed commands against a simulated machine: current position,
//! distance mode (G90/G91) and modal feed rate. Each command yields a
//! [`MotionResult`] describing the move it causes, if any.
//!
//! Supported: `G0`, `G1`, `G28`, `G90`, `G91`. Every other G or M command is
//! recorded as not requiring movement.

use std::time::Duration;

use millkit_core::Point3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CommandType, ParsedCommand};

/// Feed rate in effect before any `F` word (mm/min)
pub const DEFAULT_FEED_RATE: f64 = 1500.0;

/// Distance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositioningMode {
    /// G90: coordinates are absolute
    #[default]
    Absolute,
    /// G91: coordinates are offsets from the current position
    Relative,
}

/// Outcome of executing one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionResult {
    /// Whether the command moves the machine
    pub requires_movement: bool,
    /// Rapid positioning (G0, G28)
    pub is_rapid: bool,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Planned duration at the modal feed rate; never negative
    pub duration_secs: f64,
    /// Source line of the command
    pub line_number: usize,
}

impl MotionResult {
    fn stationary(position: Point3<f64>, line_number: usize) -> Self {
        Self {
            requires_movement: false,
            is_rapid: false,
            start: position,
            end: position,
            duration_secs: 0.0,
            line_number,
        }
    }

    /// Straight-line travel distance
    pub fn distance(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Position at `fraction` (clamped to 0..=1) of the way through the move
    pub fn interpolate(&self, fraction: f64) -> Point3<f64> {
        let t = fraction.clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }
}

/// Simulated machine state
#[derive(Debug, Clone)]
pub struct MotionInterpreter {
    position: Point3<f64>,
    mode: PositioningMode,
    feed_rate: f64,
}

impl Default for MotionInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionInterpreter {
    /// At the origin, absolute mode, default feed rate
    pub fn new() -> Self {
        Self {
            position: Point3::origin(),
            mode: PositioningMode::Absolute,
            feed_rate: DEFAULT_FEED_RATE,
        }
    }

    /// Return to the initial state regardless of history
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn mode(&self) -> PositioningMode {
        self.mode
    }

    pub fn feed_rate(&self) -> f64 {
        self.feed_rate
    }

    /// Execute one command, advancing the machine state
    pub fn execute(&mut self, command: &ParsedCommand) -> MotionResult {
        match (command.command_type, command.number) {
            (Some(CommandType::G), Some(0)) => self.linear_move(command, true),
            (Some(CommandType::G), Some(1)) => self.linear_move(command, false),
            (Some(CommandType::G), Some(28)) => self.home(command),
            (Some(CommandType::G), Some(90)) => {
                self.mode = PositioningMode::Absolute;
                MotionResult::stationary(self.position, command.line_number)
            }
            (Some(CommandType::G), Some(91)) => {
                self.mode = PositioningMode::Relative;
                MotionResult::stationary(self.position, command.line_number)
            }
            _ => MotionResult::stationary(self.position, command.line_number),
        }
    }

    /// Execute every command in order
    pub fn execute_program(&mut self, commands: &[ParsedCommand]) -> Vec<MotionResult> {
        commands.iter().map(|c| self.execute(c)).collect()
    }

    fn linear_move(&mut self, command: &ParsedCommand, is_rapid: bool) -> MotionResult {
        self.update_feed_rate(command);

        if !command.has_axis_words() {
            return MotionResult::stationary(self.position, command.line_number);
        }

        let start = self.position;
        let end = Point3::new(
            self.resolve(command.x, start.x),
            self.resolve(command.y, start.y),
            self.resolve(command.z, start.z),
        );
        self.travel(start, end, is_rapid, command.line_number)
    }

    fn home(&mut self, command: &ParsedCommand) -> MotionResult {
        self.update_feed_rate(command);
        let start = self.position;
        self.travel(start, Point3::origin(), true, command.line_number)
    }

    fn travel(
        &mut self,
        start: Point3<f64>,
        end: Point3<f64>,
        is_rapid: bool,
        line_number: usize,
    ) -> MotionResult {
        let distance = (end - start).norm();
        let duration_secs = if distance > 0.0 && distance.is_finite() {
            distance / self.feed_rate * 60.0
        } else {
            0.0
        };

        self.position = end;
        MotionResult {
            requires_movement: true,
            is_rapid,
            start,
            end,
            duration_secs,
            line_number,
        }
    }

    fn resolve(&self, word: Option<f64>, current: f64) -> f64 {
        match (word, self.mode) {
            (Some(value), PositioningMode::Absolute) => value,
            (Some(delta), PositioningMode::Relative) => current + delta,
            (None, _) => current,
        }
    }

    fn update_feed_rate(&mut self, command: &ParsedCommand) {
        match command.f {
            Some(f) if f.is_finite() && f > 0.0 => self.feed_rate = f,
            Some(f) => warn!(
                "Line {}: ignoring non-positive feed rate F{}",
                command.line_number, f
            ),
            None => {}
        }
    }
}

/// Total planned time of a result list
pub fn estimate_duration(results: &[MotionResult]) -> Duration {
    let total: f64 = results
        .iter()
        .filter(|r| r.requires_movement)
        .map(|r| r.duration_secs)
        .sum();
    Duration::try_from_secs_f64(total).unwrap_or(Duration::MAX)
}
