//! # Millkit Visualizer
//!
//! G-code replay for simulation: a line-local parser, a motion interpreter
//! that turns commands into timed moves, and a playback driver that animates
//! them.

pub mod error;
pub mod gcode;
pub mod playback;

pub use error::{VisualizerError, VisualizerResult};
pub use gcode::{
    estimate_duration, parse_line, parse_program, CommandType, MotionInterpreter, MotionResult,
    ParsedCommand, PositioningMode, DEFAULT_FEED_RATE,
};
pub use playback::{
    PlaybackCommand, PlaybackDriver, PlaybackEvent, PlaybackSession, PlaybackState,
    DEFAULT_RAPID_SPEEDUP,
};
