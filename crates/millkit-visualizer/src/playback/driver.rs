//! # Playback Driver
//!
//! Replays a precomputed [`MotionResult`] list. Each tick interpolates the
//! current move by wall time over planned duration; rapid moves are sped up.
//! Stepping bypasses interpolation and jumps a whole command at a time.

use std::time::{Duration, Instant};

use millkit_core::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gcode::{parse_program, MotionInterpreter, MotionResult};

/// Rapid moves play this many times faster than planned.
pub const DEFAULT_RAPID_SPEEDUP: f64 = 2.0;

/// Control input for a playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackCommand {
    Play,
    Pause,
    StepForward,
    StepBackward,
    /// Back to the first command, keeping the running/paused state
    Rewind,
    /// Halt and return to the first command
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Output of a playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// The tool is now at `position`, executing `line_number`
    Position {
        position: Point3<f64>,
        line_number: usize,
    },
    /// The last command completed
    Finished,
}

/// Replays one program's motion
#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    results: Vec<MotionResult>,
    index: usize,
    state: PlaybackState,
    position: Point3<f64>,
    /// When the current move started, shifted forward by any paused time
    anchor: Option<Instant>,
    /// Time already spent in the current move when paused
    paused_elapsed: Duration,
    rapid_speedup: f64,
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(DEFAULT_RAPID_SPEEDUP)
    }
}

impl PlaybackDriver {
    /// An empty, stopped driver
    pub fn new(rapid_speedup: f64) -> Self {
        Self {
            results: Vec::new(),
            index: 0,
            state: PlaybackState::Stopped,
            position: Point3::origin(),
            anchor: None,
            paused_elapsed: Duration::ZERO,
            rapid_speedup: if rapid_speedup.is_finite() && rapid_speedup > 0.0 {
                rapid_speedup
            } else {
                DEFAULT_RAPID_SPEEDUP
            },
        }
    }

    /// A stopped driver over already-computed results
    pub fn with_results(results: Vec<MotionResult>, rapid_speedup: f64) -> Self {
        let mut driver = Self::new(rapid_speedup);
        driver.results = results;
        driver
    }

    /// Parse and interpret `program` with a fresh interpreter; stop at the start
    ///
    /// Returns the number of commands loaded.
    pub fn load(&mut self, program: &str) -> usize {
        let mut interpreter = MotionInterpreter::new();
        self.results = interpreter.execute_program(&parse_program(program));
        self.state = PlaybackState::Stopped;
        self.return_to_start();
        debug!("Loaded {} commands for playback", self.results.len());
        self.results.len()
    }

    /// Load `program` and begin playing
    pub fn start(&mut self, program: &str, now: Instant) -> usize {
        let count = self.load(program);
        self.play(now);
        count
    }

    pub fn results(&self) -> &[MotionResult] {
        &self.results
    }

    /// Index of the command being executed next
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.results.len()
    }

    /// Begin or resume ticking; no-op while running
    pub fn play(&mut self, now: Instant) {
        match self.state {
            PlaybackState::Running => {}
            PlaybackState::Paused => {
                self.anchor = now.checked_sub(self.paused_elapsed).or(Some(now));
                self.paused_elapsed = Duration::ZERO;
                self.state = PlaybackState::Running;
            }
            PlaybackState::Stopped => {
                self.anchor = None;
                self.paused_elapsed = Duration::ZERO;
                self.state = PlaybackState::Running;
            }
        }
    }

    /// Halt ticking, keeping index and progress within the current move
    pub fn pause(&mut self, now: Instant) {
        if self.state == PlaybackState::Running {
            self.paused_elapsed = self
                .anchor
                .map_or(Duration::ZERO, |anchor| now.saturating_duration_since(anchor));
            self.anchor = None;
            self.state = PlaybackState::Paused;
        }
    }

    /// Jump to the end of the current command
    pub fn step_forward(&mut self) -> Option<PlaybackEvent> {
        let result = self.results.get(self.index)?;
        self.position = result.end;
        let line_number = result.line_number;
        self.index += 1;
        self.clear_progress();
        Some(PlaybackEvent::Position {
            position: self.position,
            line_number,
        })
    }

    /// Undo the previous command
    pub fn step_backward(&mut self) -> Option<PlaybackEvent> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        let result = &self.results[self.index];
        self.position = result.start;
        let line_number = result.line_number;
        self.clear_progress();
        Some(PlaybackEvent::Position {
            position: self.position,
            line_number,
        })
    }

    /// Return to the first command without changing the running state
    pub fn rewind(&mut self) -> PlaybackEvent {
        self.return_to_start();
        PlaybackEvent::Position {
            position: self.position,
            line_number: self.results.first().map_or(0, |r| r.line_number),
        }
    }

    /// Halt and return to the first command
    pub fn stop(&mut self) -> PlaybackEvent {
        self.state = PlaybackState::Stopped;
        self.rewind()
    }

    /// Dispatch a control command
    pub fn apply(&mut self, command: PlaybackCommand, now: Instant) -> Option<PlaybackEvent> {
        match command {
            PlaybackCommand::Play => {
                self.play(now);
                None
            }
            PlaybackCommand::Pause => {
                self.pause(now);
                None
            }
            PlaybackCommand::StepForward => self.step_forward(),
            PlaybackCommand::StepBackward => self.step_backward(),
            PlaybackCommand::Rewind => Some(self.rewind()),
            PlaybackCommand::Stop => Some(self.stop()),
        }
    }

    /// Advance the animation to `now`
    ///
    /// Commands that do not move are consumed one per tick without an event.
    /// Reaching the end stops the driver and yields [`PlaybackEvent::Finished`].
    pub fn tick(&mut self, now: Instant) -> Option<PlaybackEvent> {
        if self.state != PlaybackState::Running {
            return None;
        }

        let Some(result) = self.results.get(self.index) else {
            self.state = PlaybackState::Stopped;
            self.clear_progress();
            return Some(PlaybackEvent::Finished);
        };

        if !result.requires_movement {
            self.index += 1;
            self.clear_progress();
            return None;
        }

        let anchor = *self.anchor.get_or_insert(now);
        let planned = if result.is_rapid {
            result.duration_secs / self.rapid_speedup
        } else {
            result.duration_secs
        };
        let fraction = if planned > 0.0 {
            (now.saturating_duration_since(anchor).as_secs_f64() / planned).min(1.0)
        } else {
            1.0
        };

        let line_number = result.line_number;
        if fraction >= 1.0 {
            self.position = result.end;
            self.index += 1;
            self.clear_progress();
        } else {
            self.position = result.interpolate(fraction);
        }

        Some(PlaybackEvent::Position {
            position: self.position,
            line_number,
        })
    }

    fn return_to_start(&mut self) {
        self.index = 0;
        self.position = self
            .results
            .first()
            .map_or_else(Point3::origin, |r| r.start);
        self.clear_progress();
    }

    fn clear_progress(&mut self) {
        self.anchor = None;
        self.paused_elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "G90\nG1 X10 F600\nM3\nG0 X0\n";

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn position_x(event: Option<PlaybackEvent>) -> f64 {
        match event {
            Some(PlaybackEvent::Position { position, .. }) => position.x,
            other => panic!("expected a position, got {:?}", other),
        }
    }

    #[test]
    fn test_load_precomputes_everything() {
        let mut driver = PlaybackDriver::default();
        assert_eq!(driver.load(PROGRAM), 4);
        assert_eq!(driver.state(), PlaybackState::Stopped);
        assert_eq!(driver.index(), 0);
        assert!((driver.results()[1].duration_secs - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tick_interpolates_and_snaps() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::default();
        driver.start(PROGRAM, t0);

        // G90 consumed silently
        assert_eq!(driver.tick(t0), None);
        assert_eq!(driver.index(), 1);

        // 10 mm at 600 mm/min takes one second
        assert_eq!(position_x(driver.tick(t0)), 0.0);
        assert!((position_x(driver.tick(ms(t0, 250))) - 2.5).abs() < 1e-9);
        assert_eq!(position_x(driver.tick(ms(t0, 1500))), 10.0);
        assert_eq!(driver.index(), 2);
    }

    #[test]
    fn test_rapid_moves_play_faster() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::default();
        driver.load(PROGRAM);
        driver.step_forward();
        driver.step_forward();
        driver.step_forward();
        driver.play(t0);

        // G0 X0: planned 1 s, played in 0.5 s
        assert_eq!(position_x(driver.tick(t0)), 10.0);
        assert!((position_x(driver.tick(ms(t0, 250))) - 5.0).abs() < 1e-9);
        assert_eq!(position_x(driver.tick(ms(t0, 500))), 0.0);

        assert_eq!(driver.tick(ms(t0, 525)), Some(PlaybackEvent::Finished));
        assert_eq!(driver.state(), PlaybackState::Stopped);
        assert_eq!(driver.tick(ms(t0, 550)), None);
    }

    #[test]
    fn test_pause_keeps_progress() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::default();
        driver.start("G1 X10 F600\n", t0);
        driver.tick(t0);
        driver.tick(ms(t0, 400));

        driver.pause(ms(t0, 400));
        driver.pause(ms(t0, 900));
        assert_eq!(driver.state(), PlaybackState::Paused);
        assert_eq!(driver.tick(ms(t0, 5000)), None);
        assert!((driver.position().x - 4.0).abs() < 1e-9);

        driver.play(ms(t0, 10_000));
        driver.play(ms(t0, 10_050));
        assert!((position_x(driver.tick(ms(t0, 10_100))) - 5.0).abs() < 1e-9);
        assert_eq!(driver.index(), 0);
    }

    #[test]
    fn test_steps_bypass_interpolation() {
        let mut driver = PlaybackDriver::default();
        driver.load(PROGRAM);

        assert!(driver.step_backward().is_none());
        driver.step_forward();
        assert_eq!(position_x(driver.step_forward()), 10.0);
        assert_eq!(driver.index(), 2);

        assert_eq!(position_x(driver.step_backward()), 0.0);
        assert_eq!(driver.index(), 1);

        for _ in 0..10 {
            driver.step_forward();
        }
        assert!(driver.is_finished());
        assert_eq!(driver.position().x, 0.0);
    }

    #[test]
    fn test_rewind_and_stop() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::default();
        driver.start(PROGRAM, t0);
        driver.step_forward();
        driver.step_forward();

        driver.apply(PlaybackCommand::Rewind, t0);
        assert_eq!(driver.index(), 0);
        assert_eq!(driver.state(), PlaybackState::Running);

        driver.apply(PlaybackCommand::StepForward, t0);
        driver.apply(PlaybackCommand::Stop, t0);
        assert_eq!(driver.index(), 0);
        assert_eq!(driver.state(), PlaybackState::Stopped);
        assert_eq!(driver.position(), Point3::origin());
    }

    #[test]
    fn test_empty_program_finishes_immediately() {
        let t0 = Instant::now();
        let mut driver = PlaybackDriver::default();
        driver.start("; nothing here\n", t0);
        assert_eq!(driver.tick(t0), Some(PlaybackEvent::Finished));
    }
}
