//! Animated replay of interpreted programs
//!
//! [`PlaybackDriver`] is a synchronous state machine advanced by explicit
//! ticks; [`PlaybackSession`] runs one on a tokio task with a fixed tick
//! interval and command/event channels.

pub mod driver;
pub mod session;

pub use driver::*;
pub use session::*;
