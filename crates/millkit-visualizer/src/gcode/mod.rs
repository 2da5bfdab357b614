//! G-code parsing and motion interpretation
//!
//! This module provides:
//! - Line-local parsing of the linear-motion subset
//! - A motion interpreter tracking position, distance mode and feed rate

pub mod command;
pub mod interpreter;
pub mod parser;

pub use command::*;
pub use interpreter::*;
pub use parser::*;
