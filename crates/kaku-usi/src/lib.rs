//! USI protocol handling for kaku.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, GoParams, UsiOption, parse_command};
pub use engine::{UsiEngine, format_score};
pub use error::UsiError;
