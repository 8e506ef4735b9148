//! Front ends: the interactive TUI, the headless runner, and one-shot
//! server commands.

pub mod commands;
pub mod console;
pub mod tui;
