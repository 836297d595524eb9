use std::fmt::Display;
use std::io::{stderr, stdout, Write};

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Ok,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Ok => "[OK]",
            Level::Warn => "[WARN]",
            Level::Error => "[ERROR]",
        }
    }

    fn color(self) -> Color {
        match self {
            Level::Info => Color::Cyan,
            Level::Ok => Color::Green,
            Level::Warn => Color::Yellow,
            Level::Error => Color::Red,
        }
    }
}

/// Print one colored status line. Warnings and errors go to stderr.
pub fn status(level: Level, msg: impl Display) {
    let line = format!(" {msg}\n");
    let _ = match level {
        Level::Warn | Level::Error => {
            execute!(stderr(), SetForegroundColor(level.color()), Print(level.tag()), ResetColor, Print(line))
        }
        Level::Info | Level::Ok => {
            execute!(stdout(), SetForegroundColor(level.color()), Print(level.tag()), ResetColor, Print(line))
        }
    };
}

pub fn info(msg: impl Display) {
    status(Level::Info, msg)
}

pub fn ok(msg: impl Display) {
    status(Level::Ok, msg)
}

pub fn warn(msg: impl Display) {
    status(Level::Warn, msg)
}

pub fn error(msg: impl Display) {
    status(Level::Error, msg)
}

/// Print a block of text in one color.
pub fn colored(color: Color, text: impl Display) {
    let mut out = stdout();
    let _ = execute!(out, SetForegroundColor(color), Print(text), ResetColor);
    let _ = out.flush();
}
