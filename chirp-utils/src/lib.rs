/// Generic embed builders shared across commands.
pub mod embed;
/// Shared formatting helpers (durations, timestamps, reasons).
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Shared pagination helper utilities.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
/// Permission and issuer-role helpers.
pub mod permissions;
/// Keyed fire-and-forget timers.
pub mod tasks;
/// Shared time helpers.
pub mod time;
