//! Terminal console: command parsing, presentation, and the session loop.

pub mod commands;
pub mod presenter;
pub mod session;

pub use self::commands::{CommandError, SessionCommand, parse_form_command, parse_session_command};
pub use self::presenter::TerminalPresenter;
pub use self::session::ConsoleSession;
