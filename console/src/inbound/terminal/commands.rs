//! Line commands understood by the terminal console.

use thiserror::Error;

use crate::domain::chips::ChipSelector;
use crate::domain::ports::FormAction;
use crate::domain::validation::{UnknownFieldError, UserField};
use crate::domain::{Group, RecordId, RecordIdError};

/// Help text for the top-level prompt.
pub const SESSION_HELP: &str = "commands: list | add | edit <id> | delete <id> | help | quit";

/// Help text while a form is open.
pub const FORM_HELP: &str = "form: set <field> <value> | city <id|none> | type <text>[,] | enter | \
pick <id> | drop <id> | save | cancel | show";

/// Top-level console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Reload and print the users table.
    List,
    /// Open the create form.
    Add,
    /// Open the edit form for a user.
    Edit(RecordId),
    /// Delete a user after confirmation.
    Delete(RecordId),
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
}

/// Reasons a command line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The line held only whitespace.
    #[error("empty command")]
    Empty,
    /// The first word is not a known command.
    #[error("unknown command {0:?}")]
    Unknown(String),
    /// A required argument was not supplied.
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        /// Command that was typed.
        command: &'static str,
        /// Description of the missing argument.
        argument: &'static str,
    },
    /// An id argument did not parse.
    #[error(transparent)]
    InvalidId(#[from] RecordIdError),
    /// A field name did not match any form field.
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),
}

fn split_command(raw: &str) -> Result<(String, &str), CommandError> {
    let line = raw.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Ok((word.to_ascii_lowercase(), rest.trim()))
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn parse_id(rest: &str, command: &'static str) -> Result<RecordId, CommandError> {
    Ok(required(rest, command, "a record id")?.parse()?)
}

/// Parse a line typed at the top-level prompt.
///
/// # Errors
/// Returns a [`CommandError`] describing why the line was rejected.
pub fn parse_session_command(line: &str) -> Result<SessionCommand, CommandError> {
    let (word, rest) = split_command(line)?;
    match word.as_str() {
        "list" | "ls" => Ok(SessionCommand::List),
        "add" | "new" => Ok(SessionCommand::Add),
        "edit" => parse_id(rest, "edit").map(SessionCommand::Edit),
        "delete" | "rm" => parse_id(rest, "delete").map(SessionCommand::Delete),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        _ => Err(CommandError::Unknown(word)),
    }
}

/// Split chip text on separator keys.
///
/// Every segment followed by a separator is typed and committed; a trailing
/// segment is only typed, so suggestions can be shown for it.
pub fn chip_actions(text: &str) -> Vec<FormAction> {
    let mut actions = Vec::new();
    let mut segment = String::new();
    for key in text.chars() {
        if ChipSelector::<Group>::key_ends_entry(key) {
            actions.push(FormAction::GroupInput(std::mem::take(&mut segment)));
            actions.push(FormAction::CommitGroupInput);
        } else {
            segment.push(key);
        }
    }
    if !segment.trim().is_empty() {
        actions.push(FormAction::GroupInput(segment.trim_start().to_owned()));
    }
    actions
}

/// Parse a line typed while a form is open.
///
/// An empty result means "show the form again".
///
/// # Errors
/// Returns a [`CommandError`] describing why the line was rejected.
pub fn parse_form_command(line: &str) -> Result<Vec<FormAction>, CommandError> {
    let (word, rest) = split_command(line)?;
    let action = match word.as_str() {
        "set" => {
            let assignment = required(rest, "set", "a field name")?;
            let (name, value) = assignment
                .split_once(char::is_whitespace)
                .unwrap_or((assignment, ""));
            FormAction::SetField {
                field: name.parse::<UserField>()?,
                value: value.trim().to_owned(),
            }
        }
        "city" => match required(rest, "city", "a city id or `none`")? {
            "none" | "-" => FormAction::SelectCity(None),
            id => FormAction::SelectCity(Some(id.parse()?)),
        },
        "type" => return Ok(chip_actions(rest)),
        "enter" => FormAction::CommitGroupInput,
        "pick" => FormAction::PickGroup(parse_id(rest, "pick")?),
        "drop" => FormAction::RemoveGroup(parse_id(rest, "drop")?),
        "save" | "update" | "submit" => FormAction::Submit,
        "cancel" | "close" => FormAction::Cancel,
        "show" | "help" | "?" => return Ok(Vec::new()),
        _ => return Err(CommandError::Unknown(word)),
    };
    Ok(vec![action])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::list("list", SessionCommand::List)]
    #[case::alias("  LS  ", SessionCommand::List)]
    #[case::add("add", SessionCommand::Add)]
    #[case::edit("edit 7", SessionCommand::Edit(RecordId::new(7)))]
    #[case::delete("delete 3", SessionCommand::Delete(RecordId::new(3)))]
    #[case::quit("exit", SessionCommand::Quit)]
    fn session_commands_parse(#[case] line: &str, #[case] expected: SessionCommand) {
        assert_eq!(parse_session_command(line), Ok(expected));
    }

    #[rstest]
    fn session_command_errors_are_descriptive() {
        assert_eq!(parse_session_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_session_command("edit"),
            Err(CommandError::MissingArgument {
                command: "edit",
                argument: "a record id"
            })
        );
        assert!(matches!(
            parse_session_command("delete seven"),
            Err(CommandError::InvalidId(_))
        ));
        assert_eq!(
            parse_session_command("frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_owned()))
        );
    }

    #[rstest]
    #[case::set(
        "set firstName Ann Marie",
        vec![FormAction::SetField { field: UserField::FirstName, value: "Ann Marie".to_owned() }]
    )]
    #[case::clear(
        "set last_name",
        vec![FormAction::SetField { field: UserField::LastName, value: String::new() }]
    )]
    #[case::city("city 2", vec![FormAction::SelectCity(Some(RecordId::new(2)))])]
    #[case::no_city("city none", vec![FormAction::SelectCity(None)])]
    #[case::enter("enter", vec![FormAction::CommitGroupInput])]
    #[case::pick("pick 1", vec![FormAction::PickGroup(RecordId::new(1))])]
    #[case::drop("drop 1", vec![FormAction::RemoveGroup(RecordId::new(1))])]
    #[case::save("update", vec![FormAction::Submit])]
    #[case::cancel("cancel", vec![FormAction::Cancel])]
    #[case::show("show", vec![])]
    fn form_commands_parse(#[case] line: &str, #[case] expected: Vec<FormAction>) {
        assert_eq!(parse_form_command(line), Ok(expected));
    }

    #[rstest]
    fn unknown_fields_are_reported() {
        assert!(matches!(
            parse_form_command("set nickname Al"),
            Err(CommandError::UnknownField(_))
        ));
    }

    #[rstest]
    #[case::typed_only("Adm", vec![FormAction::GroupInput("Adm".to_owned())])]
    #[case::committed(
        "Admins,",
        vec![FormAction::GroupInput("Admins".to_owned()), FormAction::CommitGroupInput]
    )]
    #[case::several(
        "Admins, Editors,Gu",
        vec![
            FormAction::GroupInput("Admins".to_owned()),
            FormAction::CommitGroupInput,
            FormAction::GroupInput(" Editors".to_owned()),
            FormAction::CommitGroupInput,
            FormAction::GroupInput("Gu".to_owned()),
        ]
    )]
    #[case::empty("", vec![])]
    fn chip_text_splits_on_separators(#[case] text: &str, #[case] expected: Vec<FormAction>) {
        assert_eq!(chip_actions(text), expected);
    }
}
