//! Line-oriented presentation over any reader/writer pair.
//!
//! One [`TerminalPresenter`] implements every presentation port: dialogs are
//! printed with their buttons and answered by name or number, notifications
//! are printed inline, and forms are driven by the commands in
//! [`super::commands`].

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::commands::{FORM_HELP, parse_form_command};
use crate::domain::dialog::{ButtonType, Dialog, ModalChrome};
use crate::domain::ports::{DialogHost, FormAction, FormDriver, FormSnapshot, Notifier};
use crate::domain::table::RenderedTable;

struct Terminal<R, W> {
    input: R,
    output: W,
    pending: VecDeque<FormAction>,
}

/// Terminal adapter for dialogs, notifications, and form input.
pub struct TerminalPresenter<R, W> {
    inner: Mutex<Terminal<R, W>>,
}

impl<R, W> std::fmt::Debug for TerminalPresenter<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPresenter").finish_non_exhaustive()
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalPresenter<R, W> {
    /// Presenter reading from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            inner: Mutex::new(Terminal {
                input,
                output,
                pending: VecDeque::new(),
            }),
        }
    }

    /// Give back the reader and writer.
    ///
    /// # Errors
    /// Fails when a previous user of the terminal panicked mid-write.
    pub fn into_inner(self) -> io::Result<(R, W)> {
        let terminal = self
            .inner
            .into_inner()
            .map_err(|_| io::Error::other("terminal lock poisoned"))?;
        Ok((terminal.input, terminal.output))
    }

    fn with_terminal<T>(&self, action: impl FnOnce(&mut Terminal<R, W>) -> io::Result<T>) -> io::Result<T> {
        let mut terminal = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("terminal lock poisoned"))?;
        action(&mut terminal)
    }

    /// Print `text` followed by a newline.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_line(&self, text: &str) -> io::Result<()> {
        self.with_terminal(|terminal| {
            writeln!(terminal.output, "{text}")?;
            terminal.output.flush()
        })
    }

    /// Print a rendered table.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn show_table(&self, table: &RenderedTable) -> io::Result<()> {
        if table.rows.is_empty() {
            return self.write_line(&format!("{table}(no records)"));
        }
        self.write_line(table.to_string().trim_end())
    }

    /// Print `prompt` and read one line, or `None` at end of input.
    ///
    /// # Errors
    /// Propagates read and write failures.
    pub fn prompt(&self, prompt: &str) -> io::Result<Option<String>> {
        self.with_terminal(|terminal| {
            write!(terminal.output, "{prompt}")?;
            terminal.output.flush()?;
            let mut line = String::new();
            if terminal.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
        })
    }

    fn report(&self, error: &io::Error) {
        warn!(error = %error, "terminal unavailable");
    }
}

fn parse_button(raw: &str, offered: &[ButtonType]) -> Option<ButtonType> {
    let answer = raw.trim();
    if let Ok(index) = answer.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| offered.get(i)).copied();
    }
    offered.iter().copied().find(|button| {
            button.name().eq_ignore_ascii_case(answer)
                || button.name().get(..1).is_some_and(|first| first.eq_ignore_ascii_case(answer))
        })
}

fn button_bar(offered: &[ButtonType]) -> String {
    offered
        .iter()
        .enumerate()
        .map(|(index, button)| format!("[{}] {button}", index + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

fn joined<T>(items: &[T], render: impl Fn(&T) -> String, separator: &str) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(separator)
}

/// Text shown for a form snapshot.
pub fn render_form(snapshot: &FormSnapshot) -> String {
    let mut lines = vec![format!("-- {} [{}] --", snapshot.title, snapshot.action_label)];
    for field in &snapshot.fields {
        let mut line = format!("  {:<12} {}", field.field.name(), field.value);
        if !field.errors.is_empty() {
            let findings = field
                .errors
                .iter()
                .map(|(_, reason)| reason.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            line.push_str("  ! ");
            line.push_str(&findings);
        }
        lines.push(line);
    }
    lines.push(format!("  gender options: {}", snapshot.gender_options.join(", ")));
    let cities = joined(
        &snapshot.cities,
        |city| {
            let marker = if snapshot.selected_city == Some(city.id) { "*" } else { "" };
            format!("{marker}{} {}", city.id, city.name)
        },
        ", ",
    );
    lines.push(format!("  cities: {cities}"));
    let chips = joined(
        &snapshot.selected_groups,
        |group| format!("({} {})", group.id, group.group_name),
        " ",
    );
    let typed = if snapshot.group_input.is_empty() {
        format!("<{}>", snapshot.group_placeholder)
    } else {
        format!("{:?}", snapshot.group_input)
    };
    lines.push(format!(
        "  {}: {chips}  input: {typed}",
        snapshot.group_label.to_lowercase()
    ));
    let suggestions = joined(
        &snapshot.group_suggestions,
        |group| format!("{} {}", group.id, group.group_name),
        ", ",
    );
    lines.push(format!("  suggestions: {suggestions}"));
    if !snapshot.valid {
        lines.push("  (form has errors)".to_owned());
    }
    lines.push(FORM_HELP.trim_end().to_owned());
    lines.join("\n")
}

#[async_trait]
impl<R: BufRead + Send, W: Write + Send> DialogHost for TerminalPresenter<R, W> {
    async fn present(&self, dialog: &Dialog) -> ButtonType {
        let offered = dialog.kind.buttons();
        let fallback = offered.last().copied().unwrap_or(ButtonType::Ok);
        let header = format!("*** {} ***\n{}\n{}", dialog.title, dialog.content, button_bar(offered));
        if let Err(error) = self.write_line(&header) {
            self.report(&error);
            return fallback;
        }
        loop {
            match self.prompt("? ") {
                Ok(Some(answer)) => {
                    if let Some(button) = parse_button(&answer, offered) {
                        return button;
                    }
                    if let Err(error) = self.write_line(&format!("choose one of: {}", button_bar(offered))) {
                        self.report(&error);
                        return fallback;
                    }
                }
                Ok(None) => return fallback,
                Err(error) => {
                    self.report(&error);
                    return fallback;
                }
            }
        }
    }

    async fn open_chrome(&self, chrome: &ModalChrome) {
        let width = chrome
            .width
            .as_deref()
            .map(|width| format!(" ({width})"))
            .unwrap_or_default();
        if let Err(error) = self.write_line(&format!("=== {}{width} ===", chrome.title)) {
            self.report(&error);
        }
    }

    async fn close_chrome(&self, chrome: &ModalChrome) {
        if let Err(error) = self.write_line(&format!("=== /{} ===", chrome.title)) {
            self.report(&error);
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> Notifier for TerminalPresenter<R, W> {
    fn notify(&self, message: &str, duration: Duration) {
        let line = format!("[{}ms] {message}", duration.as_millis());
        if let Err(error) = self.write_line(&line) {
            self.report(&error);
        }
    }
}

#[async_trait]
impl<R: BufRead + Send, W: Write + Send> FormDriver for TerminalPresenter<R, W> {
    async fn next_action(&self, snapshot: &FormSnapshot) -> FormAction {
        loop {
            let queued = self.with_terminal(|terminal| Ok(terminal.pending.pop_front()));
            match queued {
                Ok(Some(action)) => return action,
                Ok(None) => {}
                Err(error) => {
                    self.report(&error);
                    return FormAction::Cancel;
                }
            }

            let read = self
                .write_line(&render_form(snapshot))
                .and_then(|()| self.prompt("form> "));
            let line = match read {
                Ok(Some(text)) => text,
                Ok(None) => return FormAction::Cancel,
                Err(error) => {
                    self.report(&error);
                    return FormAction::Cancel;
                }
            };
            match parse_form_command(&line) {
                Ok(actions) => {
                    let queued = self.with_terminal(|terminal| {
                        terminal.pending.extend(actions);
                        Ok(())
                    });
                    if let Err(error) = queued {
                        self.report(&error);
                        return FormAction::Cancel;
                    }
                }
                Err(error) => {
                    if let Err(error) = self.write_line(&format!("error: {error}")) {
                        self.report(&error);
                        return FormAction::Cancel;
                    }
                }
            }
        }
    }
}
