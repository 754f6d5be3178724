//! Top-level read-eval loop of the console.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::commands::{SESSION_HELP, SessionCommand, parse_session_command};
use super::presenter::TerminalPresenter;
use crate::domain::{Api, RecordId, TableIntentError, UiService, UserAdmin};

const PROMPT: &str = "users> ";

/// Interactive session over one terminal.
pub struct ConsoleSession<R, W> {
    admin: UserAdmin,
    terminal: Arc<TerminalPresenter<R, W>>,
}

impl<R, W> std::fmt::Debug for ConsoleSession<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSession")
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

impl<R, W> ConsoleSession<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    /// Session around an already wired orchestrator.
    pub fn new(admin: UserAdmin, terminal: Arc<TerminalPresenter<R, W>>) -> Self {
        Self { admin, terminal }
    }

    /// Wire `terminal` as dialog host, notifier, and form driver for `api`.
    pub fn wire(api: Api, terminal: Arc<TerminalPresenter<R, W>>, notification_duration: Duration) -> Self {
        let ui = UiService::new(terminal.clone(), terminal.clone())
            .with_notification_duration(notification_duration);
        let admin = UserAdmin::new(api, ui, terminal.clone());
        Self::new(admin, terminal)
    }

    /// Orchestrator behind the session.
    pub fn admin(&self) -> &UserAdmin {
        &self.admin
    }

    /// Load the table and serve commands until `quit` or end of input.
    ///
    /// # Errors
    /// Fails when the terminal can no longer be read or written.
    pub async fn run(&mut self) -> io::Result<()> {
        info!("console session started");
        self.reload().await?;
        self.terminal.write_line(SESSION_HELP)?;
        while let Some(line) = self.terminal.prompt(PROMPT)? {
            if line.trim().is_empty() {
                continue;
            }
            match parse_session_command(&line) {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => self.execute(command).await?,
                Err(error) => self.terminal.write_line(&format!("error: {error}"))?,
            }
        }
        info!("console session finished");
        Ok(())
    }

    async fn execute(&mut self, command: SessionCommand) -> io::Result<()> {
        debug!(?command, "console command");
        match command {
            SessionCommand::List => self.reload().await,
            SessionCommand::Add => {
                if self.admin.open_add_user_form().await.is_some() {
                    self.show_table()?;
                }
                Ok(())
            }
            SessionCommand::Edit(id) => self.row_action(id, |admin, row| admin.table().request_edit(row)).await,
            SessionCommand::Delete(id) => {
                self.row_action(id, |admin, row| admin.table().request_delete(row)).await
            }
            SessionCommand::Help => self.terminal.write_line(SESSION_HELP),
            SessionCommand::Quit => Ok(()),
        }
    }

    async fn row_action(
        &mut self,
        id: RecordId,
        request: impl FnOnce(&UserAdmin, usize) -> Result<(), TableIntentError>,
    ) -> io::Result<()> {
        let Some(row) = self.admin.table().row_for_key(&id.to_value()) else {
            return self.terminal.write_line(&format!("no user with id {id}"));
        };
        if let Err(error) = request(&self.admin, row) {
            return self.terminal.write_line(&format!("error: {error}"));
        }
        if self.admin.process_intents().await > 0 {
            self.show_table()?;
        }
        Ok(())
    }

    async fn reload(&mut self) -> io::Result<()> {
        // A failed load has already been alerted; show what is left.
        if self.admin.init_users_table().await.is_err() {
            debug!("showing previous table after failed load");
        }
        self.show_table()
    }

    fn show_table(&self) -> io::Result<()> {
        self.terminal.show_table(&self.admin.table().render())
    }
}
