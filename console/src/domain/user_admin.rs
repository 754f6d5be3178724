//! Root orchestration of the users table and its modal forms.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::api::Api;
use super::dialog::{ButtonType, DialogKind, UiService};
use super::error::DomainError;
use super::models::User;
use super::ports::{FormDriver, Resource};
use super::record::RecordId;
use super::table::{TableIntent, TableView};
use super::table_config::{ColumnDescriptor, LookupConfig, TableConfig};
use super::user_form::{FormResult, UserForm};

/// Title of the create form.
pub const ADD_USER_TITLE: &str = "Add User Form";
/// Width hint of the create form.
pub const ADD_USER_WIDTH: &str = "50%";
/// Title of the edit form.
pub const EDIT_USER_TITLE: &str = "Edit User Form";
/// Alert raised when the users table cannot be loaded.
pub const FETCH_FAILED: &str = "Error while fetching records";
/// Title of the delete confirmation.
pub const DELETE_TITLE: &str = "Warning";
/// Shown after a successful delete.
pub const USER_DELETED: &str = "User deleted successfully!!!";
/// Alert raised when a delete fails.
pub const DELETE_FAILED: &str = "Error while deleting the user";

/// Body of the delete confirmation for `id`.
pub fn delete_prompt(id: RecordId) -> String {
    format!("Are you sure to delete user : {id} ?")
}

/// Columns of the users table.
pub fn users_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("firstName", "First Name"),
        ColumnDescriptor::new("email", "Email"),
        ColumnDescriptor::new("phoneNumber", "Phone Number"),
        ColumnDescriptor::with_lookup("city", "City", LookupConfig::new("id", "name")),
        ColumnDescriptor::new("address", "Address"),
        ColumnDescriptor::new("gender", "Gender"),
    ]
}

fn users_table(users: Vec<User>) -> TableConfig<User> {
    TableConfig::new(users, users_columns())
        .with_primary_key("id")
        .deletable(true)
        .editable(true)
}

/// What happened to a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The operator did not confirm.
    Declined,
    /// The user was deleted and the table refreshed.
    Deleted,
    /// The backend refused or failed the delete.
    Failed,
}

/// Owns the users table and reacts to its row actions.
pub struct UserAdmin {
    api: Api,
    ui: UiService,
    driver: Arc<dyn FormDriver>,
    table: TableView<User>,
    intents: mpsc::UnboundedReceiver<TableIntent<User>>,
}

impl fmt::Debug for UserAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAdmin")
            .field("rows", &self.table.config().data().len())
            .finish_non_exhaustive()
    }
}

impl UserAdmin {
    /// Orchestrator with an empty table; call
    /// [`UserAdmin::init_users_table`] to load it.
    pub fn new(api: Api, ui: UiService, driver: Arc<dyn FormDriver>) -> Self {
        let (tx, intents) = mpsc::unbounded_channel();
        Self {
            api,
            ui,
            driver,
            table: TableView::new(users_table(Vec::new()), tx),
            intents,
        }
    }

    /// Table currently shown.
    pub fn table(&self) -> &TableView<User> {
        &self.table
    }

    /// Dialog service used for prompts and alerts.
    pub fn ui(&self) -> &UiService {
        &self.ui
    }

    /// Fetch all users and rebuild the table.
    ///
    /// # Errors
    /// Returns the fetch failure after alerting the operator; the previous
    /// table stays in place.
    pub async fn init_users_table(&mut self) -> Result<(), DomainError> {
        match self.api.users().await {
            Ok(users) => {
                debug!(rows = users.len(), "users table refreshed");
                self.table.replace_config(users_table(users));
                Ok(())
            }
            Err(err) => {
                warn!(code = ?err.code(), error = %err, "users table refresh failed");
                self.ui.alert(FETCH_FAILED).await;
                Err(err)
            }
        }
    }

    fn form(&self) -> UserForm {
        UserForm::new(self.api.clone(), self.ui.clone(), self.driver.clone())
    }

    /// Host the create form; refresh the table when a user was added.
    pub async fn open_add_user_form(&mut self) -> Option<FormResult> {
        let mut form = self.form();
        let result = self
            .ui
            .open_component_in_dialog(&mut form, ADD_USER_TITLE, None, Some(ADD_USER_WIDTH))
            .await;
        if result == Some(FormResult::Created) {
            self.refresh().await;
        }
        result
    }

    /// Host the edit form for `user`; refresh the table when it was updated.
    pub async fn edit_user(&mut self, user: User) -> Option<FormResult> {
        let mut form = self.form();
        let result = self
            .ui
            .open_component_in_dialog(&mut form, EDIT_USER_TITLE, Some(user), None)
            .await;
        if result == Some(FormResult::Updated) {
            self.refresh().await;
        }
        result
    }

    /// Confirm and delete the user keyed by `id`.
    ///
    /// Only an explicit `Yes` reaches the backend. On success the table is
    /// refreshed before the confirmation is shown.
    pub async fn delete_user(&mut self, id: RecordId) -> DeleteOutcome {
        let answer = self
            .ui
            .open_dialog(DialogKind::YesNoCancel, DELETE_TITLE, &delete_prompt(id), None)
            .await;
        if answer != ButtonType::Yes {
            debug!(%id, answer = answer.name(), "delete not confirmed");
            return DeleteOutcome::Declined;
        }
        match self.api.delete(Resource::User, id).await {
            Ok(()) => {
                info!(%id, "user deleted");
                self.refresh().await;
                self.ui.notify(USER_DELETED);
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(%id, code = ?err.code(), error = %err, "user delete failed");
                self.ui.alert(DELETE_FAILED).await;
                DeleteOutcome::Failed
            }
        }
    }

    async fn refresh(&mut self) {
        // Failures already raised their own alert.
        if self.init_users_table().await.is_err() {
            debug!("table kept after failed refresh");
        }
    }

    /// Route one table intent.
    pub async fn handle_intent(&mut self, intent: TableIntent<User>) {
        match intent {
            TableIntent::Edit(user) => {
                self.edit_user(user).await;
            }
            TableIntent::Delete(key) => match RecordId::from_value(&key) {
                Some(id) => {
                    self.delete_user(id).await;
                }
                None => warn!(%key, "delete requested for a non-numeric key"),
            },
        }
    }

    /// Handle every intent queued by the table, returning how many ran.
    pub async fn process_intents(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(intent) = self.intents.try_recv() {
            self.handle_intent(intent).await;
            handled += 1;
        }
        handled
    }
}
