//! Add/edit form for a single user.
//!
//! The form owns one [`FormControl`] per editable field, the city choice, and
//! a [`ChipSelector`] for group memberships. It runs inside a modal frame as
//! a [`DialogComponent`]: a [`FormDriver`] supplies operator actions until a
//! submit succeeds or the operator cancels.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::api::Api;
use super::chips::ChipSelector;
use super::dialog::{DialogComponent, ModalChrome, UiService};
use super::error::DomainError;
use super::helpers::merge_errors;
use super::models::{City, Group, User};
use super::ports::{FieldSnapshot, FormAction, FormDriver, FormSnapshot, Resource};
use super::record::RecordId;
use super::table_config::LookupConfig;
use super::validation::{
    ErrorSet, FormControl, UserField, ValidationReason, email_conflicts, validate_field,
};

/// Choices offered for the gender field.
pub const GENDER_OPTIONS: [&str; 2] = ["Male", "Female"];

/// Shown when submit is attempted with failing fields.
pub const INVALID_DATA: &str = "Invalid data";
/// Shown after a successful create.
pub const USER_ADDED: &str = "User added successfully!!!";
/// Shown after a successful update.
pub const USER_UPDATED: &str = "User updated successfully!!!";
/// Alert raised when a create fails.
pub const ADD_FAILED: &str = "Error while adding the user";
/// Alert raised when an update fails.
pub const UPDATE_FAILED: &str = "Error while update user";
/// Alert raised when the city list cannot be loaded.
pub const CITIES_FAILED: &str = "Error while get cities";
/// Alert raised when the group list cannot be loaded.
pub const GROUPS_FAILED: &str = "Error while get groups";
/// Alert raised when the uniqueness check cannot load users.
pub const USERS_FAILED: &str = "Error while getting users!!";

/// Whether the form creates a user or edits an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    /// Build a new user.
    #[default]
    Create,
    /// Edit this stored user.
    Edit(User),
}

impl FormMode {
    /// The stored user being edited, if any.
    pub fn original(&self) -> Option<&User> {
        match self {
            Self::Create => None,
            Self::Edit(user) => Some(user),
        }
    }

    /// Label of the submit action.
    pub const fn action_label(&self) -> &'static str {
        match self {
            Self::Create => "save",
            Self::Edit(_) => "update",
        }
    }
}

/// What a successful submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    /// A new user was stored.
    Created,
    /// An existing user was replaced.
    Updated,
}

impl FormResult {
    /// Close tag reported to whoever opened the form.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Created => "save",
            Self::Updated => "update",
        }
    }
}

impl fmt::Display for FormResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Reasons a submit did not store anything.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// At least one field is failing validation.
    #[error("form data is invalid")]
    Invalid,
    /// The backend refused or failed the write.
    #[error(transparent)]
    Backend(#[from] DomainError),
}

/// Whether the form stays open after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    /// Keep asking for actions.
    Continue,
    /// The form closed, with a result when a submit succeeded.
    Closed(Option<FormResult>),
}

fn blank_control(field: UserField) -> FormControl {
    FormControl::new("", validate_field(field, ""))
}

fn blank_controls() -> BTreeMap<UserField, FormControl> {
    UserField::ALL
        .into_iter()
        .map(|field| (field, blank_control(field)))
        .collect()
}

/// State of an open add/edit user form.
pub struct UserForm {
    api: Api,
    ui: UiService,
    driver: Arc<dyn FormDriver>,
    mode: FormMode,
    title: String,
    controls: BTreeMap<UserField, FormControl>,
    cities: Vec<City>,
    selected_city: Option<RecordId>,
    groups: ChipSelector<Group>,
    group_changes: mpsc::UnboundedReceiver<Vec<Group>>,
    selected_groups: Vec<Group>,
}

impl fmt::Debug for UserForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserForm")
            .field("mode", &self.mode)
            .field("title", &self.title)
            .field("controls", &self.controls)
            .field("selected_city", &self.selected_city)
            .field("selected_groups", &self.selected_groups)
            .finish_non_exhaustive()
    }
}

impl UserForm {
    /// Blank create-mode form.
    pub fn new(api: Api, ui: UiService, driver: Arc<dyn FormDriver>) -> Self {
        let mut groups = ChipSelector::new(LookupConfig::new("id", "groupName"))
            .with_label("Groups", "New group...");
        let group_changes = groups.subscribe();
        Self {
            api,
            ui,
            driver,
            mode: FormMode::Create,
            title: String::new(),
            controls: blank_controls(),
            cities: Vec::new(),
            selected_city: None,
            groups,
            group_changes,
            selected_groups: Vec::new(),
        }
    }

    /// Load reference data and, when `edit` is given, pre-fill from it.
    ///
    /// Cities and groups are fetched concurrently. A failed fetch raises its
    /// own alert and leaves that list empty; the form stays usable.
    pub async fn open(&mut self, edit: Option<User>) {
        let (cities, groups) = tokio::join!(self.api.cities(), self.api.groups());
        match cities {
            Ok(cities) => self.cities = cities,
            Err(err) => {
                warn!(error = %err, "city list unavailable");
                self.ui.alert(CITIES_FAILED).await;
            }
        }
        match groups {
            Ok(groups) => self.groups.set_candidates(groups),
            Err(err) => {
                warn!(error = %err, "group list unavailable");
                self.ui.alert(GROUPS_FAILED).await;
            }
        }
        if let Some(user) = edit {
            self.prefill(user);
        }
    }

    fn prefill(&mut self, user: User) {
        for field in UserField::ALL {
            let value = field.read(&user);
            let errors = validate_field(field, value);
            self.controls.insert(field, FormControl::new(value, errors));
        }
        self.selected_city = user.city.as_ref().map(|city| city.id);
        self.groups.set_selected(user.groups.clone());
        self.selected_groups = user.groups.clone();
        self.mode = FormMode::Edit(user);
    }

    /// Create or edit.
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Title shown on the frame.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Control backing `field`.
    pub fn control(&self, field: UserField) -> Option<&FormControl> {
        self.controls.get(&field)
    }

    /// Cities offered for selection.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Selected city id.
    pub fn selected_city(&self) -> Option<RecordId> {
        self.selected_city
    }

    /// Group chip selector.
    pub fn groups(&self) -> &ChipSelector<Group> {
        &self.groups
    }

    /// Groups as last published by the chip selector.
    pub fn selected_groups(&self) -> &[Group] {
        &self.selected_groups
    }

    /// Whether every control passes validation.
    pub fn is_valid(&self) -> bool {
        self.controls.values().all(FormControl::is_valid)
    }

    /// Replace a field's value and revalidate it.
    ///
    /// A non-empty email is also checked against the stored users; a clash
    /// adds a `duplicate` finding next to any synchronous ones.
    pub async fn set_field(&mut self, field: UserField, value: impl Into<String>) {
        let text = value.into();
        let errors = validate_field(field, &text);
        self.controls
            .insert(field, FormControl::new(text.as_str(), errors));
        if field == UserField::Email && !text.is_empty() {
            self.check_email_unique(&text).await;
        }
    }

    async fn check_email_unique(&mut self, email: &str) {
        let users = match self.api.users().await {
            Ok(users) => users,
            Err(err) => {
                warn!(error = %err, "uniqueness check could not load users");
                self.ui.alert(USERS_FAILED).await;
                return;
            }
        };
        let original = self.mode.original().map(|user| user.email.as_str());
        if !email_conflicts(email, users.iter().map(|user| user.email.as_str()), original) {
            return;
        }
        debug!(email, "email already taken");
        let duplicate: ErrorSet = [ValidationReason::Duplicate].into_iter().collect();
        merge_errors(Some(&duplicate), self.controls.get_mut(&UserField::Email));
    }

    /// Choose a city by id, or clear the choice.
    pub fn select_city(&mut self, id: Option<RecordId>) {
        self.selected_city = id;
    }

    /// Apply a chip-selector edit and pick up the published selection.
    fn edit_groups(&mut self, edit: impl FnOnce(&mut ChipSelector<Group>) -> bool) -> bool {
        let changed = edit(&mut self.groups);
        while let Ok(selected) = self.group_changes.try_recv() {
            self.selected_groups = selected;
        }
        changed
    }

    /// User assembled from the current controls.
    ///
    /// The city is resolved against the loaded cities; an id that matches
    /// none of them yields no city.
    pub fn draft(&self) -> User {
        let value = |field: UserField| {
            self.controls
                .get(&field)
                .map(|control| control.value().to_owned())
                .unwrap_or_default()
        };
        let city = self
            .selected_city
            .and_then(|id| self.cities.iter().find(|city| city.id == id).cloned());
        User {
            id: self.mode.original().and_then(|user| user.id),
            first_name: value(UserField::FirstName),
            last_name: value(UserField::LastName),
            email: value(UserField::Email),
            phone_number: value(UserField::PhoneNumber),
            address: value(UserField::Address),
            gender: value(UserField::Gender),
            city,
            groups: self.selected_groups.clone(),
        }
    }

    /// Validate and store the form.
    ///
    /// # Errors
    /// [`SubmitError::Invalid`] when a field fails validation (nothing is
    /// sent), or [`SubmitError::Backend`] when the write fails. The form
    /// keeps its data in both cases.
    pub async fn submit(&mut self) -> Result<FormResult, SubmitError> {
        if !self.is_valid() {
            self.ui.notify(INVALID_DATA);
            return Err(SubmitError::Invalid);
        }
        let user = self.draft();
        let (outcome, failure) = match &self.mode {
            FormMode::Create => (
                self.api
                    .post(Resource::User, &user)
                    .await
                    .map(|_| FormResult::Created),
                ADD_FAILED,
            ),
            FormMode::Edit(original) => {
                let written = match original.id {
                    Some(id) => self.api.put(Resource::User, id, &user).await,
                    None => Err(DomainError::invalid_request("edited user has no id")),
                };
                (written.map(|_| FormResult::Updated), UPDATE_FAILED)
            }
        };
        match outcome {
            Ok(result) => {
                info!(result = result.tag(), email = %user.email, "user stored");
                self.ui.notify(match result {
                    FormResult::Created => USER_ADDED,
                    FormResult::Updated => USER_UPDATED,
                });
                self.reset();
                Ok(result)
            }
            Err(err) => {
                warn!(code = ?err.code(), error = %err, "user write failed");
                self.ui.alert(failure).await;
                Err(SubmitError::Backend(err))
            }
        }
    }

    /// Clear every control, the city, and the selected groups.
    pub fn reset(&mut self) {
        self.controls = blank_controls();
        self.selected_city = None;
        self.groups.set_input("");
        self.groups.set_selected(Vec::new());
        self.selected_groups.clear();
    }

    /// Everything a driver needs to choose the next action.
    pub fn snapshot(&self) -> FormSnapshot {
        let fields = self
            .controls
            .iter()
            .map(|(field, control)| FieldSnapshot {
                field: *field,
                value: control.value().to_owned(),
                errors: control.errors().clone(),
            })
            .collect();
        FormSnapshot {
            title: self.title.clone(),
            action_label: self.mode.action_label(),
            fields,
            cities: self.cities.clone(),
            selected_city: self.selected_city,
            group_label: self.groups.label().to_owned(),
            group_placeholder: self.groups.placeholder().to_owned(),
            group_input: self.groups.input().to_owned(),
            selected_groups: self.selected_groups.clone(),
            group_suggestions: self.groups.filtered().into_iter().cloned().collect(),
            gender_options: &GENDER_OPTIONS,
            valid: self.is_valid(),
        }
    }

    /// Apply one operator action.
    pub async fn apply(&mut self, action: FormAction) -> FormStep {
        match action {
            FormAction::SetField { field, value } => self.set_field(field, value).await,
            FormAction::SelectCity(id) => self.select_city(id),
            FormAction::GroupInput(text) => self.groups.set_input(text),
            FormAction::CommitGroupInput => {
                self.edit_groups(ChipSelector::commit_typed);
            }
            FormAction::PickGroup(id) => {
                let picked = self
                    .groups
                    .candidates()
                    .iter()
                    .find(|group| group.id == id)
                    .cloned();
                match picked {
                    Some(group) => {
                        self.edit_groups(|chips| chips.commit_pick(group));
                    }
                    None => debug!(%id, "picked group is not a candidate"),
                }
            }
            FormAction::RemoveGroup(id) => {
                let chosen = self
                    .selected_groups
                    .iter()
                    .find(|group| group.id == id)
                    .cloned();
                if let Some(group) = chosen {
                    self.edit_groups(|chips| chips.remove(&group));
                }
            }
            FormAction::Submit => {
                if let Ok(result) = self.submit().await {
                    return FormStep::Closed(Some(result));
                }
            }
            FormAction::Cancel => return FormStep::Closed(None),
        }
        FormStep::Continue
    }
}

#[async_trait]
impl DialogComponent for UserForm {
    type Data = User;
    type Output = FormResult;

    async fn run(&mut self, chrome: &ModalChrome, data: Option<User>) -> Option<FormResult> {
        chrome.title.clone_into(&mut self.title);
        self.open(data).await;
        loop {
            let snapshot = self.snapshot();
            let action = self.driver.next_action(&snapshot).await;
            if let FormStep::Closed(result) = self.apply(action).await {
                return result;
            }
        }
    }
}
