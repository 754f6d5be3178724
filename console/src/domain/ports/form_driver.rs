//! Port through which an operator fills in the user form.
use async_trait::async_trait;

use crate::domain::validation::{ErrorSet, UserField};
use crate::domain::{City, Group, RecordId};

/// One editable field as the operator sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    /// Field identity.
    pub field: UserField,
    /// Current text.
    pub value: String,
    /// Findings currently attached to the field.
    pub errors: ErrorSet,
}

/// Read-only view of the form handed to the driver before each action.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot {
    /// Dialog title.
    pub title: String,
    /// Submit button label, `save` or `update`.
    pub action_label: &'static str,
    /// Editable fields in form order.
    pub fields: Vec<FieldSnapshot>,
    /// Cities available for selection.
    pub cities: Vec<City>,
    /// Currently selected city id.
    pub selected_city: Option<RecordId>,
    /// Caption of the group chip input.
    pub group_label: String,
    /// Placeholder shown while the group chip input is empty.
    pub group_placeholder: String,
    /// Text typed into the group chip input.
    pub group_input: String,
    /// Groups already chosen.
    pub selected_groups: Vec<Group>,
    /// Groups matching the typed text.
    pub group_suggestions: Vec<Group>,
    /// Choices offered for the gender field.
    pub gender_options: &'static [&'static str],
    /// Whether every field currently passes validation.
    pub valid: bool,
}

impl FormSnapshot {
    /// Snapshot of a single field.
    pub fn field(&self, field: UserField) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|snapshot| snapshot.field == field)
    }
}

/// Operator input applied to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Replace a field's text.
    SetField {
        /// Field to change.
        field: UserField,
        /// New text.
        value: String,
    },
    /// Choose a city by id, or clear the choice.
    SelectCity(Option<RecordId>),
    /// Replace the group chip input text.
    GroupInput(String),
    /// Commit the typed group text as a chip.
    CommitGroupInput,
    /// Add the group with this id from the suggestions.
    PickGroup(RecordId),
    /// Remove the selected group with this id.
    RemoveGroup(RecordId),
    /// Submit the form.
    Submit,
    /// Close the form without saving.
    Cancel,
}

/// Supplies the next operator action for an open form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// Decide what to do next given the current form state.
    async fn next_action(&self, snapshot: &FormSnapshot) -> FormAction;
}
