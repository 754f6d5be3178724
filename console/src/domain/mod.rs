//! Domain model, widgets, and orchestration for the user console.
//!
//! Purpose: keep every rule about users, tables, chips, validation, and
//! dialogs independent of how records are fetched and how the operator is
//! shown things. Adapters plug in through [`ports`].
//!
//! Public surface:
//! - [`UserAdmin`] drives the users table and its add/edit/delete flows.
//! - [`UserForm`] is the add/edit form component.
//! - [`TableView`] and [`ChipSelector`] are the generic widgets.
//! - [`UiService`] wraps the presentation ports.

pub mod api;
pub mod chips;
pub mod dialog;
pub mod error;
pub mod helpers;
pub mod models;
pub mod ports;
pub mod record;
pub mod table;
pub mod table_config;
pub mod user_admin;
pub mod user_form;
pub mod validation;

pub use self::api::Api;
pub use self::chips::ChipSelector;
pub use self::dialog::{ButtonType, Dialog, DialogComponent, DialogKind, ModalChrome, UiService};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::helpers::{find_by_field, merge_errors, project_field};
pub use self::models::{City, Group, User};
pub use self::record::{Record, RecordId, RecordIdError, label_text};
pub use self::table::{RenderedTable, TableIntent, TableIntentError, TableView};
pub use self::table_config::{ColumnDescriptor, LookupConfig, TableConfig};
pub use self::user_admin::{DeleteOutcome, UserAdmin};
pub use self::user_form::{FormMode, FormResult, FormStep, SubmitError, UserForm};
pub use self::validation::{
    ErrorSet, FormControl, UserField, ValidationReason, email_conflicts, validate, validate_field,
};
