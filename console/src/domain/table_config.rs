//! Declarative configuration for rendering record collections.

use serde_json::Value;

use super::record::{Record, label_text};

/// Primary-key field used when a table does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Names the identity and label sub-fields of a nested record.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_console::domain::LookupConfig;
///
/// let lookup = LookupConfig::new("id", "name");
/// let city = json!({ "id": 4, "name": "Springfield" });
/// assert_eq!(lookup.label_of(&city).as_deref(), Some("Springfield"));
/// assert_eq!(lookup.value_of(&city), Some(json!(4)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    value_field: String,
    label_field: String,
}

impl LookupConfig {
    /// Build a lookup from the identity and label field names.
    pub fn new(value_field: impl Into<String>, label_field: impl Into<String>) -> Self {
        Self {
            value_field: value_field.into(),
            label_field: label_field.into(),
        }
    }

    /// Field compared to decide whether two records are the same.
    pub fn value_field(&self) -> &str {
        self.value_field.as_str()
    }

    /// Field shown to the operator.
    pub fn label_field(&self) -> &str {
        self.label_field.as_str()
    }

    /// Identity value of `record`.
    pub fn value_of<R: Record + ?Sized>(&self, record: &R) -> Option<Value> {
        record.field(&self.value_field)
    }

    /// Display label of `record`.
    pub fn label_of<R: Record + ?Sized>(&self, record: &R) -> Option<String> {
        record.field(&self.label_field).map(|value| label_text(&value))
    }
}

/// One table column.
///
/// ## Invariants
/// - `field_name` exists on every record shown in the table.
/// - With a lookup, the field holds a nested record (or a list of them)
///   carrying the lookup's value and label fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    field_name: String,
    display_label: String,
    lookup: Option<LookupConfig>,
}

impl ColumnDescriptor {
    /// Plain column rendering the field's scalar value.
    pub fn new(field_name: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            display_label: display_label.into(),
            lookup: None,
        }
    }

    /// Column rendering a nested record through `lookup`.
    pub fn with_lookup(
        field_name: impl Into<String>,
        display_label: impl Into<String>,
        lookup: LookupConfig,
    ) -> Self {
        Self {
            lookup: Some(lookup),
            ..Self::new(field_name, display_label)
        }
    }

    /// Record field this column reads.
    pub fn field_name(&self) -> &str {
        self.field_name.as_str()
    }

    /// Column header.
    pub fn display_label(&self) -> &str {
        self.display_label.as_str()
    }

    /// Lookup used for nested records, if any.
    pub fn lookup(&self) -> Option<&LookupConfig> {
        self.lookup.as_ref()
    }
}

/// Everything needed to render a collection as a table.
///
/// A configuration is a snapshot: refreshing the data builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig<R> {
    data: Vec<R>,
    columns: Vec<ColumnDescriptor>,
    primary_key_field: String,
    deletable: bool,
    editable: bool,
}

impl<R> TableConfig<R> {
    /// Read-only table keyed by [`DEFAULT_PRIMARY_KEY`].
    pub fn new(data: Vec<R>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            data,
            columns,
            primary_key_field: DEFAULT_PRIMARY_KEY.to_owned(),
            deletable: false,
            editable: false,
        }
    }

    /// Override the primary-key field name.
    #[must_use]
    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key_field = field.into();
        self
    }

    /// Allow or forbid delete requests.
    #[must_use]
    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    /// Allow or forbid edit requests.
    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Rows in display order.
    pub fn data(&self) -> &[R] {
        &self.data
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Field holding each record's primary key.
    pub fn primary_key_field(&self) -> &str {
        self.primary_key_field.as_str()
    }

    /// Whether rows can be deleted.
    pub fn is_deletable(&self) -> bool {
        self.deletable
    }

    /// Whether rows can be edited.
    pub fn is_editable(&self) -> bool {
        self.editable
    }
}
