//! Generic table view driven by a [`TableConfig`].
//!
//! The view renders rows and turns row actions into [`TableIntent`]s on a
//! channel. It never mutates the data and never talks to the backend; the
//! owner of the receiving end decides what an edit or delete means.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use super::record::{Record, label_text, values_match};
use super::table_config::{ColumnDescriptor, LookupConfig, TableConfig};

/// Action requested from a table row.
#[derive(Debug, Clone, PartialEq)]
pub enum TableIntent<R> {
    /// Open the full record for editing.
    Edit(R),
    /// Delete the record with this primary-key value.
    Delete(Value),
}

/// Reasons a row action could not be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableIntentError {
    /// The table does not offer editing.
    #[error("table rows are not editable")]
    NotEditable,
    /// The table does not offer deletion.
    #[error("table rows are not deletable")]
    NotDeletable,
    /// The row index is past the end of the data.
    #[error("row {row} is out of range for a table of {len} rows")]
    RowOutOfRange {
        /// Requested row.
        row: usize,
        /// Number of rows in the table.
        len: usize,
    },
    /// The row carries no primary-key value.
    #[error("row {row} has no primary key")]
    MissingPrimaryKey {
        /// Row without a key.
        row: usize,
    },
    /// Nobody is listening for intents any more.
    #[error("table intent receiver closed")]
    Closed,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// Primary-key value, when the record has one.
    pub key: Option<Value>,
    /// Cell text in column order.
    pub cells: Vec<String>,
}

/// Header and cell text for a whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows in data order.
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_line(f, &self.headers, &widths)?;
        let rule = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-");
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            write_line(f, &row.cells, &widths)?;
        }
        Ok(())
    }
}

/// Text for one cell.
///
/// Lookup columns show the nested record's label, or the labels of a nested
/// list joined with `", "`. A scalar under a lookup column has no label and
/// renders empty. Plain columns render scalars as text and anything else as
/// compact JSON.
pub fn render_cell(value: Option<&Value>, lookup: Option<&LookupConfig>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match (lookup, value) {
        (Some(lookup), Value::Array(items)) => items
            .iter()
            .filter_map(|item| lookup.label_of(item))
            .collect::<Vec<_>>()
            .join(", "),
        (Some(lookup), Value::Object(_)) => lookup.label_of(value).unwrap_or_default(),
        (Some(_), _) => String::new(),
        (None, Value::Array(items)) if items.iter().all(|item| !item.is_object() && !item.is_array()) => {
            items.iter().map(label_text).collect::<Vec<_>>().join(", ")
        }
        (None, Value::Object(_) | Value::Array(_)) => value.to_string(),
        (None, scalar) => label_text(scalar),
    }
}

/// Table bound to a configuration and an intent channel.
#[derive(Debug)]
pub struct TableView<R> {
    config: TableConfig<R>,
    intents: mpsc::UnboundedSender<TableIntent<R>>,
}

impl<R: Record + Clone> TableView<R> {
    /// Bind `config` to the sending half of an intent channel.
    pub fn new(config: TableConfig<R>, intents: mpsc::UnboundedSender<TableIntent<R>>) -> Self {
        Self { config, intents }
    }

    /// Configuration currently shown.
    pub fn config(&self) -> &TableConfig<R> {
        &self.config
    }

    /// Swap in a freshly built configuration.
    pub fn replace_config(&mut self, config: TableConfig<R>) {
        self.config = config;
    }

    /// Render headers and cells for every row.
    pub fn render(&self) -> RenderedTable {
        let columns = self.config.columns();
        let headers = columns
            .iter()
            .map(|column| column.display_label().to_owned())
            .collect();
        let rows = self
            .config
            .data()
            .iter()
            .map(|record| RenderedRow {
                key: self.key_of(record),
                cells: columns.iter().map(|column| cell_for(record, column)).collect(),
            })
            .collect();
        RenderedTable { headers, rows }
    }

    /// Ask the owner to edit the record at `row`.
    pub fn request_edit(&self, row: usize) -> Result<(), TableIntentError> {
        if !self.config.is_editable() {
            return Err(TableIntentError::NotEditable);
        }
        let record = self.record_at(row)?.clone();
        self.send(TableIntent::Edit(record))
    }

    /// Ask the owner to delete the record at `row`.
    pub fn request_delete(&self, row: usize) -> Result<(), TableIntentError> {
        if !self.config.is_deletable() {
            return Err(TableIntentError::NotDeletable);
        }
        let record = self.record_at(row)?;
        let key = self
            .key_of(record)
            .ok_or(TableIntentError::MissingPrimaryKey { row })?;
        self.send(TableIntent::Delete(key))
    }

    /// Index of the row whose primary key matches `key`.
    pub fn row_for_key(&self, key: &Value) -> Option<usize> {
        self.config
            .data()
            .iter()
            .position(|record| self.key_of(record).is_some_and(|own| values_match(&own, key)))
    }

    fn key_of(&self, record: &R) -> Option<Value> {
        record
            .field(self.config.primary_key_field())
            .filter(|value| !value.is_null())
    }

    fn record_at(&self, row: usize) -> Result<&R, TableIntentError> {
        let data = self.config.data();
        data.get(row).ok_or(TableIntentError::RowOutOfRange {
            row,
            len: data.len(),
        })
    }

    fn send(&self, intent: TableIntent<R>) -> Result<(), TableIntentError> {
        self.intents.send(intent).map_err(|_| {
            debug!("table intent dropped: receiver closed");
            TableIntentError::Closed
        })
    }
}

fn cell_for<R: Record>(record: &R, column: &ColumnDescriptor) -> String {
    let value = record.field(column.field_name());
    render_cell(value.as_ref(), column.lookup())
}
