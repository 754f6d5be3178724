//! Multi-select chip input with autocomplete over an arbitrary collection.
//!
//! The selector knows nothing about the records it holds beyond the
//! [`LookupConfig`] naming their identity and label fields. Every change to
//! the selection is published as the full selected collection.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use super::helpers::{find_by_field, project_field};
use super::record::{Record, label_text, values_match};
use super::table_config::LookupConfig;

/// Keys that finish typing a chip.
pub const SEPARATOR_KEYS: [char; 2] = ['\n', ','];

/// Chip selector state.
///
/// A clone publishes to the same change listener as the original.
#[derive(Debug, Clone)]
pub struct ChipSelector<R> {
    label: String,
    placeholder: String,
    lookup: LookupConfig,
    candidates: Vec<R>,
    selected: Vec<R>,
    input: String,
    changes: Option<mpsc::UnboundedSender<Vec<R>>>,
}

impl<R: Record + Clone> ChipSelector<R> {
    /// Empty selector using `lookup` for identity and labels.
    pub fn new(lookup: LookupConfig) -> Self {
        Self {
            label: String::new(),
            placeholder: String::new(),
            lookup,
            candidates: Vec::new(),
            selected: Vec::new(),
            input: String::new(),
            changes: None,
        }
    }

    /// Set the caption and input placeholder.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.label = label.into();
        self.placeholder = placeholder.into();
        self
    }

    /// Caption shown next to the input.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Placeholder text for the input.
    pub fn placeholder(&self) -> &str {
        self.placeholder.as_str()
    }

    /// Lookup configuration in use.
    pub fn lookup(&self) -> &LookupConfig {
        &self.lookup
    }

    /// Replace the candidate collection.
    pub fn set_candidates(&mut self, candidates: Vec<R>) {
        self.candidates = candidates;
    }

    /// Every record the operator can choose from.
    pub fn candidates(&self) -> &[R] {
        &self.candidates
    }

    /// Replace the selection without publishing a change.
    pub fn set_selected(&mut self, selected: Vec<R>) {
        self.selected = selected;
    }

    /// Currently selected records.
    pub fn selected(&self) -> &[R] {
        &self.selected
    }

    /// Current free-text input.
    pub fn input(&self) -> &str {
        self.input.as_str()
    }

    /// Subscribe to selection changes, replacing any earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Vec<R>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.changes = Some(tx);
        rx
    }

    /// Whether `key` ends the current chip entry.
    pub fn key_ends_entry(key: char) -> bool {
        SEPARATOR_KEYS.contains(&key)
    }

    /// Update the free-text input.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Candidates whose label contains the current input, ignoring case.
    ///
    /// An empty input yields every candidate. Candidate order is preserved.
    pub fn filtered(&self) -> Vec<&R> {
        if self.input.is_empty() {
            return self.candidates.iter().collect();
        }
        self.filter_text(&self.input)
    }

    /// Candidates whose label contains `record`'s label, ignoring case.
    pub fn filter_by_record(&self, record: &R) -> Vec<&R> {
        let label = self.lookup.label_of(record).unwrap_or_default();
        self.filter_text(&label)
    }

    fn filter_text(&self, text: &str) -> Vec<&R> {
        let needle = text.to_lowercase();
        self.candidates
            .iter()
            .filter(|candidate| {
                self.lookup
                    .label_of(*candidate)
                    .is_some_and(|label| label.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Commit the typed text as a chip.
    ///
    /// The trimmed text must equal some candidate's label and no selected
    /// record may already carry that label. Unmatched text is dropped
    /// silently. The input is cleared either way. Returns whether a record
    /// was appended.
    pub fn commit_typed(&mut self) -> bool {
        let typed = std::mem::take(&mut self.input);
        let value = typed.trim();
        if value.is_empty() {
            return false;
        }

        let wanted = Value::from(value);
        let label_field = self.lookup.label_field().to_owned();
        let has_label = |records: &[R]| {
            project_field(&label_field, records)
                .iter()
                .flatten()
                .any(|label| label_text(label) == value)
        };
        if !has_label(&self.candidates) || has_label(&self.selected) {
            debug!(chip = value, "typed chip rejected");
            return false;
        }

        let Some(record) = find_by_field(&label_field, &wanted, &self.candidates).cloned() else {
            return false;
        };
        self.selected.push(record);
        self.publish();
        true
    }

    /// Commit a record picked from the suggestions.
    ///
    /// Appends only when no selected record shares its identity value. The
    /// input is cleared either way.
    pub fn commit_pick(&mut self, record: R) -> bool {
        self.input.clear();
        let identity = self.lookup.value_of(&record);
        if self.position_of(identity.as_ref()).is_some() {
            return false;
        }
        self.selected.push(record);
        self.publish();
        true
    }

    /// Remove the first selected record sharing `record`'s identity value.
    pub fn remove(&mut self, record: &R) -> bool {
        let identity = self.lookup.value_of(record);
        let Some(index) = self.position_of(identity.as_ref()) else {
            return false;
        };
        self.selected.remove(index);
        self.publish();
        true
    }

    fn position_of(&self, identity: Option<&Value>) -> Option<usize> {
        let wanted = identity?;
        project_field(self.lookup.value_field(), &self.selected)
            .iter()
            .position(|value| value.as_ref().is_some_and(|found| values_match(found, wanted)))
    }

    fn publish(&self) {
        let Some(changes) = &self.changes else {
            return;
        };
        if changes.send(self.selected.clone()).is_err() {
            debug!("chip selection subscriber dropped");
        }
    }
}

#[cfg(test)]
mod tests;
