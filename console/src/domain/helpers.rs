//! Small collection helpers shared by the widgets and the form.

use serde_json::Value;

use super::record::{Record, values_match};
use super::validation::{ErrorSet, FormControl};

/// Read `key` from every record, preserving order and length.
///
/// Records without the field contribute `None`; nothing is deduplicated.
pub fn project_field<R: Record>(key: &str, records: &[R]) -> Vec<Option<Value>> {
    records.iter().map(|record| record.field(key)).collect()
}

/// Find the record whose `key` field matches `expected`.
///
/// When several records match, the **last** one in input order wins.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_console::domain::find_by_field;
///
/// let cities = vec![
///     json!({ "id": 1, "name": "Springfield" }),
///     json!({ "id": 2, "name": "Springfield" }),
/// ];
/// let found = find_by_field("name", &json!("Springfield"), &cities);
/// assert_eq!(found.and_then(|city| city.get("id")), Some(&json!(2)));
/// ```
pub fn find_by_field<'a, R: Record>(key: &str, expected: &Value, records: &'a [R]) -> Option<&'a R> {
    let mut found = None;
    for record in records {
        if record
            .field(key)
            .is_some_and(|value| values_match(&value, expected))
        {
            found = Some(record);
        }
    }
    found
}

/// Merge `new_errors` into the control's existing findings.
///
/// Does nothing when either side is absent. Keys already on the control
/// survive unless `new_errors` carries the same key.
pub fn merge_errors(new_errors: Option<&ErrorSet>, control: Option<&mut FormControl>) {
    let (Some(new_errors), Some(control)) = (new_errors, control) else {
        return;
    };
    control.errors_mut().merge(new_errors);
}
