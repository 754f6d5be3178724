//! Field validation for the user form.
//!
//! Synchronous rules are pure functions of a field value. The email
//! uniqueness rule needs the stored users, so it is exposed separately as
//! [`email_conflicts`] and its finding is merged into the same [`ErrorSet`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::models::User;

/// Minimum length for bounded text fields.
pub const TEXT_MIN: usize = 2;
/// Maximum length for bounded text fields.
pub const TEXT_MAX: usize = 20;
/// Exact length of a phone number.
pub const PHONE_LENGTH: usize = 10;
/// Pattern phone numbers must match.
pub const PHONE_PATTERN: &str = "^[0-9]*$";

const EMAIL_MAX: usize = 254;
const EMAIL_LOCAL_MAX: usize = 64;

// Overall and local-part lengths are checked separately.
#[expect(clippy::expect_used, reason = "the pattern is a literal checked by the tests")]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .expect("email regex is valid")
});

#[expect(clippy::expect_used, reason = "the pattern is a constant checked by the tests")]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone regex is valid"));

/// Editable fields of the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UserField {
    /// `firstName`, required.
    FirstName,
    /// `lastName`.
    LastName,
    /// `email`, required and unique.
    Email,
    /// `phoneNumber`, ten digits when given.
    PhoneNumber,
    /// `address`.
    Address,
    /// `gender`, free choice among the form's options.
    Gender,
}

impl UserField {
    /// Every field, in form order.
    pub const ALL: [Self; 6] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::PhoneNumber,
        Self::Address,
        Self::Gender,
    ];

    /// Wire name of the field.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::PhoneNumber => "phoneNumber",
            Self::Address => "address",
            Self::Gender => "gender",
        }
    }

    /// Current value of this field on `user`.
    pub fn read(self, user: &User) -> &str {
        match self {
            Self::FirstName => user.first_name.as_str(),
            Self::LastName => user.last_name.as_str(),
            Self::Email => user.email.as_str(),
            Self::PhoneNumber => user.phone_number.as_str(),
            Self::Address => user.address.as_str(),
            Self::Gender => user.gender.as_str(),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a field name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field {0:?}")]
pub struct UnknownFieldError(
    /// Name as typed.
    pub String,
);

impl FromStr for UserField {
    type Err = UnknownFieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().replace(['_', '-'], "").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| UnknownFieldError(raw.to_owned()))
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The field is empty.
    Required,
    /// Fewer characters than allowed.
    MinLength {
        /// Smallest accepted length.
        required: usize,
        /// Length found.
        actual: usize,
    },
    /// More characters than allowed.
    MaxLength {
        /// Largest accepted length.
        required: usize,
        /// Length found.
        actual: usize,
    },
    /// Not shaped like an email address.
    Email,
    /// Does not match the field's pattern.
    Pattern {
        /// Pattern the value had to match.
        pattern: &'static str,
    },
    /// Another user already has this value.
    Duplicate,
}

impl ValidationReason {
    /// Key under which the reason is stored in an [`ErrorSet`].
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength { .. } => "minlength",
            Self::MaxLength { .. } => "maxlength",
            Self::Email => "email",
            Self::Pattern { .. } => "pattern",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::MinLength { required, actual } => {
                write!(f, "must be at least {required} characters (got {actual})")
            }
            Self::MaxLength { required, actual } => {
                write!(f, "must be at most {required} characters (got {actual})")
            }
            Self::Email => write!(f, "must be a valid email address"),
            Self::Pattern { pattern } => write!(f, "must match {pattern}"),
            Self::Duplicate => write!(f, "already exists"),
        }
    }
}

/// Validation findings for one control, keyed by reason key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet(BTreeMap<String, ValidationReason>);

impl ErrorSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reason` under its own key, replacing any previous entry.
    pub fn insert(&mut self, reason: ValidationReason) {
        self.0.insert(reason.key().to_owned(), reason);
    }

    /// Record `reason` under an explicit key.
    pub fn insert_as(&mut self, key: impl Into<String>, reason: ValidationReason) {
        self.0.insert(key.into(), reason);
    }

    /// Copy every entry of `other` into `self`; same-named keys are overwritten.
    pub fn merge(&mut self, other: &Self) {
        for (key, reason) in &other.0 {
            self.0.insert(key.clone(), reason.clone());
        }
    }

    /// Reason stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ValidationReason> {
        self.0.get(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the set holds no findings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate findings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationReason)> {
        self.0.iter().map(|(key, reason)| (key.as_str(), reason))
    }
}

impl FromIterator<ValidationReason> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = ValidationReason>>(iter: I) -> Self {
        let mut set = Self::new();
        for reason in iter {
            set.insert(reason);
        }
        set
    }
}

/// A form control: current value plus its validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormControl {
    value: String,
    errors: ErrorSet,
}

impl FormControl {
    /// Control holding `value` with the given findings.
    pub fn new(value: impl Into<String>, errors: ErrorSet) -> Self {
        Self {
            value: value.into(),
            errors,
        }
    }

    /// Current value.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Current findings.
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Mutable findings, used when merging asynchronous results.
    pub fn errors_mut(&mut self) -> &mut ErrorSet {
        &mut self.errors
    }

    /// Whether the control currently has no findings.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Findings for every field that failed, in form order.
pub type FormErrors = BTreeMap<UserField, ErrorSet>;

fn bounded_length(value: &str, errors: &mut ErrorSet, min: usize, max: usize) {
    if value.is_empty() {
        return;
    }
    let actual = value.chars().count();
    if actual < min {
        errors.insert(ValidationReason::MinLength {
            required: min,
            actual,
        });
    }
    if actual > max {
        errors.insert(ValidationReason::MaxLength {
            required: max,
            actual,
        });
    }
}

fn is_email_shaped(value: &str) -> bool {
    let Some((local, _)) = value.split_once('@') else {
        return false;
    };
    value.len() <= EMAIL_MAX && local.len() <= EMAIL_LOCAL_MAX && EMAIL_RE.is_match(value)
}

/// Run the synchronous rules for one field.
///
/// Empty optional fields always pass; length rules count characters.
///
/// # Examples
/// ```
/// use user_console::domain::{UserField, validate_field};
///
/// assert!(validate_field(UserField::FirstName, "Al").is_empty());
/// assert!(validate_field(UserField::FirstName, "A").contains("minlength"));
/// assert!(validate_field(UserField::PhoneNumber, "").is_empty());
/// ```
pub fn validate_field(field: UserField, value: &str) -> ErrorSet {
    let mut errors = ErrorSet::new();
    match field {
        UserField::FirstName => {
            if value.is_empty() {
                errors.insert(ValidationReason::Required);
            }
            bounded_length(value, &mut errors, TEXT_MIN, TEXT_MAX);
        }
        UserField::LastName | UserField::Address => {
            bounded_length(value, &mut errors, TEXT_MIN, TEXT_MAX);
        }
        UserField::Email => {
            if value.is_empty() {
                errors.insert(ValidationReason::Required);
            } else if !is_email_shaped(value) {
                errors.insert(ValidationReason::Email);
            }
        }
        UserField::PhoneNumber => {
            if !value.is_empty() && !PHONE_RE.is_match(value) {
                errors.insert(ValidationReason::Pattern {
                    pattern: PHONE_PATTERN,
                });
            }
            bounded_length(value, &mut errors, PHONE_LENGTH, PHONE_LENGTH);
        }
        UserField::Gender => {}
    }
    errors
}

/// Run the synchronous rules for every field of `user`.
pub fn validate(user: &User) -> FormErrors {
    UserField::ALL
        .into_iter()
        .filter_map(|field| {
            let errors = validate_field(field, field.read(user));
            (!errors.is_empty()).then_some((field, errors))
        })
        .collect()
}

/// Decide whether `candidate` collides with an existing user's email.
///
/// `original_email` is the stored email of the record being edited; keeping
/// it unchanged never counts as a collision.
///
/// # Examples
/// ```
/// use user_console::domain::email_conflicts;
///
/// let existing = ["a@x.com", "b@x.com"];
/// assert!(email_conflicts("a@x.com", existing, None));
/// assert!(!email_conflicts("a@x.com", existing, Some("a@x.com")));
/// assert!(email_conflicts("b@x.com", existing, Some("a@x.com")));
/// ```
pub fn email_conflicts<'a>(
    candidate: &str,
    existing: impl IntoIterator<Item = &'a str>,
    original_email: Option<&str>,
) -> bool {
    let taken = existing.into_iter().any(|email| email == candidate);
    taken && original_email != Some(candidate)
}
