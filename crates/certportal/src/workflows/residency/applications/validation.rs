//! Declarative form-validation engine.
//!
//! A [`RuleSet`] maps field identifiers to [`FieldRule`]s and evaluates them
//! against any [`FieldSource`]. Evaluation is pure: for each field the rules
//! run in a fixed order and the first violation wins, so the result carries at
//! most one [`FieldError`] per field. Callers branch on [`ViolationKind`],
//! never on message text.

use chrono::NaiveDate;
use mime::Mime;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

const BYTES_PER_MB: u64 = 1_048_576;

/// Structured failure category for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    TooShort,
    TooLong,
    BadFormat,
    BadFileSize,
    BadFileType,
    CustomRuleFailed,
}

/// First violated rule for a field, with a display-ready message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldError {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Mapping from field name to its first violation. Regenerated fresh on every
/// validation pass; callers merge or clear entries explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    fields: BTreeMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, error: FieldError) {
        self.fields.insert(field.into(), error);
    }

    /// Drop the entry for one field, if any. Used by the wizard when the user
    /// edits that field.
    pub fn clear(&mut self, field: &str) {
        self.fields.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.fields.get(field)
    }

    pub fn kind_of(&self, field: &str) -> Option<ViolationKind> {
        self.fields.get(field).map(|error| error.kind)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(name, error)| (name.as_str(), error))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// A value as seen by the engine. File rules only apply to `File`, string
/// rules only to `Text`; `Flag(false)` counts as blank so checkboxes can be
/// required.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    File(FileMeta),
    Flag(bool),
}

/// Declared metadata of a selected file, as reported by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_name: String,
    pub size_bytes: u64,
    pub media_type: String,
}

/// Seam between the engine and whatever holds the form state.
pub trait FieldSource {
    /// Current value for `field`, or `None` when nothing has been entered.
    fn field(&self, field: &str) -> Option<FieldValue>;
}

type CustomCheck = Arc<dyn Fn(&FieldValue) -> Option<String> + Send + Sync>;

/// Constraints for a single field. Immutable once built; construct with the
/// chained builder methods.
#[derive(Clone, Default)]
pub struct FieldRule {
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    email: bool,
    phone: bool,
    nin: bool,
    pattern: Option<Regex>,
    max_file_size_mb: Option<u64>,
    allowed_media_types: Option<Vec<Mime>>,
    custom: Option<CustomCheck>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    pub fn phone(mut self) -> Self {
        self.phone = true;
        self
    }

    pub fn nin(mut self) -> Self {
        self.nin = true;
        self
    }

    /// Case-sensitive full-string match.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn max_file_size_mb(mut self, limit: u64) -> Self {
        self.max_file_size_mb = Some(limit);
        self
    }

    pub fn allowed_media_types(mut self, types: &[Mime]) -> Self {
        self.allowed_media_types = Some(types.to_vec());
        self
    }

    /// Caller-supplied predicate, always evaluated last.
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    fn evaluate(&self, field: &str, value: Option<&FieldValue>) -> Option<FieldError> {
        let label = field_label(field);

        if is_blank(value) {
            if self.required {
                return Some(FieldError::new(
                    ViolationKind::Missing,
                    format!("{label} is required"),
                ));
            }
            // Optional fields impose no shape constraints when left blank.
            return None;
        }

        let value = value?;

        if let FieldValue::Text(text) = value {
            if let Some(min) = self.min_length {
                if text.chars().count() < min {
                    return Some(FieldError::new(
                        ViolationKind::TooShort,
                        format!("{label} must be at least {min} characters"),
                    ));
                }
            }
            if let Some(max) = self.max_length {
                if text.chars().count() > max {
                    return Some(FieldError::new(
                        ViolationKind::TooLong,
                        format!("{label} must not exceed {max} characters"),
                    ));
                }
            }
            if self.email && !is_valid_email(text) {
                return Some(FieldError::new(
                    ViolationKind::BadFormat,
                    format!("{label} must be a valid email address"),
                ));
            }
            if self.phone && !is_valid_phone(text) {
                return Some(FieldError::new(
                    ViolationKind::BadFormat,
                    format!("{label} must be a valid phone number"),
                ));
            }
            if self.nin && !is_valid_nin(text) {
                return Some(FieldError::new(
                    ViolationKind::BadFormat,
                    format!("{label} must be an 11-digit number"),
                ));
            }
            if let Some(pattern) = &self.pattern {
                if !full_match(pattern, text) {
                    return Some(FieldError::new(
                        ViolationKind::BadFormat,
                        format!("{label} format is invalid"),
                    ));
                }
            }
        }

        if let FieldValue::File(meta) = value {
            if let Some(limit) = self.max_file_size_mb {
                if meta.size_bytes > limit * BYTES_PER_MB {
                    return Some(FieldError::new(
                        ViolationKind::BadFileSize,
                        format!("{label} must be smaller than {limit}MB"),
                    ));
                }
            }
            if let Some(allowed) = &self.allowed_media_types {
                let declared = meta.media_type.parse::<Mime>().ok();
                let permitted = declared
                    .map(|mime| allowed.iter().any(|ty| ty.essence_str() == mime.essence_str()))
                    .unwrap_or(false);
                if !permitted {
                    let listing = allowed
                        .iter()
                        .map(Mime::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Some(FieldError::new(
                        ViolationKind::BadFileType,
                        format!("{label} must be one of: {listing}"),
                    ));
                }
            }
        }

        if let Some(check) = &self.custom {
            if let Some(message) = check(value) {
                return Some(FieldError::new(ViolationKind::CustomRuleFailed, message));
            }
        }

        None
    }
}

/// One rule-set per logical form. Built once, reused across validations.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<String, FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.rules.contains_key(field)
    }

    /// Evaluate every field in the set against `source`. Deterministic and
    /// side-effect free; a failing field contributes exactly one entry.
    pub fn validate(&self, source: &dyn FieldSource) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (field, rule) in &self.rules {
            let value = source.field(field);
            if let Some(error) = rule.evaluate(field, value.as_ref()) {
                errors.insert(field.clone(), error);
            }
        }
        errors
    }
}

/// Absent values, whitespace-only text, and unchecked flags all count as
/// blank; a required checkbox must therefore be checked to pass.
fn is_blank(value: Option<&FieldValue>) -> bool {
    match value {
        None => true,
        Some(FieldValue::Text(text)) => text.trim().is_empty(),
        Some(FieldValue::Flag(flag)) => !flag,
        Some(FieldValue::Date(_)) | Some(FieldValue::File(_)) => false,
    }
}

fn full_match(pattern: &Regex, value: &str) -> bool {
    pattern
        .find(value)
        .map(|found| found.start() == 0 && found.end() == value.len())
        .unwrap_or(false)
}

/// Derive a display label from a camelCase identifier: `dateOfBirth` becomes
/// "Date of birth".
pub fn field_label(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in field.chars() {
        if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut label = words.join(" ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\+234|234|0)?[789][01][0-9]{8}$").expect("phone pattern compiles")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Nigerian mobile shape: optional `+234`/`234`/`0` prefix, a digit in
/// `{7,8,9}`, a digit in `{0,1}`, then eight more digits. Internal whitespace
/// is ignored.
pub fn is_valid_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    phone_regex().is_match(&compact)
}

pub fn is_valid_nin(value: &str) -> bool {
    value.len() == 11 && value.chars().all(|c| c.is_ascii_digit())
}
