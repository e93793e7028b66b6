//! Rule-sets backing each wizard step, plus the canonical age computation.
//!
//! The minor/adult split is decided by [`age_in_years`] alone: one
//! birthday-adjusted calculation, applied everywhere an age is needed.

use chrono::{Datelike, NaiveDate};
use mime::Mime;
use regex::Regex;
use std::sync::OnceLock;

use super::domain::GuardianRelationship;
use super::validation::{FieldRule, FieldValue, RuleSet};

/// Whole years lived as of `today`, counted down by one when the birthday has
/// not yet occurred this year.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

pub fn is_minor_on(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    age_in_years(date_of_birth, today) < 18
}

fn name_pattern() -> Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-zA-Z\s'-]+").expect("name pattern compiles"))
        .clone()
}

fn photo_media_types() -> &'static [Mime] {
    static TYPES: OnceLock<Vec<Mime>> = OnceLock::new();
    TYPES.get_or_init(|| vec![mime::IMAGE_JPEG, mime::IMAGE_PNG])
}

fn document_media_types() -> &'static [Mime] {
    static TYPES: OnceLock<Vec<Mime>> = OnceLock::new();
    TYPES.get_or_init(|| vec![mime::IMAGE_JPEG, mime::IMAGE_PNG, mime::APPLICATION_PDF])
}

const UPLOAD_LIMIT_MB: u64 = 2;

fn name_rule() -> FieldRule {
    FieldRule::new()
        .min_length(2)
        .max_length(50)
        .pattern(name_pattern())
}

fn document_rule() -> FieldRule {
    FieldRule::new()
        .max_file_size_mb(UPLOAD_LIMIT_MB)
        .allowed_media_types(document_media_types())
}

fn date_of_birth_rule(today: NaiveDate) -> FieldRule {
    let earliest = NaiveDate::from_ymd_opt(today.year() - 100, 1, 1).unwrap_or(NaiveDate::MIN);
    FieldRule::new().required().custom(move |value| {
        let FieldValue::Date(date) = value else {
            return None;
        };
        if *date > today {
            return Some("Date of birth cannot be in the future".to_string());
        }
        if *date < earliest {
            return Some("Please enter a valid date of birth".to_string());
        }
        None
    })
}

/// Step 1 rules. The required set changes with the derived minor flag: adults
/// must supply a NIN, minors a guardian block instead.
pub fn personal_info_rules(
    is_minor: bool,
    relationship: Option<GuardianRelationship>,
    today: NaiveDate,
) -> RuleSet {
    let mut rules = RuleSet::new()
        .rule("firstName", name_rule().required())
        .rule("surname", name_rule().required())
        .rule("middleName", name_rule())
        .rule("gender", FieldRule::new().required())
        .rule("dateOfBirth", date_of_birth_rule(today))
        .rule("phone", FieldRule::new().required().phone());

    if is_minor {
        let authorization = match relationship {
            Some(rel) if rel.requires_authorization_letter() => document_rule().required(),
            _ => document_rule(),
        };
        rules = rules
            .rule("guardianName", name_rule().required())
            .rule("relationship", FieldRule::new().required())
            .rule("guardianPhone", FieldRule::new().required().phone())
            .rule("guardianEmail", FieldRule::new().email().max_length(100))
            .rule("guardianId", document_rule().required())
            .rule("birthCertificate", document_rule().required())
            .rule("authorizationLetter", authorization)
            .rule("guardianDeclaration", FieldRule::new().required());
    } else {
        rules = rules.rule("nin", FieldRule::new().required().nin());
    }

    rules
}

/// Step 2 rules: certificate type, LGA, community, and address are all
/// required.
pub fn location_rules() -> RuleSet {
    RuleSet::new()
        .rule("certificateType", FieldRule::new().required())
        .rule("lga", FieldRule::new().required())
        .rule("community", FieldRule::new().required().max_length(100))
        .rule("address", FieldRule::new().required().max_length(200))
}

/// Step 3 rules. Minor applications already captured the birth certificate
/// and guardian documents at step 1, so only the passport photo is required
/// for them here.
pub fn document_rules(is_minor: bool) -> RuleSet {
    let passport = FieldRule::new()
        .required()
        .max_file_size_mb(UPLOAD_LIMIT_MB)
        .allowed_media_types(photo_media_types());

    let mut rules = RuleSet::new().rule("passport", passport);
    if !is_minor {
        rules = rules
            .rule("ninSlip", document_rule().required())
            .rule("birthCertificate", document_rule().required());
    }
    rules
}

/// Step 4 gate: the payment sub-flow must have reported completion.
pub fn payment_rules() -> RuleSet {
    RuleSet::new().rule("payment", FieldRule::new().required())
}

/// Step 5 rules: the declaration checkbox is the terminal gate.
pub fn declaration_rules() -> RuleSet {
    RuleSet::new().rule("declaration", FieldRule::new().required())
}
