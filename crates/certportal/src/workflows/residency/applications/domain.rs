use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two certificate products the portal issues, each with a fixed fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificateType {
    LocalGovernment,
    StateOfOrigin,
}

impl CertificateType {
    /// Fee in naira. The mapping is total; no other certificate type exists.
    pub const fn fee(self) -> u32 {
        match self {
            CertificateType::LocalGovernment => 5_000,
            CertificateType::StateOfOrigin => 10_000,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CertificateType::LocalGovernment => "Local Government",
            CertificateType::StateOfOrigin => "State of Origin",
        }
    }

    /// Short code used in issued certificate identifiers.
    pub const fn code(self) -> &'static str {
        match self {
            CertificateType::LocalGovernment => "LG",
            CertificateType::StateOfOrigin => "SO",
        }
    }
}

/// Local Government Areas served by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lga {
    UghelliNorth,
    UghelliSouth,
    Kwale,
    Sapele,
    Udu,
    Patani,
}

impl Lga {
    pub const fn label(self) -> &'static str {
        match self {
            Lga::UghelliNorth => "Ughelli North",
            Lga::UghelliSouth => "Ughelli South",
            Lga::Kwale => "Kwale (Ndokwa West)",
            Lga::Sapele => "Sapele",
            Lga::Udu => "Udu",
            Lga::Patani => "Patani",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Lga::UghelliNorth => "UGN",
            Lga::UghelliSouth => "UGS",
            Lga::Kwale => "KWL",
            Lga::Sapele => "SAP",
            Lga::Udu => "UDU",
            Lga::Patani => "PTN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Relationship of the authorizing guardian to a minor applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardianRelationship {
    Parent,
    LegalGuardian,
    Relative,
    Other,
}

impl GuardianRelationship {
    pub const fn label(self) -> &'static str {
        match self {
            GuardianRelationship::Parent => "parent",
            GuardianRelationship::LegalGuardian => "legal guardian",
            GuardianRelationship::Relative => "relative",
            GuardianRelationship::Other => "other",
        }
    }

    /// Only a parent may authorize without a separate letter.
    pub const fn requires_authorization_letter(self) -> bool {
        !matches!(self, GuardianRelationship::Parent)
    }
}

/// Logical upload slots referenced by the wizard's document steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentSlot {
    PassportPhoto,
    NinSlip,
    BirthCertificate,
    GuardianId,
    AuthorizationLetter,
}

impl DocumentSlot {
    /// Field identifier used for rule lookup and error keying.
    pub const fn field_name(self) -> &'static str {
        match self {
            DocumentSlot::PassportPhoto => "passport",
            DocumentSlot::NinSlip => "ninSlip",
            DocumentSlot::BirthCertificate => "birthCertificate",
            DocumentSlot::GuardianId => "guardianId",
            DocumentSlot::AuthorizationLetter => "authorizationLetter",
        }
    }
}

/// Metadata for a selected file. The portal never stores file content; a real
/// document store is an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub size_bytes: u64,
    pub media_type: String,
}

/// National Identification Number: exactly eleven digits, checked at parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nin(String);

impl Nin {
    pub fn parse(raw: &str) -> Result<Self, NinError> {
        let trimmed = raw.trim();
        if trimmed.len() == 11 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(NinError::Malformed)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Nin {
    type Error = NinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Nin::parse(&value)
    }
}

impl From<Nin> for String {
    fn from(value: Nin) -> Self {
        value.0
    }
}

impl fmt::Display for Nin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NinError {
    #[error("NIN must be an 11-digit number")]
    Malformed,
}

/// Review status tracked for every submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Fields shared by adult and minor applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonDetails {
    pub first_name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub certificate_type: CertificateType,
    pub lga: Lga,
    pub community: String,
    pub address: String,
    pub passport_photo: DocumentUpload,
}

impl CommonDetails {
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.surname, self.first_name, middle),
            None => format!("{} {}", self.surname, self.first_name),
        }
    }
}

/// Identification carried only by adult applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdultIdentity {
    pub nin: Nin,
    pub nin_slip: DocumentUpload,
    pub birth_certificate: DocumentUpload,
}

/// Guardian authorization carried only by minor applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianDetails {
    pub name: String,
    pub relationship: GuardianRelationship,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub guardian_id: DocumentUpload,
    /// Required whenever the relationship is not `Parent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_letter: Option<DocumentUpload>,
}

/// Durable submission payload. Adult and minor variants are distinct so stale
/// fields from a flipped minor flag can never leak into a submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplicationPayload {
    Adult {
        #[serde(flatten)]
        common: CommonDetails,
        identity: AdultIdentity,
    },
    Minor {
        #[serde(flatten)]
        common: CommonDetails,
        birth_certificate: DocumentUpload,
        guardian: GuardianDetails,
    },
}

impl ApplicationPayload {
    pub fn common(&self) -> &CommonDetails {
        match self {
            ApplicationPayload::Adult { common, .. } => common,
            ApplicationPayload::Minor { common, .. } => common,
        }
    }

    pub fn certificate_type(&self) -> CertificateType {
        self.common().certificate_type
    }

    pub fn is_minor(&self) -> bool {
        matches!(self, ApplicationPayload::Minor { .. })
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn fee_mapping_is_total_and_exact() {
        assert_eq!(CertificateType::LocalGovernment.fee(), 5_000);
        assert_eq!(CertificateType::StateOfOrigin.fee(), 10_000);
    }

    #[test]
    fn nin_requires_exactly_eleven_digits() {
        assert!(Nin::parse("12345678901").is_ok());
        assert_eq!(Nin::parse("1234567890"), Err(NinError::Malformed));
        assert_eq!(Nin::parse("123456789012"), Err(NinError::Malformed));
        assert_eq!(Nin::parse("1234567890a"), Err(NinError::Malformed));
    }

    #[test]
    fn nin_tolerates_surrounding_whitespace() {
        let nin = Nin::parse(" 12345678901 ").expect("trimmed NIN parses");
        assert_eq!(nin.as_str(), "12345678901");
    }

    #[test]
    fn only_parents_skip_the_authorization_letter() {
        assert!(!GuardianRelationship::Parent.requires_authorization_letter());
        assert!(GuardianRelationship::LegalGuardian.requires_authorization_letter());
        assert!(GuardianRelationship::Relative.requires_authorization_letter());
        assert!(GuardianRelationship::Other.requires_authorization_letter());
    }
}
