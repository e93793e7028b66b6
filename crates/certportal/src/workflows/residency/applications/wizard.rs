//! Five-step application wizard.
//!
//! The machine is strictly linear: `PersonalInfo → Location → Documents →
//! Payment → Declaration`. Forward transitions are gated by the current
//! step's rule-set; backward transitions are unconditional and never discard
//! input. The payment step is left through the payment sub-flow's own
//! completion or cancel actions, not through `next`/`previous`.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::domain::{
    AdultIdentity, ApplicationPayload, CertificateType, CommonDetails, DocumentSlot,
    DocumentUpload, Gender, GuardianDetails, GuardianRelationship, Lga, Nin,
};
use super::payment::PaymentRequest;
use super::rules;
use super::validation::{FieldSource, FieldValue, FileMeta, RuleSet, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WizardStep {
    PersonalInfo,
    Location,
    Documents,
    Payment,
    Declaration,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            WizardStep::PersonalInfo => 1,
            WizardStep::Location => 2,
            WizardStep::Documents => 3,
            WizardStep::Payment => 4,
            WizardStep::Declaration => 5,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal Information",
            WizardStep::Location => "Location Information",
            WizardStep::Documents => "Document Upload",
            WizardStep::Payment => "Payment",
            WizardStep::Declaration => "Declaration and Submission",
        }
    }

    const fn forward(self) -> Option<Self> {
        match self {
            WizardStep::PersonalInfo => Some(WizardStep::Location),
            WizardStep::Location => Some(WizardStep::Documents),
            WizardStep::Documents => Some(WizardStep::Payment),
            WizardStep::Payment => Some(WizardStep::Declaration),
            WizardStep::Declaration => None,
        }
    }

    const fn back(self) -> Option<Self> {
        match self {
            WizardStep::PersonalInfo => None,
            WizardStep::Location => Some(WizardStep::PersonalInfo),
            WizardStep::Documents => Some(WizardStep::Location),
            WizardStep::Payment => Some(WizardStep::Documents),
            WizardStep::Declaration => Some(WizardStep::Payment),
        }
    }
}

/// Flat, mutable wizard state. Field relevance shifts with the derived
/// `is_minor` flag; the typed [`ApplicationPayload`] produced at submit is
/// where the adult/minor split becomes structural.
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub first_name: String,
    pub surname: String,
    pub middle_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: String,
    pub nin: String,
    pub is_minor: bool,
    pub guardian_name: String,
    pub relationship: Option<GuardianRelationship>,
    pub guardian_phone: String,
    pub guardian_email: String,
    pub guardian_declaration: bool,
    pub certificate_type: CertificateType,
    pub lga: Option<Lga>,
    pub community: String,
    pub address: String,
    pub documents: BTreeMap<DocumentSlot, DocumentUpload>,
    pub payment_complete: bool,
    pub transaction_id: Option<String>,
    pub declaration_accepted: bool,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            surname: String::new(),
            middle_name: String::new(),
            gender: None,
            date_of_birth: None,
            phone: String::new(),
            nin: String::new(),
            is_minor: false,
            guardian_name: String::new(),
            relationship: None,
            guardian_phone: String::new(),
            guardian_email: String::new(),
            guardian_declaration: false,
            certificate_type: CertificateType::LocalGovernment,
            lga: None,
            community: String::new(),
            address: String::new(),
            documents: BTreeMap::new(),
            payment_complete: false,
            transaction_id: None,
            declaration_accepted: false,
        }
    }
}

impl ApplicationForm {
    fn document_value(&self, slot: DocumentSlot) -> Option<FieldValue> {
        self.documents.get(&slot).map(|upload| {
            FieldValue::File(FileMeta {
                file_name: upload.file_name.clone(),
                size_bytes: upload.size_bytes,
                media_type: upload.media_type.clone(),
            })
        })
    }
}

impl FieldSource for ApplicationForm {
    fn field(&self, field: &str) -> Option<FieldValue> {
        match field {
            "firstName" => Some(FieldValue::Text(self.first_name.clone())),
            "surname" => Some(FieldValue::Text(self.surname.clone())),
            "middleName" => Some(FieldValue::Text(self.middle_name.clone())),
            "gender" => self
                .gender
                .map(|gender| FieldValue::Text(gender.label().to_string())),
            "dateOfBirth" => self.date_of_birth.map(FieldValue::Date),
            "phone" => Some(FieldValue::Text(self.phone.clone())),
            "nin" => Some(FieldValue::Text(self.nin.clone())),
            "guardianName" => Some(FieldValue::Text(self.guardian_name.clone())),
            "relationship" => self
                .relationship
                .map(|rel| FieldValue::Text(rel.label().to_string())),
            "guardianPhone" => Some(FieldValue::Text(self.guardian_phone.clone())),
            "guardianEmail" => Some(FieldValue::Text(self.guardian_email.clone())),
            "guardianDeclaration" => Some(FieldValue::Flag(self.guardian_declaration)),
            "certificateType" => Some(FieldValue::Text(
                self.certificate_type.label().to_string(),
            )),
            "lga" => self.lga.map(|lga| FieldValue::Text(lga.label().to_string())),
            "community" => Some(FieldValue::Text(self.community.clone())),
            "address" => Some(FieldValue::Text(self.address.clone())),
            "passport" => self.document_value(DocumentSlot::PassportPhoto),
            "ninSlip" => self.document_value(DocumentSlot::NinSlip),
            "birthCertificate" => self.document_value(DocumentSlot::BirthCertificate),
            "guardianId" => self.document_value(DocumentSlot::GuardianId),
            "authorizationLetter" => self.document_value(DocumentSlot::AuthorizationLetter),
            "payment" => Some(FieldValue::Flag(self.payment_complete)),
            "declaration" => Some(FieldValue::Flag(self.declaration_accepted)),
            _ => None,
        }
    }
}

/// Typed field-change event. Applying one writes the value and clears any
/// existing error for that exact field; nothing is re-validated until the
/// next transition attempt.
#[derive(Debug, Clone)]
pub enum FieldChange {
    FirstName(String),
    Surname(String),
    MiddleName(String),
    Gender(Option<Gender>),
    DateOfBirth(Option<NaiveDate>),
    Phone(String),
    Nin(String),
    GuardianName(String),
    Relationship(Option<GuardianRelationship>),
    GuardianPhone(String),
    GuardianEmail(String),
    GuardianDeclaration(bool),
    CertificateType(CertificateType),
    Lga(Option<Lga>),
    Community(String),
    Address(String),
    Document(DocumentSlot, Option<DocumentUpload>),
    Declaration(bool),
}

impl FieldChange {
    pub const fn field_name(&self) -> &'static str {
        match self {
            FieldChange::FirstName(_) => "firstName",
            FieldChange::Surname(_) => "surname",
            FieldChange::MiddleName(_) => "middleName",
            FieldChange::Gender(_) => "gender",
            FieldChange::DateOfBirth(_) => "dateOfBirth",
            FieldChange::Phone(_) => "phone",
            FieldChange::Nin(_) => "nin",
            FieldChange::GuardianName(_) => "guardianName",
            FieldChange::Relationship(_) => "relationship",
            FieldChange::GuardianPhone(_) => "guardianPhone",
            FieldChange::GuardianEmail(_) => "guardianEmail",
            FieldChange::GuardianDeclaration(_) => "guardianDeclaration",
            FieldChange::CertificateType(_) => "certificateType",
            FieldChange::Lga(_) => "lga",
            FieldChange::Community(_) => "community",
            FieldChange::Address(_) => "address",
            FieldChange::Document(slot, _) => slot.field_name(),
            FieldChange::Declaration(_) => "declaration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("the current step has validation errors")]
    ValidationFailed,
    #[error("already at the final step; submit the application instead")]
    AtFinalStep,
    #[error("payment actions are only available at the payment step")]
    NotAtPaymentStep,
    #[error("the payment step is left through the payment flow's complete or cancel actions")]
    PaymentInProgress,
    #[error("submission is only available at the declaration step")]
    NotAtDeclarationStep,
    #[error("the application was already submitted")]
    AlreadySubmitted,
    #[error("validated form is missing '{0}'")]
    MissingField(&'static str),
}

/// The wizard state machine. One instance per application; the reference
/// date is injected so the age rule is deterministic under test.
#[derive(Debug, Clone)]
pub struct ApplicationWizard {
    today: NaiveDate,
    step: WizardStep,
    form: ApplicationForm,
    errors: ValidationErrors,
    submitted: bool,
}

impl ApplicationWizard {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            step: WizardStep::PersonalInfo,
            form: ApplicationForm::default(),
            errors: ValidationErrors::new(),
            submitted: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_minor(&self) -> bool {
        self.form.is_minor
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Record a field edit. Clears only that field's error; the date of birth
    /// additionally recomputes the minor flag, which shifts the required set
    /// checked on the next transition attempt.
    pub fn apply(&mut self, change: FieldChange) {
        self.errors.clear(change.field_name());
        match change {
            FieldChange::FirstName(value) => self.form.first_name = value,
            FieldChange::Surname(value) => self.form.surname = value,
            FieldChange::MiddleName(value) => self.form.middle_name = value,
            FieldChange::Gender(value) => self.form.gender = value,
            FieldChange::DateOfBirth(value) => {
                self.form.date_of_birth = value;
                self.form.is_minor = value
                    .map(|date| rules::is_minor_on(date, self.today))
                    .unwrap_or(false);
            }
            FieldChange::Phone(value) => self.form.phone = value,
            FieldChange::Nin(value) => self.form.nin = value,
            FieldChange::GuardianName(value) => self.form.guardian_name = value,
            FieldChange::Relationship(value) => self.form.relationship = value,
            FieldChange::GuardianPhone(value) => self.form.guardian_phone = value,
            FieldChange::GuardianEmail(value) => self.form.guardian_email = value,
            FieldChange::GuardianDeclaration(value) => self.form.guardian_declaration = value,
            FieldChange::CertificateType(value) => self.form.certificate_type = value,
            FieldChange::Lga(value) => self.form.lga = value,
            FieldChange::Community(value) => self.form.community = value,
            FieldChange::Address(value) => self.form.address = value,
            FieldChange::Document(slot, Some(upload)) => {
                self.form.documents.insert(slot, upload);
            }
            FieldChange::Document(slot, None) => {
                self.form.documents.remove(&slot);
            }
            FieldChange::Declaration(value) => self.form.declaration_accepted = value,
        }
    }

    fn current_rules(&self) -> RuleSet {
        match self.step {
            WizardStep::PersonalInfo => rules::personal_info_rules(
                self.form.is_minor,
                self.form.relationship,
                self.today,
            ),
            WizardStep::Location => rules::location_rules(),
            WizardStep::Documents => rules::document_rules(self.form.is_minor),
            WizardStep::Payment => rules::payment_rules(),
            WizardStep::Declaration => rules::declaration_rules(),
        }
    }

    /// Attempt to advance. On a clean validation the step moves forward and
    /// the error map is replaced by the (empty) fresh result; otherwise the
    /// step is unchanged and the violations are exposed via [`Self::errors`].
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let Some(target) = self.step.forward() else {
            return Err(WizardError::AtFinalStep);
        };

        let result = self.current_rules().validate(&self.form);
        if result.is_empty() {
            self.errors = result;
            self.step = target;
            Ok(target)
        } else {
            self.errors = result;
            Err(WizardError::ValidationFailed)
        }
    }

    /// Step backward without re-validating anything. All entered data and any
    /// displayed errors are retained. The payment step has no back action of
    /// its own; cancel the payment instead.
    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Payment {
            return Err(WizardError::PaymentInProgress);
        }
        if let Some(target) = self.step.back() {
            self.step = target;
        }
        Ok(self.step)
    }

    /// Quote for the payment sub-flow, derived from the selected certificate
    /// type's fixed fee.
    pub fn begin_payment(&self) -> Result<PaymentRequest, WizardError> {
        if self.step != WizardStep::Payment {
            return Err(WizardError::NotAtPaymentStep);
        }
        Ok(PaymentRequest {
            amount: self.form.certificate_type.fee(),
            certificate_type: self.form.certificate_type,
        })
    }

    /// Payment collaborator reported success: record the transaction and
    /// advance to the declaration step.
    pub fn payment_completed(
        &mut self,
        transaction_id: impl Into<String>,
    ) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Payment {
            return Err(WizardError::NotAtPaymentStep);
        }
        self.form.payment_complete = true;
        self.form.transaction_id = Some(transaction_id.into());
        self.errors.clear("payment");
        self.step = WizardStep::Declaration;
        Ok(self.step)
    }

    /// Payment collaborator reported cancellation: return to the documents
    /// step with everything else intact.
    pub fn payment_cancelled(&mut self) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Payment {
            return Err(WizardError::NotAtPaymentStep);
        }
        self.step = WizardStep::Documents;
        Ok(self.step)
    }

    /// Terminal action. Validates the declaration gate, then freezes the form
    /// into the typed submission payload. A wizard submits at most once.
    pub fn submit(&mut self) -> Result<ApplicationPayload, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.step != WizardStep::Declaration {
            return Err(WizardError::NotAtDeclarationStep);
        }

        let result = rules::declaration_rules().validate(&self.form);
        if !result.is_empty() {
            self.errors = result;
            return Err(WizardError::ValidationFailed);
        }

        let payload = self.build_payload()?;
        self.errors = ValidationErrors::new();
        self.submitted = true;
        Ok(payload)
    }

    fn document(&self, slot: DocumentSlot) -> Result<DocumentUpload, WizardError> {
        self.form
            .documents
            .get(&slot)
            .cloned()
            .ok_or(WizardError::MissingField(slot.field_name()))
    }

    // Consistency guard: every field demanded here was already validated by
    // the step gates, so a miss indicates a broken caller sequence.
    fn build_payload(&self) -> Result<ApplicationPayload, WizardError> {
        let form = &self.form;
        let common = CommonDetails {
            first_name: form.first_name.trim().to_string(),
            surname: form.surname.trim().to_string(),
            middle_name: non_blank(&form.middle_name),
            gender: form.gender.ok_or(WizardError::MissingField("gender"))?,
            date_of_birth: form
                .date_of_birth
                .ok_or(WizardError::MissingField("dateOfBirth"))?,
            phone: form.phone.trim().to_string(),
            certificate_type: form.certificate_type,
            lga: form.lga.ok_or(WizardError::MissingField("lga"))?,
            community: form.community.trim().to_string(),
            address: form.address.trim().to_string(),
            passport_photo: self.document(DocumentSlot::PassportPhoto)?,
        };

        if form.is_minor {
            let guardian = GuardianDetails {
                name: form.guardian_name.trim().to_string(),
                relationship: form
                    .relationship
                    .ok_or(WizardError::MissingField("relationship"))?,
                phone: form.guardian_phone.trim().to_string(),
                email: non_blank(&form.guardian_email),
                guardian_id: self.document(DocumentSlot::GuardianId)?,
                authorization_letter: form
                    .documents
                    .get(&DocumentSlot::AuthorizationLetter)
                    .cloned(),
            };
            Ok(ApplicationPayload::Minor {
                common,
                birth_certificate: self.document(DocumentSlot::BirthCertificate)?,
                guardian,
            })
        } else {
            let identity = AdultIdentity {
                nin: Nin::parse(&form.nin).map_err(|_| WizardError::MissingField("nin"))?,
                nin_slip: self.document(DocumentSlot::NinSlip)?,
                birth_certificate: self.document(DocumentSlot::BirthCertificate)?,
            };
            Ok(ApplicationPayload::Adult { common, identity })
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
