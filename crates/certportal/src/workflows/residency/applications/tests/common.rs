use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::residency::applications::domain::{
    AdultIdentity, ApplicationId, ApplicationPayload, CertificateType, CommonDetails, DocumentSlot,
    DocumentUpload, Gender, GuardianDetails, GuardianRelationship, Lga, Nin,
};
use crate::workflows::residency::applications::payment::PaymentReceipt;
use crate::workflows::residency::applications::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError,
};
use crate::workflows::residency::applications::wizard::{ApplicationWizard, FieldChange};
use crate::workflows::residency::applications::{application_router, ResidencyApplicationService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Reference date used throughout: the minor boundary cases pivot on it.
pub(super) fn today() -> NaiveDate {
    date(2024, 6, 15)
}

pub(super) fn upload(name: &str, media_type: &str, size_bytes: u64) -> DocumentUpload {
    DocumentUpload {
        file_name: name.to_string(),
        size_bytes,
        media_type: media_type.to_string(),
    }
}

pub(super) fn photo() -> DocumentUpload {
    upload("passport.jpg", "image/jpeg", 500_000)
}

pub(super) fn pdf(name: &str) -> DocumentUpload {
    upload(name, "application/pdf", 300_000)
}

pub(super) fn adult_common() -> CommonDetails {
    CommonDetails {
        first_name: "Ada".to_string(),
        surname: "Okafor".to_string(),
        middle_name: None,
        gender: Gender::Female,
        date_of_birth: date(1990, 1, 1),
        phone: "08031234567".to_string(),
        certificate_type: CertificateType::LocalGovernment,
        lga: Lga::UghelliNorth,
        community: "Otovwodo".to_string(),
        address: "12 Market Road, Ughelli".to_string(),
        passport_photo: photo(),
    }
}

pub(super) fn adult_payload() -> ApplicationPayload {
    ApplicationPayload::Adult {
        common: adult_common(),
        identity: AdultIdentity {
            nin: Nin::parse("12345678901").expect("valid nin"),
            nin_slip: pdf("nin-slip.pdf"),
            birth_certificate: pdf("birth-certificate.pdf"),
        },
    }
}

pub(super) fn minor_payload() -> ApplicationPayload {
    let mut common = adult_common();
    common.first_name = "Ese".to_string();
    common.date_of_birth = date(2012, 3, 4);
    ApplicationPayload::Minor {
        common,
        birth_certificate: pdf("birth-certificate.pdf"),
        guardian: GuardianDetails {
            name: "Ada Okafor".to_string(),
            relationship: GuardianRelationship::Parent,
            phone: "08031234567".to_string(),
            email: None,
            guardian_id: pdf("guardian-id.pdf"),
            authorization_letter: None,
        },
    }
}

pub(super) fn receipt_for(certificate_type: CertificateType) -> PaymentReceipt {
    PaymentReceipt {
        transaction_id: "TXN-1718409600000-001".to_string(),
        amount: certificate_type.fee(),
    }
}

/// Wizard advanced through step 1 as an adult applicant.
pub(super) fn adult_wizard_at_location() -> ApplicationWizard {
    let mut wizard = ApplicationWizard::new(today());
    fill_adult_personal_info(&mut wizard);
    wizard.next().expect("step 1 is complete");
    wizard
}

pub(super) fn fill_adult_personal_info(wizard: &mut ApplicationWizard) {
    wizard.apply(FieldChange::FirstName("Ada".to_string()));
    wizard.apply(FieldChange::Surname("Okafor".to_string()));
    wizard.apply(FieldChange::Gender(Some(Gender::Female)));
    wizard.apply(FieldChange::DateOfBirth(Some(date(1990, 1, 1))));
    wizard.apply(FieldChange::Phone("08031234567".to_string()));
    wizard.apply(FieldChange::Nin("12345678901".to_string()));
}

pub(super) fn fill_location(wizard: &mut ApplicationWizard) {
    wizard.apply(FieldChange::CertificateType(CertificateType::LocalGovernment));
    wizard.apply(FieldChange::Lga(Some(Lga::UghelliNorth)));
    wizard.apply(FieldChange::Community("Otovwodo".to_string()));
    wizard.apply(FieldChange::Address("12 Market Road, Ughelli".to_string()));
}

pub(super) fn fill_adult_documents(wizard: &mut ApplicationWizard) {
    wizard.apply(FieldChange::Document(DocumentSlot::PassportPhoto, Some(photo())));
    wizard.apply(FieldChange::Document(
        DocumentSlot::NinSlip,
        Some(pdf("nin-slip.pdf")),
    ));
    wizard.apply(FieldChange::Document(
        DocumentSlot::BirthCertificate,
        Some(pdf("birth-certificate.pdf")),
    ));
}

/// Wizard carried all the way to the payment step with valid adult data.
pub(super) fn adult_wizard_at_payment() -> ApplicationWizard {
    let mut wizard = adult_wizard_at_location();
    fill_location(&mut wizard);
    wizard.next().expect("step 2 is complete");
    fill_adult_documents(&mut wizard);
    wizard.next().expect("step 3 is complete");
    wizard
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.application_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    Arc<ResidencyApplicationService<MemoryRepository>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(ResidencyApplicationService::new(repository.clone()));
    (service, repository)
}

pub(super) fn router_with_memory_repository() -> (axum::Router, Arc<MemoryRepository>) {
    let (service, repository) = build_service();
    (application_router(service), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_not_found(response: &Response) {
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
