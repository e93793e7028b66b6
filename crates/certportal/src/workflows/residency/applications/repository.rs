use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationPayload, ApplicationStatus};
use super::payment::PaymentReceipt;

/// Repository record: the frozen payload plus review metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub payload: ApplicationPayload,
    pub receipt: PaymentReceipt,
    pub status: ApplicationStatus,
    pub submitted_on: NaiveDate,
    /// Assigned when the application is approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            applicant_name: self.payload.common().full_name(),
            certificate_type: self.payload.certificate_type().label(),
            status: self.status.label(),
            submitted_on: self.submitted_on,
            transaction_id: self.receipt.transaction_id.clone(),
            certificate_id: self.certificate_id.clone(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub applicant_name: String,
    pub certificate_type: &'static str,
    pub status: &'static str,
    pub submitted_on: NaiveDate,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}
