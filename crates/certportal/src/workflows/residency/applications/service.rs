use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use tracing::info;

use super::domain::{ApplicationId, ApplicationPayload, ApplicationStatus};
use super::payment::PaymentReceipt;
use super::report::{portfolio_report, PortfolioReport};
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CERTIFICATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Review decision taken by an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    StartReview,
    Approve,
    Reject,
}

/// Service composing the repository with submission intake and review.
pub struct ResidencyApplicationService<R> {
    repository: Arc<R>,
}

impl<R> ResidencyApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Accept a wizard-produced payload and its payment receipt. The receipt
    /// amount must match the certificate's fixed fee exactly.
    pub fn submit(
        &self,
        payload: ApplicationPayload,
        receipt: PaymentReceipt,
        submitted_on: NaiveDate,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let expected = payload.certificate_type().fee();
        if receipt.amount != expected {
            return Err(ApplicationServiceError::FeeMismatch {
                expected,
                found: receipt.amount,
            });
        }

        let record = ApplicationRecord {
            application_id: next_application_id(),
            payload,
            receipt,
            status: ApplicationStatus::Submitted,
            submitted_on,
            certificate_id: None,
        };

        let stored = self.repository.insert(record)?;
        info!(
            application_id = %stored.application_id,
            certificate_type = stored.payload.certificate_type().label(),
            minor = stored.payload.is_minor(),
            "application submitted"
        );
        Ok(stored)
    }

    /// Apply a review decision and persist the outcome. Approval mints a
    /// certificate identifier.
    pub fn review(
        &self,
        application_id: &ApplicationId,
        action: ReviewAction,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        record.status = match action {
            ReviewAction::StartReview => ApplicationStatus::UnderReview,
            ReviewAction::Approve => ApplicationStatus::Approved,
            ReviewAction::Reject => ApplicationStatus::Rejected,
        };

        if record.status == ApplicationStatus::Approved && record.certificate_id.is_none() {
            record.certificate_id = Some(mint_certificate_id(&record));
        }

        self.repository.update(record.clone())?;
        info!(
            application_id = %record.application_id,
            status = record.status.label(),
            "application reviewed"
        );
        Ok(record)
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Aggregate view over every stored application.
    pub fn report(&self) -> Result<PortfolioReport, ApplicationServiceError> {
        let records = self.repository.list()?;
        Ok(portfolio_report(&records))
    }
}

/// Certificate ids follow `<type>-<lga>-<year>-<serial>`, the format printed
/// on issued certificates.
fn mint_certificate_id(record: &ApplicationRecord) -> String {
    let serial = CERTIFICATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let common = record.payload.common();
    format!(
        "{}-{}-{}-{serial:03}",
        common.certificate_type.code(),
        common.lga.code(),
        record.submitted_on.year(),
    )
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("payment receipt amount {found} does not match the {expected} fee")]
    FeeMismatch { expected: u32, found: u32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
