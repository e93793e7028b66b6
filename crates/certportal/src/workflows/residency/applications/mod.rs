//! Residency certificate application intake, validation, and review.
//!
//! The validation engine in [`validation`] is declarative: each wizard step owns a
//! [`validation::RuleSet`] built in [`rules`], and the [`wizard::ApplicationWizard`]
//! drives the five-step flow from personal details through payment to submission.

pub mod domain;
pub mod payment;
pub(crate) mod report;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    AdultIdentity, ApplicationId, ApplicationPayload, ApplicationStatus, CertificateType,
    CommonDetails, DocumentSlot, DocumentUpload, Gender, GuardianDetails, GuardianRelationship,
    Lga, Nin,
};
pub use payment::{
    CardDetails, PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway,
};
pub use report::PortfolioReport;
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
};
pub use router::application_router;
pub use service::{ApplicationServiceError, ResidencyApplicationService, ReviewAction};
pub use validation::{
    FieldError, FieldRule, FieldSource, FieldValue, FileMeta, RuleSet, ValidationErrors,
    ViolationKind,
};
pub use wizard::{ApplicationForm, ApplicationWizard, FieldChange, WizardError, WizardStep};
