//! Payment collaborator contract.
//!
//! Everything here is a stand-in for a real gateway integration. The card
//! checks exist purely for interface realism and are not a security boundary
//! of any kind; [`PaymentGateway`] is the seam a real processor would fill.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use super::domain::CertificateType;
use super::validation::{field_label, FieldError, ValidationErrors, ViolationKind};

/// Quote handed to the gateway: the fixed fee for the selected certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: u32,
    pub certificate_type: CertificateType,
}

/// Successful charge acknowledgment recorded on the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub amount: u32,
}

/// Card details as entered in the payment form. Synthetic shape checks only.
#[derive(Debug, Clone, Default)]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    /// Shape-check the card form: sixteen digits (spaces tolerated), a
    /// cardholder name, an `MM/YY` expiry that is not in the past, and a
    /// three-digit CVV.
    pub fn validate(&self, today: NaiveDate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let digits: String = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if digits.is_empty() {
            errors.insert("cardNumber", required("cardNumber"));
        } else if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.insert(
                "cardNumber",
                bad_format("Card number must be 16 digits"),
            );
        }

        if self.card_holder.trim().is_empty() {
            errors.insert("cardHolder", required("cardHolder"));
        }

        if self.expiry.trim().is_empty() {
            errors.insert("expiry", required("expiry"));
        } else {
            match parse_expiry(&self.expiry) {
                Some((month, year)) => {
                    let current_year = (today.year() % 100) as u32;
                    let current_month = today.month();
                    if year < current_year || (year == current_year && month < current_month) {
                        errors.insert("expiry", bad_format("Card has expired"));
                    }
                }
                None => {
                    errors.insert("expiry", bad_format("Invalid expiry date"));
                }
            }
        }

        if self.cvv.trim().is_empty() {
            errors.insert("cvv", required("cvv"));
        } else if self.cvv.len() != 3 || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.insert("cvv", bad_format("CVV must be 3 digits"));
        }

        errors
    }
}

fn required(field: &str) -> FieldError {
    FieldError {
        kind: ViolationKind::Missing,
        message: format!("{} is required", field_label(field)),
    }
}

fn bad_format(message: &str) -> FieldError {
    FieldError {
        kind: ViolationKind::BadFormat,
        message: message.to_string(),
    }
}

fn parse_expiry(raw: &str) -> Option<(u32, u32)> {
    let (month, year) = raw.trim().split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: u32 = year.parse().ok()?;
    if (1..=12).contains(&month) && year <= 99 {
        Some((month, year))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("card details failed validation")]
    InvalidCard(ValidationErrors),
    #[error("payment declined: {0}")]
    Declined(String),
}

/// Outbound payment seam consumed by the wizard's surroundings.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, request: &PaymentRequest, card: &CardDetails)
        -> Result<PaymentReceipt, PaymentError>;
}

/// Gateway simulation. Charges always succeed once the card form passes its
/// shape checks; transaction ids combine a timestamp with a process-local
/// sequence so they stay unique without a randomness source.
pub struct SimulatedGateway {
    today: NaiveDate,
    sequence: AtomicU64,
}

impl SimulatedGateway {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_transaction_id(&self) -> String {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        format!("TXN-{millis}-{serial:03}")
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(
        &self,
        request: &PaymentRequest,
        card: &CardDetails,
    ) -> Result<PaymentReceipt, PaymentError> {
        let errors = card.validate(self.today);
        if !errors.is_empty() {
            return Err(PaymentError::InvalidCard(errors));
        }

        Ok(PaymentReceipt {
            transaction_id: self.next_transaction_id(),
            amount: request.amount,
        })
    }
}
