use serde::Serialize;
use std::collections::BTreeMap;

use super::domain::{ApplicationStatus, CertificateType, Lga};
use super::repository::ApplicationRecord;

/// Aggregates the review dashboard renders: status and distribution counts,
/// fees collected, and the share of decided applications that were approved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioReport {
    pub total: u32,
    pub status_counts: BTreeMap<ApplicationStatus, u32>,
    pub certificate_counts: BTreeMap<CertificateType, u32>,
    pub lga_counts: BTreeMap<Lga, u32>,
    pub minor_applications: u32,
    pub fees_collected: u64,
    pub pending_review: u32,
    /// Approved as a percentage of all applications, rounded down.
    pub approval_rate_percent: u8,
}

pub fn portfolio_report(records: &[ApplicationRecord]) -> PortfolioReport {
    let mut report = PortfolioReport::default();

    for record in records {
        report.total += 1;
        *report.status_counts.entry(record.status).or_default() += 1;
        *report
            .certificate_counts
            .entry(record.payload.certificate_type())
            .or_default() += 1;
        *report
            .lga_counts
            .entry(record.payload.common().lga)
            .or_default() += 1;
        if record.payload.is_minor() {
            report.minor_applications += 1;
        }
        report.fees_collected += u64::from(record.receipt.amount);
        if matches!(
            record.status,
            ApplicationStatus::Submitted | ApplicationStatus::UnderReview
        ) {
            report.pending_review += 1;
        }
    }

    if report.total > 0 {
        let approved = report
            .status_counts
            .get(&ApplicationStatus::Approved)
            .copied()
            .unwrap_or(0);
        report.approval_rate_percent = ((approved * 100) / report.total) as u8;
    }

    report
}
