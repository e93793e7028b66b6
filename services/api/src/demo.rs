use crate::infra::InMemoryApplicationRepository;
use certportal::error::AppError;
use certportal::workflows::residency::applications::{
    ApplicationRecord, ApplicationWizard, CardDetails, CertificateType, DocumentSlot,
    DocumentUpload, FieldChange, Gender, GuardianRelationship, Lga, PaymentGateway, PaymentReceipt,
    ResidencyApplicationService, ReviewAction, SimulatedGateway, WizardStep,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for age and card-expiry checks (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the minor (guardian) application scenario.
    #[arg(long)]
    pub(crate) skip_minor: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_minor } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Residency certificate portal demo (reference date {today})");

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = ResidencyApplicationService::new(repository);
    let gateway = SimulatedGateway::new(today);

    let adult = run_adult_scenario(today, &gateway, &service)?;
    let under_review = service.review(&adult.application_id, ReviewAction::StartReview)?;
    println!(
        "  Admin review: {} moved to under review",
        under_review.application_id
    );
    let approved = service.review(&adult.application_id, ReviewAction::Approve)?;
    println!(
        "  Admin review: approved, certificate {}",
        approved
            .certificate_id
            .as_deref()
            .unwrap_or("<not minted>")
    );

    if !skip_minor {
        let minor = run_minor_scenario(today, &gateway, &service)?;
        service.review(&minor.application_id, ReviewAction::StartReview)?;
        println!("  Admin review: {} moved to under review", minor.application_id);
    }

    let report = service.report()?;
    println!("\nPortfolio snapshot");
    println!("  Applications:    {}", report.total);
    println!("  Pending review:  {}", report.pending_review);
    println!("  From minors:     {}", report.minor_applications);
    println!("  Fees collected:  ₦{}", report.fees_collected);
    println!("  Approval rate:   {}%", report.approval_rate_percent);
    for (status, count) in &report.status_counts {
        println!("    {:<14} {count}", status.label());
    }

    Ok(())
}

fn run_adult_scenario(
    today: NaiveDate,
    gateway: &SimulatedGateway,
    service: &ResidencyApplicationService<InMemoryApplicationRepository>,
) -> Result<ApplicationRecord, AppError> {
    println!("\nAdult application: Ada Okafor, State of Origin certificate");
    let mut wizard = ApplicationWizard::new(today);

    wizard.apply(FieldChange::FirstName("Ada".to_string()));
    wizard.apply(FieldChange::Surname("Okafor".to_string()));
    wizard.apply(FieldChange::Gender(Some(Gender::Female)));
    wizard.apply(FieldChange::DateOfBirth(Some(date(1990, 1, 1))));
    wizard.apply(FieldChange::Phone("08031234567".to_string()));
    wizard.apply(FieldChange::Nin("12345678901".to_string()));
    advance(&mut wizard)?;

    wizard.apply(FieldChange::CertificateType(CertificateType::StateOfOrigin));
    wizard.apply(FieldChange::Lga(Some(Lga::UghelliNorth)));
    wizard.apply(FieldChange::Community("Otovwodo".to_string()));
    wizard.apply(FieldChange::Address("12 Market Road, Ughelli".to_string()));
    advance(&mut wizard)?;

    wizard.apply(FieldChange::Document(
        DocumentSlot::PassportPhoto,
        Some(upload("passport.jpg", "image/jpeg")),
    ));
    wizard.apply(FieldChange::Document(
        DocumentSlot::NinSlip,
        Some(upload("nin-slip.pdf", "application/pdf")),
    ));
    wizard.apply(FieldChange::Document(
        DocumentSlot::BirthCertificate,
        Some(upload("birth-certificate.pdf", "application/pdf")),
    ));
    advance(&mut wizard)?;

    let receipt = pay(&mut wizard, gateway, today)?;
    wizard.apply(FieldChange::Declaration(true));
    let payload = wizard.submit()?;

    let record = service.submit(payload, receipt, today)?;
    println!(
        "  Submitted as {} (₦{} paid, txn {})",
        record.application_id, record.receipt.amount, record.receipt.transaction_id
    );
    Ok(record)
}

fn run_minor_scenario(
    today: NaiveDate,
    gateway: &SimulatedGateway,
    service: &ResidencyApplicationService<InMemoryApplicationRepository>,
) -> Result<ApplicationRecord, AppError> {
    println!("\nMinor application: Ese Okafor with a relative as guardian");
    let mut wizard = ApplicationWizard::new(today);

    wizard.apply(FieldChange::FirstName("Ese".to_string()));
    wizard.apply(FieldChange::Surname("Okafor".to_string()));
    wizard.apply(FieldChange::Gender(Some(Gender::Male)));
    wizard.apply(FieldChange::DateOfBirth(Some(date(2012, 3, 4))));
    wizard.apply(FieldChange::Phone("08031234567".to_string()));
    println!("  Applicant is a minor: guardian details required");

    wizard.apply(FieldChange::GuardianName("Efe Okafor".to_string()));
    wizard.apply(FieldChange::Relationship(Some(GuardianRelationship::Relative)));
    wizard.apply(FieldChange::GuardianPhone("08139876543".to_string()));
    wizard.apply(FieldChange::GuardianDeclaration(true));
    wizard.apply(FieldChange::Document(
        DocumentSlot::GuardianId,
        Some(upload("guardian-id.pdf", "application/pdf")),
    ));
    wizard.apply(FieldChange::Document(
        DocumentSlot::BirthCertificate,
        Some(upload("birth-certificate.pdf", "application/pdf")),
    ));

    // A relative must attach an authorization letter; show the rejection first.
    if wizard.next().is_err() {
        for (field, error) in wizard.errors().iter() {
            println!("  Validation stopped step 1: {field}: {}", error.message);
        }
    }
    wizard.apply(FieldChange::Document(
        DocumentSlot::AuthorizationLetter,
        Some(upload("authorization.pdf", "application/pdf")),
    ));
    advance(&mut wizard)?;

    wizard.apply(FieldChange::Lga(Some(Lga::Sapele)));
    wizard.apply(FieldChange::Community("Amukpe".to_string()));
    wizard.apply(FieldChange::Address("3 Okpe Road, Sapele".to_string()));
    advance(&mut wizard)?;

    wizard.apply(FieldChange::Document(
        DocumentSlot::PassportPhoto,
        Some(upload("passport.png", "image/png")),
    ));
    advance(&mut wizard)?;

    let receipt = pay(&mut wizard, gateway, today)?;
    wizard.apply(FieldChange::Declaration(true));
    let payload = wizard.submit()?;

    let record = service.submit(payload, receipt, today)?;
    println!(
        "  Submitted as {} (₦{} paid, txn {})",
        record.application_id, record.receipt.amount, record.receipt.transaction_id
    );
    Ok(record)
}

fn advance(wizard: &mut ApplicationWizard) -> Result<WizardStep, AppError> {
    let step = wizard.next()?;
    println!("  Step {}: {}", step.number(), step.title());
    Ok(step)
}

fn pay(
    wizard: &mut ApplicationWizard,
    gateway: &SimulatedGateway,
    today: NaiveDate,
) -> Result<PaymentReceipt, AppError> {
    let request = wizard.begin_payment()?;
    let card = CardDetails {
        card_number: "4111 1111 1111 1111".to_string(),
        card_holder: "Ada Okafor".to_string(),
        expiry: expiry_after(today),
        cvv: "123".to_string(),
    };
    let receipt = gateway.charge(&request, &card)?;
    wizard
        .payment_completed(receipt.transaction_id.clone())
        ?;
    println!(
        "  Payment of ₦{} accepted (txn {})",
        receipt.amount, receipt.transaction_id
    );
    Ok(receipt)
}

fn expiry_after(today: NaiveDate) -> String {
    use chrono::Datelike;
    format!("12/{:02}", (today.year() + 1) % 100)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid demo date")
}

fn upload(name: &str, media_type: &str) -> DocumentUpload {
    DocumentUpload {
        file_name: name.to_string(),
        size_bytes: 400_000,
        media_type: media_type.to_string(),
    }
}
