//! Residency certificate issuance workflows.

pub mod applications;
