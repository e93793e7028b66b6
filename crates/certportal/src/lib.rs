//! Domain library for the residency certificate application portal.
//!
//! The heart of the crate is the application wizard under
//! [`workflows::residency::applications`]: a declarative form-validation
//! engine and the five-step application state machine, plus the submission
//! repository, review service, and HTTP router built on top of them.

pub mod config;
pub mod error;
pub mod session;
pub mod telemetry;
pub mod workflows;
