//! Scalink - link a Veracode SCA agent-based project to an application profile
//!
//! Resolves a workspace, a project inside it and an application profile by
//! name, then links the project to the application.
pub mod cli;
pub mod error;
pub mod workflow;

pub use error::{LinkError, Result};
pub use workflow::{LinkOutcome, LinkRequest, LinkWorkflow};
