//! CLI argument parsing for scalink
use clap::Parser;
use std::fmt;
use veracode_sca_api::VeracodeConfig;

use crate::workflow::LinkRequest;

#[derive(Parser)]
#[command(
    name = "scalink",
    version,
    about = "Link an SCA project to a Veracode application profile.",
    long_about = "Resolves an SCA workspace, an SCA agent-based project in that workspace and a \
                  Veracode application profile by their exact names, then links the project to \
                  the application profile."
)]
pub struct Cli {
    /// The name of the SCA workspace
    #[arg(long = "workspace_name", value_parser = validate_name)]
    pub workspace_name: String,

    /// The name of the SCA project
    #[arg(long = "project_name", value_parser = validate_name)]
    pub project_name: String,

    /// The name of the application profile
    #[arg(long = "application_profile", value_parser = validate_name)]
    pub application_profile: String,

    /// The Veracode API ID for authentication
    #[arg(long = "api_id", value_parser = validate_api_id)]
    pub api_id: String,

    /// The Veracode API Key for authentication
    #[arg(long = "api_key", value_parser = validate_api_key)]
    pub api_key: String,
}

impl Cli {
    /// Client configuration for the commercial REST endpoint.
    #[must_use]
    pub fn veracode_config(&self) -> VeracodeConfig {
        VeracodeConfig::new(self.api_id.clone(), self.api_key.clone())
    }

    #[must_use]
    pub fn link_request(&self) -> LinkRequest<'_> {
        LinkRequest {
            workspace_name: &self.workspace_name,
            project_name: &self.project_name,
            application_profile: &self.application_profile,
        }
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("workspace_name", &self.workspace_name)
            .field("project_name", &self.project_name)
            .field("application_profile", &self.application_profile)
            .field("api_id", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Names are matched verbatim, so only emptiness is rejected.
fn validate_name(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    Ok(s.to_string())
}

fn validate_api_id(s: &str) -> Result<String, String> {
    validate_api_credential(s, "API ID")?;
    Ok(s.to_string())
}

fn validate_api_key(s: &str) -> Result<String, String> {
    validate_api_credential(s, "API Key")?;
    Ok(s.to_string())
}

/// Validate API credential with optimized character checking
pub fn validate_api_credential(value: &str, field_name: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field_name} cannot be empty"));
    }

    if !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!(
            "{field_name} must contain only alphanumeric characters"
        ));
    }

    Ok(())
}
