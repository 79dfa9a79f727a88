//! # Veracode SCA API Client
//!
//! A small Rust client for the parts of the Veracode REST API needed to attach an
//! SCA agent-based project to an application profile:
//!
//! - SCA workspaces and the projects inside them (`/srcclr/v3/...`)
//! - Application profiles (`/appsec/v1/applications`)
//! - The project-to-application link (`PUT /srcclr/v3/applications/{app}/projects/{project}`)
//!
//! Every request is signed with Veracode's `VERACODE-HMAC-SHA-256` scheme.
//!
//! ## Quick Start
//!
//! ```no_run
//! use veracode_sca_api::{VeracodeClient, VeracodeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VeracodeConfig::new(
//!         "your_api_id".to_string(),
//!         "your_api_key".to_string(),
//!     );
//!     let client = VeracodeClient::new(config)?;
//!
//!     let sca = client.sca_api();
//!     let workspace_guid = sca.get_workspace_guid("My Workspace").await?;
//!     let project_guid = sca.get_project_guid(&workspace_guid, "my-project").await?;
//!     let app_guid = client.get_application_guid("My Application").await?;
//!
//!     sca.link_project_to_application(&app_guid, &project_guid).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Regional Support
//!
//! ```no_run
//! use veracode_sca_api::{VeracodeConfig, VeracodeRegion};
//!
//! // REST APIs will use: api.veracode.eu
//! let config = VeracodeConfig::new("api_id".to_string(), "api_key".to_string())
//!     .with_region(VeracodeRegion::European);
//! ```

pub mod app;
pub mod client;
pub mod sca;

use reqwest::Error as ReqwestError;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;

pub use app::{Application, ApplicationsResponse, EmbeddedApplications, Profile};
pub use client::VeracodeClient;
pub use sca::{
    EmbeddedProjects, EmbeddedWorkspaces, LinkResult, Project, ProjectsResponse, ScaApi,
    Workspace, WorkspacesResponse,
};

/// Custom error type for Veracode API operations.
#[derive(Debug)]
pub enum VeracodeError {
    /// HTTP request failed before a response was received
    Http(ReqwestError),
    /// The platform answered with a non-2xx status
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },
    /// JSON serialization/deserialization failed
    Serialization(serde_json::Error),
    /// Authentication error (invalid credentials, signature generation failure, etc.)
    Authentication(String),
    /// The response did not have the expected structure
    InvalidResponse(String),
    /// Configuration is invalid
    InvalidConfig(String),
    /// When an item is not found
    NotFound(String),
}

impl VeracodeError {
    /// Returns true when a name lookup found no match.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, VeracodeError::NotFound(_))
    }
}

impl fmt::Display for VeracodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VeracodeError::Http(e) => write!(f, "HTTP error: {e}"),
            VeracodeError::HttpStatus { status, url, body } => {
                write!(f, "HTTP {status} from {url}: {body}")
            }
            VeracodeError::Serialization(e) => write!(f, "Serialization error: {e}"),
            VeracodeError::Authentication(e) => write!(f, "Authentication error: {e}"),
            VeracodeError::InvalidResponse(e) => write!(f, "Invalid response: {e}"),
            VeracodeError::InvalidConfig(e) => write!(f, "Invalid configuration: {e}"),
            VeracodeError::NotFound(e) => write!(f, "Item not found: {e}"),
        }
    }
}

impl std::error::Error for VeracodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VeracodeError::Http(e) => Some(e),
            VeracodeError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for VeracodeError {
    fn from(error: ReqwestError) -> Self {
        VeracodeError::Http(error)
    }
}

impl From<serde_json::Error> for VeracodeError {
    fn from(error: serde_json::Error) -> Self {
        VeracodeError::Serialization(error)
    }
}

/// API credentials held as shared secrets.
///
/// `Debug` output never contains the id or key.
#[derive(Clone)]
pub struct VeracodeCredentials {
    api_id: Arc<SecretString>,
    api_key: Arc<SecretString>,
}

impl VeracodeCredentials {
    #[must_use]
    pub fn new(api_id: String, api_key: String) -> Self {
        Self {
            api_id: Arc::new(SecretString::new(api_id.into())),
            api_key: Arc::new(SecretString::new(api_key.into())),
        }
    }

    /// Expose the API id for request signing.
    #[must_use]
    pub fn expose_api_id(&self) -> &str {
        self.api_id.expose_secret()
    }

    /// Expose the API key for request signing.
    #[must_use]
    pub fn expose_api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub fn api_id_ptr(&self) -> Arc<SecretString> {
        Arc::clone(&self.api_id)
    }

    #[must_use]
    pub fn api_key_ptr(&self) -> Arc<SecretString> {
        Arc::clone(&self.api_key)
    }
}

impl fmt::Debug for VeracodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VeracodeCredentials")
            .field("api_id", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Veracode regions for API access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VeracodeRegion {
    /// Commercial region (default) - api.veracode.com
    #[default]
    Commercial,
    /// European region - api.veracode.eu
    European,
    /// US Federal region - api.veracode.us
    Federal,
}

impl VeracodeRegion {
    /// REST API base URL for the region.
    #[must_use]
    pub fn rest_base_url(&self) -> &'static str {
        match self {
            VeracodeRegion::Commercial => "https://api.veracode.com",
            VeracodeRegion::European => "https://api.veracode.eu",
            VeracodeRegion::Federal => "https://api.veracode.us",
        }
    }
}

/// Configuration for the Veracode API client.
#[derive(Debug, Clone)]
pub struct VeracodeConfig {
    /// API id and key
    pub credentials: VeracodeCredentials,
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Veracode region for your account
    pub region: VeracodeRegion,
}

impl VeracodeConfig {
    /// Create a new configuration for the Commercial region.
    ///
    /// # Arguments
    ///
    /// * `api_id` - Your Veracode API ID
    /// * `api_key` - Your Veracode API key
    #[must_use]
    pub fn new(api_id: String, api_key: String) -> Self {
        Self::from_credentials(VeracodeCredentials::new(api_id, api_key))
    }

    /// Create a configuration sharing already-loaded credentials.
    #[must_use]
    pub fn from_credentials(credentials: VeracodeCredentials) -> Self {
        let region = VeracodeRegion::default();
        Self {
            credentials,
            base_url: region.rest_base_url().to_string(),
            region,
        }
    }

    /// Set the region for this configuration.
    ///
    /// Resets `base_url` to the region's REST endpoint.
    #[must_use]
    pub fn with_region(mut self, region: VeracodeRegion) -> Self {
        self.region = region;
        self.base_url = region.rest_base_url().to_string();
        self
    }

    /// Point the client at a different base URL, e.g. a gateway or a test server.
    ///
    /// A trailing slash is removed so endpoint paths can be appended directly.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}
