//! Error types for scalink
use veracode_sca_api::VeracodeError;

/// Failure of one stage of the linking workflow.
///
/// Every variant is terminal; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    /// The Veracode client could not be created
    #[error("Failed to create Veracode client: {0}")]
    Client(#[source] VeracodeError),

    /// Workspace resolution failed
    #[error("Workspace lookup failed: {0}")]
    Workspace(#[source] VeracodeError),

    /// Project resolution failed
    #[error("Project lookup failed: {0}")]
    Project(#[source] VeracodeError),

    /// Application profile resolution failed
    #[error("Application profile lookup failed: {0}")]
    Application(#[source] VeracodeError),

    /// The link request failed
    #[error("Linking project to application profile failed: {0}")]
    Link(#[source] VeracodeError),
}

impl LinkError {
    /// The underlying API error.
    #[must_use]
    pub fn api_error(&self) -> &VeracodeError {
        match self {
            LinkError::Client(e)
            | LinkError::Workspace(e)
            | LinkError::Project(e)
            | LinkError::Application(e)
            | LinkError::Link(e) => e,
        }
    }
}

/// Result type alias for scalink operations
pub type Result<T> = std::result::Result<T, LinkError>;
