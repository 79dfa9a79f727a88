//! The four-stage linking workflow.
//!
//! Stages run strictly in order: workspace, project, application profile, link.
//! The first failure ends the run.
use log::info;
use veracode_sca_api::VeracodeClient;

use crate::error::{LinkError, Result};

/// Names to resolve for one link operation.
#[derive(Debug, Clone, Copy)]
pub struct LinkRequest<'a> {
    pub workspace_name: &'a str,
    pub project_name: &'a str,
    pub application_profile: &'a str,
}

/// Identifiers resolved and linked by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub workspace_guid: String,
    pub project_guid: String,
    pub application_guid: String,
}

pub struct LinkWorkflow {
    client: VeracodeClient,
}

impl LinkWorkflow {
    #[must_use]
    pub fn new(client: VeracodeClient) -> Self {
        Self { client }
    }

    /// Resolve every name and link the project to the application profile.
    ///
    /// # Errors
    ///
    /// Returns the `LinkError` variant for the stage that failed.
    pub async fn execute(&self, request: &LinkRequest<'_>) -> Result<LinkOutcome> {
        let sca = self.client.sca_api();

        let workspace_guid = sca
            .get_workspace_guid(request.workspace_name)
            .await
            .map_err(LinkError::Workspace)?;
        info!("Workspace GUID: {workspace_guid}");

        let project_guid = sca
            .get_project_guid(&workspace_guid, request.project_name)
            .await
            .map_err(LinkError::Project)?;
        info!("Project GUID: {project_guid}");

        // Does not depend on the SCA lookups but must run after them.
        let application_guid = self
            .client
            .get_application_guid(request.application_profile)
            .await
            .map_err(LinkError::Application)?;
        info!("Application GUID: {application_guid}");

        sca.link_project_to_application(&application_guid, &project_guid)
            .await
            .map_err(LinkError::Link)?;

        Ok(LinkOutcome {
            workspace_guid,
            project_guid,
            application_guid,
        })
    }
}
