//! SCA (Software Composition Analysis) API functionality.
//!
//! Workspaces group agent-based SCA projects. This module resolves workspaces
//! and projects by name and links a project to an application profile.

use log::info;
use serde::{Deserialize, Serialize};

use crate::VeracodeError;
use crate::client::VeracodeClient;

/// An SCA workspace.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Workspace {
    /// Workspace GUID
    pub id: String,
    /// Workspace name
    pub name: String,
    /// Legacy site identifier
    pub site_id: Option<String>,
}

/// An SCA agent-based project inside a workspace.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    /// Project GUID
    pub id: String,
    /// Project name
    pub name: String,
    /// Legacy site identifier
    pub site_id: Option<String>,
    /// ISO 8601 timestamp of the last scan
    pub last_scan_date: Option<String>,
}

/// Response from `GET /srcclr/v3/workspaces`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspacesResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedWorkspaces>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddedWorkspaces {
    pub workspaces: Vec<Workspace>,
}

/// Response from `GET /srcclr/v3/workspaces/{id}/projects`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectsResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedProjects>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddedProjects {
    pub projects: Vec<Project>,
}

/// Identifiers joined by a successful link call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    pub application_guid: String,
    pub project_guid: String,
}

/// SCA API operations.
pub struct ScaApi<'a> {
    client: &'a VeracodeClient,
}

impl<'a> ScaApi<'a> {
    /// Create a new ScaApi instance
    #[must_use]
    pub fn new(client: &'a VeracodeClient) -> Self {
        Self { client }
    }

    /// List every workspace visible to the API credential.
    ///
    /// # Errors
    ///
    /// Request errors from the client, or `InvalidResponse` when the listing has
    /// no `_embedded.workspaces`.
    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>, VeracodeError> {
        let response: WorkspacesResponse = self.client.get_json("/srcclr/v3/workspaces").await?;

        response.embedded.map(|e| e.workspaces).ok_or_else(|| {
            VeracodeError::InvalidResponse(
                "workspace listing is missing _embedded.workspaces".to_string(),
            )
        })
    }

    /// Resolve a workspace name to its GUID.
    ///
    /// Matching is exact and case-sensitive; the first match wins.
    ///
    /// # Errors
    ///
    /// `NotFound` if no workspace has exactly this name, otherwise any error
    /// from [`ScaApi::get_workspaces`].
    pub async fn get_workspace_guid(&self, workspace_name: &str) -> Result<String, VeracodeError> {
        let workspaces = self.get_workspaces().await?;

        find_workspace(&workspaces, workspace_name)
            .map(|workspace| workspace.id.clone())
            .ok_or_else(|| {
                VeracodeError::NotFound(format!("Workspace with name {workspace_name} not found"))
            })
    }

    /// List every project in a workspace.
    ///
    /// # Errors
    ///
    /// Request errors from the client, or `InvalidResponse` when the listing has
    /// no `_embedded.projects`.
    pub async fn get_projects(&self, workspace_guid: &str) -> Result<Vec<Project>, VeracodeError> {
        let endpoint = format!(
            "/srcclr/v3/workspaces/{}/projects",
            urlencoding::encode(workspace_guid)
        );
        let response: ProjectsResponse = self.client.get_json(&endpoint).await?;

        response.embedded.map(|e| e.projects).ok_or_else(|| {
            VeracodeError::InvalidResponse(format!(
                "project listing for workspace {workspace_guid} is missing _embedded.projects"
            ))
        })
    }

    /// Resolve a project name inside a workspace to its GUID.
    ///
    /// # Errors
    ///
    /// `NotFound` (naming the workspace searched) if no project has exactly this
    /// name, otherwise any error from [`ScaApi::get_projects`].
    pub async fn get_project_guid(
        &self,
        workspace_guid: &str,
        project_name: &str,
    ) -> Result<String, VeracodeError> {
        let projects = self.get_projects(workspace_guid).await?;

        find_project(&projects, project_name)
            .map(|project| project.id.clone())
            .ok_or_else(|| {
                VeracodeError::NotFound(format!(
                    "Project with name {project_name} not found in workspace {workspace_guid}"
                ))
            })
    }

    /// Link an SCA project to an application profile.
    ///
    /// Sends `PUT /srcclr/v3/applications/{app}/projects/{project}` with an
    /// empty JSON object. The response body is logged but not interpreted.
    ///
    /// # Errors
    ///
    /// `HttpStatus` for any non-2xx response, or other request errors.
    pub async fn link_project_to_application(
        &self,
        application_guid: &str,
        project_guid: &str,
    ) -> Result<LinkResult, VeracodeError> {
        let endpoint = format!(
            "/srcclr/v3/applications/{}/projects/{}",
            urlencoding::encode(application_guid),
            urlencoding::encode(project_guid)
        );

        self.client
            .put_json(&endpoint, &serde_json::Map::new())
            .await?;

        info!("Linked project {project_guid} to application {application_guid}");
        Ok(LinkResult {
            application_guid: application_guid.to_string(),
            project_guid: project_guid.to_string(),
        })
    }
}

fn find_workspace<'w>(workspaces: &'w [Workspace], name: &str) -> Option<&'w Workspace> {
    workspaces.iter().find(|workspace| workspace.name == name)
}

fn find_project<'p>(projects: &'p [Project], name: &str) -> Option<&'p Project> {
    projects.iter().find(|project| project.name == name)
}
