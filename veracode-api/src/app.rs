//! Application profile lookups built on top of the core client.

use serde::{Deserialize, Serialize};

use crate::VeracodeError;
use crate::client::VeracodeClient;

/// Represents a Veracode application.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Application {
    /// Globally unique identifier (GUID) for the application
    pub guid: String,
    /// Numeric identifier used by the XML APIs
    pub id: Option<u64>,
    /// ISO 8601 timestamp when the application was created
    pub created: Option<String>,
    /// ISO 8601 timestamp when the application was last modified
    pub modified: Option<String>,
    /// URL to the application profile in the Veracode platform
    pub app_profile_url: Option<String>,
    /// Detailed application profile information
    pub profile: Option<Profile>,
}

/// Application profile information.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    /// Profile name
    pub name: String,
    /// Profile description
    pub description: Option<String>,
    /// Profile tags
    pub tags: Option<String>,
}

/// Response from the Applications API.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApplicationsResponse {
    /// Embedded applications data
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedApplications>,
}

/// Embedded applications in the response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmbeddedApplications {
    /// List of applications
    pub applications: Option<Vec<Application>>,
}

impl ApplicationsResponse {
    /// Find the first application whose profile name equals `name` exactly.
    ///
    /// A response without `_embedded.applications` has no matches.
    #[must_use]
    pub fn find_by_profile_name(&self, name: &str) -> Option<&Application> {
        self.embedded
            .as_ref()
            .and_then(|embedded| embedded.applications.as_deref())
            .unwrap_or_default()
            .iter()
            .find(|app| {
                app.profile
                    .as_ref()
                    .is_some_and(|profile| profile.name == name)
            })
    }
}

/// Application-specific methods that build on the core client.
impl VeracodeClient {
    /// List the applications visible to the API credential.
    ///
    /// # Errors
    ///
    /// Request errors from the client, or `Serialization` for malformed JSON.
    pub async fn get_applications(&self) -> Result<ApplicationsResponse, VeracodeError> {
        self.get_json("/appsec/v1/applications").await
    }

    /// Resolve an application profile name to the application GUID.
    ///
    /// # Errors
    ///
    /// `NotFound` when no profile has exactly this name, including when the
    /// listing lacks `_embedded.applications`.
    pub async fn get_application_guid(&self, app_name: &str) -> Result<String, VeracodeError> {
        let response = self.get_applications().await?;

        response
            .find_by_profile_name(app_name)
            .map(|app| app.guid.clone())
            .ok_or_else(|| {
                VeracodeError::NotFound(format!("Application with name {app_name} not found"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VeracodeConfig;
    use mockito::Server;

    fn test_client(base_url: &str) -> VeracodeClient {
        let config = VeracodeConfig::new(
            "abc123".to_string(),
            "3ddaeeb10ca690df3fee5e3bd1c329fa".to_string(),
        )
        .with_base_url(base_url);
        VeracodeClient::new(config).unwrap()
    }

    const APPLICATIONS_JSON: &str = r#"{
        "_embedded": {
            "applications": [
                {"guid": "A0", "id": 10, "profile": {"name": "Legacy-App", "tags": "old"}},
                {"guid": "A9"},
                {"guid": "A1", "id": 11, "profile": {"name": "Acme-App", "business_criticality": "HIGH"}}
            ]
        },
        "page": {"size": 50, "number": 0}
    }"#;

    #[test]
    fn test_find_by_profile_name() {
        let response: ApplicationsResponse = serde_json::from_str(APPLICATIONS_JSON).unwrap();

        assert_eq!(response.find_by_profile_name("Acme-App").unwrap().guid, "A1");
        assert!(response.find_by_profile_name("acme-app").is_none());
    }

    #[test]
    fn test_missing_embedded_keys_find_nothing() {
        let no_embedded: ApplicationsResponse = serde_json::from_str("{}").unwrap();
        assert!(no_embedded.find_by_profile_name("Acme-App").is_none());

        let no_applications: ApplicationsResponse =
            serde_json::from_str(r#"{"_embedded": {}}"#).unwrap();
        assert!(no_applications.find_by_profile_name("Acme-App").is_none());
    }

    #[tokio::test]
    async fn test_get_application_guid_returns_application_guid() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/appsec/v1/applications")
            .with_status(200)
            .with_body(APPLICATIONS_JSON)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let guid = client.get_application_guid("Acme-App").await.unwrap();

        assert_eq!(guid, "A1");
    }

    #[tokio::test]
    async fn test_get_application_guid_missing_shape_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/appsec/v1/applications")
            .with_status(200)
            .with_body(r#"{"page": {"total_elements": 0}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.get_application_guid("Acme-App").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Item not found: Application with name Acme-App not found"
        );
    }

    #[tokio::test]
    async fn test_get_application_guid_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/appsec/v1/applications")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.get_application_guid("Acme-App").await;

        assert!(matches!(
            result,
            Err(VeracodeError::HttpStatus { status: 401, .. })
        ));
    }
}
