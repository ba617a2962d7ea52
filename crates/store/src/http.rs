//! Persistence backend that talks to the StoryReel API server.
//!
//! Every request carries the owner's bearer token; the server scopes all
//! project routes to the token's subject, which is why `list_by_owner`
//! never sends the owner id itself.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use storyreel_core::persistence::{PersistenceError, ProjectPersistence};
use storyreel_core::project::{NewProject, Project, ProjectPatch};
use storyreel_core::types::ProjectId;

/// Success envelope used by the API server.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn projects_url(&self) -> String {
        format!("{}/api/v1/projects", self.base_url)
    }

    fn project_url(&self, id: &str) -> String {
        format!("{}/{}", self.projects_url(), urlencoding::encode(id))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, PersistenceError> {
        request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PersistenceError::Backend(format!("request failed: {e}")))
    }
}

/// Map a non-success status to a persistence error.
async fn ensure_success(response: Response, id: Option<&str>) -> Result<Response, PersistenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => PersistenceError::NotFound { id: id.to_string() },
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            PersistenceError::Rejected(format!("HTTP {status}: {body}"))
        }
        _ => PersistenceError::Backend(format!("HTTP {status}: {body}")),
    })
}

async fn parse_data<T: DeserializeOwned>(response: Response) -> Result<T, PersistenceError> {
    response
        .json::<Envelope<T>>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|e| PersistenceError::Backend(format!("invalid response body: {e}")))
}

#[async_trait]
impl ProjectPersistence for HttpRemote {
    async fn create(
        &self,
        _owner_id: &str,
        data: &NewProject,
    ) -> Result<ProjectId, PersistenceError> {
        let response = self
            .send(self.client.post(self.projects_url()).json(data))
            .await?;
        let project: Project = parse_data(ensure_success(response, None).await?).await?;
        Ok(project.id)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Project>, PersistenceError> {
        tracing::debug!(owner_id, "Listing projects over HTTP");
        let response = self.send(self.client.get(self.projects_url())).await?;
        parse_data(ensure_success(response, None).await?).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, PersistenceError> {
        let response = self.send(self.client.get(self.project_url(id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_data(ensure_success(response, Some(id)).await?).await.map(Some)
    }

    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), PersistenceError> {
        let response = self
            .send(self.client.patch(self.project_url(id)).json(patch))
            .await?;
        ensure_success(response, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let response = self.send(self.client.delete(self.project_url(id))).await?;
        ensure_success(response, Some(id)).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), PersistenceError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| PersistenceError::Backend(format!("request failed: {e}")))?;
        ensure_success(response, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_trim_trailing_slash_and_encode_ids() {
        let remote = HttpRemote::new("http://localhost:3000/", "token");
        assert_eq!(remote.projects_url(), "http://localhost:3000/api/v1/projects");
        assert_eq!(
            remote.project_url("a b"),
            "http://localhost:3000/api/v1/projects/a%20b"
        );
    }

    #[test]
    fn envelope_unwraps_data() {
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(envelope.data, vec![1, 2]);
    }
}
